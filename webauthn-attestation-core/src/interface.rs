//! The results of a successful attestation statement verification.

use openssl::x509;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The processed attestation that the authenticator is providing, describing
/// the trust model proven by the attestation statement and its trust path.
#[derive(Debug)]
pub enum ParsedAttestationData {
    /// The credential is authenticated by a signing X509 Certificate
    /// from a vendor or provider. The chain is as presented by the
    /// authenticator, leaf first, and has *not* been validated to any
    /// trust anchor.
    Basic(Vec<x509::X509>),
    /// The credential is authenticated using surrogate basic attestation
    /// it uses the credential private key to create the attestation signature.
    /// There is no trust path.
    Self_,
}

impl ParsedAttestationData {
    /// The certificates forming the attestation trust path, leaf first. Empty
    /// for attestation types without a trust path.
    pub fn trust_path(&self) -> &[x509::X509] {
        match self {
            ParsedAttestationData::Basic(chain) => chain.as_slice(),
            ParsedAttestationData::Self_ => &[],
        }
    }
}

/// Metadata learnt about the authenticator while verifying its attestation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttestationMetadata {
    /// No metadata is available.
    None,
    /// The authenticator was attested by a packed attestation certificate.
    Packed {
        /// The AAGUID of the authenticator. If the attestation certificate
        /// carried id-fido-gen-ce-aaguid, it has been checked to match.
        aaguid: Uuid,
    },
}

/// The result of a successful attestation statement verification.
#[derive(Debug)]
pub struct ParsedAttestation {
    /// The attestation type and trust path.
    pub data: ParsedAttestationData,
    /// Metadata about the authenticator.
    pub metadata: AttestationMetadata,
}
