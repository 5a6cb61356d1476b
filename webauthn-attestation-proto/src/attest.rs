//! Types related to attestation (Registration)

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Representation of an AAGUID
/// <https://www.w3.org/TR/webauthn/#aaguid>
pub type Aaguid = [u8; 16];

/// A credential ID type. At the moment this is a vector of bytes, but
/// it could also be a future change for this to be base64 string instead.
pub type CredentialID = Vec<u8>;

/// The attestation statement (`attStmt`) of an attestation object, as decoded
/// from CBOR. Its layout depends on the attestation statement format, so it is
/// kept as an untyped value and validated by the format's verifier.
pub type AttestationStatement = serde_cbor_2::Value;

/// The attested credential data of a registration's authenticator data.
///
/// <https://w3c.github.io/webauthn/#sctn-attested-credential-data>
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttestedCredentialData {
    /// The guid of the authenticator. May indicate manufacturer.
    pub aaguid: Aaguid,
    /// The credential ID.
    pub credential_id: CredentialID,
    /// The credentials public Key.
    pub credential_pk: crate::cose::COSEKey,
}

impl AttestedCredentialData {
    /// The AAGUID of the authenticator as a [Uuid].
    pub fn aaguid_uuid(&self) -> Uuid {
        Uuid::from_bytes(self.aaguid)
    }
}

/// Authenticator data of a registration, as both the exact bytes the
/// authenticator signed over and the structured attested credential data
/// decoded from them.
///
/// <https://w3c.github.io/webauthn/#sctn-authenticator-data>
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatorData {
    /// The raw authenticator data bytes, as received from the client.
    pub raw: Vec<u8>,
    /// The credential data attested by this authenticator data.
    pub attested_credential_data: AttestedCredentialData,
}

impl AuthenticatorData {
    /// Create authenticator data from its raw bytes and the credential data
    /// that was decoded from them.
    pub fn new(raw: Vec<u8>, attested_credential_data: AttestedCredentialData) -> Self {
        AuthenticatorData {
            raw,
            attested_credential_data,
        }
    }
}
