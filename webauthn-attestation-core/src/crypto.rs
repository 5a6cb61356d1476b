//! Cryptographic operation wrapper for Webauthn attestation. This module exists to
//! allow ease of auditing, safe operation wrappers for the attestation verifiers,
//! and cryptographic provider abstraction. This module currently uses OpenSSL
//! as the cryptographic primitive provider.

use der_parser::ber::BerObjectContent;
use der_parser::der::*;
use der_parser::error::BerError;
use openssl::{bn, ec, ecdsa, hash, nid, pkey, sha, sign, x509};

use crate::error::*;
use crate::proto::COSEEC2Key;

/// The signature algorithms an attestation certificate may declare, and that
/// we know how to verify a statement signature with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum X509SignatureAlgorithm {
    EcdsaSha256,
    EcdsaSha384,
    EcdsaSha512,
    RsaPkcs1Sha256,
    RsaPkcs1Sha384,
    RsaPkcs1Sha512,
    Ed25519,
}

/// Algorithms tried, in order, after the certificate's declared algorithm has
/// failed to verify a packed statement signature.
///
/// Some authenticators (notably older YubiKeys) declare an algorithm on their
/// attestation certificate that differs from the one they sign statements
/// with. This list only changes which algorithm is tried; a valid signature
/// by the certificate key is still required.
pub(crate) const FALLBACK_SIGNATURE_ALGORITHMS: &[X509SignatureAlgorithm] =
    &[X509SignatureAlgorithm::EcdsaSha256];

impl X509SignatureAlgorithm {
    /// Map the declared signature algorithm of a certificate. SHA1 and
    /// RSASSA-PSS are not recognised.
    pub(crate) fn from_nid(n: nid::Nid) -> Option<Self> {
        match n {
            nid::Nid::ECDSA_WITH_SHA256 => Some(Self::EcdsaSha256),
            nid::Nid::ECDSA_WITH_SHA384 => Some(Self::EcdsaSha384),
            nid::Nid::ECDSA_WITH_SHA512 => Some(Self::EcdsaSha512),
            nid::Nid::SHA256WITHRSAENCRYPTION => Some(Self::RsaPkcs1Sha256),
            nid::Nid::SHA384WITHRSAENCRYPTION => Some(Self::RsaPkcs1Sha384),
            nid::Nid::SHA512WITHRSAENCRYPTION => Some(Self::RsaPkcs1Sha512),
            n if n.as_raw() == pkey::Id::ED25519.as_raw() => Some(Self::Ed25519),
            _ => None,
        }
    }

    fn digest(self) -> Option<hash::MessageDigest> {
        match self {
            Self::EcdsaSha256 | Self::RsaPkcs1Sha256 => Some(hash::MessageDigest::sha256()),
            Self::EcdsaSha384 | Self::RsaPkcs1Sha384 => Some(hash::MessageDigest::sha384()),
            Self::EcdsaSha512 | Self::RsaPkcs1Sha512 => Some(hash::MessageDigest::sha512()),
            // Ed25519 hashes internally.
            Self::Ed25519 => None,
        }
    }

    fn key_id(self) -> pkey::Id {
        match self {
            Self::EcdsaSha256 | Self::EcdsaSha384 | Self::EcdsaSha512 => pkey::Id::EC,
            Self::RsaPkcs1Sha256 | Self::RsaPkcs1Sha384 | Self::RsaPkcs1Sha512 => pkey::Id::RSA,
            Self::Ed25519 => pkey::Id::ED25519,
        }
    }

    /// Verify `signature` over `verification_data` with `pkey` under this
    /// algorithm. A key of the wrong type for the algorithm never verifies.
    fn verify(
        self,
        pkey: &pkey::PKeyRef<pkey::Public>,
        signature: &[u8],
        verification_data: &[u8],
    ) -> Result<bool, openssl::error::ErrorStack> {
        if pkey.id() != self.key_id() {
            trace!(alg = ?self, key_id = ?pkey.id(), "certificate key does not match algorithm");
            return Ok(false);
        }

        let mut verifier = match self.digest() {
            Some(md) => sign::Verifier::new(md, pkey)?,
            None => sign::Verifier::new_without_digest(pkey)?,
        };
        verifier.verify_oneshot(signature, verification_data)
    }
}

/// Validate a statement signature was made by the attestation certificate's
/// key, first with the certificate's declared signature algorithm and then
/// with each of [FALLBACK_SIGNATURE_ALGORITHMS].
///
/// Returns the algorithm that verified the signature, or `None` if none did
/// or the certificate key could not be loaded.
pub(crate) fn verify_signature(
    certificate: &x509::X509Ref,
    signature: &[u8],
    verification_data: &[u8],
) -> Option<X509SignatureAlgorithm> {
    // A key OpenSSL can not load can never verify the statement.
    let pkey = match certificate.public_key() {
        Ok(pkey) => pkey,
        Err(err) => {
            trace!(?err, "attestation certificate public key could not be loaded");
            return None;
        }
    };

    let declared_nid = certificate.signature_algorithm().object().nid();
    let declared = X509SignatureAlgorithm::from_nid(declared_nid);
    if declared.is_none() {
        debug!(?declared_nid, "unrecognised certificate signature algorithm");
    }

    let candidates = declared.into_iter().chain(
        FALLBACK_SIGNATURE_ALGORITHMS
            .iter()
            .copied()
            .filter(|alg| Some(*alg) != declared),
    );

    for (attempt, alg) in candidates.enumerate() {
        if attempt > 0 {
            debug!(?alg, "retrying attestation signature with fallback algorithm");
        }
        match alg.verify(&pkey, signature, verification_data) {
            Ok(true) => return Some(alg),
            Ok(false) => trace!(?alg, "attestation signature did not verify"),
            Err(err) => trace!(?alg, ?err, "attestation signature could not be verified"),
        }
    }

    None
}

/// The components of an ECDSA signature, as unsigned big endian integers
/// without leading zero bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct EcdsaSignatureComponents {
    pub r: Vec<u8>,
    pub s: Vec<u8>,
}

fn der_unsigned_integer(obj: &DerObject) -> Result<Vec<u8>, BerError> {
    match obj.content {
        BerObjectContent::Integer(bytes) => match bytes.first() {
            None => Err(BerError::InvalidLength),
            Some(b) if b & 0x80 != 0 => Err(BerError::BerValueError),
            Some(_) => {
                let start = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len());
                Ok(bytes[start..].to_vec())
            }
        },
        _ => Err(BerError::BerTypeError),
    }
}

/// Collapse a nom parse failure into its underlying [BerError]. Input that
/// ended early is reported as an invalid length.
pub(crate) fn flatten_ber_error(e: nom::Err<BerError>) -> BerError {
    match e {
        nom::Err::Error(e) | nom::Err::Failure(e) => e,
        nom::Err::Incomplete(_) => BerError::InvalidLength,
    }
}

/// Decode a DER encoded ECDSA signature, `SEQUENCE { r INTEGER, s INTEGER }`.
/// Any data after the two integers, inside or following the sequence, is an
/// error.
pub(crate) fn parse_ecdsa_der_signature(
    signature: &[u8],
) -> Result<EcdsaSignatureComponents, BerError> {
    let (rem, components) = parse_der_container(|i: &[u8], hdr: Header| {
        if hdr.tag() != Tag::Sequence {
            return Err(nom::Err::Error(BerError::BerTypeError));
        }
        let (i, r) = parse_der_integer(i)?;
        let (i, s) = parse_der_integer(i)?;
        if !i.is_empty() {
            return Err(nom::Err::Error(BerError::InvalidLength));
        }
        let r = der_unsigned_integer(&r).map_err(nom::Err::Error)?;
        let s = der_unsigned_integer(&s).map_err(nom::Err::Error)?;
        Ok((i, EcdsaSignatureComponents { r, s }))
    })(signature)
    .map_err(flatten_ber_error)?;

    if !rem.is_empty() {
        trace!(trailing = rem.len(), "data after ecdsa signature");
        return Err(BerError::InvalidLength);
    }

    Ok(components)
}

/// Reconstruct a P-256 public key from its affine coordinates, checking it is
/// a valid point on the curve.
pub(crate) fn ecdsa_p256_public_key(
    key: &COSEEC2Key,
) -> Result<ec::EcKey<pkey::Public>, openssl::error::ErrorStack> {
    let ec_group = ec::EcGroup::from_curve_name(nid::Nid::X9_62_PRIME256V1)?;
    let xbn = bn::BigNum::from_slice(&key.x)?;
    let ybn = bn::BigNum::from_slice(&key.y)?;

    let ec_key = ec::EcKey::from_public_key_affine_coordinates(&ec_group, &xbn, &ybn)?;
    ec_key.check_key()?;
    Ok(ec_key)
}

/// Verify ECDSA signature components over the SHA-256 digest of
/// `verification_data`.
pub(crate) fn verify_ecdsa_sha256(
    ec_key: &ec::EcKeyRef<pkey::Public>,
    components: &EcdsaSignatureComponents,
    verification_data: &[u8],
) -> Result<bool, WebauthnError> {
    let r = bn::BigNum::from_slice(&components.r)?;
    let s = bn::BigNum::from_slice(&components.s)?;
    let signature = ecdsa::EcdsaSig::from_private_components(r, s)?;

    let digest = compute_sha256(verification_data);
    match signature.verify(&digest, ec_key) {
        Ok(valid) => Ok(valid),
        Err(err) => {
            trace!(?err, "ecdsa signature could not be verified");
            Ok(false)
        }
    }
}

/// Compute the sha256 of a slice of data.
pub(crate) fn compute_sha256(data: &[u8]) -> [u8; 32] {
    sha::sha256(data)
}
