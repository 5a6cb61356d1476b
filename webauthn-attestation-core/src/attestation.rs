//! Attestation information and verification procedures for the packed
//! attestation statement format.
//!
//! <https://w3c.github.io/webauthn/#sctn-packed-attestation>

use std::collections::BTreeMap;

use der_parser::error::{BerError, BerResult};
use openssl::x509;
use x509_parser::certificate::X509Certificate;
use x509_parser::error::X509Error;
use x509_parser::oid_registry::Oid;
use x509_parser::x509::X509Version;

use crate::crypto::{
    ecdsa_p256_public_key, flatten_ber_error, parse_ecdsa_der_signature, verify_ecdsa_sha256,
    verify_signature,
};
use crate::error::*;
use crate::proto::*;

/// The registered name of the packed attestation statement format.
pub const PACKED_FORMAT: &str = "packed";

/// x509 certificate extensions which are validated in the attestation
/// statement.
pub trait AttestationX509Extension {
    /// the type of the value in the certificate extension
    type Output: Eq;

    /// the oid of the extension
    const OID: Oid<'static>;

    /// how to parse the value out of the certificate extension. The input is
    /// the content of the extnValue OCTET STRING.
    fn parse(i: &[u8]) -> BerResult<Self::Output>;

    /// what error to return if the extension value can not be parsed
    fn encoding_error(err: BerError) -> WebauthnError;

    /// what error to return if validation fails---i.e. if the "other value" is
    /// not equal to that in the extension
    const VALIDATION_ERROR: WebauthnError;
}

/// The Fido AAGUID x509 extension
pub struct FidoGenCeAaguid;

impl AttestationX509Extension for FidoGenCeAaguid {
    // If cert contains an extension with OID 1 3 6 1 4 1 45724 1 1 4 (id-fido-gen-ce-aaguid)
    const OID: Oid<'static> = der_parser::oid!(1.3.6 .1 .4 .1 .45724 .1 .1 .4);

    // verify that the value of this extension matches the aaguid in authenticatorData.
    type Output = Aaguid;

    fn parse(i: &[u8]) -> BerResult<Self::Output> {
        let (rem, aaguid) = der_parser::der::parse_der_octetstring(i)?;
        let aaguid: Aaguid = aaguid
            .as_slice()
            .map_err(nom::Err::Error)?
            .try_into()
            .map_err(|_| nom::Err::Error(BerError::InvalidLength))?;

        Ok((rem, aaguid))
    }

    fn encoding_error(err: BerError) -> WebauthnError {
        WebauthnError::AttestationCertificateAAGUIDInvalid(err)
    }

    const VALIDATION_ERROR: WebauthnError = WebauthnError::AttestationCertificateAAGUIDMismatch;
}

/// Validate an optional, non-critical extension of `certificate` against
/// the expected value `data`.
///
/// Returns `true` if the extension was present and matched, `false` if the
/// certificate does not carry it.
pub(crate) fn validate_extension<T>(
    certificate: &X509Certificate<'_>,
    data: &<T as AttestationX509Extension>::Output,
) -> WebauthnResult<bool>
where
    T: AttestationX509Extension,
{
    let Some(extension) = certificate
        .extensions()
        .iter()
        .find(|extension| extension.oid == T::OID)
    else {
        return Ok(false);
    };

    if extension.critical {
        return Err(WebauthnError::AttestationCertificateExtensionCritical);
    }

    let (rem, output) = T::parse(extension.value)
        .map_err(flatten_ber_error)
        .map_err(T::encoding_error)?;
    if !rem.is_empty() {
        trace!(oid = %T::OID, trailing = rem.len(), "data after extension value");
        return Err(T::encoding_error(BerError::InvalidLength));
    }

    if &output == data {
        Ok(true)
    } else {
        Err(T::VALIDATION_ERROR)
    }
}

/// A packed attestation statement carrying an attestation certificate chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicStatement<'a> {
    /// The COSE algorithm identifier of the signature.
    pub alg: i64,
    /// The attestation signature.
    pub sig: &'a [u8],
    /// DER encoded certificates, the attestation certificate first. Never
    /// empty.
    pub x5c: Vec<&'a [u8]>,
}

/// A packed attestation statement using ECDAA.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EcdaaStatement<'a> {
    /// The COSE algorithm identifier of the signature.
    pub alg: i64,
    /// The attestation signature.
    pub sig: &'a [u8],
    /// The ECDAA-Issuer public key identifier, if it was a byte string.
    pub ecdaa_key_id: Option<&'a [u8]>,
}

/// A packed attestation statement signed by the credential key itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelfStatement<'a> {
    /// The COSE algorithm identifier of the signature.
    pub alg: i64,
    /// The attestation signature.
    pub sig: &'a [u8],
}

/// A packed attestation statement, sorted by the attestation type it
/// claims.
///
/// ```text
/// packedStmtFormat = {
///                        alg: COSEAlgorithmIdentifier,
///                        sig: bytes,
///                        x5c: [ attestnCert: bytes, * (caCert: bytes) ]
///                    } //
///                    {
///                        alg: COSEAlgorithmIdentifier,
///                        sig: bytes,
///                        ecdaaKeyId: bytes
///                    } //
///                    {
///                        alg: COSEAlgorithmIdentifier
///                        sig: bytes,
///                    }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackedStatement<'a> {
    /// `x5c` is present.
    Basic(BasicStatement<'a>),
    /// `ecdaaKeyId` is present, and `x5c` is not.
    Ecdaa(EcdaaStatement<'a>),
    /// Neither `x5c` nor `ecdaaKeyId` are present.
    Self_(SelfStatement<'a>),
}

impl PackedStatement<'_> {
    /// The COSE algorithm identifier of the signature.
    pub fn alg(&self) -> i64 {
        match self {
            PackedStatement::Basic(s) => s.alg,
            PackedStatement::Ecdaa(s) => s.alg,
            PackedStatement::Self_(s) => s.alg,
        }
    }

    /// The attestation signature.
    pub fn sig(&self) -> &[u8] {
        match self {
            PackedStatement::Basic(s) => s.sig,
            PackedStatement::Ecdaa(s) => s.sig,
            PackedStatement::Self_(s) => s.sig,
        }
    }
}

fn statement_field<'a>(
    att_stmt_map: &'a BTreeMap<serde_cbor_2::Value, serde_cbor_2::Value>,
    name: &str,
) -> Option<&'a serde_cbor_2::Value> {
    att_stmt_map.get(&serde_cbor_2::Value::Text(name.to_string()))
}

impl<'a> TryFrom<&'a AttestationStatement> for PackedStatement<'a> {
    type Error = WebauthnError;

    fn try_from(att_stmt: &'a AttestationStatement) -> Result<Self, Self::Error> {
        let att_stmt_map = cbor_try_map!(att_stmt)?;
        let field = |name: &str| statement_field(att_stmt_map, name);

        let alg_value = field("alg").ok_or(WebauthnError::AttestationStatementMissingField("alg"))?;
        let alg = cbor_try_i128!(alg_value, "alg").and_then(|v| {
            i64::try_from(v).map_err(|_| WebauthnError::AttestationStatementFieldInvalid("alg"))
        })?;

        let sig_value = field("sig").ok_or(WebauthnError::AttestationStatementMissingField("sig"))?;
        let sig = cbor_try_bytes!(sig_value, "sig")?.as_slice();

        if let Some(x5c) = field("x5c") {
            // x5c: [ attestnCert: bytes, * (caCert: bytes) ]
            let x5c = cbor_try_array!(x5c, "x5c")?
                .iter()
                .map(|v| cbor_try_bytes!(v, "x5c").map(Vec::as_slice))
                .collect::<Result<Vec<_>, _>>()?;

            // Must have at least one x509 cert, this is the leaf certificate.
            if x5c.is_empty() {
                return Err(WebauthnError::AttestationStatementFieldInvalid("x5c"));
            }

            return Ok(PackedStatement::Basic(BasicStatement { alg, sig, x5c }));
        }

        if let Some(ecdaa_key_id) = field("ecdaaKeyId") {
            let ecdaa_key_id = match ecdaa_key_id {
                serde_cbor_2::Value::Bytes(b) => Some(b.as_slice()),
                _ => None,
            };
            return Ok(PackedStatement::Ecdaa(EcdaaStatement {
                alg,
                sig,
                ecdaa_key_id,
            }));
        }

        Ok(PackedStatement::Self_(SelfStatement { alg, sig }))
    }
}

/// The bytes every packed attestation signature is made over: the
/// authenticator data followed by the client data hash.
pub(crate) fn verification_data(auth_data: &AuthenticatorData, client_data_hash: &[u8]) -> Vec<u8> {
    auth_data
        .raw
        .iter()
        .chain(client_data_hash.iter())
        .copied()
        .collect()
}

/// Decode a DER certificate with both x509-parser, for inspecting its
/// structure, and OpenSSL, for using its key. The DER must be exactly one
/// certificate.
fn parse_certificate(der: &[u8]) -> Result<(X509Certificate<'_>, x509::X509), CertificateDecodeError> {
    let (rem, parsed) = x509_parser::parse_x509_certificate(der).map_err(|e| match e {
        nom::Err::Error(e) | nom::Err::Failure(e) => e,
        nom::Err::Incomplete(_) => X509Error::InvalidCertificate,
    })?;
    if !rem.is_empty() {
        return Err(CertificateDecodeError::TrailingData(rem.len()));
    }

    let certificate = x509::X509::from_der(der)?;
    Ok((parsed, certificate))
}

/// Verify that attestnCert meets the requirements in § 8.2.1 Packed
/// Attestation Statement Certificate Requirements.
///
/// <https://w3c.github.io/webauthn/#sctn-packed-attestation-cert-requirements>
pub(crate) fn assert_packed_attest_req(certificate: &X509Certificate<'_>) -> WebauthnResult<()> {
    // Version MUST be set to 3 (which is indicated by an ASN.1 INTEGER with value 2).
    if certificate.version() != X509Version::V3 {
        trace!(version = ?certificate.version(), "attestation certificate is not x509 v3");
        return Err(WebauthnError::AttestationCertificateRequirementsNotMet(
            "version must be 3",
        ));
    }

    // The Basic Constraints extension MUST have the CA component set to false.
    let is_ca = certificate
        .basic_constraints()
        .map_err(CertificateDecodeError::X509)?
        .map(|basic_constraints| basic_constraints.value.ca)
        .unwrap_or(false);
    if is_ca {
        return Err(WebauthnError::AttestationCertificateRequirementsNotMet(
            "basic constraints CA must be false",
        ));
    }

    Ok(())
}

/// Verify a packed attestation statement.
///
/// `client_data_hash` is appended to the raw authenticator data to form the
/// signed bytes. On success the attestation type, its trust path and any
/// metadata learnt from the attestation certificate are returned. The trust
/// path is *not* validated against any trust anchor.
///
/// <https://w3c.github.io/webauthn/#sctn-packed-attestation>
pub fn verify_packed_attestation(
    att_stmt: &AttestationStatement,
    auth_data: &AuthenticatorData,
    client_data_hash: &[u8],
) -> WebauthnResult<ParsedAttestation> {
    // Verify that attStmt is valid CBOR conforming to the syntax defined above and perform CBOR
    // decoding on it to extract the contained fields.
    let statement = PackedStatement::try_from(att_stmt)?;
    let acd = &auth_data.attested_credential_data;
    let verification_data = verification_data(auth_data, client_data_hash);

    match statement {
        PackedStatement::Basic(statement) => {
            // If x5c is present, this indicates that the attestation type is not ECDAA.
            debug!(certificates = statement.x5c.len(), "packed basic attestation");
            verify_basic(&statement, acd, &verification_data)
        }
        PackedStatement::Ecdaa(statement) => {
            // If ecdaaKeyId is present, then the attestation type is ECDAA.
            debug!(ecdaa_key_id = ?statement.ecdaa_key_id, "packed ecdaa attestation");
            Err(WebauthnError::AttestationFormatUnsupported("ECDAA"))
        }
        PackedStatement::Self_(statement) => {
            // If neither x5c nor ecdaaKeyId is present, self attestation is in use.
            debug!("packed self attestation");
            verify_self(&statement, acd, &verification_data)
        }
    }
}

fn verify_basic(
    statement: &BasicStatement<'_>,
    acd: &AttestedCredentialData,
    verification_data: &[u8],
) -> WebauthnResult<ParsedAttestation> {
    // The alg is recorded, but the certificate decides how the signature is checked.
    trace!(alg = statement.alg, cose_alg = ?COSEAlgorithm::try_from(statement.alg).ok());

    let (leaf_der, chain_der) = statement
        .x5c
        .split_first()
        .ok_or(WebauthnError::AttestationStatementFieldInvalid("x5c"))?;

    // The attestation certificate attestnCert MUST be the first element in the array.
    let (attestn_cert, leaf) = parse_certificate(leaf_der)?;
    trace!(
        subject = %attestn_cert.subject(),
        issuer = %attestn_cert.issuer(),
        "attestation certificate"
    );

    let chain = chain_der
        .iter()
        .map(|der| parse_certificate(der).map(|(_, certificate)| certificate))
        .collect::<Result<Vec<_>, _>>()?;

    assert_packed_attest_req(&attestn_cert)?;

    // If attestnCert contains an extension with OID 1.3.6.1.4.1.45724.1.1.4
    // (id-fido-gen-ce-aaguid) verify that the value of this extension matches the aaguid
    // in authenticatorData.
    if !validate_extension::<FidoGenCeAaguid>(&attestn_cert, &acd.aaguid)? {
        trace!("attestation certificate has no aaguid extension");
    }

    // Verify that sig is a valid signature over the concatenation of authenticatorData
    // and clientDataHash using the attestation public key in attestnCert.
    match verify_signature(&leaf, statement.sig, verification_data) {
        Some(alg) => trace!(?alg, "packed x509 signature valid"),
        None => {
            trace!("packed x509 signature invalid");
            return Err(WebauthnError::AttestationStatementSigInvalid);
        }
    }

    let mut trust_path = Vec::with_capacity(chain.len() + 1);
    trust_path.push(leaf);
    trust_path.extend(chain);

    Ok(ParsedAttestation {
        data: ParsedAttestationData::Basic(trust_path),
        metadata: AttestationMetadata::Packed {
            aaguid: acd.aaguid_uuid(),
        },
    })
}

fn verify_self(
    statement: &SelfStatement<'_>,
    acd: &AttestedCredentialData,
    verification_data: &[u8],
) -> WebauthnResult<ParsedAttestation> {
    let credential_pk = &acd.credential_pk;
    let unsupported = || WebauthnError::AttestationKeyOrAlgorithmUnsupported {
        alg: statement.alg,
        key: credential_pk.key.name(),
    };

    // Only ES256 over P-256 is supported for self attestation.
    let ec2 = match &credential_pk.key {
        COSEKeyType::EC_EC2(ec2) if ec2.curve == ECDSACurve::SECP256R1 => ec2,
        COSEKeyType::EC_EC2(_) | COSEKeyType::EC_OKP(_) | COSEKeyType::RSA(_) => {
            return Err(unsupported());
        }
    };

    // Validate that alg matches the algorithm of the credentialPublicKey in authenticatorData.
    if credential_pk.type_ != COSEAlgorithm::ES256
        || COSEAlgorithm::try_from(statement.alg) != Ok(COSEAlgorithm::ES256)
    {
        return Err(unsupported());
    }

    let components = parse_ecdsa_der_signature(statement.sig)
        .map_err(WebauthnError::AttestationSignatureMalformed)?;
    let ec_key =
        ecdsa_p256_public_key(ec2).map_err(WebauthnError::CredentialPublicKeyInvalid)?;

    // Verify that sig is a valid signature over the concatenation of authenticatorData and
    // clientDataHash using the credential public key with alg.
    if !verify_ecdsa_sha256(&ec_key, &components, verification_data)? {
        trace!("Invalid Self Attestation Signature");
        return Err(WebauthnError::AttestationStatementSigInvalid);
    }

    Ok(ParsedAttestation {
        data: ParsedAttestationData::Self_,
        metadata: AttestationMetadata::None,
    })
}
