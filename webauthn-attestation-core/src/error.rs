//! Possible errors that may occur during attestation statement verification

use der_parser::error::BerError;
use openssl::error::ErrorStack as OpenSSLErrorStack;
use thiserror::Error;
use x509_parser::error::X509Error;

/// A wrapper for `Result<T, WebauthnError>`
pub type WebauthnResult<T> = core::result::Result<T, WebauthnError>;

/// Possible errors that may occur during attestation statement verification.
///
/// Every error is terminal: verification of the same inputs will always fail
/// the same way, so there is nothing to retry.
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum WebauthnError {
    #[error("The attestation statement is not a map")]
    AttestationStatementMapInvalid,

    #[error("The attestation statement is missing the required field '{0}'")]
    AttestationStatementMissingField(&'static str),

    #[error("The attestation statement field '{0}' has an unexpected type or shape")]
    AttestationStatementFieldInvalid(&'static str),

    #[error("The attestation certificate could not be decoded")]
    AttestationCertificateInvalid(#[source] CertificateDecodeError),

    #[error("The attestation statement signature is not valid")]
    AttestationStatementSigInvalid,

    #[error("The attestation certificate does not meet the format requirements: {0}")]
    AttestationCertificateRequirementsNotMet(&'static str),

    #[error("The attestation certificate id-fido-gen-ce-aaguid extension must not be critical")]
    AttestationCertificateExtensionCritical,

    #[error("The attestation certificate id-fido-gen-ce-aaguid extension is not a 16 byte OCTET STRING")]
    AttestationCertificateAAGUIDInvalid(#[source] BerError),

    #[error("The attestation certificate AAGUID does not match the authenticator data AAGUID")]
    AttestationCertificateAAGUIDMismatch,

    #[error("The attestation type {0} is not supported")]
    AttestationFormatUnsupported(&'static str),

    #[error("Self attestation with a {key} key and algorithm {alg} is not supported")]
    AttestationKeyOrAlgorithmUnsupported {
        /// The algorithm of the attestation statement
        alg: i64,
        /// The type of the credential public key
        key: &'static str,
    },

    #[error("The credential public key is not a valid point on its curve")]
    CredentialPublicKeyInvalid(#[source] OpenSSLErrorStack),

    #[error("The self attestation signature is not a DER encoded ECDSA signature")]
    AttestationSignatureMalformed(#[source] BerError),

    #[error("The attestation statement format '{0}' is not supported")]
    AttestationNotSupported(String),

    #[error("An OpenSSL Error has occurred")]
    OpenSSLError(#[from] OpenSSLErrorStack),
}

/// The reason an attestation certificate could not be decoded.
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum CertificateDecodeError {
    #[error("OpenSSL could not parse the certificate")]
    OpenSSL(#[from] OpenSSLErrorStack),

    #[error("The certificate is not a valid x509 DER structure")]
    X509(#[from] X509Error),

    #[error("The certificate is followed by {0} bytes of trailing data")]
    TrailingData(usize),
}

/// The category of a [WebauthnError], independent of the detail it carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A required statement field is absent.
    MissingField,
    /// A statement field, or the statement itself, has an unexpected shape.
    WrongType,
    /// The leaf certificate could not be decoded.
    InvalidCertificate,
    /// The signature failed cryptographic verification.
    InvalidSignature,
    /// The leaf certificate has the wrong version or is a CA.
    InvalidCertificateProfile,
    /// The AAGUID extension is marked critical.
    InvalidExtension,
    /// The AAGUID extension value is not a nested 16 byte OCTET STRING.
    InvalidAaguidEncoding,
    /// The certificate vouches for a different AAGUID than the authenticator data.
    AaguidMismatch,
    /// The attestation type, or statement format, is not supported.
    UnsupportedFormat,
    /// The self attestation key type, curve or algorithm is not supported.
    UnsupportedKeyOrAlgorithm,
    /// The self attestation signature is not a well formed ECDSA signature.
    MalformedSignature,
    /// The cryptographic provider failed unexpectedly.
    Internal,
}

impl WebauthnError {
    /// The category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            WebauthnError::AttestationStatementMissingField(_) => ErrorKind::MissingField,
            WebauthnError::AttestationStatementMapInvalid
            | WebauthnError::AttestationStatementFieldInvalid(_) => ErrorKind::WrongType,
            WebauthnError::AttestationCertificateInvalid(_) => ErrorKind::InvalidCertificate,
            WebauthnError::AttestationStatementSigInvalid => ErrorKind::InvalidSignature,
            WebauthnError::AttestationCertificateRequirementsNotMet(_) => {
                ErrorKind::InvalidCertificateProfile
            }
            WebauthnError::AttestationCertificateExtensionCritical => ErrorKind::InvalidExtension,
            WebauthnError::AttestationCertificateAAGUIDInvalid(_) => {
                ErrorKind::InvalidAaguidEncoding
            }
            WebauthnError::AttestationCertificateAAGUIDMismatch => ErrorKind::AaguidMismatch,
            WebauthnError::AttestationFormatUnsupported(_)
            | WebauthnError::AttestationNotSupported(_) => ErrorKind::UnsupportedFormat,
            WebauthnError::AttestationKeyOrAlgorithmUnsupported { .. }
            | WebauthnError::CredentialPublicKeyInvalid(_) => ErrorKind::UnsupportedKeyOrAlgorithm,
            WebauthnError::AttestationSignatureMalformed(_) => ErrorKind::MalformedSignature,
            WebauthnError::OpenSSLError(_) => ErrorKind::Internal,
        }
    }
}

impl From<CertificateDecodeError> for WebauthnError {
    fn from(e: CertificateDecodeError) -> Self {
        WebauthnError::AttestationCertificateInvalid(e)
    }
}
