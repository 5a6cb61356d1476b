//! Lookup of attestation statement verifiers by their format name.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

use crate::attestation::{verify_packed_attestation, PACKED_FORMAT};
use crate::error::*;
use crate::proto::*;

/// A verifier for one attestation statement format. It is given the
/// statement, the authenticator data it attests and the client data hash.
pub type AttestationVerifier =
    fn(&AttestationStatement, &AuthenticatorData, &[u8]) -> WebauthnResult<ParsedAttestation>;

/// A mapping of attestation statement format names (`fmt`) to their
/// verifiers.
#[derive(Clone, Default)]
pub struct FormatRegistry {
    verifiers: BTreeMap<&'static str, AttestationVerifier>,
}

impl fmt::Debug for FormatRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.formats()).finish()
    }
}

impl FormatRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the verifier for the format `fmt`.
    ///
    /// # Panics
    ///
    /// If a verifier is already registered for `fmt`.
    pub fn register(&mut self, fmt: &'static str, verifier: AttestationVerifier) {
        let existing = self.verifiers.insert(fmt, verifier);
        assert!(
            existing.is_none(),
            "attestation format {fmt} registered more than once"
        );
    }

    /// The verifier registered for `fmt`, if any.
    pub fn get(&self, fmt: &str) -> Option<AttestationVerifier> {
        self.verifiers.get(fmt).copied()
    }

    /// The names of all registered formats, in sorted order.
    pub fn formats(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.verifiers.keys().copied()
    }

    /// Verify `att_stmt` with the verifier registered for `fmt`.
    pub fn verify(
        &self,
        fmt: &str,
        att_stmt: &AttestationStatement,
        auth_data: &AuthenticatorData,
        client_data_hash: &[u8],
    ) -> WebauthnResult<ParsedAttestation> {
        let verifier = self.get(fmt).ok_or_else(|| {
            debug!(%fmt, "no verifier registered for attestation format");
            WebauthnError::AttestationNotSupported(fmt.to_string())
        })?;
        verifier(att_stmt, auth_data, client_data_hash)
    }
}

/// The process-wide registry, with every format of this crate registered.
/// It is built on first use and never changes afterwards.
pub fn default_registry() -> &'static FormatRegistry {
    static REGISTRY: OnceLock<FormatRegistry> = OnceLock::new();
    REGISTRY.get_or_init(|| {
        let mut registry = FormatRegistry::new();
        registry.register(PACKED_FORMAT, verify_packed_attestation);
        registry
    })
}
