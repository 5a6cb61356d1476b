//! Webauthn attestation statement verification.
//!
//! During a Webauthn registration the authenticator may supply an attestation
//! statement, proving that the new credential was created by a genuine
//! authenticator of a given model. This crate verifies statements of the
//! `packed` format and reports which trust model they prove:
//!
//! * `Basic` - the statement is signed by an attestation certificate, whose
//!   chain is returned for the caller to validate against its trust anchors.
//! * `Self_` - the statement is signed by the credential's own key.
//! * ECDAA statements are rejected as unsupported.
//!
//! Verifiers are looked up by format name through the [FormatRegistry]. The
//! process-wide [default_registry] has every format of this crate registered.
//!
//! Decoding of the attestation object, authenticator data and COSE keys, as
//! well as validation of the returned certificate chain, are the caller's
//! responsibility.

#![warn(unused_extern_crates)]
#![warn(missing_docs)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::unreachable)]
#![deny(clippy::await_holding_lock)]
#![deny(clippy::needless_pass_by_value)]
#![deny(clippy::trivially_copy_pass_by_ref)]

#[macro_use]
extern crate tracing;

#[macro_use]
mod macros;

mod attestation;
mod crypto;

pub mod error;
pub mod interface;
pub mod registry;

#[cfg(test)]
mod test_utils;

/// Protocol bindings
pub mod proto {
    pub use crate::interface::*;
    pub use webauthn_attestation_proto::*;
}

pub use attestation::{
    verify_packed_attestation, AttestationX509Extension, BasicStatement, EcdaaStatement,
    FidoGenCeAaguid, PackedStatement, SelfStatement, PACKED_FORMAT,
};
pub use registry::{default_registry, AttestationVerifier, FormatRegistry};
