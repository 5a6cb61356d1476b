//! Data types consumed by Webauthn attestation statement verification.
//!
//! These represent the output of decoding a registration response: the
//! attestation statement map, the raw authenticator data that was signed, and
//! the attested credential data with its already decoded COSE public key.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(unused_extern_crates)]
#![warn(missing_docs)]

pub mod attest;
pub mod cose;

pub use attest::*;
pub use cose::*;
