//! Fixtures for minting attestation certificates, keys and statements.

#![allow(clippy::unwrap_used, clippy::panic)]

use std::collections::BTreeMap;

use hex_literal::hex;
use openssl::asn1::{Asn1Object, Asn1OctetString, Asn1Time};
use openssl::bn::{BigNum, BigNumContext};
use openssl::ec::{EcGroup, EcKey};
use openssl::hash::MessageDigest;
use openssl::nid::Nid;
use openssl::pkey::{PKey, Private, Public};
use openssl::rsa::Rsa;
use openssl::sign::Signer;
use openssl::x509::extension::BasicConstraints;
use openssl::x509::{X509Builder, X509Extension, X509NameBuilder, X509};
use serde_cbor_2::Value;

use crate::proto::*;

pub(crate) const AAGUID: Aaguid = hex!("cb69481e8ff7403993ec0a2729a154a8");
pub(crate) const OTHER_AAGUID: Aaguid = hex!("ee882879721c491397753dfcce97072a");

pub(crate) const CLIENT_DATA_HASH: [u8; 32] =
    hex!("6a1f3e0cd4f1a22a4e1b0a6c6bd5f2e8e8b3a6c1f0b2d4e6a8c0e2f4a6b8c0d2");

pub(crate) fn init_logging() {
    let _ = tracing_subscriber::fmt::try_init();
}

pub(crate) fn p256_private_key() -> PKey<Private> {
    let group = EcGroup::from_curve_name(Nid::X9_62_PRIME256V1).unwrap();
    PKey::from_ec_key(EcKey::generate(&group).unwrap()).unwrap()
}

pub(crate) fn p384_private_key() -> PKey<Private> {
    let group = EcGroup::from_curve_name(Nid::SECP384R1).unwrap();
    PKey::from_ec_key(EcKey::generate(&group).unwrap()).unwrap()
}

pub(crate) fn ec_public_key(key: &PKey<Private>) -> EcKey<Public> {
    let ec_key = key.ec_key().unwrap();
    EcKey::from_public_key(ec_key.group(), ec_key.public_key()).unwrap()
}

/// The COSE form of an EC private key's public half, on whichever curve the
/// key uses.
pub(crate) fn cose_key_from(key: &PKey<Private>) -> COSEKey {
    let ec_key = key.ec_key().unwrap();
    let group = ec_key.group();
    let (curve, type_) = match group.curve_name() {
        Some(Nid::X9_62_PRIME256V1) => (ECDSACurve::SECP256R1, COSEAlgorithm::ES256),
        Some(Nid::SECP384R1) => (ECDSACurve::SECP384R1, COSEAlgorithm::ES384),
        other => panic!("unexpected test curve {other:?}"),
    };

    let mut ctx = BigNumContext::new().unwrap();
    let mut x = BigNum::new().unwrap();
    let mut y = BigNum::new().unwrap();
    ec_key
        .public_key()
        .affine_coordinates(group, &mut x, &mut y, &mut ctx)
        .unwrap();

    let size = curve.coordinate_size() as i32;
    COSEKey {
        type_,
        key: COSEKeyType::EC_EC2(COSEEC2Key {
            curve,
            x: x.to_vec_padded(size).unwrap(),
            y: y.to_vec_padded(size).unwrap(),
        }),
    }
}

pub(crate) fn ed25519_private_key() -> PKey<Private> {
    PKey::generate_ed25519().unwrap()
}

pub(crate) fn rsa_private_key() -> PKey<Private> {
    PKey::from_rsa(Rsa::generate(2048).unwrap()).unwrap()
}

/// Ed25519 hashes internally, so it signs without a digest.
pub(crate) fn sign_ed25519(key: &PKey<Private>, data: &[u8]) -> Vec<u8> {
    let mut signer = Signer::new_without_digest(key).unwrap();
    signer.sign_oneshot_to_vec(data).unwrap()
}

/// Rewrite the id-ecPublicKey algorithm of a certificate's key to an
/// unregistered OID. The certificate still decodes, but its key can not be
/// loaded.
pub(crate) fn with_unknown_key_algorithm(der: &[u8]) -> Vec<u8> {
    // OBJECT IDENTIFIER 1.2.840.10045.2.1
    const EC_PUBLIC_KEY: [u8; 9] = hex!("06 07 2a 86 48 ce 3d 02 01");
    let at = der
        .windows(EC_PUBLIC_KEY.len())
        .position(|w| w == EC_PUBLIC_KEY)
        .unwrap();
    let mut der = der.to_vec();
    der[at + EC_PUBLIC_KEY.len() - 1] = 0x09;
    der
}

pub(crate) fn sign_with(key: &PKey<Private>, digest: MessageDigest, data: &[u8]) -> Vec<u8> {
    let mut signer = Signer::new(digest, key).unwrap();
    signer.update(data).unwrap();
    signer.sign_to_vec().unwrap()
}

/// The raw DER content of an id-fido-gen-ce-aaguid extension: the AAGUID
/// wrapped in an OCTET STRING. x509 wraps this in a second OCTET STRING.
pub(crate) fn aaguid_extension_value(aaguid: &[u8]) -> Vec<u8> {
    let mut value = vec![0x04, aaguid.len() as u8];
    value.extend_from_slice(aaguid);
    value
}

pub(crate) struct CertificateOptions {
    /// The x509 version field, 2 being v3.
    pub version: i32,
    pub ca: bool,
    /// The DER value of the aaguid extension and its critical flag.
    pub aaguid_extension: Option<(Vec<u8>, bool)>,
    /// Digest the certificate itself is signed with, which sets the
    /// certificate's declared signature algorithm.
    pub digest: MessageDigest,
}

impl Default for CertificateOptions {
    fn default() -> Self {
        CertificateOptions {
            version: 2,
            ca: false,
            aaguid_extension: Some((aaguid_extension_value(&AAGUID), false)),
            digest: MessageDigest::sha256(),
        }
    }
}

/// A self signed packed attestation certificate for `key`.
pub(crate) fn build_certificate(key: &PKey<Private>, opts: &CertificateOptions) -> X509 {
    build_certificate_signed_by(key, key, opts)
}

/// A packed attestation certificate for `key`, signed by `issuer_key`. The
/// issuer key decides the certificate's declared signature algorithm.
pub(crate) fn build_certificate_signed_by(
    key: &PKey<Private>,
    issuer_key: &PKey<Private>,
    opts: &CertificateOptions,
) -> X509 {
    let mut name = X509NameBuilder::new().unwrap();
    name.append_entry_by_text("C", "SE").unwrap();
    name.append_entry_by_text("O", "Test Vendor AB").unwrap();
    name.append_entry_by_text("OU", "Authenticator Attestation")
        .unwrap();
    name.append_entry_by_text("CN", "Test Attestation Batch 1")
        .unwrap();
    let name = name.build();

    let mut builder = X509Builder::new().unwrap();
    builder.set_version(opts.version).unwrap();
    let serial = BigNum::from_u32(7).unwrap().to_asn1_integer().unwrap();
    builder.set_serial_number(&serial).unwrap();
    builder.set_subject_name(&name).unwrap();
    builder.set_issuer_name(&name).unwrap();
    builder.set_pubkey(key).unwrap();
    builder
        .set_not_before(&Asn1Time::days_from_now(0).unwrap())
        .unwrap();
    builder
        .set_not_after(&Asn1Time::days_from_now(365).unwrap())
        .unwrap();

    // Extensions only exist from x509 v3.
    if opts.version == 2 {
        let basic_constraints = if opts.ca {
            BasicConstraints::new().critical().ca().build().unwrap()
        } else {
            BasicConstraints::new().build().unwrap()
        };
        builder.append_extension(basic_constraints).unwrap();

        if let Some((value, critical)) = &opts.aaguid_extension {
            let oid = Asn1Object::from_str("1.3.6.1.4.1.45724.1.1.4").unwrap();
            let contents = Asn1OctetString::new_from_bytes(value).unwrap();
            let ext = X509Extension::new_from_der(&oid, *critical, &contents).unwrap();
            builder.append_extension(ext).unwrap();
        }
    }

    builder.sign(issuer_key, opts.digest).unwrap();
    builder.build()
}

/// Authenticator data for a registration with `credential_pk`. The raw bytes
/// follow the authenticator data layout, except that the credential public
/// key is left out as verifiers never decode them.
pub(crate) fn authenticator_data(aaguid: Aaguid, credential_pk: COSEKey) -> AuthenticatorData {
    let credential_id = hex!("4c2a0ee9cb1bd1fd5b5d7a4b5c1b8e26").to_vec();

    // rpIdHash
    let mut raw =
        hex!("49960de5880e8c687434170f6476605b8fe4aeb9a28632c7995cf3ba831d9763").to_vec();
    // flags: UP | UV | AT
    raw.push(0x45);
    // signCount
    raw.extend_from_slice(&[0x00, 0x00, 0x00, 0x01]);
    raw.extend_from_slice(&aaguid);
    raw.extend_from_slice(&(credential_id.len() as u16).to_be_bytes());
    raw.extend_from_slice(&credential_id);

    AuthenticatorData::new(
        raw,
        AttestedCredentialData {
            aaguid,
            credential_id,
            credential_pk,
        },
    )
}

pub(crate) fn signed_payload(auth_data: &AuthenticatorData, client_data_hash: &[u8]) -> Vec<u8> {
    let mut data = auth_data.raw.clone();
    data.extend_from_slice(client_data_hash);
    data
}

pub(crate) fn statement(fields: Vec<(&str, Value)>) -> AttestationStatement {
    Value::Map(
        fields
            .into_iter()
            .map(|(k, v)| (Value::Text(k.to_string()), v))
            .collect::<BTreeMap<_, _>>(),
    )
}

pub(crate) fn x5c(certs: &[&X509]) -> Value {
    Value::Array(
        certs
            .iter()
            .map(|c| Value::Bytes(c.to_der().unwrap()))
            .collect(),
    )
}
