// SPDX-License-Identifier: MIT

use openssl::asn1::Asn1Time;
use openssl::bn::{BigNum, MsbOption};
use openssl::error::ErrorStack;
use openssl::hash::MessageDigest;
use openssl::nid::Nid;
use openssl::pkey::PKey;
use openssl::rsa::Rsa;
use openssl::x509::{X509, X509Name, X509NameEntryRef, X509NameRef};
use std::time::{SystemTime, UNIX_EPOCH};


const RSA_KEY_SIZE: u32 = 2048;
const X509_VERSION_3: i32 = 2;
const SECONDS_PER_DAY: i64 = 24 * 60 * 60;
const VALID_DAYS_BEFORE: i64 = 100;
const VALID_DAYS_AFTER: i64 = 400;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct X509Cert {
    pub issuer: String,
    pub subject: String,
    pub serial_number: String,
    pub not_before: String,
    pub not_after: String,
    pub raw: Vec<u8>,
}

impl X509Cert {
    pub fn from_der(data: &[u8]) -> Result<X509Cert, ErrorStack> {
        let cert = X509::from_der(data)?;
        Ok(X509Cert {
            issuer: name_to_string(cert.issuer_name()),
            subject: name_to_string(cert.subject_name()),
            serial_number: cert.serial_number().to_bn()?.to_dec_str()?.to_string(),
            not_before: cert.not_before().to_string(),
            not_after: cert.not_after().to_string(),
            raw: data.to_vec(),
        })
    }
}

/// Formats a name entry as `KEY=value`, escaping commas in the value.
fn entry_to_string(entry: &X509NameEntryRef) -> Option<String> {
    let key = entry.object().nid().short_name().ok()?;
    let data = entry.data().to_string().ok()?;
    Some(format!("{key}={}", data.replace(',', "\\,")))
}

fn name_to_string(name: &X509NameRef) -> String {
    name.entries()
        .filter_map(entry_to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Tries reading a signature payload as a DER certificate. `None` is the
/// expected answer for hash entries and is not an error.
pub fn classify_payload(payload: &[u8]) -> Option<X509Cert> {
    match X509Cert::from_der(payload) {
        Ok(cert) => Some(cert),
        Err(e) => {
            log::trace!("Payload of {} bytes is not a certificate: {e}", payload.len());
            None
        }
    }
}

/// Generates a fresh RSA 2048 key and a self signed certificate for it with
/// `CN=subject_name`. Returns the DER encoded certificate.
pub fn generate_self_signed_cert(subject_name: &str) -> Result<Vec<u8>, ErrorStack> {
    let key = PKey::from_rsa(Rsa::generate(RSA_KEY_SIZE)?)?;

    let mut name_builder = X509Name::builder()?;
    name_builder.append_entry_by_nid(Nid::COMMONNAME, subject_name)?;
    let name = name_builder.build();

    let mut builder = X509::builder()?;
    builder.set_version(X509_VERSION_3)?;

    let mut serial = BigNum::new()?;
    serial.rand(128, MsbOption::MAYBE_ZERO, false)?;
    let serial = serial.to_asn1_integer()?;
    builder.set_serial_number(&serial)?;

    builder.set_subject_name(&name)?;
    builder.set_issuer_name(&name)?;

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64;
    let not_before = Asn1Time::from_unix(now - VALID_DAYS_BEFORE * SECONDS_PER_DAY)?;
    builder.set_not_before(&not_before)?;
    let not_after = Asn1Time::from_unix(now + VALID_DAYS_AFTER * SECONDS_PER_DAY)?;
    builder.set_not_after(&not_after)?;

    builder.set_pubkey(&key)?;
    builder.sign(&key, MessageDigest::sha256())?;

    builder.build().to_der()
}
