// SPDX-License-Identifier: MIT

use thiserror::Error;
use uuid::{Uuid, uuid};

pub mod efivars;

pub const GUID_GLOBAL_VARIABLE: Uuid = uuid!("8be4df61-93ca-11d2-aa0d-00e098032b8c");
pub const GUID_SECURITY_DATABASE: Uuid = uuid!("d719b2cb-3d3a-4596-a3bc-dad00e67656f");

/// Signature type of lists holding DER encoded X.509 certificates
pub const EFI_CERT_X509_GUID: Uuid = uuid!("a5c059a1-94e4-4aa7-87b5-ab155c2bf072");
/// Signature type of lists holding 32 byte SHA-256 digests
pub const EFI_CERT_SHA256_GUID: Uuid = uuid!("c1c41626-504c-4092-aca9-41f936934328");

pub const GUID_LENGTH: usize = 16;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("malformed identifier: expected 16 bytes, got {len}")]
    MalformedIdentifier { len: usize },
    #[error(
        "inconsistent entry size: entry {index} carries {found} payload bytes, list expects {expected}"
    )]
    InconsistentEntrySize {
        index: usize,
        expected: usize,
        found: usize,
    },
    #[error("signature list of {size} bytes does not fit a u32 size field")]
    ListTooLarge { size: usize },
}

// Generates the mixed endian on-wire representation of a GUID: the first
// three fields are little endian, the last 8 bytes are kept as they are.
pub fn guid_to_le_bytes(guid: &Uuid) -> [u8; GUID_LENGTH] {
    guid.to_bytes_le()
}

/// Reads a GUID from its on-wire representation. Only the first 16 bytes of
/// `data` are looked at.
pub fn guid_from_le_bytes(data: &[u8]) -> Result<Uuid, CodecError> {
    let raw: [u8; GUID_LENGTH] = data
        .get(..GUID_LENGTH)
        .and_then(|d| d.try_into().ok())
        .ok_or(CodecError::MalformedIdentifier { len: data.len() })?;
    Ok(Uuid::from_bytes_le(raw))
}
