// SPDX-License-Identifier: MIT

//! Encoding and decoding of single `EFI_SIGNATURE_LIST` blocks.
//!
//! ```text
//! EFI_SIGNATURE_LIST {
//!   SignatureType       : 16 bytes (mixed endian GUID)
//!   SignatureListSize   : u32 le
//!   SignatureHeaderSize : u32 le
//!   SignatureSize       : u32 le
//!   SignatureHeader     : SignatureHeaderSize bytes
//!   SignatureData[]     : { SignatureOwner: 16 bytes, payload: SignatureSize - 16 bytes }
//! }
//! ```

use crate::uefi::{CodecError, GUID_LENGTH, guid_to_le_bytes};
use uuid::Uuid;


/// Size of the fixed part of a signature list: type GUID and three u32 sizes
pub const SIGNATURE_LIST_HEADER_SIZE: usize = GUID_LENGTH + 3 * 4;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignatureEntry {
    pub owner: Uuid,
    pub payload: Vec<u8>,
}

impl SignatureEntry {
    pub fn new(owner: Uuid, payload: Vec<u8>) -> SignatureEntry {
        SignatureEntry { owner, payload }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignatureList {
    signature_type: Uuid,
    signature_size: u32,
    declared_size: u32,
    header: Vec<u8>,
    entries: Vec<SignatureEntry>,
}

/// Why a block was rejected while decoding
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InvalidReason {
    /// `SignatureListSize` is smaller than the fixed header
    ListTooSmall(u32),
    /// `SignatureListSize` runs past the end of the buffer
    ListOverrun(u32),
    /// `SignatureHeaderSize` runs past the end of the list
    HeaderOverrun(u32),
    /// `SignatureSize` cannot even hold the owner GUID
    SignatureTooSmall(u32),
}

/// Outcome of decoding one block at a given offset
#[derive(Debug, PartialEq, Eq)]
pub enum ListDecode {
    Parsed {
        list: SignatureList,
        next_offset: usize,
    },
    /// Less than a fixed header left, scanning is over
    EndOfData,
    /// The block is structurally broken, nothing after it can be trusted
    Invalid(InvalidReason),
}

impl SignatureList {
    /// Builds a list, checking that every payload has the same length.
    pub fn new(
        signature_type: Uuid,
        header: Vec<u8>,
        entries: Vec<SignatureEntry>,
    ) -> Result<SignatureList, CodecError> {
        let payload_len = entries.first().map_or(0, |e| e.payload.len());
        if let Some((index, entry)) = entries
            .iter()
            .enumerate()
            .find(|(_, e)| e.payload.len() != payload_len)
        {
            return Err(CodecError::InconsistentEntrySize {
                index,
                expected: payload_len,
                found: entry.payload.len(),
            });
        }

        let (signature_size, list_size) = framed_sizes(header.len(), entries.len(), payload_len)?;
        Ok(SignatureList {
            signature_type,
            signature_size,
            declared_size: list_size,
            header,
            entries,
        })
    }

    pub fn signature_type(&self) -> Uuid {
        self.signature_type
    }

    pub fn header(&self) -> &[u8] {
        &self.header
    }

    pub fn header_size(&self) -> u32 {
        self.header.len() as u32
    }

    pub fn signature_size(&self) -> u32 {
        self.signature_size
    }

    pub fn entries(&self) -> &[SignatureEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<SignatureEntry> {
        self.entries
    }

    /// The `SignatureListSize` this list is encoded with
    pub fn list_size(&self) -> u32 {
        // Never above `declared_size`, which is a u32
        (SIGNATURE_LIST_HEADER_SIZE
            + self.header.len()
            + self.entries.len() * self.signature_size as usize) as u32
    }

    /// The `SignatureListSize` read from the source buffer, padding included.
    /// Same as `list_size` for lists built with `new`.
    pub fn declared_size(&self) -> u32 {
        self.declared_size
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.list_size() as usize);
        self.extend_encoded(&mut out);
        out
    }

    /// Appends the encoded list to `out`
    pub fn extend_encoded(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&guid_to_le_bytes(&self.signature_type));
        out.extend_from_slice(&self.list_size().to_le_bytes());
        out.extend_from_slice(&self.header_size().to_le_bytes());
        out.extend_from_slice(&self.signature_size.to_le_bytes());
        out.extend_from_slice(&self.header);
        for entry in &self.entries {
            out.extend_from_slice(&guid_to_le_bytes(&entry.owner));
            out.extend_from_slice(&entry.payload);
        }
    }
}

/// Serializes `entries` into one signature list block. Fails if the entries
/// don't all carry payloads of the same length.
pub fn encode_signature_list(
    signature_type: Uuid,
    header: &[u8],
    entries: &[SignatureEntry],
) -> Result<Vec<u8>, CodecError> {
    Ok(SignatureList::new(signature_type, header.to_vec(), entries.to_vec())?.encode())
}

/// `SignatureSize` and `SignatureListSize` of a list, or `ListTooLarge` when
/// either overflows its u32 field.
pub fn framed_sizes(
    header_len: usize,
    entry_count: usize,
    payload_len: usize,
) -> Result<(u32, u32), CodecError> {
    let signature_size = GUID_LENGTH + payload_len;
    let list_size = entry_count
        .checked_mul(signature_size)
        .and_then(|n| n.checked_add(header_len))
        .and_then(|n| n.checked_add(SIGNATURE_LIST_HEADER_SIZE))
        .ok_or(CodecError::ListTooLarge { size: usize::MAX })?;
    let too_large = CodecError::ListTooLarge { size: list_size };

    Ok((
        u32::try_from(signature_size).map_err(|_| too_large.clone())?,
        u32::try_from(list_size).map_err(|_| too_large)?,
    ))
}

fn read_guid(data: &[u8], offset: usize) -> Uuid {
    let mut raw = [0u8; GUID_LENGTH];
    raw.copy_from_slice(&data[offset..offset + GUID_LENGTH]);
    Uuid::from_bytes_le(raw)
}

fn read_u32(data: &[u8], offset: usize) -> u32 {
    let mut raw = [0u8; 4];
    raw.copy_from_slice(&data[offset..offset + 4]);
    u32::from_le_bytes(raw)
}

/// Decodes the signature list starting at `offset`.
///
/// None of the declared sizes are trusted: the list must fit in `data`, its
/// header must fit in the list, and entries are only read while a whole
/// `SignatureSize` chunk is left before the end of the list. Trailing bytes
/// shorter than one entry are skipped.
pub fn decode_signature_list(data: &[u8], offset: usize) -> ListDecode {
    let remaining = data.len().saturating_sub(offset);
    if remaining < SIGNATURE_LIST_HEADER_SIZE {
        return ListDecode::EndOfData;
    }

    let signature_type = read_guid(data, offset);
    let list_size = read_u32(data, offset + 16);
    let header_size = read_u32(data, offset + 20);
    let signature_size = read_u32(data, offset + 24);

    if (list_size as usize) < SIGNATURE_LIST_HEADER_SIZE {
        log::debug!("Signature list at {offset:#x}: list size {list_size} below fixed header");
        return ListDecode::Invalid(InvalidReason::ListTooSmall(list_size));
    }
    if list_size as usize > remaining {
        log::debug!(
            "Signature list at {offset:#x}: list size {list_size} exceeds the {remaining} bytes left"
        );
        return ListDecode::Invalid(InvalidReason::ListOverrun(list_size));
    }
    let list_end = offset + list_size as usize;

    let header_start = offset + SIGNATURE_LIST_HEADER_SIZE;
    let header_end = match header_start.checked_add(header_size as usize) {
        Some(end) if end <= list_end => end,
        _ => {
            log::debug!(
                "Signature list at {offset:#x}: header size {header_size} exceeds list size {list_size}"
            );
            return ListDecode::Invalid(InvalidReason::HeaderOverrun(header_size));
        }
    };

    let entry_region = list_end - header_end;
    let sig_size = signature_size as usize;
    if entry_region > 0 && sig_size < GUID_LENGTH {
        log::debug!("Signature list at {offset:#x}: signature size {signature_size} too small");
        return ListDecode::Invalid(InvalidReason::SignatureTooSmall(signature_size));
    }

    let mut entries = Vec::new();
    let mut entry_offset = header_end;
    if sig_size >= GUID_LENGTH {
        entries.reserve(entry_region / sig_size);
        while entry_offset + sig_size <= list_end {
            entries.push(SignatureEntry {
                owner: read_guid(data, entry_offset),
                payload: data[entry_offset + GUID_LENGTH..entry_offset + sig_size].to_vec(),
            });
            entry_offset += sig_size;
        }
    }
    if entry_offset < list_end {
        log::debug!(
            "Signature list at {offset:#x}: ignoring {} trailing bytes",
            list_end - entry_offset
        );
    }

    ListDecode::Parsed {
        list: SignatureList {
            signature_type,
            signature_size,
            declared_size: list_size,
            header: data[header_start..header_end].to_vec(),
            entries,
        },
        next_offset: list_end,
    }
}
