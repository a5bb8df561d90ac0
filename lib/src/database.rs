// SPDX-License-Identifier: MIT

use crate::siglist::{ListDecode, SignatureEntry, SignatureList, decode_signature_list};
use uuid::Uuid;

#[cfg(test)]
mod tests;

/// A store's content: signature lists concatenated without separators
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Database {
    lists: Vec<SignatureList>,
}

impl Database {
    pub fn new(lists: Vec<SignatureList>) -> Database {
        Database { lists }
    }

    pub fn lists(&self) -> &[SignatureList] {
        &self.lists
    }

    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }

    pub fn push(&mut self, list: SignatureList) {
        self.lists.push(list);
    }

    /// Every entry of every list, along with its list's signature type
    pub fn entries(&self) -> impl Iterator<Item = (Uuid, &SignatureEntry)> {
        self.lists
            .iter()
            .flat_map(|l| l.entries().iter().map(move |e| (l.signature_type(), e)))
    }

    pub fn encode(&self) -> Vec<u8> {
        encode_database(&self.lists)
    }

    pub fn decode(data: &[u8]) -> Database {
        Database {
            lists: decode_database(data),
        }
    }
}

pub fn encode_database(lists: &[SignatureList]) -> Vec<u8> {
    let mut out = Vec::with_capacity(lists.iter().map(|l| l.list_size() as usize).sum());
    for list in lists {
        list.extend_encoded(&mut out);
    }
    out
}

/// Decodes consecutive signature lists from `data`.
///
/// Scanning stops at the first block that is too short to be a list or that
/// is structurally invalid; whatever was decoded before it is returned.
pub fn decode_database(data: &[u8]) -> Vec<SignatureList> {
    let mut lists = Vec::new();
    let mut offset = 0;

    loop {
        match decode_signature_list(data, offset) {
            ListDecode::Parsed { list, next_offset } => {
                lists.push(list);
                offset = next_offset;
            }
            ListDecode::EndOfData => {
                if offset < data.len() {
                    log::debug!("Ignoring {} trailing bytes", data.len() - offset);
                }
                break;
            }
            ListDecode::Invalid(reason) => {
                log::debug!(
                    "Stopping at invalid signature list at {offset:#x} ({reason:?}), keeping {} lists",
                    lists.len()
                );
                break;
            }
        }
    }

    lists
}
