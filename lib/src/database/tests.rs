// SPDX-License-Identifier: MIT

use super::*;
use crate::uefi::{EFI_CERT_SHA256_GUID, EFI_CERT_X509_GUID};
use uuid::uuid;

const OWNER: Uuid = uuid!("77fa9abd-0359-4d32-bd60-28f4e78f784b");

fn hash_list(count: u8) -> SignatureList {
    let entries = (0..count)
        .map(|i| SignatureEntry::new(OWNER, vec![i; 32]))
        .collect();
    SignatureList::new(EFI_CERT_SHA256_GUID, vec![], entries).unwrap()
}

fn cert_like_list(len: usize) -> SignatureList {
    SignatureList::new(
        EFI_CERT_X509_GUID,
        vec![],
        vec![SignatureEntry::new(OWNER, vec![0x30; len])],
    )
    .unwrap()
}

#[test]
fn test_empty_database() {
    assert!(encode_database(&[]).is_empty());
    assert!(decode_database(&[]).is_empty());
    assert_eq!(Database::decode(&[]), Database::default());
}

#[test]
fn test_roundtrip() {
    let lists = vec![cert_like_list(913), cert_like_list(1021), hash_list(3)];
    let encoded = encode_database(&lists);

    assert_eq!(
        encoded.len(),
        lists.iter().map(|l| l.list_size() as usize).sum::<usize>()
    );
    assert_eq!(decode_database(&encoded), lists);
}

#[test]
fn test_trailing_bytes_ignored() {
    let db = Database::new(vec![cert_like_list(900), hash_list(10)]);
    let encoded = db.encode();

    for extra in 1..28 {
        let mut padded = encoded.clone();
        padded.extend(vec![0u8; extra]);
        assert_eq!(Database::decode(&padded), db, "{extra} trailing bytes");
    }
}

#[test]
fn test_corrupt_second_list() {
    let first = hash_list(2);
    let second = hash_list(4);
    let mut encoded = encode_database(&[first.clone(), second]);
    let second_offset = first.list_size() as usize;
    encoded[second_offset + 16..second_offset + 20].copy_from_slice(&0xffff_fff0u32.to_le_bytes());

    let decoded = decode_database(&encoded);
    assert_eq!(decoded, vec![first]);
}

#[test]
fn test_corrupt_first_list() {
    let mut encoded = encode_database(&[hash_list(2), hash_list(4)]);
    encoded[16..20].copy_from_slice(&3u32.to_le_bytes());

    assert!(decode_database(&encoded).is_empty());
}

#[test]
fn test_dbx_ten_hashes() {
    let db = Database::new(vec![hash_list(10)]);
    let decoded = Database::decode(&db.encode());

    assert_eq!(decoded.lists().len(), 1);
    assert_eq!(decoded.lists()[0].signature_size(), 48);
    assert_eq!(decoded.lists()[0].entries().len(), 10);
    assert!(decoded.entries().all(|(t, e)| {
        t == EFI_CERT_SHA256_GUID && e.payload.len() == 32 && e.owner == OWNER
    }));
}

#[test]
fn test_entries_keep_list_type() {
    let db = Database::new(vec![cert_like_list(10), hash_list(2)]);
    let types: Vec<Uuid> = db.entries().map(|(t, _)| t).collect();

    assert_eq!(
        types,
        vec![EFI_CERT_X509_GUID, EFI_CERT_SHA256_GUID, EFI_CERT_SHA256_GUID]
    );
}
