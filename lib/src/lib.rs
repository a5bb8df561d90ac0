// SPDX-License-Identifier: MIT

//! Reading and writing the UEFI Secure Boot signature databases (PK, KEK, db
//! and dbx) in their `EFI_SIGNATURE_LIST` firmware format.

pub mod certs;
pub mod database;
pub mod layout;
pub mod report;
pub mod siglist;
pub mod store;
pub mod uefi;

pub use database::{Database, decode_database, encode_database};
pub use siglist::{
    ListDecode, SignatureEntry, SignatureList, decode_signature_list, encode_signature_list,
};
pub use store::{SecureBootStores, StoreFixtures, StoreName};
pub use uefi::{CodecError, EFI_CERT_SHA256_GUID, EFI_CERT_X509_GUID};
