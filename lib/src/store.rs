// SPDX-License-Identifier: MIT

//! The four Secure Boot stores and the databases they hold.

use crate::certs::generate_self_signed_cert;
use crate::database::Database;
use crate::report::EntryReport;
use crate::siglist::{SignatureEntry, SignatureList};
use crate::uefi::{CodecError, EFI_CERT_SHA256_GUID, EFI_CERT_X509_GUID};
use openssl::error::ErrorStack;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;


pub const PK_SUBJECT: &str = "Platform Key (PK)";
pub const KEK_SUBJECT: &str = "Key Exchange Key (KEK)";
pub const DB_SUBJECTS: [&str; 2] = ["UEFI CA A (Sim)", "UEFI CA B (Sim)"];
pub const DBX_DEFAULT_HASHES: usize = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StoreName {
    #[serde(rename = "PK")]
    Pk,
    #[serde(rename = "KEK")]
    Kek,
    #[serde(rename = "db")]
    Db,
    #[serde(rename = "dbx")]
    Dbx,
}

impl StoreName {
    pub const ALL: [StoreName; 4] = [StoreName::Pk, StoreName::Kek, StoreName::Db, StoreName::Dbx];

    pub fn as_str(&self) -> &'static str {
        match self {
            StoreName::Pk => "PK",
            StoreName::Kek => "KEK",
            StoreName::Db => "db",
            StoreName::Dbx => "dbx",
        }
    }

    /// Signature type the store holds by convention. Nothing enforces it.
    pub fn signature_type(&self) -> Uuid {
        match self {
            StoreName::Dbx => EFI_CERT_SHA256_GUID,
            _ => EFI_CERT_X509_GUID,
        }
    }
}

impl fmt::Display for StoreName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payloads the stores are built from
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StoreFixtures {
    /// DER encoded PK certificate
    pub pk: Vec<u8>,
    /// DER encoded KEK certificate
    pub kek: Vec<u8>,
    /// DER encoded db certificates
    pub db: Vec<Vec<u8>>,
    /// Forbidden SHA-256 digests
    pub dbx: Vec<[u8; 32]>,
}

impl StoreFixtures {
    /// Fresh self signed certificates for PK, KEK and every `db_subjects`
    /// entry, plus `dbx_hashes` digests of random data.
    pub fn simulated(db_subjects: &[&str], dbx_hashes: usize) -> Result<StoreFixtures, ErrorStack> {
        let mut dbx = Vec::with_capacity(dbx_hashes);
        for _ in 0..dbx_hashes {
            let mut noise = [0u8; 64];
            openssl::rand::rand_bytes(&mut noise)?;
            let mut digest = [0u8; 32];
            digest.copy_from_slice(&Sha256::digest(noise));
            dbx.push(digest);
        }

        Ok(StoreFixtures {
            pk: generate_self_signed_cert(PK_SUBJECT)?,
            kek: generate_self_signed_cert(KEK_SUBJECT)?,
            db: db_subjects
                .iter()
                .map(|s| generate_self_signed_cert(s))
                .collect::<Result<_, _>>()?,
            dbx,
        })
    }
}

/// Puts certificates in X.509 signature lists. A list can only hold
/// certificates of one length, so one list is made per distinct length, in
/// order of first appearance.
pub fn certificate_lists<F: FnMut() -> Uuid>(
    certs: &[Vec<u8>],
    owner: &mut F,
) -> Result<Vec<SignatureList>, CodecError> {
    let mut groups: Vec<Vec<SignatureEntry>> = vec![];
    for cert in certs {
        let entry = SignatureEntry::new(owner(), cert.clone());
        match groups
            .iter_mut()
            .find(|g| g[0].payload.len() == cert.len())
        {
            Some(group) => group.push(entry),
            None => groups.push(vec![entry]),
        }
    }

    groups
        .into_iter()
        .map(|entries| SignatureList::new(EFI_CERT_X509_GUID, vec![], entries))
        .collect()
}

pub fn hash_list<F: FnMut() -> Uuid>(
    digests: &[[u8; 32]],
    owner: &mut F,
) -> Result<SignatureList, CodecError> {
    let entries = digests
        .iter()
        .map(|d| SignatureEntry::new(owner(), d.to_vec()))
        .collect();
    SignatureList::new(EFI_CERT_SHA256_GUID, vec![], entries)
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SecureBootStores {
    stores: BTreeMap<StoreName, Database>,
}

impl SecureBootStores {
    pub fn new() -> SecureBootStores {
        SecureBootStores::default()
    }

    /// Builds all four stores from `fixtures`, tagging every entry with an
    /// owner taken from `owner`.
    pub fn build<F: FnMut() -> Uuid>(
        fixtures: &StoreFixtures,
        mut owner: F,
    ) -> Result<SecureBootStores, CodecError> {
        let mut stores = SecureBootStores::new();
        stores.insert(
            StoreName::Pk,
            Database::new(certificate_lists(
                std::slice::from_ref(&fixtures.pk),
                &mut owner,
            )?),
        );
        stores.insert(
            StoreName::Kek,
            Database::new(certificate_lists(
                std::slice::from_ref(&fixtures.kek),
                &mut owner,
            )?),
        );
        stores.insert(
            StoreName::Db,
            Database::new(certificate_lists(&fixtures.db, &mut owner)?),
        );

        let mut dbx = Database::default();
        if !fixtures.dbx.is_empty() {
            dbx.push(hash_list(&fixtures.dbx, &mut owner)?);
        }
        stores.insert(StoreName::Dbx, dbx);

        Ok(stores)
    }

    pub fn insert(&mut self, name: StoreName, db: Database) -> Option<Database> {
        self.stores.insert(name, db)
    }

    /// Decodes `data` and stores the result under `name`
    pub fn insert_bytes(&mut self, name: StoreName, data: &[u8]) -> &Database {
        let db = Database::decode(data);
        log::debug!("{name}: decoded {} signature lists", db.lists().len());
        self.stores.insert(name, db);
        &self.stores[&name]
    }

    pub fn get(&self, name: StoreName) -> Option<&Database> {
        self.stores.get(&name)
    }

    /// Encoded content of a store, `None` if the store isn't set
    pub fn to_bytes(&self, name: StoreName) -> Option<Vec<u8>> {
        self.stores.get(&name).map(Database::encode)
    }

    pub fn iter(&self) -> impl Iterator<Item = (StoreName, &Database)> {
        self.stores.iter().map(|(n, db)| (*n, db))
    }

    /// One report row per entry, stores in PK, KEK, db, dbx order
    pub fn report(&self) -> Vec<EntryReport> {
        self.iter()
            .flat_map(|(name, db)| {
                db.entries()
                    .map(move |(signature_type, entry)| EntryReport::new(name, signature_type, entry))
            })
            .collect()
    }
}
