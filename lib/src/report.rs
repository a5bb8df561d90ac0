// SPDX-License-Identifier: MIT

use crate::certs::classify_payload;
use crate::siglist::{SignatureEntry, SignatureList};
use crate::store::StoreName;
use crate::uefi::EFI_CERT_SHA256_GUID;
use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use uuid::Uuid;


/// One row of the exported store report
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryReport {
    pub store: StoreName,
    pub signature_type: Uuid,
    pub owner: Uuid,
    pub is_x509: bool,
    pub subject: String,
    pub issuer: String,
    pub serial_number: String,
    pub not_before: String,
    pub not_after: String,
    pub data_length: usize,
    #[serde_as(as = "Option<serde_with::hex::Hex>")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha256: Option<Vec<u8>>,
}

impl EntryReport {
    pub fn new(store: StoreName, signature_type: Uuid, entry: &SignatureEntry) -> EntryReport {
        let sha256 = (signature_type == EFI_CERT_SHA256_GUID && entry.payload.len() == 32)
            .then(|| entry.payload.clone());
        let mut report = EntryReport {
            store,
            signature_type,
            owner: entry.owner,
            is_x509: false,
            subject: String::new(),
            issuer: String::new(),
            serial_number: String::new(),
            not_before: String::new(),
            not_after: String::new(),
            data_length: entry.payload.len(),
            sha256,
        };

        if let Some(cert) = classify_payload(&entry.payload) {
            report.is_x509 = true;
            report.subject = cert.subject;
            report.issuer = cert.issuer;
            report.serial_number = cert.serial_number;
            report.not_before = cert.not_before;
            report.not_after = cert.not_after;
        }
        report
    }
}

/// Summary of one signature list, as found in a raw database file
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListSummary {
    pub signature_type: Uuid,
    /// `SignatureListSize` as found in the file, padding included
    pub list_size: u32,
    pub header_size: u32,
    pub signature_size: u32,
    pub entries: usize,
}

impl From<&SignatureList> for ListSummary {
    fn from(list: &SignatureList) -> Self {
        ListSummary {
            signature_type: list.signature_type(),
            list_size: list.declared_size(),
            header_size: list.header_size(),
            signature_size: list.signature_size(),
            entries: list.entries().len(),
        }
    }
}
