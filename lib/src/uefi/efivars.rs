// SPDX-License-Identifier: MIT

use super::{GUID_GLOBAL_VARIABLE, GUID_SECURITY_DATABASE};
use crate::store::StoreName;
use uuid::Uuid;

const EFI_VAR_ID_PK: (&str, Uuid) = ("PK", GUID_GLOBAL_VARIABLE);
const EFI_VAR_ID_KEK: (&str, Uuid) = ("KEK", GUID_GLOBAL_VARIABLE);
const EFI_VAR_ID_DB: (&str, Uuid) = ("db", GUID_SECURITY_DATABASE);
const EFI_VAR_ID_DBX: (&str, Uuid) = ("dbx", GUID_SECURITY_DATABASE);

/// efivarfs prefixes every variable with its 4 byte attribute mask
pub const SECURE_BOOT_ATTR_HEADER_LENGTH: usize = 4;

/// Variable name and vendor GUID under which firmware exposes a store
pub fn variable_id(store: StoreName) -> (&'static str, Uuid) {
    match store {
        StoreName::Pk => EFI_VAR_ID_PK,
        StoreName::Kek => EFI_VAR_ID_KEK,
        StoreName::Db => EFI_VAR_ID_DB,
        StoreName::Dbx => EFI_VAR_ID_DBX,
    }
}

/// File name of a store inside an efivarfs mount, e.g.
/// `db-d719b2cb-3d3a-4596-a3bc-dad00e67656f`
pub fn efivar_file_name(store: StoreName) -> String {
    let (var, guid) = variable_id(store);
    format!("{var}-{guid}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn efivar_file_names() {
        assert_eq!(
            efivar_file_name(StoreName::Pk),
            "PK-8be4df61-93ca-11d2-aa0d-00e098032b8c"
        );
        assert_eq!(
            efivar_file_name(StoreName::Dbx),
            "dbx-d719b2cb-3d3a-4596-a3bc-dad00e67656f"
        );
    }
}
