// SPDX-License-Identifier: MIT

//! Where each store lives on disk. Stores are always named explicitly, either
//! through one of the fixed layouts or a JSON description.

use crate::store::{SecureBootStores, StoreName};
use crate::uefi::efivars::{SECURE_BOOT_ATTR_HEADER_LENGTH, efivar_file_name};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[cfg(test)]
mod tests;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreLayout {
    /// Bytes to drop from the start of every store file
    #[serde(default)]
    pub attribute_header: usize,
    pub stores: BTreeMap<StoreName, PathBuf>,
}

/// File name of a store written by `generate`, e.g. `db.bin`
pub fn bin_file_name(store: StoreName) -> String {
    format!("{}.bin", store.as_str())
}

impl StoreLayout {
    /// `PK.bin`, `KEK.bin`, `db.bin` and `dbx.bin` inside `dir`
    pub fn in_dir(dir: &Path) -> StoreLayout {
        StoreLayout {
            attribute_header: 0,
            stores: StoreName::ALL
                .iter()
                .map(|s| (*s, dir.join(bin_file_name(*s))))
                .collect(),
        }
    }

    /// Secure Boot variables of an efivarfs mount
    pub fn efivars(dir: &Path) -> StoreLayout {
        StoreLayout {
            attribute_header: SECURE_BOOT_ATTR_HEADER_LENGTH,
            stores: StoreName::ALL
                .iter()
                .map(|s| (*s, dir.join(efivar_file_name(*s))))
                .collect(),
        }
    }

    /// Reads a JSON layout. Relative store paths are taken relative to the
    /// directory holding the layout file.
    pub fn from_json_file(path: &Path) -> io::Result<StoreLayout> {
        let mut layout: StoreLayout = serde_json::from_slice(&fs::read(path)?)?;
        let base = path.parent().unwrap_or(Path::new(""));
        for store_path in layout.stores.values_mut() {
            if store_path.is_relative() {
                *store_path = base.join(&*store_path);
            }
        }
        Ok(layout)
    }

    pub fn path(&self, store: StoreName) -> Option<&Path> {
        self.stores.get(&store).map(PathBuf::as_path)
    }

    /// Raw database bytes of `store`. `None` when the layout doesn't name the
    /// store or its file doesn't exist.
    pub fn read(&self, store: StoreName) -> io::Result<Option<Vec<u8>>> {
        let Some(path) = self.path(store) else {
            return Ok(None);
        };
        let mut data = match fs::read(path) {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e),
        };
        if data.len() < self.attribute_header {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "{} is shorter than its {} byte attribute header",
                    path.display(),
                    self.attribute_header
                ),
            ));
        }
        data.drain(..self.attribute_header);
        Ok(Some(data))
    }

    /// Loads every store the layout names. Missing files are skipped.
    pub fn load(&self) -> io::Result<SecureBootStores> {
        let mut stores = SecureBootStores::new();
        for (store, path) in &self.stores {
            match self.read(*store)? {
                Some(data) => {
                    stores.insert_bytes(*store, &data);
                }
                None => log::warn!("{store}: {} not found, skipping", path.display()),
            }
        }
        Ok(stores)
    }

    /// Writes the stores present in `stores` to their layout paths. Attribute
    /// headers are not synthesized, so this refuses layouts that have one.
    pub fn write(&self, stores: &SecureBootStores) -> io::Result<Vec<PathBuf>> {
        if self.attribute_header != 0 {
            return Err(io::Error::new(
                io::ErrorKind::Unsupported,
                "writing stores with an attribute header is not supported",
            ));
        }

        let mut written = vec![];
        for (store, db) in stores.iter() {
            let Some(path) = self.path(store) else {
                continue;
            };
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, db.encode())?;
            log::info!("{store}: wrote {}", path.display());
            written.push(path.to_path_buf());
        }
        Ok(written)
    }
}
