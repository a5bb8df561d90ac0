// SPDX-License-Identifier: MIT

use super::*;
use crate::store::StoreFixtures;
use uuid::Uuid;

fn sample_stores() -> SecureBootStores {
    let fixtures = StoreFixtures {
        pk: vec![0x30; 40],
        kek: vec![0x31; 41],
        db: vec![vec![0x32; 42], vec![0x33; 42]],
        dbx: vec![[7; 32]; 3],
    };
    SecureBootStores::build(&fixtures, Uuid::new_v4).unwrap()
}

#[test]
fn test_in_dir_names() {
    let layout = StoreLayout::in_dir(Path::new("/tmp/sb"));
    assert_eq!(layout.path(StoreName::Pk), Some(Path::new("/tmp/sb/PK.bin")));
    assert_eq!(layout.path(StoreName::Dbx), Some(Path::new("/tmp/sb/dbx.bin")));
    assert_eq!(layout.attribute_header, 0);
}

#[test]
fn test_efivars_names() {
    let layout = StoreLayout::efivars(Path::new("/sys/firmware/efi/efivars"));
    assert_eq!(
        layout.path(StoreName::Db),
        Some(Path::new(
            "/sys/firmware/efi/efivars/db-d719b2cb-3d3a-4596-a3bc-dad00e67656f"
        ))
    );
    assert_eq!(layout.attribute_header, 4);
}

#[test]
fn test_write_then_load() {
    let dir = tempfile::tempdir().unwrap();
    let layout = StoreLayout::in_dir(dir.path());
    let stores = sample_stores();

    let written = layout.write(&stores).unwrap();
    assert_eq!(written.len(), 4);
    assert_eq!(layout.load().unwrap(), stores);
}

#[test]
fn test_load_skips_missing() {
    let dir = tempfile::tempdir().unwrap();
    let layout = StoreLayout::in_dir(dir.path());
    let stores = sample_stores();
    fs::write(
        layout.path(StoreName::Kek).unwrap(),
        stores.to_bytes(StoreName::Kek).unwrap(),
    )
    .unwrap();

    let loaded = layout.load().unwrap();
    assert_eq!(loaded.iter().count(), 1);
    assert_eq!(loaded.get(StoreName::Kek), stores.get(StoreName::Kek));
}

#[test]
fn test_attribute_header_stripped() {
    let dir = tempfile::tempdir().unwrap();
    let layout = StoreLayout::efivars(dir.path());
    let stores = sample_stores();
    let mut raw = vec![0x27, 0, 0, 0];
    raw.extend(stores.to_bytes(StoreName::Dbx).unwrap());
    fs::write(layout.path(StoreName::Dbx).unwrap(), raw).unwrap();

    let loaded = layout.load().unwrap();
    assert_eq!(loaded.get(StoreName::Dbx), stores.get(StoreName::Dbx));
    assert!(layout.write(&stores).is_err());
}

#[test]
fn test_attribute_header_too_short() {
    let dir = tempfile::tempdir().unwrap();
    let layout = StoreLayout::efivars(dir.path());
    fs::write(layout.path(StoreName::Pk).unwrap(), [0x27, 0]).unwrap();

    let err = layout.read(StoreName::Pk).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::InvalidData);
}

#[test]
fn test_json_layout() {
    let dir = tempfile::tempdir().unwrap();
    let layout_path = dir.path().join("layout.json");
    fs::write(
        &layout_path,
        r#"{"stores": {"db": "firmware/db.esl", "dbx": "/abs/dbx.esl"}}"#,
    )
    .unwrap();

    let layout = StoreLayout::from_json_file(&layout_path).unwrap();
    assert_eq!(layout.attribute_header, 0);
    assert_eq!(
        layout.path(StoreName::Db),
        Some(dir.path().join("firmware/db.esl").as_path())
    );
    assert_eq!(layout.path(StoreName::Dbx), Some(Path::new("/abs/dbx.esl")));
    assert_eq!(layout.path(StoreName::Pk), None);
}

#[test]
fn test_json_layout_unknown_store() {
    let dir = tempfile::tempdir().unwrap();
    let layout_path = dir.path().join("layout.json");
    fs::write(&layout_path, r#"{"stores": {"dbt": "dbt.bin"}}"#).unwrap();

    let err = StoreLayout::from_json_file(&layout_path).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::InvalidData);
}
