//! CSV catalog files read from disk.

use std::fs;

use anyhow::Result;
use catalog::IndexCatalog;
use common::AuditError;

#[test]
fn loads_catalog_from_file() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("indexes.csv");
    fs::write(&path, "users,id\nusers,email\norders,id\norders,user_id\n")?;

    let catalog = IndexCatalog::from_csv_path(&path)?;
    assert_eq!(catalog.table_count(), 2);
    assert!(catalog.lookup("orders").contains("user_id"));
    assert!(catalog.lookup("users").contains("email"));
    Ok(())
}

#[test]
fn missing_file_names_the_path() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("nope.csv");

    let err = IndexCatalog::from_csv_path(&path).expect_err("missing catalog should fail");
    match err {
        AuditError::Catalog(msg) => {
            assert!(msg.contains("index list not found"), "{msg}");
            assert!(msg.contains("nope.csv"), "{msg}");
        }
        other => panic!("expected Catalog error, got {other:?}"),
    }
    Ok(())
}

#[test]
fn malformed_file_fails_before_any_lookup() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("bad.csv");
    fs::write(&path, "users,id\nusers,email,extra\n")?;

    let err = IndexCatalog::from_csv_path(&path).expect_err("three fields should fail");
    assert!(matches!(
        err,
        AuditError::CatalogFormat {
            record: 2,
            fields: 3
        }
    ));
    Ok(())
}
