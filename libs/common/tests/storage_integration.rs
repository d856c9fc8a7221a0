//! Integration tests for durable storage
//!
//! These tests verify that values written through one `FileStore` handle
//! are visible to a handle opened later on the same directory, which is what
//! a restarted client relies on.

use common::storage::{FileStore, KeyValueStore, STORE_FILE_NAME};

#[test]
fn test_values_survive_reopen() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;

    {
        let store = FileStore::open(dir.path())?;
        store.set("sbdev_admin_token", "abc")?;
    }

    let reopened = FileStore::open(dir.path())?;
    assert_eq!(
        reopened.get("sbdev_admin_token")?,
        Some("abc".to_string()),
        "Value was not persisted"
    );
    assert!(dir.path().join(STORE_FILE_NAME).exists());

    // No temp file is left behind after writes
    assert!(!dir.path().join("storage.json.tmp").exists());

    reopened.delete("sbdev_admin_token")?;
    let reopened = FileStore::open(dir.path())?;
    assert_eq!(reopened.get("sbdev_admin_token")?, None);

    Ok(())
}

#[test]
fn test_open_creates_missing_directory() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let nested = dir.path().join("a").join("b");

    let store = FileStore::open(&nested)?;
    store.set("key", "value")?;

    assert!(nested.join(STORE_FILE_NAME).exists());
    Ok(())
}
