//! Session persistence across a simulated restart using on-disk storage

use std::sync::Arc;

use auth::{AuthSession, TOKEN_KEY};
use common::storage::{FileStore, KeyValueStore};

#[test]
fn test_session_rehydrates_from_file_store() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;

    let session = AuthSession::restore(Arc::new(FileStore::open(dir.path())?));
    session.login("abc");
    drop(session);

    let store = FileStore::open(dir.path())?;
    assert_eq!(store.get(TOKEN_KEY)?, Some("abc".to_string()));

    let reloaded = AuthSession::restore(Arc::new(store));
    assert_eq!(reloaded.current_token(), Some("abc".to_string()));

    reloaded.logout();
    let reloaded = AuthSession::restore(Arc::new(FileStore::open(dir.path())?));
    assert_eq!(reloaded.current_token(), None);

    Ok(())
}
