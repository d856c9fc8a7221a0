//! Session management backed by durable storage

use std::sync::Arc;

use common::storage::KeyValueStore;
use tokio::sync::watch;
use tracing::{info, warn};

/// Storage key the token is persisted under
pub const TOKEN_KEY: &str = "sbdev_admin_token";

/// Holds the operator's credential token
///
/// Clones share the same token. Every mutation is mirrored into storage
/// (write on set, delete on clear) so `restore` can rehydrate it later.
#[derive(Clone)]
pub struct AuthSession {
    token: Arc<watch::Sender<Option<String>>>,
    storage: Arc<dyn KeyValueStore>,
}

impl std::fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSession")
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}

impl AuthSession {
    /// Rehydrate the session from storage
    ///
    /// An unreadable store starts the session unauthenticated.
    pub fn restore(storage: Arc<dyn KeyValueStore>) -> Self {
        let token = match storage.get(TOKEN_KEY) {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                warn!("Failed to read stored session: {}", e);
                None
            }
        };

        if token.is_some() {
            info!("Restored operator session from storage");
        }

        let (sender, _) = watch::channel(token);
        Self {
            token: Arc::new(sender),
            storage,
        }
    }

    /// Store a token in memory and in durable storage
    pub fn login(&self, token: impl Into<String>) {
        let token = token.into();
        if let Err(e) = self.storage.set(TOKEN_KEY, &token) {
            warn!("Failed to persist session token: {}", e);
        }
        self.token.send_replace(Some(token));
        info!("Operator session started");
    }

    /// Clear the token from memory and durable storage
    pub fn logout(&self) {
        if let Err(e) = self.storage.delete(TOKEN_KEY) {
            warn!("Failed to remove persisted session token: {}", e);
        }
        if self.token.send_replace(None).is_some() {
            info!("Operator session ended");
        }
    }

    pub fn current_token(&self) -> Option<String> {
        self.token.borrow().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.borrow().is_some()
    }

    /// Observe token changes (login, logout, forced expiry)
    pub fn subscribe(&self) -> watch::Receiver<Option<String>> {
        self.token.subscribe()
    }
}
