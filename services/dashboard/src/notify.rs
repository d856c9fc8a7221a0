//! Operator-facing notifications and navigation requests

use std::sync::{Arc, Mutex};

use tracing::info;

use crate::lock;

/// A toast shown to the operator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub description: Option<String>,
}

/// Request to navigate away from the current view
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    pub to: String,
    /// Path to return to after the target view is done
    pub from: Option<String>,
}

#[derive(Debug, Default)]
struct OutboxState {
    notifications: Vec<Notification>,
    redirect: Option<Redirect>,
}

/// Side effects produced by controllers, drained by the view layer
#[derive(Debug, Clone, Default)]
pub struct Outbox {
    state: Arc<Mutex<OutboxState>>,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notify(&self, title: &str, description: Option<&str>) {
        match description {
            Some(description) => info!("Notification: {} ({})", title, description),
            None => info!("Notification: {}", title),
        }

        lock(&self.state).notifications.push(Notification {
            title: title.to_string(),
            description: description.map(str::to_string),
        });
    }

    /// Request navigation; a later request replaces an unconsumed one
    pub fn redirect(&self, redirect: Redirect) {
        info!("Redirect requested to {}", redirect.to);
        lock(&self.state).redirect = Some(redirect);
    }

    /// Pending notifications, oldest first, without consuming them
    pub fn notifications(&self) -> Vec<Notification> {
        lock(&self.state).notifications.clone()
    }

    pub fn take_notifications(&self) -> Vec<Notification> {
        std::mem::take(&mut lock(&self.state).notifications)
    }

    pub fn take_redirect(&self) -> Option<Redirect> {
        lock(&self.state).redirect.take()
    }

    pub fn pending_redirect(&self) -> Option<Redirect> {
        lock(&self.state).redirect.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_drains() {
        let outbox = Outbox::new();
        outbox.notify("Project created", None);
        outbox.notify("Delete failed", Some("Could not delete project"));

        let taken = outbox.take_notifications();
        assert_eq!(taken.len(), 2);
        assert_eq!(taken[1].description.as_deref(), Some("Could not delete project"));
        assert!(outbox.take_notifications().is_empty());
    }

    #[test]
    fn test_latest_redirect_wins() {
        let outbox = Outbox::new();
        outbox.redirect(Redirect {
            to: "/admin".into(),
            from: None,
        });
        outbox.redirect(Redirect {
            to: "/admin/login".into(),
            from: None,
        });

        assert_eq!(outbox.take_redirect().map(|r| r.to), Some("/admin/login".into()));
        assert_eq!(outbox.take_redirect(), None);
    }
}
