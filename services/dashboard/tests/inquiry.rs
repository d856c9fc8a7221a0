//! Public contact form against the in-memory API backend

use std::sync::Arc;

use api::{
    ApiError,
    fake::InMemoryBackend,
    models::{ContactStatus, ContactSubmission},
};
use auth::AuthSession;
use common::storage::MemoryStore;
use dashboard::{InquiryForm, Outbox};
use reqwest::Method;

fn setup() -> (Arc<InMemoryBackend>, Outbox, InquiryForm) {
    let session = AuthSession::restore(Arc::new(MemoryStore::new()));
    let backend = Arc::new(InMemoryBackend::new(session));
    let outbox = Outbox::new();
    let form = InquiryForm::new(backend.clone(), outbox.clone());
    form.update(|draft| {
        draft.name = "Jane".to_string();
        draft.email = " jane@example.com ".to_string();
        draft.subject = "Website".to_string();
        draft.message = "We need a new site.".to_string();
    });
    (backend, outbox, form)
}

#[tokio::test]
async fn test_submit_posts_and_resets() -> anyhow::Result<()> {
    let (backend, outbox, form) = setup();

    form.submit().await?;

    let contacts = backend.contacts();
    assert_eq!(contacts.len(), 1);
    assert_eq!(contacts[0].email, "jane@example.com");
    assert_eq!(contacts[0].status, ContactStatus::New);
    assert_eq!(form.draft(), ContactSubmission::default());
    assert_eq!(outbox.notifications()[0].title, "Message sent!");
    Ok(())
}

#[tokio::test]
async fn test_invalid_email_is_not_sent() {
    let (backend, outbox, form) = setup();
    form.update(|draft| draft.email = "jane@".to_string());

    let result = form.submit().await;

    assert!(result.is_err_and(|e| e.is_validation()));
    assert!(backend.requests().is_empty());
    assert_eq!(outbox.notifications()[0].title, "Invalid input");
}

#[tokio::test]
async fn test_failed_send_keeps_draft() {
    let (backend, outbox, form) = setup();
    backend.fail_next(
        Method::POST,
        "/contact",
        ApiError::Network("connection refused".to_string()),
    );
    let before = form.draft();

    assert!(form.submit().await.is_err());

    assert_eq!(form.draft(), before);
    assert!(backend.contacts().is_empty());
    let sent = outbox.notifications();
    assert_eq!(sent[0].title, "Send failed");
    assert_eq!(sent[0].description.as_deref(), Some("Network error: connection refused"));
}
