//! Public contact form

use std::sync::{Arc, Mutex};

use api::{ApiGateway, endpoints, models::ContactSubmission};
use tracing::{error, info};

use crate::{
    error::{DashboardError, DashboardResult},
    lock,
    notify::Outbox,
    validation::{require_fields, validate_email},
};

/// Draft and submission of a visitor's message
pub struct InquiryForm {
    gateway: Arc<dyn ApiGateway>,
    outbox: Outbox,
    draft: Mutex<ContactSubmission>,
}

impl InquiryForm {
    pub fn new(gateway: Arc<dyn ApiGateway>, outbox: Outbox) -> Self {
        Self {
            gateway,
            outbox,
            draft: Mutex::new(ContactSubmission::default()),
        }
    }

    pub fn draft(&self) -> ContactSubmission {
        lock(&self.draft).clone()
    }

    pub fn update(&self, edit: impl FnOnce(&mut ContactSubmission)) {
        edit(&mut lock(&self.draft));
    }

    fn validate(draft: &ContactSubmission) -> Result<ContactSubmission, String> {
        require_fields(&[
            ("Name", &draft.name),
            ("Email", &draft.email),
            ("Subject", &draft.subject),
            ("Message", &draft.message),
        ])?;
        validate_email(draft.email.trim())?;

        Ok(ContactSubmission {
            name: draft.name.trim().to_string(),
            email: draft.email.trim().to_string(),
            subject: draft.subject.trim().to_string(),
            message: draft.message.trim().to_string(),
        })
    }

    /// Send the message; the draft is cleared only once the server accepted it
    pub async fn submit(&self) -> DashboardResult<()> {
        let submission = Self::validate(&self.draft()).map_err(|message| {
            self.outbox.notify("Invalid input", Some(&message));
            DashboardError::Validation(message)
        })?;

        match endpoints::submit_contact(self.gateway.as_ref(), &submission).await {
            Ok(_) => {
                info!("Contact message submitted");
                *lock(&self.draft) = ContactSubmission::default();
                self.outbox.notify(
                    "Message sent!",
                    Some("Thanks for reaching out. We'll get back to you soon."),
                );
                Ok(())
            }
            Err(failure) => {
                error!("Contact submission failed: {}", failure);
                self.outbox.notify("Send failed", Some(&failure.detail()));
                Err(failure.into())
            }
        }
    }
}
