//! Admin dashboard state for the SB Dev Studio site
//!
//! The controllers here sit between operator actions and the API: they
//! validate and normalise form drafts, dispatch to the resource stores, and
//! turn every outcome into notifications and navigation requests collected
//! in an [`Outbox`].

use std::sync::{Mutex, MutexGuard, PoisonError};

pub mod app;
pub mod controller;
pub mod error;
pub mod filter;
pub mod forms;
pub mod inquiry;
pub mod login;
pub mod notify;
pub mod validation;

pub use app::AdminClient;
pub use controller::{DashboardController, MountOutcome};
pub use error::{DashboardError, DashboardResult};
pub use filter::ProjectFilter;
pub use forms::{Form, FormMode, ProjectDraft, TestimonialDraft};
pub use inquiry::InquiryForm;
pub use login::LoginController;
pub use notify::{Notification, Outbox, Redirect};

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
