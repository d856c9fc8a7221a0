//! Login view controller

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use api::{ApiGateway, endpoints, models::LoginRequest};
use auth::{AuthSession, Decision, RouteGuard, guard::LOGIN_PATH};
use tracing::{error, info};

use crate::{
    error::{DashboardError, DashboardResult},
    notify::{Outbox, Redirect},
};

/// Exchanges operator credentials for a session token
pub struct LoginController {
    session: AuthSession,
    gateway: Arc<dyn ApiGateway>,
    outbox: Outbox,
    return_to: Option<String>,
    submitting: AtomicBool,
}

impl LoginController {
    pub fn new(session: AuthSession, gateway: Arc<dyn ApiGateway>, outbox: Outbox) -> Self {
        Self {
            session,
            gateway,
            outbox,
            return_to: None,
            submitting: AtomicBool::new(false),
        }
    }

    /// Remember the path to return to after signing in
    pub fn with_return_path(mut self, from: Option<String>) -> Self {
        self.return_to = from;
        self
    }

    pub fn return_path(&self) -> Option<&str> {
        self.return_to.as_deref()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.load(Ordering::Acquire)
    }

    /// Check whether the login view should be shown at all
    ///
    /// An operator who is already signed in is sent on immediately.
    pub fn enter(&self) -> Decision {
        let decision = self.guard().check(LOGIN_PATH, self.return_path());
        if let Decision::Redirect { to, from } = &decision {
            self.outbox.redirect(Redirect {
                to: to.clone(),
                from: from.clone(),
            });
        }
        decision
    }

    /// Sign in with `username` and `password`
    ///
    /// On success the token is stored and navigation to the remembered path
    /// (or the dashboard) is requested. On failure the session is left as is
    /// and no navigation happens.
    pub async fn submit(&self, username: &str, password: &str) -> DashboardResult<()> {
        if username.trim().is_empty() || password.is_empty() {
            self.outbox.notify("Missing fields", Some("Enter username and password."));
            return Err(DashboardError::Validation(
                "Username and password are required".to_string(),
            ));
        }

        let Some(_submitting) = SubmitGuard::acquire(&self.submitting) else {
            return Err(DashboardError::InProgress("Login"));
        };
        let credentials = LoginRequest::new(username.trim(), password);
        let result = endpoints::admin_login(self.gateway.as_ref(), &credentials).await;

        match result {
            Ok(token) => {
                info!("Operator {} signed in", credentials.username);
                self.session.login(token.access_token);
                self.outbox.notify("Welcome", Some("You are now signed in."));
                self.enter();
                Ok(())
            }
            Err(failure) => {
                error!("Login failed: {}", failure);
                let detail = failure.detail();
                let detail = if detail.trim().is_empty() {
                    "Login failed".to_string()
                } else {
                    detail
                };
                self.outbox.notify("Login error", Some(&detail));
                Err(failure.into())
            }
        }
    }

    fn guard(&self) -> RouteGuard {
        RouteGuard::new(self.session.clone())
    }
}

/// Marks a login as in flight; cleared on drop, including when the submit
/// future is cancelled
struct SubmitGuard<'a>(&'a AtomicBool);

impl<'a> SubmitGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        (!flag.swap(true, Ordering::AcqRel)).then_some(SubmitGuard(flag))
    }
}

impl Drop for SubmitGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
