//! Wiring of the admin client

use std::sync::Arc;

use api::{ApiGateway, Confirm, HttpGateway};
use auth::AuthSession;
use common::{config::ClientConfig, storage::FileStore};
use tracing::info;

use crate::{
    controller::DashboardController, error::DashboardResult, inquiry::InquiryForm,
    login::LoginController, notify::Outbox,
};

/// One signed-in (or signed-out) operator and the views they can open
///
/// All views share the session, the gateway and a single outbox.
#[derive(Clone)]
pub struct AdminClient {
    session: AuthSession,
    gateway: Arc<dyn ApiGateway>,
    outbox: Outbox,
}

impl AdminClient {
    /// Restore the session from `config.storage_dir` and talk HTTP to
    /// `config.api_base`
    pub fn from_config(config: &ClientConfig) -> DashboardResult<Self> {
        let storage = FileStore::open(&config.storage_dir)?;
        let session = AuthSession::restore(Arc::new(storage));
        let gateway = HttpGateway::from_config(config, session.clone());
        info!(
            "Admin client using {} (signed in: {})",
            gateway.base_url(),
            session.is_authenticated()
        );
        Ok(Self::new(session, Arc::new(gateway)))
    }

    pub fn new(session: AuthSession, gateway: Arc<dyn ApiGateway>) -> Self {
        Self {
            session,
            gateway,
            outbox: Outbox::new(),
        }
    }

    pub fn session(&self) -> &AuthSession {
        &self.session
    }

    pub fn outbox(&self) -> &Outbox {
        &self.outbox
    }

    pub fn dashboard(&self, confirm: Arc<dyn Confirm>) -> DashboardController {
        DashboardController::new(self.session.clone(), Arc::clone(&self.gateway), confirm)
            .with_outbox(self.outbox.clone())
    }

    /// `from` is the path a refused navigation wanted
    pub fn login(&self, from: Option<String>) -> LoginController {
        LoginController::new(self.session.clone(), Arc::clone(&self.gateway), self.outbox.clone())
            .with_return_path(from)
    }

    pub fn inquiry(&self) -> InquiryForm {
        InquiryForm::new(Arc::clone(&self.gateway), self.outbox.clone())
    }
}
