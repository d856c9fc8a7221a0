//! Admin dashboard controller
//!
//! [`DashboardController`] owns the three resource stores, the two editor
//! forms and the stats view for one dashboard mount. Every action reports
//! its outcome through the [`Outbox`]; failures never leave a store half
//! written and never affect unrelated resources.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use api::{
    ApiError, ApiGateway, Confirm, Confirmed, ErrorKind, Resource, ResourceStore, UploadFile,
    endpoints,
    models::{
        Contact, ContactStatus, ContactStatusUpdate, DashboardStats, Project, Testimonial,
        UploadFolder,
    },
};
use auth::{
    AuthSession, Decision, RouteGuard,
    guard::{DASHBOARD_PATH, LOGIN_PATH},
};
use common::lifecycle::{Lifecycle, MountGuard};
use tracing::{debug, error, info, warn};

use crate::{
    error::{DashboardError, DashboardResult},
    filter::{self, ProjectFilter},
    forms::{Form, FormMode, ProjectDraft, TestimonialDraft},
    lock,
    notify::{Outbox, Redirect},
    validation::validate_upload,
};

/// Result of mounting the dashboard
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MountOutcome {
    /// All loads finished; some may have failed non-fatally
    Ready,
    /// Navigation was requested to this path instead
    Redirected(String),
    /// The view was unmounted before the loads finished
    Unmounted,
}

pub struct DashboardController {
    session: AuthSession,
    gateway: Arc<dyn ApiGateway>,
    confirm: Arc<dyn Confirm>,
    lifecycle: Lifecycle,
    mounted: Mutex<Option<MountGuard>>,
    ready: AtomicBool,
    stats: Mutex<Option<DashboardStats>>,
    projects: ResourceStore<Project>,
    testimonials: ResourceStore<Testimonial>,
    contacts: ResourceStore<Contact>,
    project_form: Mutex<Form<ProjectDraft>>,
    testimonial_form: Mutex<Form<TestimonialDraft>>,
    outbox: Outbox,
}

impl DashboardController {
    /// `confirm` is asked before every delete
    pub fn new(session: AuthSession, gateway: Arc<dyn ApiGateway>, confirm: Arc<dyn Confirm>) -> Self {
        let lifecycle = Lifecycle::new();
        Self {
            projects: ResourceStore::new(Arc::clone(&gateway), lifecycle.clone()),
            testimonials: ResourceStore::new(Arc::clone(&gateway), lifecycle.clone()),
            contacts: ResourceStore::new(Arc::clone(&gateway), lifecycle.clone()),
            session,
            gateway,
            confirm,
            lifecycle,
            mounted: Mutex::new(None),
            ready: AtomicBool::new(false),
            stats: Mutex::new(None),
            project_form: Mutex::new(Form::new()),
            testimonial_form: Mutex::new(Form::new()),
            outbox: Outbox::new(),
        }
    }

    /// Share an outbox with other controllers of the same view
    pub fn with_outbox(mut self, outbox: Outbox) -> Self {
        self.outbox = outbox;
        self
    }

    pub fn outbox(&self) -> &Outbox {
        &self.outbox
    }

    pub fn session(&self) -> &AuthSession {
        &self.session
    }

    /// Enter the dashboard and load everything it shows
    ///
    /// Without a session token nothing is fetched and the route guard's
    /// redirect is emitted. Stats and the three lists load concurrently.
    pub async fn mount(&self) -> MountOutcome {
        if let Decision::Redirect { to, from } = RouteGuard::new(self.session.clone()).check(DASHBOARD_PATH, None) {
            info!("Dashboard mount refused, redirecting to {}", to);
            self.outbox.redirect(Redirect {
                to: to.clone(),
                from,
            });
            return MountOutcome::Redirected(to);
        }

        *lock(&self.mounted) = Some(self.lifecycle.acquire());
        self.ready.store(false, Ordering::Release);
        let ticket = self.lifecycle.ticket();

        let (stats, projects, testimonials, contacts) = tokio::join!(
            self.load_stats(),
            self.projects.load(),
            self.testimonials.load(),
            self.contacts.load(),
        );

        let failures: Vec<(&str, ApiError)> = [
            ("stats", stats.err()),
            ("projects", projects.err()),
            ("testimonials", testimonials.err()),
            ("contacts", contacts.err()),
        ]
        .into_iter()
        .filter_map(|(name, failure)| failure.map(|failure| (name, failure)))
        .collect();

        if let Some((_, rejected)) = failures.iter().find(|(_, failure)| failure.is_unauthorized()) {
            self.expire_session(rejected);
            return MountOutcome::Redirected(LOGIN_PATH.to_string());
        }

        if !ticket.is_live() {
            debug!("Dashboard unmounted while loading");
            return MountOutcome::Unmounted;
        }

        for (name, failure) in failures {
            warn!("Failed to load {}: {}", name, failure);
            self.outbox.notify(
                "Load failed",
                Some(&format!("Could not load {}: {}", name, failure.detail())),
            );
        }

        self.ready.store(true, Ordering::Release);
        info!("Dashboard ready");
        MountOutcome::Ready
    }

    /// Leave the dashboard; in-flight responses are discarded on arrival
    pub fn unmount(&self) {
        let guard = lock(&self.mounted).take();
        if guard.is_some() {
            info!("Dashboard unmounted");
        }
        drop(guard);

        self.ready.store(false, Ordering::Release);
        *lock(&self.stats) = None;
        self.projects.clear();
        self.testimonials.clear();
        self.contacts.clear();
        lock(&self.project_form).reset();
        lock(&self.testimonial_form).reset();
    }

    pub fn is_mounted(&self) -> bool {
        self.lifecycle.is_mounted()
    }

    /// True once a mount finished loading and until the next unmount
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// Sign out and go to the login view
    pub fn logout(&self) {
        self.session.logout();
        self.unmount();
        self.outbox.redirect(Redirect {
            to: LOGIN_PATH.to_string(),
            from: None,
        });
    }

    /// Sign out after the server rejected the token. Only the first of
    /// several concurrent rejections is reported.
    fn expire_session(&self, rejected: &ApiError) {
        let was_signed_in = self.session.is_authenticated();
        self.session.logout();
        self.unmount();
        if !was_signed_in {
            debug!("Session already cleared: {}", rejected);
            return;
        }

        warn!("Session rejected by the server, signing out: {}", rejected);
        let detail = describe(rejected, "Session expired");
        self.outbox.notify("Auth required", Some(&detail));
        self.outbox.redirect(Redirect {
            to: LOGIN_PATH.to_string(),
            from: Some(DASHBOARD_PATH.to_string()),
        });
    }

    /// Report a failed API call and convert it for the caller
    fn fail(&self, failure: ApiError, title: &str, description: Describe<'_>) -> DashboardError {
        match failure.kind() {
            ErrorKind::Authorization => self.expire_session(&failure),
            ErrorKind::Stale => debug!("Dropped result for an unmounted dashboard"),
            _ => {
                error!("{}: {}", title, failure);
                let description = match description {
                    Describe::Fixed(text) => text.to_string(),
                    Describe::Detail { fallback } => describe(&failure, fallback),
                };
                self.outbox.notify(title, Some(&description));
            }
        }
        DashboardError::Api(failure)
    }

    fn invalid(&self, message: String) -> DashboardError {
        debug!("Rejected input: {}", message);
        self.outbox.notify("Invalid input", Some(&message));
        DashboardError::Validation(message)
    }

    async fn load_stats(&self) -> Result<DashboardStats, ApiError> {
        let ticket = self.lifecycle.ticket();
        let stats = endpoints::fetch_stats(self.gateway.as_ref()).await?;
        if !ticket.is_live() {
            return Err(ApiError::Stale);
        }
        *lock(&self.stats) = Some(stats);
        Ok(stats)
    }

    /// Re-fetch the counters shown on the overview
    pub async fn refresh_stats(&self) -> DashboardResult<DashboardStats> {
        self.load_stats()
            .await
            .map_err(|failure| self.fail(failure, "Load failed", Describe::Detail { fallback: "Load failed" }))
    }

    pub fn stats(&self) -> Option<DashboardStats> {
        *lock(&self.stats)
    }

    pub fn projects(&self) -> Vec<Project> {
        self.projects.items()
    }

    pub fn projects_in(&self, filter: &ProjectFilter) -> Vec<Project> {
        self.projects.filtered_by(|project| filter.matches(project))
    }

    /// Filter labels derived from the loaded projects
    pub fn project_categories(&self) -> Vec<String> {
        filter::categories(&self.projects.items())
    }

    pub fn testimonials(&self) -> Vec<Testimonial> {
        self.testimonials.items()
    }

    pub fn contacts(&self) -> Vec<Contact> {
        self.contacts.items()
    }

    pub fn project_form(&self) -> Form<ProjectDraft> {
        lock(&self.project_form).clone()
    }

    pub fn testimonial_form(&self) -> Form<TestimonialDraft> {
        lock(&self.testimonial_form).clone()
    }

    pub fn update_project_draft(&self, edit: impl FnOnce(&mut ProjectDraft)) {
        edit(&mut lock(&self.project_form).draft);
    }

    pub fn update_testimonial_draft(&self, edit: impl FnOnce(&mut TestimonialDraft)) {
        edit(&mut lock(&self.testimonial_form).draft);
    }

    /// Load a listed project into the editor, discarding any unsaved draft
    pub fn edit_project(&self, id: &str) -> DashboardResult<()> {
        let project = self.projects.get(id).ok_or_else(|| DashboardError::UnknownEntity {
            kind: Project::KIND.name,
            id: id.to_string(),
        })?;
        lock(&self.project_form).begin_edit(id, ProjectDraft::from_project(&project));
        Ok(())
    }

    pub fn cancel_project_edit(&self) {
        lock(&self.project_form).reset();
    }

    pub fn edit_testimonial(&self, id: &str) -> DashboardResult<()> {
        let testimonial = self.testimonials.get(id).ok_or_else(|| DashboardError::UnknownEntity {
            kind: Testimonial::KIND.name,
            id: id.to_string(),
        })?;
        lock(&self.testimonial_form).begin_edit(id, TestimonialDraft::from_testimonial(&testimonial));
        Ok(())
    }

    pub fn cancel_testimonial_edit(&self) {
        lock(&self.testimonial_form).reset();
    }

    /// Create or update a project from the editor draft
    pub async fn submit_project(&self) -> DashboardResult<Project> {
        let (mode, normalized) = {
            let form = lock(&self.project_form);
            (form.mode().clone(), form.draft.normalize())
        };
        let payload = normalized.map_err(|message| self.invalid(message))?;

        let (result, done) = match form_target(&mode) {
            None => (self.projects.create(&payload).await, "Project created"),
            Some(id) => (self.projects.update(id, &payload).await, "Project updated"),
        };
        let project = result.map_err(|failure| {
            self.fail(failure, "Project error", Describe::Detail { fallback: "Save failed" })
        })?;

        reset_if_unchanged(&self.project_form, &mode);
        self.outbox.notify(done, None);
        Ok(project)
    }

    /// Create or update a testimonial from the editor draft
    pub async fn submit_testimonial(&self) -> DashboardResult<Testimonial> {
        let (mode, normalized) = {
            let form = lock(&self.testimonial_form);
            (form.mode().clone(), form.draft.normalize())
        };
        let payload = normalized.map_err(|message| self.invalid(message))?;

        let (result, done) = match form_target(&mode) {
            None => (self.testimonials.create(&payload).await, "Testimonial created"),
            Some(id) => (self.testimonials.update(id, &payload).await, "Testimonial updated"),
        };
        let testimonial = result.map_err(|failure| {
            self.fail(failure, "Testimonial error", Describe::Detail { fallback: "Save failed" })
        })?;

        reset_if_unchanged(&self.testimonial_form, &mode);
        self.outbox.notify(done, None);
        Ok(testimonial)
    }

    /// Returns `Ok(false)` when the operator declined
    pub async fn delete_project(&self, id: &str) -> DashboardResult<bool> {
        let deleted = self
            .delete(&self.projects, id, "Delete this project?", "Project deleted", "Could not delete project")
            .await?;
        if deleted {
            reset_if_editing(&self.project_form, id);
        }
        Ok(deleted)
    }

    pub async fn delete_testimonial(&self, id: &str) -> DashboardResult<bool> {
        let deleted = self
            .delete(
                &self.testimonials,
                id,
                "Delete this testimonial?",
                "Testimonial deleted",
                "Could not delete testimonial",
            )
            .await?;
        if deleted {
            reset_if_editing(&self.testimonial_form, id);
        }
        Ok(deleted)
    }

    pub async fn delete_contact(&self, id: &str) -> DashboardResult<bool> {
        self.delete(&self.contacts, id, "Delete this contact?", "Contact deleted", "Could not delete contact")
            .await
    }

    async fn delete<T: Resource>(
        &self,
        store: &ResourceStore<T>,
        id: &str,
        prompt: &str,
        done: &str,
        failed: &str,
    ) -> DashboardResult<bool> {
        let Some(confirmed) = Confirmed::ask(self.confirm.as_ref(), prompt) else {
            debug!("Delete of {} {} declined", T::KIND.name, id);
            return Ok(false);
        };

        store
            .remove(id, confirmed)
            .await
            .map_err(|failure| self.fail(failure, "Delete failed", Describe::Fixed(failed)))?;
        self.outbox.notify(done, None);
        Ok(true)
    }

    /// Change a contact's status; no confirmation is asked
    pub async fn set_contact_status(&self, id: &str, status: ContactStatus) -> DashboardResult<Contact> {
        let contact = self
            .contacts
            .update(id, &ContactStatusUpdate { status })
            .await
            .map_err(|failure| self.fail(failure, "Update failed", Describe::Fixed("Could not update contact")))?;
        self.outbox.notify("Status updated", None);
        Ok(contact)
    }

    /// Upload an image and put its URL into the matching editor draft
    ///
    /// The owning entity is not saved; the operator still has to submit.
    pub async fn upload(&self, folder: UploadFolder, file: UploadFile) -> DashboardResult<String> {
        validate_upload(&file).map_err(|message| self.invalid(message))?;

        let ticket = self.lifecycle.ticket();
        let file_name = file.file_name.clone();
        let uploaded = endpoints::upload_image(self.gateway.as_ref(), file, folder)
            .await
            .and_then(|uploaded| if ticket.is_live() { Ok(uploaded) } else { Err(ApiError::Stale) })
            .map_err(|failure| self.fail(failure, "Upload error", Describe::Detail { fallback: "Upload failed" }))?;

        match folder {
            UploadFolder::Projects => lock(&self.project_form).draft.image = uploaded.url.clone(),
            UploadFolder::Testimonials => lock(&self.testimonial_form).draft.avatar = uploaded.url.clone(),
        }

        info!("Uploaded {} to {}", file_name, uploaded.url);
        self.outbox.notify("Uploaded", Some(&file_name));
        Ok(uploaded.url)
    }
}

/// Description of a failure notification
enum Describe<'a> {
    Fixed(&'a str),
    /// The server's detail, or `fallback` when it has none
    Detail { fallback: &'a str },
}

fn describe(failure: &ApiError, fallback: &str) -> String {
    let detail = failure.detail();
    if detail.trim().is_empty() {
        fallback.to_string()
    } else {
        detail
    }
}

fn form_target(mode: &FormMode) -> Option<&str> {
    match mode {
        FormMode::Create => None,
        FormMode::Edit(id) => Some(id),
    }
}

/// Reset after a successful submit unless the operator switched targets meanwhile
fn reset_if_unchanged<D: Default>(form: &Mutex<Form<D>>, submitted: &FormMode) {
    let mut form = lock(form);
    if form.mode() == submitted {
        form.reset();
    }
}

fn reset_if_editing<D: Default>(form: &Mutex<Form<D>>, id: &str) {
    let mut form = lock(form);
    if form.editing_id() == Some(id) {
        form.reset();
    }
}
