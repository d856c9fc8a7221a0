//! In-memory API backend for tests
//!
//! `InMemoryBackend` implements [`ApiGateway`] with the same routes, status
//! semantics and auth rules as the real API. Tests can make the next call on
//! a route fail, hold a route's response until released, and inspect which
//! requests were issued.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use auth::AuthSession;
use chrono::Utc;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tokio::sync::Notify;

use crate::{
    error::{ApiError, ApiResult},
    gateway::{ApiGateway, ApiRequest, RequestBody},
    models::{
        Contact, ContactStatus, ContactStatusUpdate, ContactSubmission, DashboardStats,
        LoginRequest, Project, ProjectPayload, Testimonial, TestimonialPayload, UploadFolder,
    },
};

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "Admin@123";
pub const ADMIN_TOKEN: &str = "test-admin-token";

#[derive(Default)]
struct BackendState {
    projects: Vec<Project>,
    testimonials: Vec<Testimonial>,
    contacts: Vec<Contact>,
    next_id: u64,
    uploads: u64,
}

impl BackendState {
    fn next_id(&mut self) -> String {
        self.next_id += 1;
        self.next_id.to_string()
    }
}

struct Fault {
    method: Method,
    path: String,
    error: ApiError,
}

struct Hold {
    method: Method,
    path: String,
    release: Arc<Notify>,
}

/// Stand-in for the site API
pub struct InMemoryBackend {
    session: AuthSession,
    state: Mutex<BackendState>,
    faults: Mutex<Vec<Fault>>,
    holds: Mutex<Vec<Hold>>,
    requests: Mutex<Vec<(Method, String)>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn json_body<T: DeserializeOwned>(body: RequestBody) -> ApiResult<T> {
    match body {
        RequestBody::Json(value) => serde_json::from_value(value)
            .map_err(|e| ApiError::BadRequest(format!("Invalid body: {}", e))),
        _ => Err(ApiError::BadRequest("Expected a JSON body".to_string())),
    }
}

impl InMemoryBackend {
    /// Protected routes accept `ADMIN_TOKEN` as read from `session`
    pub fn new(session: AuthSession) -> Self {
        Self {
            session,
            state: Mutex::new(BackendState::default()),
            faults: Mutex::new(Vec::new()),
            holds: Mutex::new(Vec::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Fail the next call to `method path` with `error`
    pub fn fail_next(&self, method: Method, path: &str, error: ApiError) {
        lock(&self.faults).push(Fault {
            method,
            path: path.to_string(),
            error,
        });
    }

    /// Process the next call to `method path` but withhold its response
    /// until the returned handle is notified
    pub fn hold_next(&self, method: Method, path: &str) -> Arc<Notify> {
        let release = Arc::new(Notify::new());
        lock(&self.holds).push(Hold {
            method,
            path: path.to_string(),
            release: Arc::clone(&release),
        });
        release
    }

    /// Every request received so far, in order
    pub fn requests(&self) -> Vec<(Method, String)> {
        lock(&self.requests).clone()
    }

    pub fn seed_project(&self, payload: ProjectPayload) -> Project {
        let mut state = lock(&self.state);
        let project = new_project(state.next_id(), payload);
        state.projects.insert(0, project.clone());
        project
    }

    pub fn seed_testimonial(&self, payload: TestimonialPayload) -> Testimonial {
        let mut state = lock(&self.state);
        let testimonial = new_testimonial(state.next_id(), payload);
        state.testimonials.insert(0, testimonial.clone());
        testimonial
    }

    pub fn seed_contact(&self, submission: ContactSubmission) -> Contact {
        let mut state = lock(&self.state);
        let contact = new_contact(state.next_id(), submission);
        state.contacts.insert(0, contact.clone());
        contact
    }

    pub fn projects(&self) -> Vec<Project> {
        lock(&self.state).projects.clone()
    }

    pub fn testimonials(&self) -> Vec<Testimonial> {
        lock(&self.state).testimonials.clone()
    }

    pub fn contacts(&self) -> Vec<Contact> {
        lock(&self.state).contacts.clone()
    }

    fn take_fault(&self, method: &Method, path: &str) -> Option<ApiError> {
        let mut faults = lock(&self.faults);
        let index = faults
            .iter()
            .position(|fault| &fault.method == method && fault.path == path)?;
        Some(faults.remove(index).error)
    }

    fn take_hold(&self, method: &Method, path: &str) -> Option<Arc<Notify>> {
        let mut holds = lock(&self.holds);
        let index = holds
            .iter()
            .position(|hold| &hold.method == method && hold.path == path)?;
        Some(holds.remove(index).release)
    }

    fn authorize(&self, path: &str) -> ApiResult<()> {
        let protected = path.starts_with("/admin/") && path != "/admin/login";
        if protected && self.session.current_token().as_deref() != Some(ADMIN_TOKEN) {
            return Err(ApiError::Unauthorized(
                "Could not validate credentials".to_string(),
            ));
        }
        Ok(())
    }

    fn route(&self, method: &Method, path: &str, body: RequestBody) -> ApiResult<Value> {
        self.authorize(path)?;

        let segments: Vec<&str> = path.trim_matches('/').split('/').collect();
        let mut state = lock(&self.state);

        match (method.as_str(), segments.as_slice()) {
            ("POST", ["admin", "login"]) => {
                let credentials: LoginRequest = json_body(body)?;
                if credentials.username == ADMIN_USERNAME && credentials.password == ADMIN_PASSWORD {
                    Ok(json!({"access_token": ADMIN_TOKEN, "token_type": "bearer"}))
                } else {
                    Err(ApiError::Unauthorized(
                        "Incorrect username or password".to_string(),
                    ))
                }
            }
            ("GET", ["admin", "stats"]) => {
                let stats = DashboardStats {
                    total_projects: state.projects.len() as u64,
                    total_testimonials: state.testimonials.len() as u64,
                    total_contacts: state.contacts.len() as u64,
                    new_contacts: state
                        .contacts
                        .iter()
                        .filter(|c| c.status == ContactStatus::New)
                        .count() as u64,
                };
                Ok(serde_json::to_value(stats)?)
            }
            ("GET", ["projects"]) => Ok(serde_json::to_value(&state.projects)?),
            ("POST", ["admin", "projects"]) => {
                let payload: ProjectPayload = json_body(body)?;
                let project = new_project(state.next_id(), payload);
                state.projects.insert(0, project.clone());
                Ok(serde_json::to_value(project)?)
            }
            ("PUT", ["admin", "projects", id]) => {
                let payload: ProjectPayload = json_body(body)?;
                let slot = state
                    .projects
                    .iter_mut()
                    .find(|p| p.id == *id)
                    .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;
                let created_at = slot.created_at;
                *slot = new_project(id.to_string(), payload);
                slot.created_at = created_at;
                Ok(serde_json::to_value(slot.clone())?)
            }
            ("DELETE", ["admin", "projects", id]) => {
                let before = state.projects.len();
                state.projects.retain(|p| p.id != *id);
                if state.projects.len() == before {
                    return Err(ApiError::NotFound("Project not found".to_string()));
                }
                Ok(json!({"message": "Project deleted successfully"}))
            }
            ("GET", ["testimonials"]) => Ok(serde_json::to_value(&state.testimonials)?),
            ("POST", ["admin", "testimonials"]) => {
                let payload: TestimonialPayload = json_body(body)?;
                if !(1..=5).contains(&payload.rating) {
                    return Err(ApiError::BadRequest("rating must be between 1 and 5".to_string()));
                }
                let testimonial = new_testimonial(state.next_id(), payload);
                state.testimonials.insert(0, testimonial.clone());
                Ok(serde_json::to_value(testimonial)?)
            }
            ("PUT", ["admin", "testimonials", id]) => {
                let payload: TestimonialPayload = json_body(body)?;
                let slot = state
                    .testimonials
                    .iter_mut()
                    .find(|t| t.id == *id)
                    .ok_or_else(|| ApiError::NotFound("Testimonial not found".to_string()))?;
                let created_at = slot.created_at;
                *slot = new_testimonial(id.to_string(), payload);
                slot.created_at = created_at;
                Ok(serde_json::to_value(slot.clone())?)
            }
            ("DELETE", ["admin", "testimonials", id]) => {
                let before = state.testimonials.len();
                state.testimonials.retain(|t| t.id != *id);
                if state.testimonials.len() == before {
                    return Err(ApiError::NotFound("Testimonial not found".to_string()));
                }
                Ok(json!({"message": "Testimonial deleted successfully"}))
            }
            ("GET", ["admin", "contacts"]) => Ok(serde_json::to_value(&state.contacts)?),
            ("PUT", ["admin", "contacts", id]) => {
                let update: ContactStatusUpdate = json_body(body)?;
                let slot = state
                    .contacts
                    .iter_mut()
                    .find(|c| c.id == *id)
                    .ok_or_else(|| ApiError::NotFound("Contact not found".to_string()))?;
                slot.status = update.status;
                Ok(serde_json::to_value(slot.clone())?)
            }
            ("DELETE", ["admin", "contacts", id]) => {
                let before = state.contacts.len();
                state.contacts.retain(|c| c.id != *id);
                if state.contacts.len() == before {
                    return Err(ApiError::NotFound("Contact not found".to_string()));
                }
                Ok(json!({"message": "Contact deleted successfully"}))
            }
            ("POST", ["contact"]) => {
                let submission: ContactSubmission = json_body(body)?;
                let contact = new_contact(state.next_id(), submission);
                let id = contact.id.clone();
                state.contacts.insert(0, contact);
                Ok(json!({"message": "Contact form submitted successfully", "id": id}))
            }
            ("POST", ["admin", "upload"]) => {
                let RequestBody::Upload { file, subfolder } = body else {
                    return Err(ApiError::BadRequest("Expected a multipart body".to_string()));
                };
                let folder = UploadFolder::parse(&subfolder)
                    .ok_or_else(|| ApiError::BadRequest("Invalid subfolder".to_string()))?;
                let extension = file
                    .extension()
                    .ok_or_else(|| ApiError::BadRequest("No filename provided".to_string()))?;
                state.uploads += 1;
                Ok(json!({
                    "filename": file.file_name,
                    "url": format!("/uploads/{}/{}.{}", folder.as_str(), state.uploads, extension),
                }))
            }
            _ => Err(ApiError::NotFound("Not Found".to_string())),
        }
    }
}

fn new_project(id: String, payload: ProjectPayload) -> Project {
    Project {
        id,
        title: payload.title,
        description: payload.description,
        category: payload.category,
        technologies: payload.technologies,
        image: payload.image,
        link: payload.link,
        created_at: Some(Utc::now()),
    }
}

fn new_testimonial(id: String, payload: TestimonialPayload) -> Testimonial {
    Testimonial {
        id,
        name: payload.name,
        role: payload.role,
        content: payload.content,
        rating: payload.rating,
        avatar: payload.avatar,
        created_at: Some(Utc::now()),
    }
}

fn new_contact(id: String, submission: ContactSubmission) -> Contact {
    Contact {
        id,
        name: submission.name,
        email: submission.email,
        subject: submission.subject,
        message: submission.message,
        status: ContactStatus::New,
        created_at: Some(Utc::now()),
    }
}

#[async_trait]
impl ApiGateway for InMemoryBackend {
    async fn send(&self, request: ApiRequest) -> ApiResult<Value> {
        let ApiRequest { method, path, body } = request;
        lock(&self.requests).push((method.clone(), path.clone()));

        let result = match self.take_fault(&method, &path) {
            Some(error) => Err(error),
            None => self.route(&method, &path, body),
        };

        if let Some(release) = self.take_hold(&method, &path) {
            release.notified().await;
        }
        result
    }
}
