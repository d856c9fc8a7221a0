//! API models for request and response payloads

use serde::{Deserialize, Serialize};

pub mod content;

pub use content::{
    Contact, ContactStatus, ContactStatusUpdate, ContactSubmission, Project, ProjectPayload,
    Testimonial, TestimonialPayload,
};

/// Request for operator login
#[derive(Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl LoginRequest {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Response for a successful login
#[derive(Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

/// Aggregate counts shown on the dashboard
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_projects: u64,
    pub total_testimonials: u64,
    pub total_contacts: u64,
    pub new_contacts: u64,
}

/// Server-side folder an uploaded image is filed under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadFolder {
    Projects,
    Testimonials,
}

impl UploadFolder {
    pub fn as_str(&self) -> &'static str {
        match self {
            UploadFolder::Projects => "projects",
            UploadFolder::Testimonials => "testimonials",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "projects" => Some(UploadFolder::Projects),
            "testimonials" => Some(UploadFolder::Testimonials),
            _ => None,
        }
    }
}

/// Response for a file upload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadResponse {
    #[serde(default)]
    pub filename: String,
    pub url: String,
}
