//! Site content models: projects, testimonials and inbound contacts

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::repositories::{Creatable, Resource, ResourceKind};

/// Showcased project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub technologies: Vec<String>,
    pub image: String,
    #[serde(default = "default_link")]
    pub link: String,
    #[serde(default, with = "timestamp", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

fn default_link() -> String {
    "#".to_string()
}

/// Project fields sent on create and update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectPayload {
    pub title: String,
    pub description: String,
    pub category: String,
    pub technologies: Vec<String>,
    pub image: String,
    pub link: String,
}

impl Resource for Project {
    type Update = ProjectPayload;

    const KIND: ResourceKind = ResourceKind {
        name: "project",
        list_path: "/projects",
        admin_path: "/admin/projects",
    };

    fn id(&self) -> &str {
        &self.id
    }
}

impl Creatable for Project {
    type Create = ProjectPayload;
}

/// Client testimonial
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Testimonial {
    pub id: String,
    pub name: String,
    pub role: String,
    pub content: String,
    pub rating: u8,
    pub avatar: String,
    #[serde(default, with = "timestamp", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Testimonial fields sent on create and update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestimonialPayload {
    pub name: String,
    pub role: String,
    pub content: String,
    pub rating: u8,
    pub avatar: String,
}

impl Resource for Testimonial {
    type Update = TestimonialPayload;

    const KIND: ResourceKind = ResourceKind {
        name: "testimonial",
        list_path: "/testimonials",
        admin_path: "/admin/testimonials",
    };

    fn id(&self) -> &str {
        &self.id
    }
}

impl Creatable for Testimonial {
    type Create = TestimonialPayload;
}

/// Handling state of an inbound message
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactStatus {
    #[default]
    New,
    Read,
    Replied,
}

impl ContactStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContactStatus::New => "new",
            ContactStatus::Read => "read",
            ContactStatus::Replied => "replied",
        }
    }
}

impl std::fmt::Display for ContactStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inbound contact message. Never created by the admin client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub id: String,
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    #[serde(default)]
    pub status: ContactStatus,
    #[serde(default, with = "timestamp", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// The only contact field the operator may change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactStatusUpdate {
    pub status: ContactStatus,
}

impl Resource for Contact {
    type Update = ContactStatusUpdate;

    const KIND: ResourceKind = ResourceKind {
        name: "contact",
        list_path: "/admin/contacts",
        admin_path: "/admin/contacts",
    };

    fn id(&self) -> &str {
        &self.id
    }
}

/// Message submitted through the public contact form
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactSubmission {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

/// Timestamps arrive either as RFC 3339 or as naive UTC datetimes.
mod timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(value) => serializer.serialize_str(&value.to_rfc3339()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let Some(raw) = Option::<String>::deserialize(deserializer)? else {
            return Ok(None);
        };

        if let Ok(parsed) = DateTime::parse_from_rfc3339(&raw) {
            return Ok(Some(parsed.with_timezone(&Utc)));
        }

        NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
            .map(|naive| Some(naive.and_utc()))
            .map_err(serde::de::Error::custom)
    }
}
