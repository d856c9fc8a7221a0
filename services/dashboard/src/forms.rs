//! Form drafts for the dashboard editors
//!
//! A [`Form`] is either creating a new entity or editing exactly one
//! existing entity. Drafts keep the editable text representation (a
//! comma-separated technology list, a rating typed as text) and are turned
//! into API payloads only at submit time by the pure `normalize` functions.

use api::models::{Project, ProjectPayload, Testimonial, TestimonialPayload};

use crate::validation::require_fields;

pub const DEFAULT_CATEGORY: &str = "Web Development";
pub const DEFAULT_TECHNOLOGIES: &str = "React, FastAPI, MongoDB";
pub const DEFAULT_RATING: u8 = 5;

/// What a submit will do
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FormMode {
    #[default]
    Create,
    /// Bound to the entity with this id
    Edit(String),
}

impl FormMode {
    pub fn is_create(&self) -> bool {
        matches!(self, FormMode::Create)
    }
}

/// One draft per resource type plus the mode it will be submitted in
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Form<D> {
    mode: FormMode,
    pub draft: D,
}

impl<D: Default> Form<D> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> &FormMode {
        &self.mode
    }

    pub fn editing_id(&self) -> Option<&str> {
        match &self.mode {
            FormMode::Edit(id) => Some(id),
            FormMode::Create => None,
        }
    }

    /// Switch to editing `id`; any unsaved draft is replaced
    pub fn begin_edit(&mut self, id: impl Into<String>, draft: D) {
        self.mode = FormMode::Edit(id.into());
        self.draft = draft;
    }

    /// Back to a blank create-mode draft
    pub fn reset(&mut self) {
        self.mode = FormMode::Create;
        self.draft = D::default();
    }
}

/// Editable project fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectDraft {
    pub title: String,
    pub description: String,
    pub category: String,
    /// Comma-separated while editing
    pub technologies_text: String,
    pub image: String,
    pub link: String,
}

impl Default for ProjectDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            category: DEFAULT_CATEGORY.to_string(),
            technologies_text: DEFAULT_TECHNOLOGIES.to_string(),
            image: String::new(),
            link: String::new(),
        }
    }
}

/// Split a comma-separated list, trimming entries and dropping blanks
pub fn split_technologies(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|technology| !technology.is_empty())
        .map(str::to_string)
        .collect()
}

impl ProjectDraft {
    pub fn from_project(project: &Project) -> Self {
        Self {
            title: project.title.clone(),
            description: project.description.clone(),
            category: project.category.clone(),
            technologies_text: project.technologies.join(", "),
            image: project.image.clone(),
            link: project.link.clone(),
        }
    }

    pub fn normalize(&self) -> Result<ProjectPayload, String> {
        require_fields(&[("Title", &self.title), ("Category", &self.category)])?;

        let link = self.link.trim();
        Ok(ProjectPayload {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            category: self.category.trim().to_string(),
            technologies: split_technologies(&self.technologies_text),
            image: self.image.trim().to_string(),
            link: if link.is_empty() { "#".to_string() } else { link.to_string() },
        })
    }
}

/// Editable testimonial fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestimonialDraft {
    pub name: String,
    pub role: String,
    pub content: String,
    /// As typed; parsed and clamped on submit
    pub rating_text: String,
    pub avatar: String,
}

impl Default for TestimonialDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            role: String::new(),
            content: String::new(),
            rating_text: DEFAULT_RATING.to_string(),
            avatar: String::new(),
        }
    }
}

/// Parse a typed rating, rounding fractions and clamping into 1..=5
pub fn parse_rating(text: &str) -> Result<u8, String> {
    let value: f64 = text
        .trim()
        .parse()
        .map_err(|_| format!("Rating must be a number, got {:?}", text))?;

    if !value.is_finite() {
        return Err(format!("Rating must be a number, got {:?}", text));
    }

    Ok(value.round().clamp(1.0, 5.0) as u8)
}

impl TestimonialDraft {
    pub fn from_testimonial(testimonial: &Testimonial) -> Self {
        Self {
            name: testimonial.name.clone(),
            role: testimonial.role.clone(),
            content: testimonial.content.clone(),
            rating_text: testimonial.rating.to_string(),
            avatar: testimonial.avatar.clone(),
        }
    }

    pub fn normalize(&self) -> Result<TestimonialPayload, String> {
        require_fields(&[("Name", &self.name), ("Content", &self.content)])?;

        Ok(TestimonialPayload {
            name: self.name.trim().to_string(),
            role: self.role.trim().to_string(),
            content: self.content.trim().to_string(),
            rating: parse_rating(&self.rating_text)?,
            avatar: self.avatar.trim().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_technologies_become_ordered_list() {
        let draft = ProjectDraft {
            title: "X".into(),
            technologies_text: "React, Go".into(),
            ..ProjectDraft::default()
        };

        let payload = draft.normalize().expect("valid draft");
        assert_eq!(payload.technologies, vec!["React", "Go"]);
        assert_eq!(payload.title, "X");
        assert_eq!(payload.category, DEFAULT_CATEGORY);
        assert_eq!(payload.link, "#");
    }

    #[test]
    fn test_split_technologies_drops_blanks() {
        assert_eq!(split_technologies(" Rust ,, Tokio ,"), vec!["Rust", "Tokio"]);
        assert!(split_technologies("").is_empty());
    }

    #[test]
    fn test_project_draft_requires_title() {
        let draft = ProjectDraft::default();
        assert_eq!(draft.normalize(), Err("Please fill in: Title".to_string()));
    }

    #[test]
    fn test_project_draft_round_trips_entity_fields() {
        let project = Project {
            id: "1".into(),
            title: "Shop".into(),
            description: "Store".into(),
            category: "Design".into(),
            technologies: vec!["React".into(), "Go".into()],
            image: "/uploads/projects/1.png".into(),
            link: "https://shop.example".into(),
            created_at: None,
        };

        let draft = ProjectDraft::from_project(&project);
        assert_eq!(draft.technologies_text, "React, Go");

        let payload = draft.normalize().expect("valid draft");
        assert_eq!(payload.technologies, project.technologies);
        assert_eq!(payload.link, project.link);
    }

    #[test]
    fn test_parse_rating_clamps() {
        assert_eq!(parse_rating("5"), Ok(5));
        assert_eq!(parse_rating(" 3 "), Ok(3));
        assert_eq!(parse_rating("9"), Ok(5));
        assert_eq!(parse_rating("0"), Ok(1));
        assert_eq!(parse_rating("-4"), Ok(1));
        assert_eq!(parse_rating("4.6"), Ok(5));
        assert!(parse_rating("five").is_err());
        assert!(parse_rating("").is_err());
        assert!(parse_rating("NaN").is_err());
    }

    #[test]
    fn test_testimonial_draft_requires_name_and_content() {
        let draft = TestimonialDraft {
            name: "Ada".into(),
            ..TestimonialDraft::default()
        };
        assert_eq!(draft.normalize(), Err("Please fill in: Content".to_string()));
    }

    #[test]
    fn test_switching_edit_target_discards_draft() {
        let mut form: Form<ProjectDraft> = Form::new();
        form.begin_edit("a", ProjectDraft {
            title: "A".into(),
            ..ProjectDraft::default()
        });
        form.draft.title = "A (unsaved)".into();

        form.begin_edit("b", ProjectDraft {
            title: "B".into(),
            ..ProjectDraft::default()
        });

        assert_eq!(form.editing_id(), Some("b"));
        assert_eq!(form.draft.title, "B");

        form.reset();
        assert!(form.mode().is_create());
        assert_eq!(form.draft, ProjectDraft::default());
    }
}
