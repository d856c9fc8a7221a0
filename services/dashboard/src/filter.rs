//! Category filtering of the project list

use api::models::Project;

/// Label of the "no filter" option
pub const ALL: &str = "All";

/// Suggested categories for the project editor
pub const CATEGORY_OPTIONS: [&str; 6] = [
    "Web Development",
    "Mobile Apps",
    "AI/ML",
    "Automation",
    "Design",
    ALL,
];

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ProjectFilter {
    #[default]
    All,
    Category(String),
}

impl ProjectFilter {
    pub fn from_label(label: &str) -> Self {
        if label == ALL {
            ProjectFilter::All
        } else {
            ProjectFilter::Category(label.to_string())
        }
    }

    pub fn matches(&self, project: &Project) -> bool {
        match self {
            ProjectFilter::All => true,
            ProjectFilter::Category(category) => &project.category == category,
        }
    }
}

/// Filter labels for `projects`: "All" then each category in list order
pub fn categories(projects: &[Project]) -> Vec<String> {
    let mut labels = vec![ALL.to_string()];
    for project in projects {
        if !labels.contains(&project.category) {
            labels.push(project.category.clone());
        }
    }
    labels
}
