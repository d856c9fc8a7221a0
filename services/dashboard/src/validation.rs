//! Input validation utilities
//!
//! Checks run before a request is dispatched. Each returns the message shown
//! to the operator on failure.

use std::sync::OnceLock;

use api::UploadFile;
use regex::Regex;

/// Image extensions the upload endpoint accepts
pub const ALLOWED_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "webp", "gif"];

/// Largest accepted upload, in bytes
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Fail with the labels of every blank field
pub fn require_fields(fields: &[(&str, &str)]) -> Result<(), String> {
    let missing: Vec<&str> = fields
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(label, _)| *label)
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(format!("Please fill in: {}", missing.join(", ")))
    }
}

/// Validate email
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email is required".to_string());
    }

    if email.len() > 254 {
        return Err("Email must be at most 254 characters long".to_string());
    }

    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .expect("Failed to compile email regex")
    });

    if !regex.is_match(email) {
        return Err("Invalid email format".to_string());
    }

    Ok(())
}

/// Check an image before it is sent to the upload endpoint
pub fn validate_upload(file: &UploadFile) -> Result<(), String> {
    if file.file_name.trim().is_empty() {
        return Err("No filename provided".to_string());
    }

    let allowed = file
        .extension()
        .is_some_and(|extension| ALLOWED_EXTENSIONS.contains(&extension.as_str()));
    if !allowed {
        return Err(format!(
            "File type not allowed. Allowed types: {}",
            ALLOWED_EXTENSIONS.join(", ")
        ));
    }

    if file.bytes.is_empty() {
        return Err("File is empty".to_string());
    }

    if file.bytes.len() > MAX_UPLOAD_BYTES {
        return Err(format!(
            "File too large. Maximum size: {}MB",
            MAX_UPLOAD_BYTES / 1024 / 1024
        ));
    }

    Ok(())
}
