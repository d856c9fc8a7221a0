//! Custom error types for the API gateway

use serde_json::Value;
use thiserror::Error;

/// Custom error type for API calls
#[derive(Error, Debug)]
pub enum ApiError {
    /// Token missing or rejected
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The server refused the payload
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Target entity does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Target entity changed or already exists
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Any other non-success status
    #[error("Server error ({status}): {detail}")]
    Server { status: u16, detail: String },

    /// The request never produced a response
    #[error("Network error: {0}")]
    Network(String),

    /// The response body did not have the expected shape
    #[error("Invalid response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The response arrived after the view that issued it went away
    #[error("Response discarded: view no longer mounted")]
    Stale,
}

/// How a failure is handled by callers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Force logout and redirect to login
    Authorization,
    /// Rejected input; nothing changed
    Validation,
    /// Network or server trouble; state stays at its last good value
    Transient,
    NotFound,
    Conflict,
    /// Result dropped silently
    Stale,
}

impl ApiError {
    /// Build an error from a non-success HTTP status and the server detail
    pub fn from_status(status: u16, detail: Option<String>) -> Self {
        let detail = detail.unwrap_or_else(|| default_detail(status).to_string());
        match status {
            401 | 403 => ApiError::Unauthorized(detail),
            400 | 422 => ApiError::BadRequest(detail),
            404 => ApiError::NotFound(detail),
            409 | 412 => ApiError::Conflict(detail),
            _ => ApiError::Server { status, detail },
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Unauthorized(_) => ErrorKind::Authorization,
            ApiError::BadRequest(_) => ErrorKind::Validation,
            ApiError::NotFound(_) => ErrorKind::NotFound,
            ApiError::Conflict(_) => ErrorKind::Conflict,
            ApiError::Server { .. } | ApiError::Network(_) | ApiError::Decode(_) => {
                ErrorKind::Transient
            }
            ApiError::Stale => ErrorKind::Stale,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.kind() == ErrorKind::Authorization
    }

    /// Message suitable for showing to the operator
    pub fn detail(&self) -> String {
        match self {
            ApiError::Unauthorized(detail)
            | ApiError::BadRequest(detail)
            | ApiError::NotFound(detail)
            | ApiError::Conflict(detail)
            | ApiError::Server { detail, .. } => detail.clone(),
            other => other.to_string(),
        }
    }
}

fn default_detail(status: u16) -> &'static str {
    match status {
        401 | 403 => "Not authenticated",
        404 => "Not found",
        409 => "Conflict",
        400 | 422 => "Invalid request",
        _ => "Unexpected server error",
    }
}

/// Pull the `detail` message out of an error body
///
/// Accepts `{"detail": "..."}` as well as validation bodies of the form
/// `{"detail": [{"msg": "..."}, ...]}`.
pub fn extract_detail(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        Value::String(message) => Some(message.clone()),
        Value::Array(items) => {
            let messages: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(Value::as_str))
                .collect();
            (!messages.is_empty()).then(|| messages.join("; "))
        }
        _ => None,
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert!(matches!(
            ApiError::from_status(401, None),
            ApiError::Unauthorized(_)
        ));
        assert!(matches!(
            ApiError::from_status(403, None),
            ApiError::Unauthorized(_)
        ));
        assert!(matches!(
            ApiError::from_status(422, None),
            ApiError::BadRequest(_)
        ));
        assert!(matches!(ApiError::from_status(404, None), ApiError::NotFound(_)));
        assert!(matches!(ApiError::from_status(409, None), ApiError::Conflict(_)));
        assert!(matches!(
            ApiError::from_status(502, None),
            ApiError::Server { status: 502, .. }
        ));
    }

    #[test]
    fn test_kinds() {
        assert_eq!(
            ApiError::Unauthorized("x".into()).kind(),
            ErrorKind::Authorization
        );
        assert_eq!(ApiError::Network("down".into()).kind(), ErrorKind::Transient);
        assert_eq!(ApiError::NotFound("x".into()).kind(), ErrorKind::NotFound);
        assert_eq!(ApiError::Stale.kind(), ErrorKind::Stale);
    }

    #[test]
    fn test_extract_detail() {
        assert_eq!(
            extract_detail(r#"{"detail":"Incorrect username or password"}"#),
            Some("Incorrect username or password".to_string())
        );
        assert_eq!(
            extract_detail(r#"{"detail":[{"msg":"field required"},{"msg":"bad email"}]}"#),
            Some("field required; bad email".to_string())
        );
        assert_eq!(extract_detail("<html>"), None);
        assert_eq!(extract_detail(r#"{"error":"x"}"#), None);
    }

    #[test]
    fn test_detail_prefers_server_message() {
        let error = ApiError::from_status(404, Some("Project not found".into()));
        assert_eq!(error.detail(), "Project not found");

        let error = ApiError::from_status(500, None);
        assert_eq!(error.detail(), "Unexpected server error");
    }
}
