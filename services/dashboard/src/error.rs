//! Custom error types for dashboard actions

use api::ApiError;
use common::error::StorageError;
use thiserror::Error;

/// Why a dashboard action did not complete
///
/// Validation and API failures have already been reported through the
/// outbox by the time the caller sees them.
#[derive(Error, Debug)]
pub enum DashboardError {
    /// Input rejected before any request was made
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The API call failed
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The same action is still running
    #[error("{0} already in progress")]
    InProgress(&'static str),

    /// Durable client storage could not be opened
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// The referenced entity is not in the loaded list
    #[error("No {kind} with id {id}")]
    UnknownEntity { kind: &'static str, id: String },
}

impl DashboardError {
    pub fn is_validation(&self) -> bool {
        matches!(self, DashboardError::Validation(_))
    }
}

/// Type alias for dashboard results
pub type DashboardResult<T> = Result<T, DashboardError>;
