use crate::cloudtrail::model::{EventSelector, UpdateTrailRequest};
use thiserror::Error;

/// Failure reported by a trail control call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TrailApiError {
    /// The provider rejected or failed the call.
    #[error("{operation} failed: {message}")]
    Provider { operation: String, message: String },
    /// The client could not run the call at all.
    #[error("trail client runtime error: {0}")]
    Runtime(String),
}

impl TrailApiError {
    pub fn provider(operation: &str, message: impl Into<String>) -> Self {
        TrailApiError::Provider {
            operation: operation.to_string(),
            message: message.into(),
        }
    }
}

/// Control operations on a single trail. Every call is idempotent and blocks
/// until the provider answers.
pub trait TrailControl: Send + Sync {
    /// Resumes logging on the trail.
    fn start_logging(&self, trail_name: &str) -> Result<(), TrailApiError>;
    /// Reapplies trail-level flags, destination bucket, and KMS key.
    fn update_trail(&self, request: &UpdateTrailRequest) -> Result<(), TrailApiError>;
    /// Replaces the full event selector set.
    fn put_event_selectors(
        &self,
        trail_name: &str,
        selectors: &[EventSelector],
    ) -> Result<(), TrailApiError>;
}
