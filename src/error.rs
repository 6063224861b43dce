use thiserror::Error;

use crate::models::RecordId;

/// Every failure the roster can report. Nothing here is fatal: validation errors are
/// shown inline, missing records are no-ops, and storage errors degrade to an empty
/// roster on load or a warning on write.
#[derive(Debug, Error)]
pub enum RosterError {
    #[error("Please enter a student name.")]
    InvalidName,

    #[error("Grades must be numbers between 0 and 100.")]
    InvalidScore,

    #[error("no student with id {0}")]
    RecordNotFound(RecordId),

    #[error("roster storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("stored roster is corrupt: {0}")]
    StorageCorrupt(String),

    #[error("failed to write roster: {0}")]
    StorageWrite(String),
}

impl RosterError {
    pub fn is_validation(&self) -> bool {
        matches!(self, RosterError::InvalidName | RosterError::InvalidScore)
    }
}
