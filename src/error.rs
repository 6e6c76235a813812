use thiserror::Error;

use crate::form::FieldError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditorError {
    #[error("unknown field '{0}'")]
    UnknownField(String),
    #[error("field '{0}' is not editable")]
    NotEditable(String),
    #[error("a submission is already in flight")]
    SubmissionPending,
    #[error("no submission is in flight")]
    NoSubmissionPending,
    #[error("{} field(s) failed validation", .0.len())]
    Invalid(Vec<FieldError>),
}

/// Rejection reported by the backend (or transport) for a submitted edit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct SubmitError {
    pub status: Option<u16>,
    pub message: String,
}

impl SubmitError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }
}
