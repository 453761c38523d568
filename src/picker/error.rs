use std::collections::BTreeMap;
use thiserror::Error;

use crate::domain::RecordError;

/// Failures local to an open picker drawer
///
/// None of these touch the value of the enclosing field.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PickerError {
    #[error(transparent)]
    Record(#[from] RecordError),

    /// Required create-form fields are blank; keys are field bindings
    #[error("Validation failed: {0:?}")]
    Validation(BTreeMap<String, String>),

    #[error("A create request is already in flight")]
    SubmitPending,

    #[error("Picker session is closed")]
    SessionClosed,

    #[error("Cannot add to '{0}': it already holds a record")]
    AddDisabled(String),

    #[error("Relationship picker '{0}' has no resource")]
    MissingResource(String),
}

pub type PickerResult<T> = Result<T, PickerError>;
