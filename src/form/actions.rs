use serde_json::Value;

use crate::domain::{FieldValue, FormData};

#[derive(Debug, Clone, PartialEq)]
pub enum EditorAction {
    /// Replace every value and take a new reset snapshot.
    Init(FormData),
    Set {
        field: String,
        value: FieldValue,
        clear_error: bool,
    },
    /// Back to the last `Init` snapshot.
    Reset,
    SetError {
        field: String,
        message: String,
    },
    ClearError {
        field: String,
    },
    SetLoading {
        key: String,
        loading: bool,
    },
}

impl EditorAction {
    pub fn set(field: impl Into<String>, value: Value) -> Self {
        EditorAction::Set {
            field: field.into(),
            value: FieldValue::from(value),
            clear_error: false,
        }
    }

    /// `Set` that also drops the field's pending error.
    pub fn set_and_clear(field: impl Into<String>, value: Value) -> Self {
        EditorAction::Set {
            field: field.into(),
            value: FieldValue::from(value),
            clear_error: true,
        }
    }

    /// `Set` of the delete marker.
    pub fn delete(field: impl Into<String>) -> Self {
        EditorAction::Set {
            field: field.into(),
            value: FieldValue::Deleted,
            clear_error: true,
        }
    }

    pub fn field(&self) -> Option<&str> {
        match self {
            EditorAction::Set { field, .. }
            | EditorAction::SetError { field, .. }
            | EditorAction::ClearError { field } => Some(field),
            EditorAction::Init(_) | EditorAction::Reset | EditorAction::SetLoading { .. } => None,
        }
    }
}
