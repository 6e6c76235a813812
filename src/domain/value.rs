use indexmap::IndexMap;
use serde_json::Value;

/// Current values of an editor session keyed by field (or slot) name.
pub type FormData = IndexMap<String, FieldValue>;

pub(crate) static EMPTY_VALUE: FieldValue = FieldValue::Empty;

/// Edited value of one field.
///
/// `Empty` and `Deleted` are kept apart so a payload can tell "never set"
/// from "explicitly removed".
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FieldValue {
    #[default]
    Empty,
    Set(Value),
    Deleted,
}

impl FieldValue {
    pub fn from_option(value: Option<Value>) -> Self {
        match value {
            Some(Value::Null) | None => FieldValue::Empty,
            Some(value) => FieldValue::Set(value),
        }
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            FieldValue::Set(value) => Some(value),
            FieldValue::Empty | FieldValue::Deleted => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        self.as_value().and_then(Value::as_str)
    }

    pub fn is_deleted(&self) -> bool {
        matches!(self, FieldValue::Deleted)
    }

    /// True for `Empty` and for values carrying no content (`null`, `""`, `[]`).
    pub fn is_blank(&self) -> bool {
        match self {
            FieldValue::Empty => true,
            FieldValue::Deleted => false,
            FieldValue::Set(Value::Null) => true,
            FieldValue::Set(Value::String(text)) => text.trim().is_empty(),
            FieldValue::Set(Value::Array(items)) => items.is_empty(),
            FieldValue::Set(_) => false,
        }
    }
}

impl From<Value> for FieldValue {
    fn from(value: Value) -> Self {
        FieldValue::from_option(Some(value))
    }
}
