use indexmap::IndexMap;

use crate::domain::{EMPTY_VALUE, FieldValue, FormData};

use super::error::FieldError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EditorPhase {
    #[default]
    Initialized,
    Editing,
}

/// In-memory state of one editor session.
///
/// Only the reducer in [`super::reducers`] mutates it; everything else
/// reads.
#[derive(Debug, Clone, Default)]
pub struct EditorState {
    values: FormData,
    snapshot: FormData,
    errors: Vec<FieldError>,
    loading: IndexMap<String, bool>,
    phase: EditorPhase,
}

impl EditorState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> EditorPhase {
        self.phase
    }

    pub fn values(&self) -> &FormData {
        &self.values
    }

    /// Current value of a field; unknown names read as `Empty`.
    pub fn value(&self, field: &str) -> &FieldValue {
        self.values.get(field).unwrap_or(&EMPTY_VALUE)
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    pub fn error_for(&self, field: &str) -> Option<&FieldError> {
        self.errors.iter().find(|error| error.field_name == field)
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    pub fn is_loading(&self, key: &str) -> bool {
        self.loading.get(key).copied().unwrap_or(false)
    }

    pub fn any_loading(&self) -> bool {
        self.loading.values().any(|loading| *loading)
    }

    pub fn is_dirty(&self) -> bool {
        self.values != self.snapshot
    }

    pub(super) fn init(&mut self, values: FormData) {
        self.snapshot = values.clone();
        self.values = values;
        self.errors.clear();
        self.loading.clear();
        self.phase = EditorPhase::Initialized;
    }

    pub(super) fn reset(&mut self) {
        self.values = self.snapshot.clone();
        self.errors.clear();
        self.loading.clear();
        self.phase = EditorPhase::Initialized;
    }

    pub(super) fn set_value(&mut self, field: String, value: FieldValue) {
        self.values.insert(field, value);
        self.phase = EditorPhase::Editing;
    }

    pub(super) fn set_error(&mut self, field: String, message: String) {
        match self.errors.iter_mut().find(|error| error.field_name == field) {
            Some(existing) => existing.message = message,
            None => self.errors.push(FieldError::new(field, message)),
        }
    }

    pub(super) fn clear_error(&mut self, field: &str) {
        self.errors.retain(|error| error.field_name != field);
    }

    pub(super) fn set_loading(&mut self, key: String, loading: bool) {
        if loading {
            self.loading.insert(key, true);
        } else {
            self.loading.shift_remove(&key);
        }
    }
}
