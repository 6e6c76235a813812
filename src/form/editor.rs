use serde_json::Value;

use crate::{
    domain::{DEFAULT_ORDER, FieldSet, FieldSpec, FieldValue},
    error::EditorError,
};

use super::{
    actions::EditorAction,
    error::FieldError,
    overlay::ReadersOverlay,
    reducers::{FormEngine, apply_action},
    state::EditorState,
    visibility::visible_fields,
    widget::{WidgetKind, resolve_widget},
};

/// One editable slot, parameterized by its spec. The same type edits a
/// field's value and, through [`ReadersOverlay`], its readers.
#[derive(Debug, Clone, Copy)]
pub struct FieldEditor<'a> {
    spec: &'a FieldSpec,
}

impl<'a> FieldEditor<'a> {
    pub fn new(spec: &'a FieldSpec) -> Self {
        Self { spec }
    }

    pub fn spec(&self) -> &'a FieldSpec {
        self.spec
    }

    pub fn slot(&self) -> &'a str {
        &self.spec.name
    }

    pub fn widget(&self) -> Option<WidgetKind> {
        resolve_widget(self.spec)
    }

    pub fn is_editable(&self) -> bool {
        self.widget().is_some_and(WidgetKind::is_interactive)
    }

    pub fn value<'s>(&self, state: &'s EditorState) -> &'s FieldValue {
        state.value(self.slot())
    }

    pub fn error<'s>(&self, state: &'s EditorState) -> Option<&'s FieldError> {
        state.error_for(self.slot())
    }

    pub fn set(&self, value: Value) -> EditorAction {
        EditorAction::set(self.slot(), value)
    }

    pub fn delete(&self) -> EditorAction {
        EditorAction::delete(self.slot())
    }

    pub fn readers(&self) -> ReadersOverlay<'a> {
        ReadersOverlay::new(self.spec)
    }
}

/// A field set together with the state it edits.
///
/// Used for the content form and, separately, for the signatures form.
#[derive(Debug, Clone)]
pub struct EditorForm {
    fields: FieldSet,
    state: EditorState,
    default_order: f64,
    validate_on_set: bool,
}

impl EditorForm {
    pub fn new(fields: FieldSet) -> Self {
        Self {
            fields,
            state: EditorState::new(),
            default_order: DEFAULT_ORDER,
            validate_on_set: true,
        }
    }

    pub fn with_default_order(mut self, order: f64) -> Self {
        self.default_order = order;
        self
    }

    pub fn with_validate_on_set(mut self, enabled: bool) -> Self {
        self.validate_on_set = enabled;
        self
    }

    pub fn fields(&self) -> &FieldSet {
        &self.fields
    }

    pub(crate) fn fields_mut(&mut self) -> &mut FieldSet {
        &mut self.fields
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    /// Seed every slot from `record` (or defaults) and take the reset snapshot.
    pub fn init(&mut self, record: Option<&Value>) {
        let values = self.fields.initial_values(record);
        apply_action(&mut self.state, EditorAction::Init(values));
    }

    pub fn dispatch(&mut self, action: EditorAction) {
        FormEngine::new(&mut self.state, &self.fields)
            .with_validate_on_set(self.validate_on_set)
            .dispatch(action);
    }

    pub fn set(&mut self, slot: &str, value: Value) -> Result<(), EditorError> {
        let editor = self.editable(slot)?;
        let action = editor.set(value);
        self.dispatch(action);
        Ok(())
    }

    pub fn delete(&mut self, slot: &str) -> Result<(), EditorError> {
        let editor = self.editable(slot)?;
        let action = editor.delete();
        self.dispatch(action);
        Ok(())
    }

    pub fn reset(&mut self) {
        apply_action(&mut self.state, EditorAction::Reset);
    }

    pub fn editor(&self, slot: &str) -> Option<FieldEditor<'_>> {
        self.fields.spec_for_slot(slot).map(FieldEditor::new)
    }

    /// Editors for the fields that currently render, in display order.
    pub fn visible(&self) -> Vec<FieldEditor<'_>> {
        visible_fields(&self.fields, self.state.values(), self.default_order)
            .into_iter()
            .map(FieldEditor::new)
            .collect()
    }

    /// Validate every slot; returns the number of errors left.
    pub fn validate(&mut self) -> usize {
        FormEngine::new(&mut self.state, &self.fields).validate_all()
    }

    /// Flag failing slots without clearing existing errors; returns the
    /// number of errors in the sequence.
    pub fn flag_errors(&mut self) -> usize {
        FormEngine::new(&mut self.state, &self.fields).flag_errors()
    }

    fn editable(&self, slot: &str) -> Result<FieldEditor<'_>, EditorError> {
        let editor = self
            .editor(slot)
            .ok_or_else(|| EditorError::UnknownField(slot.to_string()))?;
        if editor.spec().typed_param().is_none() {
            return Err(EditorError::NotEditable(slot.to_string()));
        }
        Ok(editor)
    }
}
