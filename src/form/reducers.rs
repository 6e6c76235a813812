use crate::domain::FieldSet;

use super::{actions::EditorAction, state::EditorState, validation};

/// The only place editor state changes.
pub fn apply_action(state: &mut EditorState, action: EditorAction) {
    match action {
        EditorAction::Init(values) => {
            tracing::debug!(fields = values.len(), "editor initialized");
            state.init(values);
        }
        EditorAction::Set {
            field,
            value,
            clear_error,
        } => {
            tracing::trace!(field = %field, ?value, "field set");
            if clear_error {
                state.clear_error(&field);
            }
            state.set_value(field, value);
        }
        EditorAction::Reset => {
            tracing::debug!("editor reset to initial snapshot");
            state.reset();
        }
        EditorAction::SetError { field, message } => state.set_error(field, message),
        EditorAction::ClearError { field } => state.clear_error(&field),
        EditorAction::SetLoading { key, loading } => state.set_loading(key, loading),
    }
}

/// Dispatches actions against a state and its field specs, validating
/// edited fields as they change.
pub struct FormEngine<'a> {
    state: &'a mut EditorState,
    fields: &'a FieldSet,
    validate_on_set: bool,
}

impl<'a> FormEngine<'a> {
    pub fn new(state: &'a mut EditorState, fields: &'a FieldSet) -> Self {
        Self {
            state,
            fields,
            validate_on_set: true,
        }
    }

    pub fn with_validate_on_set(mut self, enabled: bool) -> Self {
        self.validate_on_set = enabled;
        self
    }

    pub fn dispatch(&mut self, action: EditorAction) {
        let edited = match &action {
            EditorAction::Set { field, .. } => Some(field.clone()),
            _ => None,
        };
        apply_action(self.state, action);
        if self.validate_on_set
            && let Some(field) = edited
        {
            self.validate_field(&field);
        }
    }

    /// Returns whether the slot is now free of errors.
    pub fn validate_field(&mut self, slot: &str) -> bool {
        let action = validation::validate_slot(self.fields, self.state.values(), slot);
        apply_action(self.state, action);
        self.state.error_for(slot).is_none()
    }

    /// Validate every slot; returns the number of errors left.
    pub fn validate_all(&mut self) -> usize {
        for action in validation::validate_fields(self.fields, self.state) {
            apply_action(self.state, action);
        }
        self.state.error_count()
    }

    /// Like [`Self::validate_all`] but only adds errors for shown fields;
    /// their existing entries stay until the field is edited. Errors on
    /// hidden fields are dropped.
    pub fn flag_errors(&mut self) -> usize {
        for action in validation::validate_fields(self.fields, self.state) {
            let apply = match &action {
                EditorAction::SetError { .. } => true,
                EditorAction::ClearError { field } => {
                    !validation::slot_shown(self.fields, self.state.values(), field)
                }
                _ => false,
            };
            if apply {
                apply_action(self.state, action);
            }
        }
        self.state.error_count()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{
        domain::{FieldSpec, FieldValue, FormData, TypedParam},
        form::EditorPhase,
    };

    fn fields() -> FieldSet {
        FieldSet::new()
            .with(FieldSpec::typed("title", TypedParam::of_type("string")))
            .with(FieldSpec::typed("abstract", TypedParam::of_type("string").optional()))
    }

    #[test]
    fn set_moves_to_editing_and_last_write_wins() {
        let mut state = EditorState::new();
        apply_action(&mut state, EditorAction::Init(FormData::new()));
        assert_eq!(state.phase(), EditorPhase::Initialized);
        apply_action(&mut state, EditorAction::set("title", json!("First")));
        apply_action(&mut state, EditorAction::set("title", json!("Second")));
        assert_eq!(state.phase(), EditorPhase::Editing);
        assert_eq!(state.value("title"), &FieldValue::Set(json!("Second")));
    }

    #[test]
    fn reset_restores_init_snapshot() {
        let mut state = EditorState::new();
        let mut initial = FormData::new();
        initial.insert("title".into(), FieldValue::Set(json!("Original")));
        apply_action(&mut state, EditorAction::Init(initial));
        apply_action(&mut state, EditorAction::set("title", json!("Changed")));
        apply_action(
            &mut state,
            EditorAction::SetError {
                field: "title".into(),
                message: "bad".into(),
            },
        );
        assert!(state.is_dirty());
        apply_action(&mut state, EditorAction::Reset);
        assert_eq!(state.value("title"), &FieldValue::Set(json!("Original")));
        assert!(!state.has_errors());
        assert!(!state.is_dirty());
        assert_eq!(state.phase(), EditorPhase::Initialized);
    }

    #[test]
    fn errors_keep_one_entry_per_field_in_first_seen_order() {
        let mut state = EditorState::new();
        for (field, message) in [("b", "one"), ("a", "two"), ("b", "three")] {
            apply_action(
                &mut state,
                EditorAction::SetError {
                    field: field.into(),
                    message: message.into(),
                },
            );
        }
        let errors: Vec<_> = state
            .errors()
            .iter()
            .map(|error| (error.field_name.as_str(), error.message.as_str()))
            .collect();
        assert_eq!(errors, [("b", "three"), ("a", "two")]);
    }

    #[test]
    fn set_only_clears_error_when_asked() {
        let mut state = EditorState::new();
        let flag = |state: &mut EditorState| {
            apply_action(
                state,
                EditorAction::SetError {
                    field: "title".into(),
                    message: "bad".into(),
                },
            )
        };
        flag(&mut state);
        apply_action(&mut state, EditorAction::set("title", json!("x")));
        assert!(state.error_for("title").is_some());
        apply_action(&mut state, EditorAction::set_and_clear("title", json!("y")));
        assert!(state.error_for("title").is_none());
    }

    #[test]
    fn loading_flags_toggle() {
        let mut state = EditorState::new();
        apply_action(
            &mut state,
            EditorAction::SetLoading {
                key: "signatures".into(),
                loading: true,
            },
        );
        assert!(state.is_loading("signatures"));
        assert!(state.any_loading());
        apply_action(
            &mut state,
            EditorAction::SetLoading {
                key: "signatures".into(),
                loading: false,
            },
        );
        assert!(!state.any_loading());
    }

    #[test]
    fn engine_validates_on_set() {
        let fields = fields();
        let mut state = EditorState::new();
        let mut engine = FormEngine::new(&mut state, &fields);
        engine.dispatch(EditorAction::set("title", json!("")));
        assert!(state.error_for("title").is_some());

        let mut engine = FormEngine::new(&mut state, &fields);
        engine.dispatch(EditorAction::set("title", json!("Paper A")));
        assert!(state.error_for("title").is_none());
    }

    #[test]
    fn engine_validate_all_counts_remaining_errors() {
        let fields = fields();
        let mut state = EditorState::new();
        apply_action(&mut state, EditorAction::Init(fields.initial_values(None)));
        let mut engine = FormEngine::new(&mut state, &fields).with_validate_on_set(false);
        assert_eq!(engine.validate_all(), 1);
        engine.dispatch(EditorAction::set("title", json!("Paper A")));
        assert_eq!(engine.validate_all(), 0);
    }

    #[test]
    fn flag_errors_keeps_external_entries() {
        let fields = fields();
        let mut state = EditorState::new();
        apply_action(&mut state, EditorAction::Init(fields.initial_values(None)));
        apply_action(&mut state, EditorAction::set("title", json!("Paper A")));
        apply_action(
            &mut state,
            EditorAction::SetError {
                field: "title".into(),
                message: "rejected by venue".into(),
            },
        );
        let mut engine = FormEngine::new(&mut state, &fields);
        assert_eq!(engine.flag_errors(), 1);
        assert_eq!(engine.validate_all(), 0);
    }

    #[test]
    fn flag_errors_drops_entries_of_hidden_fields() {
        let fields = FieldSet::new()
            .with(FieldSpec::typed("decision", TypedParam::of_type("string")))
            .with(
                FieldSpec::typed("reason", TypedParam::of_type("string")).with_visibility(
                    |data| data.get("decision").and_then(FieldValue::as_str) == Some("Reject"),
                ),
            );
        let mut state = EditorState::new();
        apply_action(&mut state, EditorAction::Init(fields.initial_values(None)));

        let mut engine = FormEngine::new(&mut state, &fields);
        engine.dispatch(EditorAction::set("decision", json!("Reject")));
        engine.dispatch(EditorAction::set("reason", json!("")));
        engine.dispatch(EditorAction::set("decision", json!("Accept")));
        assert!(engine.state.error_for("reason").is_some());

        assert_eq!(engine.flag_errors(), 0);
        assert!(state.error_for("reason").is_none());
    }
}
