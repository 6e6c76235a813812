use anyhow::Result;
use serde_json::{Value, json};

use crate::{
    domain::{
        FieldKind, FieldSet, FieldSpec, Identity, InvitationSchema, ValueSource, edit_slot,
        readers_slot,
    },
    error::{EditorError, SubmitError},
    form::{EditorAction, EditorForm, EditorState, FieldEditor, FieldError},
    payload::{EditPayload, EditPayloadBuilder},
    schema::{Path, PathResolver},
};

use super::{
    options::EditorOptions,
    signatures::signature_options,
    validation::{ValidationOutcome, flag_forms, validate_forms},
};

const SIGNATURES: &str = "signatures";
const RECORD_LOADING: &str = "record";

/// User-facing message for a rejected submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// The edit was accepted; local state went back to its initial snapshot.
    Submitted(Value),
    /// The edit was rejected; local state is kept for another attempt.
    Failed(Notification),
}

/// One open editor: the invitation being edited, its content form, the
/// signatures form, the cached source record and the in-flight flag.
#[derive(Debug, Clone)]
pub struct EditorSession {
    schema: InvitationSchema,
    options: EditorOptions,
    content: EditorForm,
    signatures: Option<EditorForm>,
    record: Option<Value>,
    submitting: bool,
}

impl EditorSession {
    pub fn new(schema: InvitationSchema) -> Self {
        Self::with_options(schema, EditorOptions::default())
    }

    pub fn with_options(schema: InvitationSchema, options: EditorOptions) -> Self {
        let mut fields = schema.content.clone();
        for (key, kind) in schema.edit_keys() {
            if matches!(kind, FieldKind::Typed(_)) {
                let source = ValueSource::Path(Path::root().key(key));
                fields.push(FieldSpec::new(edit_slot(key), kind).with_source(source));
            }
        }

        let content = EditorForm::new(fields)
            .with_default_order(options.default_order)
            .with_validate_on_set(options.validate_on_set);
        let signatures = schema.signatures.clone().map(|spec| {
            EditorForm::new(FieldSet::new().with(spec))
                .with_validate_on_set(options.validate_on_set)
        });

        let mut session = Self {
            schema,
            options,
            content,
            signatures,
            record: None,
            submitting: false,
        };
        session.init();
        session
    }

    pub fn from_invitation(raw: &Value) -> Result<Self> {
        Ok(Self::new(InvitationSchema::parse(raw)?))
    }

    pub fn schema(&self) -> &InvitationSchema {
        &self.schema
    }

    pub fn options(&self) -> &EditorOptions {
        &self.options
    }

    pub fn state(&self) -> &EditorState {
        self.content.state()
    }

    pub fn errors(&self) -> &[FieldError] {
        self.content.state().errors()
    }

    pub fn signatures_form(&self) -> Option<&EditorForm> {
        self.signatures.as_ref()
    }

    pub fn record(&self) -> Option<&Value> {
        self.record.as_ref()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Read pre-existing values through `template` (a dissimilar object that
    /// references fields by name) instead of `content.<name>.value`.
    pub fn bind_template(&mut self, template: &Value) {
        let resolver = PathResolver::new(self.options.key_order);
        self.content.fields_mut().bind_template(template, &resolver);
        self.init_content();
    }

    /// Flag that the source record is being fetched.
    pub fn mark_record_loading(&mut self) {
        self.content.dispatch(EditorAction::SetLoading {
            key: RECORD_LOADING.to_string(),
            loading: true,
        });
    }

    /// Cache the source record for the session's lifetime and seed from it.
    pub fn load_record(&mut self, record: Value) {
        self.record = Some(record);
        self.init_content();
    }

    /// Re-seed the content form. The signatures form never reads the record,
    /// so a signer picked meanwhile is kept.
    fn init_content(&mut self) {
        self.content.init(self.record.as_ref());
    }

    fn init(&mut self) {
        self.init_content();
        if let Some(signatures) = &mut self.signatures {
            signatures.init(None);
        }
    }

    /// Offer the identity's matching groups as signature choices and
    /// preselect the first one while the signatures form is untouched.
    pub fn resolve_signatures(&mut self, identity: &Identity) {
        let Some(form) = &mut self.signatures else {
            return;
        };
        form.dispatch(EditorAction::SetLoading {
            key: SIGNATURES.to_string(),
            loading: true,
        });

        let untouched = !form.state().is_dirty();
        let mut reseed = false;
        if let Some(FieldKind::Typed(param)) =
            form.fields_mut().get_mut(SIGNATURES).map(|spec| &mut spec.kind)
            && let Some(options) = signature_options(param, identity)
        {
            tracing::debug!(candidates = options.len(), "signature options resolved");
            if param.default.is_none()
                && let Some(first) = options.first()
            {
                param.default = Some(json!([first.value]));
                reseed = untouched;
            }
            param.options = Some(options);
        }

        if reseed {
            form.init(None);
        }
        form.dispatch(EditorAction::SetLoading {
            key: SIGNATURES.to_string(),
            loading: false,
        });
    }

    pub fn field(&self, slot: &str) -> Option<FieldEditor<'_>> {
        self.content.editor(slot)
    }

    /// Editors for the fields that currently render, in display order.
    pub fn visible_fields(&self) -> Vec<FieldEditor<'_>> {
        self.content.visible()
    }

    pub fn set(&mut self, slot: &str, value: Value) -> Result<(), EditorError> {
        self.content.set(slot, value)
    }

    pub fn delete(&mut self, slot: &str) -> Result<(), EditorError> {
        self.content.delete(slot)
    }

    pub fn set_readers(&mut self, field: &str, value: Value) -> Result<(), EditorError> {
        self.content.set(&readers_slot(field), value)
    }

    pub fn set_edit_value(&mut self, key: &str, value: Value) -> Result<(), EditorError> {
        self.content.set(&edit_slot(key), value)
    }

    pub fn set_signatures(&mut self, value: Value) -> Result<(), EditorError> {
        match &mut self.signatures {
            Some(form) => form.set(SIGNATURES, value),
            None => Err(EditorError::UnknownField(SIGNATURES.to_string())),
        }
    }

    pub fn dispatch(&mut self, action: EditorAction) {
        self.content.dispatch(action);
    }

    pub fn validate(&mut self) -> ValidationOutcome {
        validate_forms(self.forms_mut())
    }

    /// Payload for the current state, without validation or submission.
    pub fn build_payload(&self, identity: &Identity) -> EditPayload {
        let builder = EditPayloadBuilder::new(&self.schema, self.content.state());
        match &self.signatures {
            Some(form) => builder
                .with_signatures(form.state().value(SIGNATURES))
                .build(identity),
            None => builder.build(identity),
        }
    }

    /// Validate and build the payload, marking the session as submitting.
    ///
    /// Refused while a submission is in flight or while any field error
    /// remains; the payload is only built once the error sequence is empty.
    pub fn begin_submit(&mut self, identity: &Identity) -> Result<EditPayload, EditorError> {
        if self.submitting {
            return Err(EditorError::SubmissionPending);
        }
        if let ValidationOutcome::Invalid { errors } = flag_forms(self.forms_mut()) {
            tracing::debug!(errors = errors.len(), "submission blocked by field errors");
            return Err(EditorError::Invalid(errors));
        }
        let payload = self.build_payload(identity);
        self.submitting = true;
        Ok(payload)
    }

    pub fn finish_submit(
        &mut self,
        result: Result<Value, SubmitError>,
    ) -> Result<SubmitOutcome, EditorError> {
        if !self.submitting {
            return Err(EditorError::NoSubmissionPending);
        }
        self.submitting = false;
        match result {
            Ok(response) => {
                tracing::debug!(invitation = %self.schema.id, "edit submitted");
                self.reset_forms();
                Ok(SubmitOutcome::Submitted(response))
            }
            Err(err) => {
                tracing::warn!(
                    invitation = %self.schema.id,
                    status = ?err.status,
                    error = %err,
                    "edit submission failed"
                );
                Ok(SubmitOutcome::Failed(Notification {
                    message: err.message,
                }))
            }
        }
    }

    /// Discard local edits. An in-flight submission is left alone.
    pub fn cancel(&mut self) {
        self.reset_forms();
    }

    fn reset_forms(&mut self) {
        self.content.reset();
        if let Some(signatures) = &mut self.signatures {
            signatures.reset();
        }
    }

    fn forms_mut(&mut self) -> impl Iterator<Item = &mut EditorForm> {
        std::iter::once(&mut self.content).chain(self.signatures.as_mut())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::domain::FieldValue;

    fn invitation() -> Value {
        json!({
            "id": "Venue/2025/-/Submission",
            "edit": {
                "signatures": {"param": {"type": "group[]", "regex": "~.*|Venue/2025/Authors"}},
                "readers": ["Venue/2025"],
                "expdate": {"param": {"type": "date", "optional": true}},
                "content": {
                    "title": {"order": 1, "value": {"param": {"type": "string", "maxLength": 20}}},
                    "authors": {"order": 2, "value": {"param": {"type": "string[]"}}},
                    "abstract": {
                        "order": 3,
                        "value": {"param": {
                            "type": "string",
                            "input": "textarea",
                            "optional": true,
                            "deletable": true
                        }},
                        "readers": {"param": {
                            "type": "group[]",
                            "enum": ["Venue/2025", "everyone"],
                            "optional": true
                        }}
                    },
                    "venue": {"value": "Venue 2025 Submission"}
                }
            }
        })
    }

    fn identity() -> Identity {
        Identity::new("~Ann_Lee1").with_groups(["Venue/2025/Authors", "Venue/2025/Reviewers"])
    }

    fn ready_session() -> EditorSession {
        let mut session = EditorSession::from_invitation(&invitation()).unwrap();
        session.resolve_signatures(&identity());
        session
    }

    #[test]
    fn external_error_blocks_submit_until_field_is_edited() {
        let mut session = ready_session();
        session.set("title", json!("Paper A")).unwrap();
        session.set("authors", json!(["Bad", "Ok"])).unwrap();
        session.dispatch(EditorAction::SetError {
            field: "authors".into(),
            message: "unknown author".into(),
        });

        let err = session.begin_submit(&identity()).unwrap_err();
        assert!(
            matches!(&err, EditorError::Invalid(errors) if errors[0].field_name == "authors")
        );
        assert!(!session.is_submitting());

        session.set("authors", json!(["Ok"])).unwrap();
        assert!(session.errors().is_empty());
        let payload = session.begin_submit(&identity()).unwrap();
        assert_eq!(payload.content_value("authors"), Some(&json!(["Ok"])));
    }

    #[test]
    fn only_one_submission_in_flight() {
        let mut session = ready_session();
        session.set("title", json!("Paper A")).unwrap();
        session.set("authors", json!(["Ann Lee"])).unwrap();

        session.begin_submit(&identity()).unwrap();
        assert_eq!(
            session.begin_submit(&identity()).unwrap_err(),
            EditorError::SubmissionPending
        );

        let outcome = session
            .finish_submit(Err(SubmitError::new("forbidden").with_status(403)))
            .unwrap();
        assert_eq!(
            outcome,
            SubmitOutcome::Failed(Notification {
                message: "forbidden".into()
            })
        );
        assert_eq!(
            session.state().value("title"),
            &FieldValue::Set(json!("Paper A"))
        );
        assert_eq!(
            session.finish_submit(Ok(json!({}))).unwrap_err(),
            EditorError::NoSubmissionPending
        );
    }

    #[test]
    fn successful_submit_resets_to_initial_snapshot() {
        let mut session = ready_session();
        session.set("title", json!("Paper A")).unwrap();
        session.set("authors", json!(["Ann Lee"])).unwrap();
        session.begin_submit(&identity()).unwrap();

        let outcome = session.finish_submit(Ok(json!({"id": "edit1"}))).unwrap();
        assert_eq!(outcome, SubmitOutcome::Submitted(json!({"id": "edit1"})));
        assert!(!session.is_submitting());
        assert_eq!(session.state().value("title"), &FieldValue::Empty);
    }

    #[test]
    fn payload_carries_target_edit_keys_and_signatures() {
        let mut session = ready_session();
        session.set("title", json!("Paper A")).unwrap();
        session.set_edit_value("expdate", json!(1735689600000u64)).unwrap();
        session.set_readers("abstract", json!(["Venue/2025"])).unwrap();

        let payload = session.build_payload(&identity());
        assert_eq!(payload.invitations(), Some("Venue/2025/-/Submission"));
        assert!(payload.invitation().is_none());
        assert_eq!(payload.get("readers"), Some(&json!(["Venue/2025"])));
        assert_eq!(payload.get("expdate"), Some(&json!(1735689600000u64)));
        assert_eq!(payload.signatures(), ["~Ann_Lee1"]);

        let content = payload.content().unwrap();
        assert!(!content.contains_key("venue"));
        assert_eq!(content["abstract"], json!({"readers": ["Venue/2025"]}));
    }

    #[test]
    fn deleted_field_is_sent_as_delete_marker() {
        let mut session = ready_session();
        session.delete("abstract").unwrap();
        assert_eq!(session.state().value("abstract"), &FieldValue::Deleted);
        assert!(session.state().error_for("abstract").is_none());

        let payload = session.build_payload(&identity());
        assert_eq!(payload.content().unwrap()["abstract"], json!({"delete": true}));

        assert_eq!(session.delete("title"), Ok(()));
        assert!(session.state().error_for("title").is_some());
    }

    #[test]
    fn signatures_preselect_first_matching_group() {
        let session = ready_session();
        let form = session.signatures_form().unwrap();
        assert_eq!(
            form.state().value("signatures"),
            &FieldValue::Set(json!(["~Ann_Lee1"]))
        );
        let offered = form
            .fields()
            .get("signatures")
            .and_then(FieldSpec::typed_param)
            .and_then(|param| param.options.as_ref())
            .map(Vec::len);
        assert_eq!(offered, Some(2));
        assert!(!form.state().is_loading("signatures"));
    }

    #[test]
    fn record_seeds_values_and_cancel_restores_them() {
        let mut session = ready_session();
        session.mark_record_loading();
        assert!(session.state().is_loading("record"));
        session.load_record(json!({
            "content": {
                "title": {"value": "Stored"},
                "abstract": {"value": "Text", "readers": ["everyone"]}
            }
        }));
        assert!(!session.state().is_loading("record"));

        session.set("title", json!("Draft")).unwrap();
        session.cancel();
        assert_eq!(
            session.state().value("title"),
            &FieldValue::Set(json!("Stored"))
        );
        assert_eq!(
            session.state().value("abstract/readers"),
            &FieldValue::Set(json!(["everyone"]))
        );
    }

    #[test]
    fn picked_signer_survives_record_and_template_loads() {
        let mut session = ready_session();
        session.set_signatures(json!(["Venue/2025/Authors"])).unwrap();
        session.load_record(json!({"content": {"title": {"value": "Stored"}}}));
        session.bind_template(&json!({"title": "${title}"}));

        let signed = FieldValue::Set(json!(["Venue/2025/Authors"]));
        let form = session.signatures_form().unwrap();
        assert_eq!(form.state().value("signatures"), &signed);
        assert_eq!(
            session.build_payload(&identity()).signatures(),
            ["Venue/2025/Authors"]
        );

        session.cancel();
        let form = session.signatures_form().unwrap();
        assert_eq!(
            form.state().value("signatures"),
            &FieldValue::Set(json!(["~Ann_Lee1"]))
        );
    }

    #[test]
    fn template_binding_reads_values_from_dissimilar_record() {
        let mut session = ready_session();
        let template = json!({"venue": {"submission": {"title": "${4/content/title/value}"}}});
        session.bind_template(&template);
        session.load_record(json!({"venue": {"submission": {"title": "From group"}}}));
        assert_eq!(
            session.state().value("title"),
            &FieldValue::Set(json!("From group"))
        );
    }
}
