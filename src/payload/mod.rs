mod authors;

use serde::Serialize;
use serde_json::{Map, Value, json};

use crate::{
    domain::{EditTarget, FieldKind, FieldValue, Identity, InvitationSchema, edit_slot},
    form::EditorState,
};

pub use authors::{AuthorEntry, merge_author_shapes};

/// The structured edit posted to the backend.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct EditPayload(Map<String, Value>);

impl EditPayload {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn invitation(&self) -> Option<&str> {
        self.get("invitation").and_then(Value::as_str)
    }

    pub fn invitations(&self) -> Option<&str> {
        self.get("invitations").and_then(Value::as_str)
    }

    pub fn signatures(&self) -> Vec<&str> {
        self.get("signatures")
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    pub fn content(&self) -> Option<&Map<String, Value>> {
        self.get("content").and_then(Value::as_object)
    }

    /// `content.<field>.value`, when present.
    pub fn content_value(&self, field: &str) -> Option<&Value> {
        self.content()
            .and_then(|content| content.get(field))
            .and_then(|entry| entry.get("value"))
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

/// Assembles an [`EditPayload`] from editor state.
///
/// It does not validate; callers check the state's error sequence first.
#[derive(Debug, Clone, Copy)]
pub struct EditPayloadBuilder<'a> {
    schema: &'a InvitationSchema,
    state: &'a EditorState,
    signatures: Option<&'a FieldValue>,
}

impl<'a> EditPayloadBuilder<'a> {
    pub fn new(schema: &'a InvitationSchema, state: &'a EditorState) -> Self {
        Self {
            schema,
            state,
            signatures: None,
        }
    }

    /// Value accumulated by the signatures form.
    pub fn with_signatures(mut self, signatures: &'a FieldValue) -> Self {
        self.signatures = Some(signatures);
        self
    }

    pub fn build(&self, identity: &Identity) -> EditPayload {
        let mut payload = Map::new();

        let (target_key, id) = match self.schema.target {
            EditTarget::Group => ("invitation", &self.schema.id),
            EditTarget::Invitation => ("invitations", &self.schema.id),
        };
        payload.insert(target_key.to_string(), json!(id));

        for (key, kind) in self.schema.edit_keys() {
            match kind {
                FieldKind::Const(value) => {
                    payload.insert(key.to_string(), value);
                }
                FieldKind::Typed(param) => match self.state.value(&edit_slot(key)) {
                    FieldValue::Set(value) => {
                        payload.insert(key.to_string(), value.clone());
                    }
                    FieldValue::Empty => {
                        if let Some(default) = param.default {
                            payload.insert(key.to_string(), default);
                        }
                    }
                    FieldValue::Deleted => {}
                },
                FieldKind::ReadersOnly => {}
            }
        }

        payload.insert("signatures".to_string(), self.signatures_value(identity));
        payload.insert("content".to_string(), Value::Object(self.content()));

        tracing::debug!(
            invitation = %self.schema.id,
            target = ?self.schema.target,
            "edit payload assembled"
        );
        EditPayload(payload)
    }

    fn signatures_value(&self, identity: &Identity) -> Value {
        match self.signatures.and_then(FieldValue::as_value) {
            Some(Value::Array(items)) if !items.is_empty() => Value::Array(items.clone()),
            Some(Value::String(signature)) => json!([signature]),
            _ => json!([identity.profile_id]),
        }
    }

    fn content(&self) -> Map<String, Value> {
        let mut content = Map::new();
        for spec in self.schema.content.iter() {
            if spec.is_const() {
                continue;
            }

            let mut entry = Map::new();
            if spec.typed_param().is_some() {
                match self.state.value(&spec.name) {
                    FieldValue::Set(value) => {
                        entry.insert("value".to_string(), value.clone());
                    }
                    FieldValue::Deleted => {
                        entry.insert("delete".to_string(), Value::Bool(true));
                    }
                    FieldValue::Empty => {}
                }
            }

            let deleted = entry.contains_key("delete");
            if let Some(readers) = spec.readers.as_deref()
                && !deleted
                && readers.typed_param().is_some()
                && let FieldValue::Set(value) = self.state.value(&readers.name)
            {
                entry.insert("readers".to_string(), value.clone());
            }

            if !entry.is_empty() {
                content.insert(spec.name.clone(), Value::Object(entry));
            }
        }
        merge_author_shapes(&mut content, &self.schema.content);
        content
    }
}
