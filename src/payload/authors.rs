use serde::Deserialize;
use serde_json::{Map, Value, json};

use crate::domain::{Arity, BaseType, FieldSet};

/// One author as held by the profile-search widget.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorEntry {
    pub author_id: String,
    pub author_name: Option<String>,
    #[serde(default)]
    pub institutions: Vec<Value>,
}

impl AuthorEntry {
    fn display_name(&self) -> &str {
        self.author_name.as_deref().unwrap_or(&self.author_id)
    }

    fn profile_shape(&self) -> Value {
        json!({
            "username": self.author_id,
            "fullname": self.display_name(),
            "institutions": self.institutions,
        })
    }
}

enum AuthorValue {
    One(AuthorEntry),
    Many(Vec<AuthorEntry>),
}

fn author_value(value: &Value) -> Option<AuthorValue> {
    match value {
        Value::Array(items) if !items.is_empty() => {
            serde_json::from_value(value.clone()).ok().map(AuthorValue::Many)
        }
        Value::Object(_) => serde_json::from_value(value.clone()).ok().map(AuthorValue::One),
        _ => None,
    }
}

/// Rewrite profile-search values held as author objects into the shapes the
/// backend stores: plain ids (plus derived `authors` names for `authorids`)
/// or `{username, fullname, institutions}` for `profile{}` fields.
pub fn merge_author_shapes(content: &mut Map<String, Value>, fields: &FieldSet) {
    for spec in fields.iter() {
        let Some(field_type) = spec
            .typed_param()
            .and_then(|param| param.field_type.as_ref())
        else {
            continue;
        };
        if !matches!(field_type.base, BaseType::Group | BaseType::Profile) {
            continue;
        }
        let Some(authors) = content
            .get(&spec.name)
            .and_then(|entry| entry.get("value"))
            .and_then(author_value)
        else {
            continue;
        };

        let entries = match authors {
            AuthorValue::One(entry) => {
                set_entry_value(content, &spec.name, json!(entry.author_id));
                continue;
            }
            AuthorValue::Many(entries) => entries,
        };

        if field_type.arity == Arity::Object {
            let shaped: Vec<Value> = entries.iter().map(AuthorEntry::profile_shape).collect();
            set_entry_value(content, &spec.name, Value::Array(shaped));
            continue;
        }

        let ids: Vec<&str> = entries.iter().map(|entry| entry.author_id.as_str()).collect();
        set_entry_value(content, &spec.name, json!(ids));

        let authors_writable = fields
            .get("authors")
            .is_some_and(|authors| authors.typed_param().is_some());
        if spec.name == "authorids" && authors_writable {
            let names: Vec<&str> = entries.iter().map(AuthorEntry::display_name).collect();
            tracing::trace!(count = names.len(), "deriving author names from authorids");
            set_entry_value(content, "authors", json!(names));
        }
    }
}

fn set_entry_value(content: &mut Map<String, Value>, field: &str, value: Value) {
    match content.get_mut(field).and_then(Value::as_object_mut) {
        Some(entry) => {
            entry.insert("value".to_string(), value);
        }
        None => {
            content.insert(field.to_string(), json!({ "value": value }));
        }
    }
}
