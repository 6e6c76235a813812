use regex::Regex;
use serde_json::{Map, Value, json};

use crate::domain::{
    Arity, BaseType, FieldSet, FieldSpec, FieldValue, FormData, InputKind, TypedParam,
};

use super::{actions::EditorAction, state::EditorState};

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Check one value against its field's constraints.
pub fn validate_value(spec: &FieldSpec, value: &FieldValue) -> Result<(), String> {
    let Some(param) = spec.typed_param() else {
        return Ok(());
    };

    let value = match value {
        FieldValue::Deleted if param.deletable => return Ok(()),
        FieldValue::Deleted => return Err(format!("{} cannot be deleted", spec.name)),
        blank if blank.is_blank() => {
            return if param.optional || param.hidden {
                Ok(())
            } else {
                Err(format!("{} is required", spec.name))
            };
        }
        FieldValue::Set(value) => value,
        FieldValue::Empty => return Ok(()),
    };

    check_schema(param, value)?;
    check_regex(&spec.name, param, value)?;
    if param
        .field_type
        .as_ref()
        .is_some_and(|field_type| field_type.base == BaseType::File)
    {
        check_file(&spec.name, param, value)?;
    }
    Ok(())
}

/// JSON Schema fragment equivalent to a field's type and bound constraints.
pub fn constraint_schema(param: &TypedParam) -> Value {
    let mut scalar = Map::new();
    if let Some(json_type) = param
        .field_type
        .as_ref()
        .and_then(|field_type| json_type_for(&field_type.base))
    {
        scalar.insert("type".into(), json_type);
    }
    if let Some(options) = &param.options {
        let values: Vec<Value> = options.iter().map(|option| option.value.clone()).collect();
        scalar.insert("enum".into(), Value::Array(values));
    }
    if let Some(min) = param.min_length {
        scalar.insert("minLength".into(), json!(min));
    }
    if let Some(max) = param.max_length {
        scalar.insert("maxLength".into(), json!(max));
    }
    if let Some(min) = param.minimum {
        scalar.insert("minimum".into(), json!(min));
    }
    if let Some(max) = param.maximum {
        scalar.insert("maximum".into(), json!(max));
    }

    let arity = param.field_type.as_ref().map(|field_type| field_type.arity);
    match arity {
        Some(Arity::Array) => json!({"type": "array", "items": Value::Object(scalar)}),
        Some(Arity::Object) => json!({}),
        None if param.input == Some(InputKind::Checkbox) => {
            json!({"type": "array", "items": Value::Object(scalar)})
        }
        Some(Arity::Single) | None => Value::Object(scalar),
    }
}

fn json_type_for(base: &BaseType) -> Option<Value> {
    match base {
        BaseType::String
        | BaseType::Script
        | BaseType::Note
        | BaseType::Edit
        | BaseType::Edge
        | BaseType::Tag => Some(json!("string")),
        BaseType::Integer => Some(json!("integer")),
        BaseType::Float | BaseType::Date => Some(json!("number")),
        BaseType::Boolean => Some(json!("boolean")),
        BaseType::Group | BaseType::Profile | BaseType::File => Some(json!(["string", "object"])),
        BaseType::Json | BaseType::Payment | BaseType::Other(_) => None,
    }
}

fn check_schema(param: &TypedParam, value: &Value) -> Result<(), String> {
    let schema = constraint_schema(param);
    let validator = match jsonschema::validator_for(&schema) {
        Ok(validator) => validator,
        Err(err) => {
            tracing::warn!(error = %err, "skipping constraints that do not compile");
            return Ok(());
        }
    };
    match validator.iter_errors(value).next() {
        Some(error) => Err(error.to_string()),
        None => Ok(()),
    }
}

fn check_regex(name: &str, param: &TypedParam, value: &Value) -> Result<(), String> {
    let Some(pattern) = &param.regex else {
        return Ok(());
    };
    let regex = match Regex::new(pattern) {
        Ok(regex) => regex,
        Err(err) => {
            tracing::warn!(field = %name, error = %err, "ignoring invalid regex");
            return Ok(());
        }
    };
    let texts: Vec<&str> = match value {
        Value::String(text) => vec![text.as_str()],
        Value::Array(items) => items.iter().filter_map(Value::as_str).collect(),
        _ => Vec::new(),
    };
    match texts.into_iter().find(|text| !regex.is_match(text)) {
        Some(text) => Err(format!("\"{text}\" does not match {pattern}")),
        None => Ok(()),
    }
}

fn check_file(name: &str, param: &TypedParam, value: &Value) -> Result<(), String> {
    let files: Vec<&Value> = match value {
        Value::Array(items) => items.iter().collect(),
        single => vec![single],
    };
    for file in files {
        let file_name = match file {
            Value::String(text) => Some(text.as_str()),
            Value::Object(object) => object.get("name").and_then(Value::as_str),
            _ => None,
        };
        if let Some(file_name) = file_name
            && !param.extensions.is_empty()
            && !has_allowed_extension(file_name, &param.extensions)
        {
            return Err(format!(
                "{name} must be one of: {}",
                param.extensions.join(", ")
            ));
        }
        let size = file.get("size").and_then(Value::as_f64);
        if let (Some(size), Some(max_size)) = (size, param.max_size)
            && size / BYTES_PER_MB > max_size
        {
            return Err(format!("{name} exceeds the {max_size} MB limit"));
        }
    }
    Ok(())
}

fn has_allowed_extension(file_name: &str, extensions: &[String]) -> bool {
    let Some((_, extension)) = file_name.rsplit_once('.') else {
        return false;
    };
    extensions
        .iter()
        .any(|allowed| allowed.trim_start_matches('.').eq_ignore_ascii_case(extension))
}

/// Whether the field owning `slot` (itself, or the field whose readers it
/// holds) currently renders. Unowned slots count as shown.
pub fn slot_shown(fields: &FieldSet, data: &FormData, slot: &str) -> bool {
    fields
        .iter()
        .find(|owner| {
            owner.name == slot
                || owner
                    .readers
                    .as_deref()
                    .is_some_and(|readers| readers.name == slot)
        })
        .is_none_or(|owner| owner.should_be_shown(data))
}

/// Error actions for one slot (a field or a readers overlay). Slots that are
/// unknown, hidden or valid get a `ClearError`.
pub fn validate_slot(fields: &FieldSet, data: &FormData, slot: &str) -> EditorAction {
    let Some(spec) = fields.spec_for_slot(slot) else {
        return EditorAction::ClearError {
            field: slot.to_string(),
        };
    };
    if !slot_shown(fields, data, slot) {
        return EditorAction::ClearError {
            field: slot.to_string(),
        };
    }
    let value = data.get(slot).unwrap_or(&FieldValue::Empty);
    match validate_value(spec, value) {
        Ok(()) => EditorAction::ClearError {
            field: slot.to_string(),
        },
        Err(message) => EditorAction::SetError {
            field: slot.to_string(),
            message,
        },
    }
}

/// Error actions for every field and readers overlay, in declaration order.
pub fn validate_fields(fields: &FieldSet, state: &EditorState) -> Vec<EditorAction> {
    let data = state.values();
    let mut actions = Vec::with_capacity(fields.len());
    for spec in fields.iter() {
        actions.push(validate_slot(fields, data, &spec.name));
        if let Some(readers) = &spec.readers {
            actions.push(validate_slot(fields, data, &readers.name));
        }
    }
    actions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FieldKind;

    fn spec(param: TypedParam) -> FieldSpec {
        FieldSpec::typed("field", param)
    }

    #[test]
    fn required_and_optional_blanks() {
        let required = spec(TypedParam::of_type("string"));
        assert_eq!(
            validate_value(&required, &FieldValue::Empty),
            Err("field is required".to_string())
        );
        let optional = spec(TypedParam::of_type("string").optional());
        assert!(validate_value(&optional, &FieldValue::Set(json!(""))).is_ok());
    }

    #[test]
    fn constants_are_never_checked() {
        let constant = FieldSpec::new("venue", FieldKind::Const(json!("ICLR")));
        assert!(validate_value(&constant, &FieldValue::Empty).is_ok());
    }

    #[test]
    fn delete_requires_deletable() {
        let plain = spec(TypedParam::of_type("string"));
        assert!(validate_value(&plain, &FieldValue::Deleted).is_err());
        let deletable = spec(TypedParam::of_type("string").deletable());
        assert!(validate_value(&deletable, &FieldValue::Deleted).is_ok());
    }

    #[test]
    fn enforces_length_bounds_and_enums() {
        let mut param = TypedParam::of_type("string");
        param.max_length = Some(5);
        assert!(validate_value(&spec(param.clone()), &FieldValue::Set(json!("short"))).is_ok());
        assert!(validate_value(&spec(param), &FieldValue::Set(json!("far too long"))).is_err());

        let choice = spec(TypedParam::of_type("string[]").with_options(["a", "b"]));
        assert!(validate_value(&choice, &FieldValue::Set(json!(["a"]))).is_ok());
        assert!(validate_value(&choice, &FieldValue::Set(json!(["c"]))).is_err());
    }

    #[test]
    fn enforces_numeric_type_and_range() {
        let mut param = TypedParam::of_type("integer");
        param.minimum = Some(1.0);
        param.maximum = Some(10.0);
        assert!(validate_value(&spec(param.clone()), &FieldValue::Set(json!(4))).is_ok());
        assert!(validate_value(&spec(param.clone()), &FieldValue::Set(json!(11))).is_err());
        assert!(validate_value(&spec(param), &FieldValue::Set(json!("4"))).is_err());
    }

    #[test]
    fn regex_checks_every_string_element() {
        let mut param = TypedParam::of_type("group[]");
        param.regex = Some("^~.+".into());
        assert!(validate_value(&spec(param.clone()), &FieldValue::Set(json!(["~Ann1"]))).is_ok());
        let err = validate_value(&spec(param), &FieldValue::Set(json!(["~Ann1", "Bad"])));
        assert!(err.unwrap_err().contains("\"Bad\""));
    }

    #[test]
    fn file_extension_and_size() {
        let mut param = TypedParam::of_type("file");
        param.extensions = vec!["pdf".into()];
        param.max_size = Some(1.0);
        let field = spec(param);
        assert!(validate_value(&field, &FieldValue::Set(json!("/attachment/paper.PDF"))).is_ok());
        assert!(validate_value(&field, &FieldValue::Set(json!({"name": "paper.zip"}))).is_err());
        let oversized = json!({"name": "paper.pdf", "size": 3.0 * BYTES_PER_MB});
        assert!(validate_value(&field, &FieldValue::Set(oversized)).is_err());
    }

    #[test]
    fn checkbox_without_type_expects_a_list() {
        let param = TypedParam::with_input("checkbox").with_options(["I agree"]);
        assert_eq!(
            constraint_schema(&param),
            json!({"type": "array", "items": {"enum": ["I agree"]}})
        );
    }
}
