use anyhow::{Context, Result, bail};
use serde::Deserialize;
use serde_json::Value;

use super::schema::{
    FieldKind, FieldSet, FieldSpec, FieldType, InputKind, ParamOption, TypedParam, ValueSource,
    readers_slot,
};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawParam {
    #[serde(rename = "const")]
    constant: Option<Value>,
    #[serde(rename = "type")]
    field_type: Option<String>,
    input: Option<String>,
    #[serde(default)]
    optional: bool,
    #[serde(default)]
    deletable: bool,
    #[serde(rename = "enum")]
    enumeration: Option<Vec<Value>>,
    items: Option<Vec<Value>>,
    regex: Option<String>,
    min_length: Option<u64>,
    max_length: Option<u64>,
    minimum: Option<f64>,
    maximum: Option<f64>,
    #[serde(default)]
    extensions: Vec<String>,
    max_size: Option<f64>,
    #[serde(default)]
    markdown: bool,
    #[serde(default)]
    hidden: bool,
    default: Option<Value>,
}

/// Parse one entry of an `edit.content` mapping.
pub fn parse_field_spec(name: &str, raw: &Value) -> Result<FieldSpec> {
    let Some(object) = raw.as_object() else {
        bail!("field '{name}' must be a JSON object");
    };

    let kind = match object.get("value") {
        Some(value) => {
            value_kind(value).with_context(|| format!("invalid value for field '{name}'"))?
        }
        None if object.contains_key("readers") => FieldKind::ReadersOnly,
        None => FieldKind::Const(Value::Null),
    };

    let mut spec = FieldSpec::new(name, kind);
    spec.description = object
        .get("description")
        .and_then(Value::as_str)
        .map(str::to_string);
    spec.order = object.get("order").and_then(Value::as_f64);

    if let Some(readers) = object.get("readers") {
        let readers_kind =
            value_kind(readers).with_context(|| format!("invalid readers for field '{name}'"))?;
        let overlay = FieldSpec::new(readers_slot(name), readers_kind)
            .with_source(ValueSource::content_readers(name));
        spec.readers = Some(Box::new(overlay));
    }

    Ok(spec)
}

/// Parse an `edit.content` mapping, keeping declaration order.
pub fn parse_field_set(content: &Value) -> Result<FieldSet> {
    let Some(object) = content.as_object() else {
        bail!("content must be a JSON object");
    };
    let mut fields = FieldSet::new();
    for (name, raw) in object {
        fields.push(parse_field_spec(name, raw)?);
    }
    Ok(fields)
}

/// Normalize a `value`-position declaration (also used for `readers` and
/// `signatures`) into a [`FieldKind`].
pub fn value_kind(value: &Value) -> Result<FieldKind> {
    let Some(param) = value.as_object().and_then(|object| object.get("param")) else {
        return Ok(FieldKind::Const(value.clone()));
    };

    let raw: RawParam =
        serde_json::from_value(param.clone()).context("param has an unexpected shape")?;

    if let Some(constant) = raw.constant {
        return Ok(FieldKind::Const(constant));
    }
    if raw.field_type.is_none() && raw.input.is_none() {
        return Ok(FieldKind::Const(raw.default.unwrap_or(Value::Null)));
    }

    let options = raw
        .enumeration
        .or(raw.items)
        .map(|entries| entries.iter().map(option_from_value).collect());

    Ok(FieldKind::Typed(TypedParam {
        field_type: raw.field_type.as_deref().map(FieldType::parse),
        input: raw.input.as_deref().map(InputKind::parse),
        optional: raw.optional,
        deletable: raw.deletable,
        options,
        regex: raw.regex,
        min_length: raw.min_length,
        max_length: raw.max_length,
        minimum: raw.minimum,
        maximum: raw.maximum,
        extensions: raw.extensions,
        max_size: raw.max_size,
        markdown: raw.markdown,
        hidden: raw.hidden,
        default: raw.default,
    }))
}

fn option_from_value(entry: &Value) -> ParamOption {
    match entry.as_object() {
        Some(object) if object.contains_key("value") => ParamOption {
            value: object.get("value").cloned().unwrap_or(Value::Null),
            description: object
                .get("description")
                .and_then(Value::as_str)
                .map(str::to_string),
            optional: object
                .get("optional")
                .and_then(Value::as_bool)
                .unwrap_or(true),
        },
        _ => ParamOption::new(entry.clone()),
    }
}
