use anyhow::{Context, Result};
use serde_json::Value;

use crate::domain::InvitationSchema;

use super::DocumentFormat;

/// Parse structured data in any supported format into a `serde_json::Value`.
pub fn parse_document_str(contents: &str, format: DocumentFormat) -> Result<Value> {
    match format {
        DocumentFormat::Json => {
            serde_json::from_str::<Value>(contents).with_context(|| "failed to parse JSON document")
        }
        #[cfg(feature = "yaml")]
        DocumentFormat::Yaml => {
            serde_yaml::from_str::<Value>(contents).with_context(|| "failed to parse YAML document")
        }
        #[cfg(feature = "toml")]
        DocumentFormat::Toml => contents
            .parse::<toml::Value>()
            .with_context(|| "failed to parse TOML document")
            .and_then(|value| {
                serde_json::to_value(value).context("failed to convert TOML to JSON")
            }),
    }
}

/// Parse an invitation document and normalize its edit schema.
pub fn load_invitation(contents: &str, format: DocumentFormat) -> Result<InvitationSchema> {
    let raw = parse_document_str(contents, format)?;
    InvitationSchema::parse(&raw).with_context(|| format!("failed to load {format} invitation"))
}

/// Parse a source record (the object pre-existing values are read from).
pub fn load_record(contents: &str, format: DocumentFormat) -> Result<Value> {
    let record = parse_document_str(contents, format)?;
    anyhow::ensure!(record.is_object(), "record must be an object");
    Ok(record)
}
