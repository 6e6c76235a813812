use std::io::Write;

use anyhow::{Context, Result};
use serde_json::Value;

use crate::payload::EditPayload;

use super::DocumentFormat;

/// Controls how an edit payload is serialized.
#[derive(Debug, Clone, Copy)]
pub struct OutputOptions {
    pub format: DocumentFormat,
    pub pretty: bool,
}

impl OutputOptions {
    pub fn new(format: DocumentFormat) -> Self {
        Self {
            format,
            pretty: true,
        }
    }

    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self::new(DocumentFormat::Json)
    }
}

pub fn serialize_payload(payload: &EditPayload, options: &OutputOptions) -> Result<String> {
    serialize_value(&payload.clone().into_value(), options)
}

/// Serialize `payload` and write it, newline-terminated, to `writer`.
pub fn write_payload(
    payload: &EditPayload,
    options: &OutputOptions,
    mut writer: impl Write,
) -> Result<()> {
    let text = serialize_payload(payload, options)?;
    writer
        .write_all(text.as_bytes())
        .and_then(|_| writer.write_all(b"\n"))
        .and_then(|_| writer.flush())
        .context("failed to write edit payload")
}

fn serialize_value(value: &Value, options: &OutputOptions) -> Result<String> {
    match options.format {
        DocumentFormat::Json => {
            if options.pretty {
                serde_json::to_string_pretty(value).context("failed to serialize JSON")
            } else {
                serde_json::to_string(value).context("failed to serialize JSON")
            }
        }
        #[cfg(feature = "yaml")]
        DocumentFormat::Yaml => serde_yaml::to_string(value).context("failed to serialize YAML"),
        #[cfg(feature = "toml")]
        DocumentFormat::Toml => {
            if options.pretty {
                toml::to_string_pretty(value).context("failed to serialize TOML")
            } else {
                toml::to_string(value).context("failed to serialize TOML")
            }
        }
    }
}
