use anyhow::{Context, Result, bail};
use serde_json::{Map, Value};

use super::{
    parser::{parse_field_set, value_kind},
    schema::{FieldKind, FieldSet, FieldSpec},
};

/// Shape of the entity an edit produces; decides between `invitation` and
/// `invitations` in the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditTarget {
    Group,
    Invitation,
}

/// An invitation's edit schema: identifier, raw edit template and the
/// normalized field specs it declares.
#[derive(Debug, Clone)]
pub struct InvitationSchema {
    pub id: String,
    pub edit: Map<String, Value>,
    pub content: FieldSet,
    pub signatures: Option<FieldSpec>,
    pub target: EditTarget,
}

impl InvitationSchema {
    pub fn parse(raw: &Value) -> Result<Self> {
        let Some(object) = raw.as_object() else {
            bail!("invitation must be a JSON object");
        };
        let id = object
            .get("id")
            .and_then(Value::as_str)
            .context("invitation is missing a string 'id'")?
            .to_string();
        let edit = object
            .get("edit")
            .and_then(Value::as_object)
            .with_context(|| format!("invitation '{id}' has no edit object"))?
            .clone();

        let content = match edit.get("content") {
            Some(content) => parse_field_set(content)
                .with_context(|| format!("invalid edit.content in invitation '{id}'"))?,
            None => {
                tracing::debug!(invitation = %id, "edit template declares no content");
                FieldSet::new()
            }
        };

        let signatures = edit
            .get("signatures")
            .map(|raw| -> Result<FieldSpec> {
                let kind = value_kind(raw)
                    .with_context(|| format!("invalid edit.signatures in invitation '{id}'"))?;
                Ok(FieldSpec::new("signatures", kind))
            })
            .transpose()?;

        let target = if edit.contains_key("group") {
            EditTarget::Group
        } else {
            EditTarget::Invitation
        };

        Ok(Self {
            id,
            edit,
            content,
            signatures,
            target,
        })
    }

    /// Top-level edit keys other than content, signatures and the entity
    /// body, with their normalized kind.
    pub fn edit_keys(&self) -> impl Iterator<Item = (&str, FieldKind)> {
        self.edit
            .iter()
            .filter(|(key, _)| !is_reserved_key(key))
            .map(|(key, raw)| {
                let kind = value_kind(raw).unwrap_or_else(|err| {
                    tracing::warn!(
                        key = %key,
                        error = %err,
                        "treating unparsable edit key as constant"
                    );
                    FieldKind::Const(raw.clone())
                });
                (key.as_str(), kind)
            })
    }
}

fn is_reserved_key(key: &str) -> bool {
    matches!(
        key,
        "content" | "signatures" | "invitation" | "invitations" | "group" | "note"
    )
}
