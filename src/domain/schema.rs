use std::{fmt, sync::Arc};

use indexmap::IndexMap;
use serde_json::Value;

use crate::schema::{Path, PathResolver};

use super::value::{FieldValue, FormData};

pub const DEFAULT_ORDER: f64 = 100.0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BaseType {
    String,
    Integer,
    Float,
    Boolean,
    Date,
    File,
    Json,
    Script,
    Group,
    Profile,
    Payment,
    Note,
    Edit,
    Edge,
    Tag,
    Other(String),
}

impl BaseType {
    fn parse(raw: &str) -> Self {
        match raw {
            "string" => BaseType::String,
            "integer" => BaseType::Integer,
            "float" => BaseType::Float,
            "boolean" => BaseType::Boolean,
            "date" => BaseType::Date,
            "file" => BaseType::File,
            "json" => BaseType::Json,
            "script" => BaseType::Script,
            "group" => BaseType::Group,
            "profile" => BaseType::Profile,
            "payment" => BaseType::Payment,
            "note" => BaseType::Note,
            "edit" => BaseType::Edit,
            "edge" => BaseType::Edge,
            "tag" => BaseType::Tag,
            other => BaseType::Other(other.to_string()),
        }
    }

    fn as_str(&self) -> &str {
        match self {
            BaseType::String => "string",
            BaseType::Integer => "integer",
            BaseType::Float => "float",
            BaseType::Boolean => "boolean",
            BaseType::Date => "date",
            BaseType::File => "file",
            BaseType::Json => "json",
            BaseType::Script => "script",
            BaseType::Group => "group",
            BaseType::Profile => "profile",
            BaseType::Payment => "payment",
            BaseType::Note => "note",
            BaseType::Edit => "edit",
            BaseType::Edge => "edge",
            BaseType::Tag => "tag",
            BaseType::Other(name) => name,
        }
    }

    /// Entity references the editor has no widget for.
    pub fn is_relational(&self) -> bool {
        matches!(
            self,
            BaseType::Note | BaseType::Edit | BaseType::Edge | BaseType::Tag
        )
    }
}

/// Arity suffix of a type string: `string`, `string[]`, `profile{}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Single,
    Array,
    Object,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldType {
    pub base: BaseType,
    pub arity: Arity,
}

impl FieldType {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        let (base, arity) = if let Some(base) = raw.strip_suffix("[]") {
            (base, Arity::Array)
        } else if let Some(base) = raw.strip_suffix("{}") {
            (base, Arity::Object)
        } else {
            (raw, Arity::Single)
        };
        FieldType {
            base: BaseType::parse(base),
            arity,
        }
    }

    pub fn is_multiple(&self) -> bool {
        self.arity != Arity::Single
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let suffix = match self.arity {
            Arity::Single => "",
            Arity::Array => "[]",
            Arity::Object => "{}",
        };
        write!(f, "{}{}", self.base.as_str(), suffix)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputKind {
    Radio,
    Checkbox,
    Select,
    Textarea,
    Text,
    Other(String),
}

impl InputKind {
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "radio" => InputKind::Radio,
            "checkbox" => InputKind::Checkbox,
            "select" => InputKind::Select,
            "textarea" => InputKind::Textarea,
            "text" => InputKind::Text,
            other => InputKind::Other(other.to_string()),
        }
    }
}

impl fmt::Display for InputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            InputKind::Radio => "radio",
            InputKind::Checkbox => "checkbox",
            InputKind::Select => "select",
            InputKind::Textarea => "textarea",
            InputKind::Text => "text",
            InputKind::Other(name) => name,
        };
        f.write_str(label)
    }
}

/// One selectable entry from `enum` or `items`.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamOption {
    pub value: Value,
    pub description: Option<String>,
    pub optional: bool,
}

impl ParamOption {
    pub fn new(value: impl Into<Value>) -> Self {
        Self {
            value: value.into(),
            description: None,
            optional: true,
        }
    }

    pub fn label(&self) -> String {
        match (&self.description, &self.value) {
            (Some(description), _) => description.clone(),
            (None, Value::String(text)) => text.clone(),
            (None, other) => other.to_string(),
        }
    }
}

/// Constraints of an editable (non-constant) field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TypedParam {
    pub field_type: Option<FieldType>,
    pub input: Option<InputKind>,
    pub optional: bool,
    pub deletable: bool,
    pub options: Option<Vec<ParamOption>>,
    pub regex: Option<String>,
    pub min_length: Option<u64>,
    pub max_length: Option<u64>,
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    pub extensions: Vec<String>,
    pub max_size: Option<f64>,
    pub markdown: bool,
    pub hidden: bool,
    pub default: Option<Value>,
}

impl TypedParam {
    pub fn of_type(raw: &str) -> Self {
        Self {
            field_type: Some(FieldType::parse(raw)),
            ..Self::default()
        }
    }

    pub fn with_input(raw: &str) -> Self {
        Self {
            input: Some(InputKind::parse(raw)),
            ..Self::default()
        }
    }

    pub fn with_options<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.options = Some(values.into_iter().map(ParamOption::new).collect());
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn deletable(mut self) -> Self {
        self.deletable = true;
        self
    }

    pub fn has_options(&self) -> bool {
        self.options.as_ref().is_some_and(|options| !options.is_empty())
    }

    pub fn is_multiple(&self) -> bool {
        self.field_type.as_ref().is_some_and(FieldType::is_multiple)
    }
}

/// Normalized shape of a field's `value` declaration.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    Const(Value),
    Typed(TypedParam),
    ReadersOnly,
}

pub type VisibilityFn = dyn Fn(&FormData) -> bool + Send + Sync;
pub type ExtractorFn = dyn Fn(&Value) -> Option<Value> + Send + Sync;

#[derive(Clone, Default)]
pub enum Visibility {
    #[default]
    Always,
    When(Arc<VisibilityFn>),
}

impl Visibility {
    pub fn when(predicate: impl Fn(&FormData) -> bool + Send + Sync + 'static) -> Self {
        Visibility::When(Arc::new(predicate))
    }

    pub fn evaluate(&self, data: &FormData) -> bool {
        match self {
            Visibility::Always => true,
            Visibility::When(predicate) => predicate(data),
        }
    }
}

impl fmt::Debug for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Visibility::Always => f.write_str("Always"),
            Visibility::When(_) => f.write_str("When(..)"),
        }
    }
}

/// Where a field's pre-existing value is read from.
#[derive(Clone)]
pub enum ValueSource {
    /// `record.content.<field>.<entry>`
    ContentEntry { field: String, entry: String },
    Path(Path),
    /// A template was bound but did not reference the field.
    Unresolved,
    Custom(Arc<ExtractorFn>),
}

impl ValueSource {
    pub fn content_value(field: &str) -> Self {
        ValueSource::ContentEntry {
            field: field.to_string(),
            entry: "value".to_string(),
        }
    }

    pub fn content_readers(field: &str) -> Self {
        ValueSource::ContentEntry {
            field: field.to_string(),
            entry: "readers".to_string(),
        }
    }

    pub fn extract(&self, record: &Value) -> Option<Value> {
        match self {
            ValueSource::ContentEntry { field, entry } => record
                .get("content")
                .and_then(|content| content.get(field))
                .and_then(|slot| slot.get(entry))
                .cloned(),
            ValueSource::Path(path) => path.lookup(record).cloned(),
            ValueSource::Unresolved => None,
            ValueSource::Custom(extract) => extract(record),
        }
    }

    pub(crate) fn is_content_value(&self) -> bool {
        matches!(self, ValueSource::ContentEntry { entry, .. } if entry == "value")
    }
}

impl fmt::Debug for ValueSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueSource::ContentEntry { field, entry } => {
                write!(f, "ContentEntry(content.{field}.{entry})")
            }
            ValueSource::Path(path) => write!(f, "Path({path})"),
            ValueSource::Unresolved => f.write_str("Unresolved"),
            ValueSource::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub name: String,
    pub description: Option<String>,
    pub order: Option<f64>,
    pub kind: FieldKind,
    pub readers: Option<Box<FieldSpec>>,
    pub visibility: Visibility,
    pub source: ValueSource,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        let name = name.into();
        Self {
            source: ValueSource::content_value(&name),
            name,
            description: None,
            order: None,
            kind,
            readers: None,
            visibility: Visibility::Always,
        }
    }

    pub fn typed(name: impl Into<String>, param: TypedParam) -> Self {
        Self::new(name, FieldKind::Typed(param))
    }

    pub fn constant(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(name, FieldKind::Const(value.into()))
    }

    pub fn with_order(mut self, order: f64) -> Self {
        self.order = Some(order);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_visibility(
        mut self,
        predicate: impl Fn(&FormData) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.visibility = Visibility::when(predicate);
        self
    }

    pub fn with_source(mut self, source: ValueSource) -> Self {
        self.source = source;
        self
    }

    pub fn with_extractor(
        self,
        extract: impl Fn(&Value) -> Option<Value> + Send + Sync + 'static,
    ) -> Self {
        self.with_source(ValueSource::Custom(Arc::new(extract)))
    }

    /// Attach a readers restriction; the nested spec is stored under the
    /// owner's readers slot.
    pub fn with_readers(mut self, kind: FieldKind) -> Self {
        let slot = readers_slot(&self.name);
        let readers =
            FieldSpec::new(slot, kind).with_source(ValueSource::content_readers(&self.name));
        self.readers = Some(Box::new(readers));
        self
    }

    pub fn order_or(&self, default: f64) -> f64 {
        self.order.unwrap_or(default)
    }

    pub fn should_be_shown(&self, data: &FormData) -> bool {
        self.visibility.evaluate(data)
    }

    pub fn typed_param(&self) -> Option<&TypedParam> {
        match &self.kind {
            FieldKind::Typed(param) => Some(param),
            FieldKind::Const(_) | FieldKind::ReadersOnly => None,
        }
    }

    pub fn const_value(&self) -> Option<&Value> {
        match &self.kind {
            FieldKind::Const(value) => Some(value),
            FieldKind::Typed(_) | FieldKind::ReadersOnly => None,
        }
    }

    pub fn is_const(&self) -> bool {
        matches!(self.kind, FieldKind::Const(_))
    }

    /// Value the editor starts with: the record's value when one is found,
    /// else the declared default. Constants always hold their fixed value.
    pub fn initial_value(&self, record: Option<&Value>) -> FieldValue {
        match &self.kind {
            FieldKind::Const(value) => FieldValue::from_option(Some(value.clone())),
            FieldKind::ReadersOnly => FieldValue::Empty,
            FieldKind::Typed(param) => {
                let existing = record.and_then(|record| self.source.extract(record));
                FieldValue::from_option(existing.or_else(|| param.default.clone()))
            }
        }
    }
}

/// Synthetic slot name under which a field's readers overlay is stored.
pub fn readers_slot(field: &str) -> String {
    format!("{field}/readers")
}

/// Synthetic slot name for a parametric top-level edit key such as `readers`.
pub fn edit_slot(key: &str) -> String {
    format!("edit/{key}")
}

/// Field specs in declaration order.
#[derive(Debug, Clone, Default)]
pub struct FieldSet {
    fields: IndexMap<String, FieldSpec>,
}

impl FieldSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, spec: FieldSpec) {
        self.fields.insert(spec.name.clone(), spec);
    }

    pub fn with(mut self, spec: FieldSpec) -> Self {
        self.push(spec);
        self
    }

    pub fn get(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut FieldSpec> {
        self.fields.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut FieldSpec> {
        self.fields.values_mut()
    }

    /// Look up a field or a readers overlay by slot name.
    pub fn spec_for_slot(&self, slot: &str) -> Option<&FieldSpec> {
        if let Some(spec) = self.fields.get(slot) {
            return Some(spec);
        }
        self.fields
            .values()
            .filter_map(|spec| spec.readers.as_deref())
            .find(|readers| readers.name == slot)
    }

    /// Point fields that read `content.<name>.value` at wherever `template`
    /// references them instead. Fields the template never mentions start
    /// empty.
    pub fn bind_template(&mut self, template: &Value, resolver: &PathResolver) {
        for spec in self.fields.values_mut() {
            if !spec.source.is_content_value() {
                continue;
            }
            spec.source = match resolver.locate(template, &spec.name) {
                Some(found) => ValueSource::Path(found.full_path()),
                None => ValueSource::Unresolved,
            };
            tracing::trace!(
                field = %spec.name,
                source = ?spec.source,
                "bound field to template"
            );
        }
    }

    /// Seed values for every field and readers overlay.
    pub fn initial_values(&self, record: Option<&Value>) -> FormData {
        let mut data = FormData::with_capacity(self.fields.len());
        for spec in self.fields.values() {
            data.insert(spec.name.clone(), spec.initial_value(record));
            if let Some(readers) = &spec.readers {
                data.insert(readers.name.clone(), readers.initial_value(record));
            }
        }
        data
    }
}

impl FromIterator<FieldSpec> for FieldSet {
    fn from_iter<T: IntoIterator<Item = FieldSpec>>(iter: T) -> Self {
        let mut set = FieldSet::new();
        for spec in iter {
            set.push(spec);
        }
        set
    }
}
