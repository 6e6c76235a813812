use crate::domain::{BaseType, FieldKind, FieldSpec, FieldType, InputKind, TypedParam};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetKind {
    Text,
    DisabledText,
    TextArea,
    Dropdown,
    RadioGroup,
    CheckboxGroup,
    DatePicker,
    FileUpload,
    CodeEditor,
    Toggle,
    ProfileSearch { multiple: bool },
    TagList,
    Payment,
}

impl WidgetKind {
    /// Whether the widget accepts user input.
    pub fn is_interactive(self) -> bool {
        !matches!(self, WidgetKind::DisabledText | WidgetKind::TagList)
    }
}

/// Widget for a field, or `None` when the field renders nothing.
///
/// `None` is a normal outcome: readers-only fields, relational types and
/// unknown inputs all land there.
pub fn resolve_widget(spec: &FieldSpec) -> Option<WidgetKind> {
    let widget = resolve_kind(&spec.kind);
    if widget.is_none() {
        tracing::debug!(field = %spec.name, "no widget for field");
    }
    widget
}

pub fn resolve_kind(kind: &FieldKind) -> Option<WidgetKind> {
    match kind {
        FieldKind::ReadersOnly => None,
        FieldKind::Const(value) if value.is_array() => Some(WidgetKind::TagList),
        FieldKind::Const(_) => Some(WidgetKind::DisabledText),
        FieldKind::Typed(param) => resolve_param(param),
    }
}

fn resolve_param(param: &TypedParam) -> Option<WidgetKind> {
    match (&param.input, &param.field_type) {
        (Some(input), _) => widget_for_input(input),
        (None, Some(field_type)) => widget_for_type(field_type, param.has_options()),
        (None, None) => None,
    }
}

fn widget_for_input(input: &InputKind) -> Option<WidgetKind> {
    match input {
        InputKind::Radio => Some(WidgetKind::RadioGroup),
        InputKind::Checkbox => Some(WidgetKind::CheckboxGroup),
        InputKind::Select => Some(WidgetKind::Dropdown),
        InputKind::Textarea => Some(WidgetKind::TextArea),
        InputKind::Text => Some(WidgetKind::Text),
        InputKind::Other(name) => {
            tracing::debug!(input = %name, "input widget not implemented");
            None
        }
    }
}

fn widget_for_type(field_type: &FieldType, has_options: bool) -> Option<WidgetKind> {
    match &field_type.base {
        BaseType::Json | BaseType::Script => Some(WidgetKind::CodeEditor),
        BaseType::File => Some(WidgetKind::FileUpload),
        BaseType::Date => Some(WidgetKind::DatePicker),
        BaseType::Boolean => Some(WidgetKind::Toggle),
        BaseType::Integer | BaseType::Float => Some(WidgetKind::Text),
        BaseType::String if has_options => Some(WidgetKind::Dropdown),
        BaseType::String => Some(WidgetKind::Text),
        BaseType::Group | BaseType::Profile => Some(WidgetKind::ProfileSearch {
            multiple: field_type.is_multiple(),
        }),
        BaseType::Payment => Some(WidgetKind::Payment),
        BaseType::Note | BaseType::Edit | BaseType::Edge | BaseType::Tag => None,
        BaseType::Other(name) => {
            tracing::debug!(field_type = %name, "unknown field type");
            None
        }
    }
}
