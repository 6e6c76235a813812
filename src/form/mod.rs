mod actions;
mod editor;
mod error;
mod overlay;
mod reducers;
mod state;
mod validation;
mod visibility;
mod widget;

pub use actions::EditorAction;
pub use editor::{EditorForm, FieldEditor};
pub use error::FieldError;
pub use overlay::ReadersOverlay;
pub use reducers::{FormEngine, apply_action};
pub use state::{EditorPhase, EditorState};
pub use validation::{
    constraint_schema, slot_shown, validate_fields, validate_slot, validate_value,
};
pub use visibility::{visible_field_names, visible_fields};
pub use widget::{WidgetKind, resolve_kind, resolve_widget};
