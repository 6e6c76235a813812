mod identity;
mod invitation;
mod parser;
mod schema;
mod value;

pub use identity::Identity;
pub use invitation::{EditTarget, InvitationSchema};
pub use parser::{parse_field_set, parse_field_spec, value_kind};
pub use schema::{
    Arity, BaseType, DEFAULT_ORDER, FieldKind, FieldSet, FieldSpec, FieldType, InputKind,
    ParamOption, TypedParam, ValueSource, Visibility, edit_slot, readers_slot,
};
pub(crate) use value::EMPTY_VALUE;
pub use value::{FieldValue, FormData};
