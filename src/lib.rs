#![deny(rust_2018_idioms)]

pub mod app;
pub mod domain;
pub mod error;
pub mod form;
pub mod io;
pub mod payload;
pub mod schema;

pub use app::{EditorOptions, EditorSession, Notification, SubmitOutcome, ValidationOutcome};
pub use domain::{FieldSpec, FieldValue, Identity, InvitationSchema};
pub use error::{EditorError, SubmitError};
pub use payload::{EditPayload, EditPayloadBuilder};
pub use schema::{KeyOrder, PathResolver};

pub mod prelude {
    pub use super::{
        EditPayload, EditorError, EditorOptions, EditorSession, FieldValue, Identity,
        InvitationSchema, KeyOrder, SubmitError, SubmitOutcome, ValidationOutcome,
    };
    pub use crate::form::{EditorAction, WidgetKind};
}
