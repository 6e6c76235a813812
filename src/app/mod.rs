mod options;
mod session;
mod signatures;
mod validation;

pub use options::EditorOptions;
pub use session::{EditorSession, Notification, SubmitOutcome};
pub use signatures::signature_options;
pub use validation::{ValidationOutcome, flag_forms, validate_forms};
