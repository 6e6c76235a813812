mod format;
mod input;
mod output;

pub use format::DocumentFormat;
pub use input::{load_invitation, load_record, parse_document_str};
pub use output::{OutputOptions, serialize_payload, write_payload};
