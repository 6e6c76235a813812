use regex::Regex;

use crate::domain::{Identity, ParamOption, TypedParam};

/// Signature choices for a typed `signatures` param.
///
/// A `regex` selects among the identity's groups (profile id first); an
/// explicit option list is kept as declared. `None` leaves the param as is.
pub fn signature_options(param: &TypedParam, identity: &Identity) -> Option<Vec<ParamOption>> {
    if let Some(pattern) = &param.regex {
        let regex = match Regex::new(pattern) {
            Ok(regex) => regex,
            Err(err) => {
                tracing::warn!(pattern = %pattern, error = %err, "invalid signatures regex");
                return None;
            }
        };
        let options = identity
            .group_ids
            .iter()
            .filter(|group| regex.is_match(group))
            .map(|group| ParamOption::new(group.as_str()))
            .collect();
        return Some(options);
    }
    param.options.clone()
}
