use crate::form::{EditorForm, FieldError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    Valid,
    Invalid { errors: Vec<FieldError> },
}

impl ValidationOutcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationOutcome::Valid)
    }
}

/// Full validation: failing slots are flagged, passing slots cleared.
pub fn validate_forms<'a>(
    forms: impl IntoIterator<Item = &'a mut EditorForm>,
) -> ValidationOutcome {
    collect(forms, EditorForm::validate)
}

/// Submit-time validation: failing slots are flagged, existing entries kept.
pub fn flag_forms<'a>(forms: impl IntoIterator<Item = &'a mut EditorForm>) -> ValidationOutcome {
    collect(forms, EditorForm::flag_errors)
}

fn collect<'a>(
    forms: impl IntoIterator<Item = &'a mut EditorForm>,
    check: fn(&mut EditorForm) -> usize,
) -> ValidationOutcome {
    let mut errors = Vec::new();
    for form in forms {
        if check(&mut *form) > 0 {
            errors.extend(form.state().errors().iter().cloned());
        }
    }
    if errors.is_empty() {
        ValidationOutcome::Valid
    } else {
        ValidationOutcome::Invalid { errors }
    }
}
