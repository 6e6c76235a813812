use crate::domain::{FieldSet, FieldSpec, FormData};

/// Fields that should render for the current values, sorted by `order`
/// (ties keep declaration order).
///
/// Predicates may read any field, so callers re-run this after every state
/// change instead of caching.
pub fn visible_fields<'a>(
    fields: &'a FieldSet,
    data: &FormData,
    default_order: f64,
) -> Vec<&'a FieldSpec> {
    let mut visible: Vec<&FieldSpec> = fields
        .iter()
        .filter(|spec| spec.should_be_shown(data))
        .collect();
    visible.sort_by(|left, right| {
        left.order_or(default_order)
            .total_cmp(&right.order_or(default_order))
    });
    visible
}

pub fn visible_field_names(
    fields: &FieldSet,
    data: &FormData,
    default_order: f64,
) -> Vec<String> {
    visible_fields(fields, data, default_order)
        .into_iter()
        .map(|spec| spec.name.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::domain::{DEFAULT_ORDER, FieldValue, TypedParam};

    fn text(name: &str) -> FieldSpec {
        FieldSpec::typed(name, TypedParam::of_type("string"))
    }

    #[test]
    fn sorts_by_order_with_default_and_stable_ties() {
        let fields = FieldSet::new()
            .with(text("venue"))
            .with(text("title").with_order(1.0))
            .with(text("abstract").with_order(4.0))
            .with(text("keywords"))
            .with(text("authors").with_order(4.0));
        let names = visible_field_names(&fields, &FormData::new(), DEFAULT_ORDER);
        assert_eq!(names, ["title", "abstract", "authors", "venue", "keywords"]);
    }

    #[test]
    fn predicates_see_sibling_values() {
        let fields = FieldSet::new()
            .with(text("decision"))
            .with(text("reason").with_visibility(|data| {
                data.get("decision").and_then(FieldValue::as_str) == Some("Reject")
            }));
        let mut data = FormData::new();
        data.insert("decision".into(), FieldValue::Set(json!("Accept")));
        assert_eq!(
            visible_field_names(&fields, &data, DEFAULT_ORDER),
            ["decision"]
        );
        data.insert("decision".into(), FieldValue::Set(json!("Reject")));
        assert_eq!(
            visible_field_names(&fields, &data, DEFAULT_ORDER),
            ["decision", "reason"]
        );
    }
}
