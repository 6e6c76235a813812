use invitation_editor::{
    EditorSession, FieldValue,
    domain::{DEFAULT_ORDER, FieldSet, FieldSpec, TypedParam},
    form::visible_field_names,
};
use pretty_assertions::assert_eq;
use serde_json::json;

fn fields() -> FieldSet {
    FieldSet::new()
        .with(FieldSpec::typed("comment", TypedParam::of_type("string")))
        .with(
            FieldSpec::typed(
                "decision",
                TypedParam::of_type("string").with_options(["Accept", "Reject"]),
            )
            .with_order(1.0),
        )
        .with(
            FieldSpec::typed("reason", TypedParam::of_type("string"))
                .with_order(2.0)
                .with_visibility(|data| {
                    data.get("decision")
                        .and_then(FieldValue::as_str)
                        .is_some_and(|decision| decision == "Reject")
                }),
        )
        .with(FieldSpec::typed("notes", TypedParam::of_type("string")).with_order(1.0))
}

#[test]
fn predicates_see_the_latest_values() {
    let fields = fields();
    let mut data = fields.initial_values(None);
    assert_eq!(
        visible_field_names(&fields, &data, DEFAULT_ORDER),
        ["decision", "notes", "comment"]
    );

    data.insert("decision".into(), FieldValue::Set(json!("Reject")));
    assert_eq!(
        visible_field_names(&fields, &data, DEFAULT_ORDER),
        ["decision", "notes", "reason", "comment"]
    );
}

#[test]
fn default_order_places_unordered_fields() {
    let fields = fields();
    let data = fields.initial_values(None);
    assert_eq!(
        visible_field_names(&fields, &data, 0.0),
        ["comment", "decision", "notes"]
    );
}

#[test]
fn session_lists_fields_in_order_with_their_editors() {
    let session = EditorSession::from_invitation(&json!({
        "id": "Venue/-/Meta_Review",
        "edit": {"content": {
            "recommendation": {
                "order": 2,
                "value": {"param": {"type": "string", "enum": ["Accept", "Reject"]}}
            },
            "metareview": {
                "order": 1,
                "value": {"param": {"type": "string", "input": "textarea"}}
            },
            "venue": {"value": "Venue 2025"}
        }}
    }))
    .unwrap();
    let slots: Vec<_> = session
        .visible_fields()
        .iter()
        .map(|editor| editor.slot())
        .collect();
    assert_eq!(slots, ["metareview", "recommendation", "venue"]);
}
