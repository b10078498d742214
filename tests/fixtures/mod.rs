//! Shared test fixtures: element-tree documents used across the
//! integration tests.

use formtree::Element;
use serde_json::{json, Value};

/// Build an element tree from its JSON form.
pub fn doc(value: Value) -> Element {
    serde_json::from_value(value).expect("fixture document")
}

/// A two-row contact form: each row is a `people[]` container holding a
/// name and an email field.
pub fn people_form() -> Element {
    doc(json!({
        "id": "contacts",
        "children": [
            {"id": "row-1", "name": "people[]", "children": [
                {"id": "name-1", "name": "name", "value": "Ada"},
                {"id": "email-1", "name": "email", "value": "a@x.com"}
            ]},
            {"id": "row-2", "name": "people[]", "children": [
                {"id": "name-2", "name": "name", "value": "Grace"},
                {"id": "email-2", "name": "email", "value": "b@x.com"}
            ]}
        ]
    }))
}

/// A form with `count` sibling fields all named `list[]`.
pub fn list_form(count: usize) -> Element {
    let children: Vec<Value> = (0..count)
        .map(|i| json!({"id": format!("item-{}", i), "name": "list[]", "value": ""}))
        .collect();
    doc(json!({"id": "list", "children": children}))
}
