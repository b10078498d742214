//! Insertion integration tests
//!
//! End-to-end coverage of the write direction: data trees in, field values
//! out, including workspace path collapsing and document expansion.

mod fixtures;

use fixtures::{doc, list_form, people_form};
use formtree::{extract, insert, Element, OptionsOverlay};
use serde_json::json;

fn value_of<'a>(root: &'a Element, id: &str) -> Option<&'a str> {
    find_by_id(root, id).map(|elem| elem.raw_value())
}

fn find_by_id<'a>(root: &'a Element, id: &str) -> Option<&'a Element> {
    if root.id.as_deref() == Some(id) {
        return Some(root);
    }
    root.children.iter().find_map(|child| find_by_id(child, id))
}

#[test]
fn test_list_fields_fill_in_order_and_extras_stay_untouched() {
    let mut root = list_form(3);
    insert(&mut root, &json!({"list": ["x", "y"]}), None).unwrap();
    assert_eq!(value_of(&root, "item-0"), Some("x"));
    assert_eq!(value_of(&root, "item-1"), Some("y"));
    // No value at index 2: the third field keeps its current value.
    assert_eq!(value_of(&root, "item-2"), Some(""));
}

#[test]
fn test_row_fields_collapse_to_shared_entries() {
    let mut root = people_form();
    insert(
        &mut root,
        &json!({"people": [
            {"name": "Marie", "email": "m@x.com"},
            {"name": "Emmy", "email": "e@x.com"}
        ]}),
        None,
    )
    .unwrap();
    assert_eq!(value_of(&root, "name-1"), Some("Marie"));
    assert_eq!(value_of(&root, "email-1"), Some("m@x.com"));
    assert_eq!(value_of(&root, "name-2"), Some("Emmy"));
    assert_eq!(value_of(&root, "email-2"), Some("e@x.com"));
}

#[test]
fn test_round_trip_through_extract() {
    let original = extract(&people_form(), None).unwrap();

    // A blank copy of the same form receives the extracted data.
    let mut blank = people_form();
    for id in ["name-1", "email-1", "name-2", "email-2"] {
        if let Some(path) = find_path(&blank, id) {
            blank.node_mut(&path).unwrap().value = Some(String::new());
        }
    }
    insert(&mut blank, &original, None).unwrap();
    assert_eq!(extract(&blank, None).unwrap(), original);
}

fn find_path(root: &Element, id: &str) -> Option<Vec<usize>> {
    fn walk(elem: &Element, id: &str, path: &mut Vec<usize>) -> bool {
        if elem.id.as_deref() == Some(id) {
            return true;
        }
        for (index, child) in elem.children.iter().enumerate() {
            path.push(index);
            if walk(child, id, path) {
                return true;
            }
            path.pop();
        }
        false
    }
    let mut path = Vec::new();
    walk(root, id, &mut path).then_some(path)
}

#[test]
fn test_document_expands_to_fit_array_data() {
    let mut root = list_form(1);
    insert(&mut root, &json!({"list": ["x", "y", "z"]}), None).unwrap();
    assert_eq!(root.children.len(), 3);
    let values: Vec<_> = root
        .children
        .iter()
        .map(|child| child.raw_value().to_string())
        .collect();
    assert_eq!(values, vec!["x", "y", "z"]);
}

#[test]
fn test_expand_never_leaves_document_size_alone() {
    let overrides = OptionsOverlay::from_value(json!({"expand": "never"})).unwrap();
    let mut root = list_form(1);
    insert(&mut root, &json!({"list": ["x", "y", "z"]}), Some(&overrides)).unwrap();
    assert_eq!(root.children.len(), 1);
    assert_eq!(value_of(&root, "item-0"), Some("x"));
}

#[test]
fn test_row_containers_expand_with_their_fields() {
    let mut root = doc(json!({
        "children": [
            {"name": "people[]", "children": [
                {"name": "email", "value": ""}
            ]}
        ]
    }));
    insert(
        &mut root,
        &json!({"people": [{"email": "a@x.com"}, {"email": "b@x.com"}]}),
        None,
    )
    .unwrap();
    assert_eq!(root.children.len(), 2);
    assert_eq!(root.children[0].children[0].raw_value(), "a@x.com");
    assert_eq!(root.children[1].children[0].raw_value(), "b@x.com");
}

#[test]
fn test_json_type_writes_serialized_value() {
    let mut root = doc(json!({
        "children": [
            {"id": "payload", "name": "payload", "opts": {"type": "json"}, "value": "null"}
        ]
    }));
    insert(&mut root, &json!({"payload": {"a": [1, 2]}}), None).unwrap();
    assert_eq!(value_of(&root, "payload"), Some("{\"a\":[1,2]}"));
}

#[test]
fn test_list_type_joins_values() {
    let mut root = doc(json!({
        "children": [
            {"id": "tags", "name": "tags", "opts": {"type": "list"}, "value": ""}
        ]
    }));
    insert(&mut root, &json!({"tags": ["red", "green"]}), None).unwrap();
    assert_eq!(value_of(&root, "tags"), Some("red green"));
}

#[test]
fn test_follow_stops_at_scalar_intermediate() {
    let mut root = people_form();
    // "people" is a scalar here; every row path dead-ends and nothing is
    // written.
    insert(&mut root, &json!({"people": "oops"}), None).unwrap();
    assert_eq!(value_of(&root, "name-1"), Some("Ada"));
    assert_eq!(value_of(&root, "email-2"), Some("b@x.com"));
}

#[test]
fn test_insert_skips_toggled_off_fields() {
    let mut root = doc(json!({
        "children": [
            {"name": "billing", "opts": {"role": "toggleable"}, "children": [
                {"kind": "checkbox", "opts": {"role": "toggle"}, "value": ""},
                {"id": "card", "name": "card", "value": "unchanged"}
            ]}
        ]
    }));
    insert(&mut root, &json!({"billing": {"card": "4111"}}), None).unwrap();
    assert_eq!(value_of(&root, "card"), Some("unchanged"));
}
