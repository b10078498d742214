//! Extraction integration tests
//!
//! End-to-end coverage of the read direction: documents in, data trees out.

mod fixtures;

use fixtures::{doc, people_form};
use formtree::{extract, MergeStrategy, OptionsOverlay};
use serde_json::json;

#[test]
fn test_rows_coalesce_into_one_object_per_row() {
    let data = extract(&people_form(), None).unwrap();
    assert_eq!(
        data,
        json!({"people": [
            {"name": "Ada", "email": "a@x.com"},
            {"name": "Grace", "email": "b@x.com"}
        ]})
    );
}

#[test]
fn test_concat_strategy_keeps_contributions_separate() {
    let overrides = OptionsOverlay {
        merge: Some(MergeStrategy::Concat),
        ..Default::default()
    };
    let data = extract(&people_form(), Some(&overrides)).unwrap();
    assert_eq!(
        data,
        json!({"people": [
            {"name": "Ada"},
            {"email": "a@x.com"},
            {"name": "Grace"},
            {"email": "b@x.com"}
        ]})
    );
}

#[test]
fn test_dotted_and_bracketed_names_nest() {
    let root = doc(json!({
        "children": [
            {"name": "server.host", "value": "localhost"},
            {"name": "server[port]", "value": "8080"},
            {"name": "server.tls.enabled", "value": "true"}
        ]
    }));
    assert_eq!(
        extract(&root, None).unwrap(),
        json!({"server": {"host": "localhost", "port": 8080, "tls": {"enabled": true}}})
    );
}

#[test]
fn test_ancestor_names_wrap_field_contributions() {
    let root = doc(json!({
        "name": "company",
        "children": [
            {"name": "departments[]", "children": [
                {"name": "title", "value": "Research"},
                {"name": "members[]", "value": "ada"},
                {"name": "members[]", "value": "grace"}
            ]}
        ]
    }));
    assert_eq!(
        extract(&root, None).unwrap(),
        json!({"company": {"departments": [
            {"title": "Research", "members": ["ada", "grace"]}
        ]}})
    );
}

#[test]
fn test_toggled_off_section_is_skipped() {
    let root = doc(json!({
        "children": [
            {"name": "billing", "opts": {"role": "toggleable"}, "children": [
                {"kind": "checkbox", "opts": {"role": "toggle"}, "value": ""},
                {"name": "card", "value": "4111"}
            ]},
            {"name": "note", "value": "keep"}
        ]
    }));
    assert_eq!(extract(&root, None).unwrap(), json!({"note": "keep"}));
}

#[test]
fn test_toggled_on_section_contributes() {
    let root = doc(json!({
        "children": [
            {"name": "billing", "opts": {"role": "toggleable"}, "children": [
                {"kind": "checkbox", "opts": {"role": "toggle"}, "value": "on"},
                {"name": "card", "value": "4111"}
            ]}
        ]
    }));
    assert_eq!(
        extract(&root, None).unwrap(),
        json!({"billing": {"card": "4111"}})
    );
}

#[test]
fn test_unchecked_checkbox_is_omitted() {
    let root = doc(json!({
        "children": [
            {"name": "subscribed", "kind": "checkbox", "opts": {"type": "boolean"}, "value": ""},
            {"name": "name", "value": "Ada"}
        ]
    }));
    assert_eq!(extract(&root, None).unwrap(), json!({"name": "Ada"}));
}

#[test]
fn test_checked_checkbox_extracts_true() {
    let root = doc(json!({
        "children": [
            {"name": "subscribed", "kind": "checkbox", "opts": {"type": "boolean"}, "value": "on"}
        ]
    }));
    assert_eq!(extract(&root, None).unwrap(), json!({"subscribed": true}));
}

#[test]
fn test_list_type_splits_values() {
    let root = doc(json!({
        "children": [
            {"name": "tags", "opts": {"type": "list"}, "value": "red, green, blue"}
        ]
    }));
    assert_eq!(
        extract(&root, None).unwrap(),
        json!({"tags": ["red", "green", "blue"]})
    );
}

#[test]
fn test_empty_include_option_keeps_field() {
    let root = doc(json!({
        "children": [
            {"name": "note", "opts": {"empty": "include"}, "value": ""},
            {"name": "skipped", "kind": "checkbox", "value": ""}
        ]
    }));
    assert_eq!(extract(&root, None).unwrap(), json!({"note": ""}));
}

#[test]
fn test_templated_name_escape_hatch() {
    let root = doc(json!({
        "children": [
            {"name": "{\"custom\":[$$$]}", "value": "entry"}
        ]
    }));
    assert_eq!(extract(&root, None).unwrap(), json!({"custom": ["entry"]}));
}

#[test]
fn test_number_type_encodes_nan_as_null() {
    let root = doc(json!({
        "children": [
            {"name": "price", "opts": {"type": "number", "empty": "include"}, "value": "not a price"}
        ]
    }));
    assert_eq!(extract(&root, None).unwrap(), json!({"price": null}));
}
