//! Document expansion
//!
//! Before insertion, the document may need to grow: a repeated field backed
//! by an array in the incoming data can have fewer elements than the array
//! has entries. Expansion finds the fields whose composed template puts the
//! value directly in an array, groups them by template, and clones the last
//! element of a short group until the counts match.

use std::collections::VecDeque;

use serde_json::Value;
use tracing::debug;

use super::{contribution_chain, resolve_options, Element, NodePath};
use crate::config::{ExpandPolicy, Options};
use crate::path::{follow, Step};
use crate::template::{compose, TemplateError};

/// Grow the document to fit array-shaped data.
pub fn expand(root: &mut Element, data: &Value, settings: &Options) -> Result<(), TemplateError> {
    if resolve_options(settings, root).expand == ExpandPolicy::Never {
        return Ok(());
    }

    // First pass fixes the group order; each group is re-scanned before it
    // is expanded because earlier expansions shift sibling positions.
    let keys: Vec<String> = array_slot_groups(root)?
        .into_iter()
        .map(|group| group.key)
        .collect();

    for key in keys {
        let Some(group) = array_slot_groups(root)?
            .into_iter()
            .find(|group| group.key == key)
        else {
            continue;
        };

        let Some(Value::Array(entries)) = follow(&group.array_path, data) else {
            continue;
        };
        if entries.len() <= group.members.len() {
            continue;
        }
        let shortfall = entries.len() - group.members.len();

        // Clone the last member and insert the copies right after it.
        let Some(last) = group.members.last() else {
            continue;
        };
        let (target_index, parent_path) = match last.split_last() {
            Some((index, parent)) => (*index, parent),
            None => continue,
        };
        let Some(parent) = root.node_mut(parent_path) else {
            continue;
        };
        let Some(template) = parent.children.get(target_index).cloned() else {
            continue;
        };
        debug!(group = %key, shortfall, "expanding document to fit data");
        for offset in 0..shortfall {
            parent
                .children
                .insert(target_index + 1 + offset, template.clone());
        }
    }
    Ok(())
}

struct SlotGroup {
    key: String,
    array_path: Vec<Step>,
    members: Vec<NodePath>,
}

/// Group named elements whose composed template has a direct array slot, by
/// template, in breadth-first document order.
fn array_slot_groups(root: &Element) -> Result<Vec<SlotGroup>, TemplateError> {
    let mut groups: Vec<SlotGroup> = Vec::new();
    let mut queue: VecDeque<NodePath> = VecDeque::new();
    queue.push_back(Vec::new());

    while let Some(path) = queue.pop_front() {
        let Some(elem) = root.node(&path) else {
            continue;
        };
        if elem.declared_name().is_some() {
            let chain = contribution_chain(root, &path);
            if let Some(composed) = compose(chain.iter().map(|c| c.name))? {
                if composed.has_array_slot() {
                    let key = composed.to_string();
                    match groups.iter().position(|group| group.key == key) {
                        Some(i) => groups[i].members.push(path.clone()),
                        None => {
                            let mut array_path = composed.slot_path();
                            array_path.pop();
                            groups.push(SlotGroup {
                                key,
                                array_path,
                                members: vec![path.clone()],
                            });
                        }
                    }
                }
            }
        }
        for index in 0..elem.children.len() {
            let mut child = path.clone();
            child.push(index);
            queue.push_back(child);
        }
    }
    Ok(groups)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: serde_json::Value) -> Element {
        serde_json::from_value(value).expect("fixture document")
    }

    #[test]
    fn test_expand_clones_trailing_element() {
        let mut root = doc(json!({
            "children": [
                {"name": "list[]", "value": ""}
            ]
        }));
        expand(&mut root, &json!({"list": ["x", "y", "z"]}), &Options::default()).unwrap();
        assert_eq!(root.children.len(), 3);
        assert_eq!(root.children[1].name.as_deref(), Some("list[]"));
    }

    #[test]
    fn test_expand_leaves_sufficient_documents_alone() {
        let mut root = doc(json!({
            "children": [
                {"name": "list[]", "value": ""},
                {"name": "list[]", "value": ""}
            ]
        }));
        expand(&mut root, &json!({"list": ["x", "y"]}), &Options::default()).unwrap();
        assert_eq!(root.children.len(), 2);
    }

    #[test]
    fn test_expand_ignores_missing_data() {
        let mut root = doc(json!({
            "children": [{"name": "list[]", "value": ""}]
        }));
        expand(&mut root, &json!({"other": true}), &Options::default()).unwrap();
        assert_eq!(root.children.len(), 1);
    }

    #[test]
    fn test_expand_never_policy() {
        let mut root = doc(json!({
            "opts": {"expand": "never"},
            "children": [{"name": "list[]", "value": ""}]
        }));
        expand(&mut root, &json!({"list": ["x", "y"]}), &Options::default()).unwrap();
        assert_eq!(root.children.len(), 1);
    }

    #[test]
    fn test_expand_clones_row_containers() {
        // The repeated element is the row container, not the leaf field.
        let mut root = doc(json!({
            "children": [
                {"name": "people[]", "opts": {}, "children": [
                    {"name": "email", "value": ""}
                ]}
            ]
        }));
        expand(
            &mut root,
            &json!({"people": [{"email": "a@x.com"}, {"email": "b@x.com"}]}),
            &Options::default(),
        )
        .unwrap();
        assert_eq!(root.children.len(), 2);
        assert_eq!(root.children[1].children[0].name.as_deref(), Some("email"));
    }
}
