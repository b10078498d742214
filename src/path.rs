//! Tree paths: locating a sentinel and following resolved paths
//!
//! Paths are sequences of object keys and array indices. `locate` discovers
//! where a value sits inside a tree; `follow` walks a path down a tree.

use std::collections::VecDeque;
use std::fmt;

use serde::Serialize;
use serde_json::Value;

/// One access step along a path
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Step {
    /// Array index
    Index(usize),
    /// Object key
    Key(String),
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Index(i) => write!(f, "[{}]", i),
            Step::Key(k) => f.write_str(k),
        }
    }
}

/// Render a path in dotted form, e.g. `people[0].email`.
pub fn render(path: &[Step]) -> String {
    let mut out = String::new();
    for step in path {
        if matches!(step, Step::Key(_)) && !out.is_empty() {
            out.push('.');
        }
        out.push_str(&step.to_string());
    }
    out
}

/// Locate a value inside a tree and report its access path.
///
/// Breadth-first: the root is tested first (empty path), then children level
/// by level in structural order. The first strict match wins, which makes
/// ambiguous hand-authored templates deterministic but not validated as
/// unique. `None` when the value is absent.
pub fn locate(tree: &Value, needle: &Value) -> Option<Vec<Step>> {
    let mut queue: VecDeque<(&Value, Vec<Step>)> = VecDeque::new();
    queue.push_back((tree, Vec::new()));

    while let Some((node, path)) = queue.pop_front() {
        if node == needle {
            return Some(path);
        }
        match node {
            Value::Array(items) => {
                for (i, item) in items.iter().enumerate() {
                    let mut next = path.clone();
                    next.push(Step::Index(i));
                    queue.push_back((item, next));
                }
            }
            Value::Object(map) => {
                for (key, item) in map {
                    let mut next = path.clone();
                    next.push(Step::Key(key.clone()));
                    queue.push_back((item, next));
                }
            }
            _ => {}
        }
    }
    None
}

/// Follow a path down a tree to the node it addresses.
///
/// Index steps also address object members by their decimal key, and key
/// steps address array elements when the key parses as an index: a path
/// resolved against a workspace array may land in an object in the caller's
/// data, and vice versa. A missing intermediate yields `None`.
pub fn follow<'a>(path: &[Step], tree: &'a Value) -> Option<&'a Value> {
    let mut node = tree;
    for step in path {
        node = match (step, node) {
            (Step::Index(i), Value::Array(items)) => items.get(*i)?,
            (Step::Index(i), Value::Object(map)) => map.get(&i.to_string())?,
            (Step::Key(k), Value::Object(map)) => map.get(k)?,
            (Step::Key(k), Value::Array(items)) => items.get(k.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(node)
}

/// Overwrite the node a path addresses. Returns false if the path cannot be
/// followed to an existing node.
pub fn set_at(tree: &mut Value, path: &[Step], value: Value) -> bool {
    let mut node = tree;
    for step in path {
        node = match (step, node) {
            (Step::Index(i), Value::Array(items)) => match items.get_mut(*i) {
                Some(item) => item,
                None => return false,
            },
            (Step::Index(i), Value::Object(map)) => match map.get_mut(&i.to_string()) {
                Some(item) => item,
                None => return false,
            },
            (Step::Key(k), Value::Object(map)) => match map.get_mut(k) {
                Some(item) => item,
                None => return false,
            },
            (Step::Key(k), Value::Array(items)) => {
                let index = match k.parse::<usize>() {
                    Ok(index) => index,
                    Err(_) => return false,
                };
                match items.get_mut(index) {
                    Some(item) => item,
                    None => return false,
                }
            }
            _ => return false,
        };
    }
    *node = value;
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn key(k: &str) -> Step {
        Step::Key(k.to_string())
    }

    #[test]
    fn test_locate_root() {
        let tree = json!("x");
        assert_eq!(locate(&tree, &json!("x")), Some(vec![]));
    }

    #[test]
    fn test_locate_nested() {
        let tree = json!({"people": [{"email": "a@x.com"}, {"email": "\u{fffc}"}]});
        assert_eq!(
            locate(&tree, &json!("\u{fffc}")),
            Some(vec![key("people"), Step::Index(1), key("email")])
        );
    }

    #[test]
    fn test_locate_breadth_first_prefers_shallow() {
        let tree = json!({"a": {"deep": {"x": "hit"}}, "b": "hit"});
        assert_eq!(locate(&tree, &json!("hit")), Some(vec![key("b")]));
    }

    #[test]
    fn test_locate_missing() {
        let tree = json!({"a": 1});
        assert_eq!(locate(&tree, &json!("\u{fffc}")), None);
    }

    #[test]
    fn test_follow_walks_path() {
        let tree = json!({"list": ["x", "y"]});
        let path = vec![key("list"), Step::Index(1)];
        assert_eq!(follow(&path, &tree), Some(&json!("y")));
    }

    #[test]
    fn test_follow_missing_intermediate() {
        let tree = json!({"list": ["x"]});
        assert_eq!(follow(&[key("list"), Step::Index(2)], &tree), None);
        assert_eq!(follow(&[key("other")], &tree), None);
    }

    #[test]
    fn test_follow_index_into_object() {
        let tree = json!({"rows": {"0": "a", "1": "b"}});
        let path = vec![key("rows"), Step::Index(1)];
        assert_eq!(follow(&path, &tree), Some(&json!("b")));
    }

    #[test]
    fn test_follow_key_into_array() {
        let tree = json!(["a", "b"]);
        assert_eq!(follow(&[key("1")], &tree), Some(&json!("b")));
    }

    #[test]
    fn test_set_at_overwrites() {
        let mut tree = json!({"list": ["x", "\u{fffc}"]});
        assert!(set_at(&mut tree, &[key("list"), Step::Index(1)], json!("y")));
        assert_eq!(tree, json!({"list": ["x", "y"]}));
    }

    #[test]
    fn test_set_at_missing_path() {
        let mut tree = json!({"list": ["x"]});
        assert!(!set_at(&mut tree, &[key("list"), Step::Index(5)], json!("y")));
    }

    #[test]
    fn test_render() {
        let path = vec![key("people"), Step::Index(0), key("email")];
        assert_eq!(render(&path), "people[0].email");
    }
}
