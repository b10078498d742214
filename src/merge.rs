//! Structural merge engine
//!
//! Deep-merges one tree into another. Objects merge by key; how two
//! sequences merge is governed by the strategy. The `auto` strategy uses the
//! safe-merge test to decide whether an incoming array entry belongs to the
//! base array's last entry (the same logical record) or is a new entry.
//!
//! Notes:
//! - does not deal with cyclical references
//! - the safe-merge test is a best-effort guess about whether two partial
//!   records describe the same row; kept as-is because changing it changes
//!   which field layouts coalesce correctly

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Strategy to employ when merging two sequences
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeStrategy {
    /// Coalesce a single incoming entry into the last base entry when safe
    #[default]
    Auto,
    /// Always concatenate
    Concat,
    /// Merge index-wise
    Extend,
}

/// Deep-merge `incoming` into `base`.
pub fn merge(base: &mut Value, incoming: Value, strategy: MergeStrategy) {
    if arraylike(&incoming) {
        match base {
            Value::Array(items) => {
                let mut elements = elements_of(incoming);
                match strategy {
                    MergeStrategy::Concat => items.extend(elements),
                    MergeStrategy::Extend => {
                        for (i, element) in elements.into_iter().enumerate() {
                            if i < items.len() {
                                if is_composite(&items[i]) && is_composite(&element) {
                                    merge(&mut items[i], element, strategy);
                                } else {
                                    items[i] = element;
                                }
                            } else {
                                items.push(element);
                            }
                        }
                    }
                    MergeStrategy::Auto => {
                        if items.is_empty() || elements.len() > 1 {
                            items.extend(elements);
                        } else if let Some(element) = elements.pop() {
                            // One incoming entry: coalesce into the last base
                            // entry when that cannot collide with anything.
                            let last = items.len() - 1;
                            if safely(&items[last], &element) {
                                merge(&mut items[last], element, strategy);
                            } else {
                                items.push(element);
                            }
                        }
                    }
                }
            }
            // Arrays contribute index-keyed entries into an object.
            Value::Object(map) => {
                for (i, element) in elements_of(incoming).into_iter().enumerate() {
                    merge_entry(map, i.to_string(), element, strategy);
                }
            }
            // A primitive always loses to a composite.
            other => *other = incoming,
        }
    } else {
        match incoming {
            Value::Object(incoming_map) => {
                if let Value::Array(items) = base {
                    // Re-key the array by index so object keys can join it.
                    let mut map = Map::new();
                    for (i, item) in items.drain(..).enumerate() {
                        map.insert(i.to_string(), item);
                    }
                    *base = Value::Object(map);
                }
                match base {
                    Value::Object(map) => {
                        for (key, value) in incoming_map {
                            merge_entry(map, key, value, strategy);
                        }
                    }
                    other => *other = Value::Object(incoming_map),
                }
            }
            // Scalars always overwrite at the leaf; last write wins.
            scalar => *base = scalar,
        }
    }
}

fn merge_entry(map: &mut Map<String, Value>, key: String, value: Value, strategy: MergeStrategy) {
    match map.get_mut(&key) {
        Some(existing) if is_composite(existing) => merge(existing, value, strategy),
        _ => {
            map.insert(key, value);
        }
    }
}

/// Whether `incoming` could merge into `base` with zero key collisions.
///
/// Arrays never collide with arrays or mappings, in either direction. Two
/// mappings are safe only if every shared key is recursively safe; a shared
/// leaf key is a collision. Anything involving a scalar is unsafe.
pub fn safely(base: &Value, incoming: &Value) -> bool {
    match (base, incoming) {
        (Value::Array(_), Value::Array(_) | Value::Object(_)) => true,
        (Value::Object(_), Value::Array(_)) => true,
        (Value::Object(a), Value::Object(b)) => b.iter().all(|(key, bv)| match a.get(key) {
            Some(av) => safely(av, bv),
            None => true,
        }),
        _ => false,
    }
}

/// Whether a value could be converted to an array without losing data:
/// a true array, or an object whose keys are exactly `0..N-1` (in any
/// order) with an optional consistent `length` member.
pub fn arraylike(value: &Value) -> bool {
    match value {
        Value::Array(_) => true,
        Value::Object(map) => {
            let mut count = 0usize;
            let mut explicit_len = None;
            for (key, val) in map {
                if key == "length" {
                    match val.as_u64() {
                        Some(n) => explicit_len = Some(n as usize),
                        None => return false,
                    }
                } else if index_key(key).is_none() {
                    return false;
                } else {
                    count += 1;
                }
            }
            if explicit_len.is_some_and(|n| n != count) {
                return false;
            }
            (0..count).all(|i| map.contains_key(&i.to_string()))
        }
        _ => false,
    }
}

fn is_composite(value: &Value) -> bool {
    matches!(value, Value::Object(_) | Value::Array(_))
}

fn index_key(key: &str) -> Option<usize> {
    if key != "0" && (key.is_empty() || key.starts_with('0')) {
        return None;
    }
    key.parse().ok()
}

/// The elements of an array-like value in index order.
fn elements_of(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        Value::Object(mut map) => {
            let count = map.keys().filter(|k| *k != "length").count();
            (0..count)
                .map(|i| map.remove(&i.to_string()).unwrap_or(Value::Null))
                .collect()
        }
        _ => Vec::new(),
    }
}
