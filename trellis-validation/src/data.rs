// Dot-path access into validation input

use crate::Input;
use serde_json::{Map, Value};

/// Resolve a dot-notation path (`address.city`, `items.0.sku`) against the
/// input. An exact top-level key match wins over segment traversal. Any
/// missing segment yields `None`.
pub fn get<'a>(data: &'a Input, path: &str) -> Option<&'a Value> {
    if let Some(value) = data.get(path) {
        return Some(value);
    }

    let mut segments = path.split('.');
    let mut current = data.get(segments.next()?)?;

    for segment in segments {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }

    Some(current)
}

/// Copy the value at `path` from `source` into `target`, giving every
/// container along the way the kind it has in `source`: objects stay
/// objects and arrays keep their indices, earlier slots padded with null.
/// A literal top-level key is copied as is. Returns `false` when the path
/// does not resolve.
pub fn copy_path(source: &Input, target: &mut Input, path: &str) -> bool {
    if let Some(value) = source.get(path) {
        target.insert(path.to_string(), value.clone());
        return true;
    }
    if get(source, path).is_none() {
        return false;
    }

    let segments: Vec<&str> = path.split('.').collect();
    let (head, rest) = (segments[0], &segments[1..]);
    match source.get(head) {
        Some(value) => {
            let slot = target.entry(head.to_string()).or_insert(Value::Null);
            copy_into(value, slot, rest);
            true
        }
        None => false,
    }
}

fn copy_into(source: &Value, slot: &mut Value, segments: &[&str]) {
    let Some((segment, rest)) = segments.split_first() else {
        *slot = source.clone();
        return;
    };

    match source {
        Value::Object(map) => {
            let Some(child) = map.get(*segment) else {
                return;
            };
            if !slot.is_object() {
                *slot = Value::Object(Map::new());
            }
            if let Value::Object(out) = slot {
                let next = out.entry(segment.to_string()).or_insert(Value::Null);
                copy_into(child, next, rest);
            }
        }
        Value::Array(items) => {
            let Some((index, child)) = segment
                .parse::<usize>()
                .ok()
                .and_then(|index| items.get(index).map(|child| (index, child)))
            else {
                return;
            };
            if !slot.is_array() {
                *slot = Value::Array(Vec::new());
            }
            if let Value::Array(out) = slot {
                if out.len() <= index {
                    out.resize(index + 1, Value::Null);
                }
                copy_into(child, &mut out[index], rest);
            }
        }
        _ => {}
    }
}

/// Whether a value counts as absent for non-implicit rules
pub fn is_absent(value: &Value) -> bool {
    value.is_null()
}

/// String form of a scalar used by membership and equality style rules
pub fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
