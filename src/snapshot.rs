// src/snapshot.rs
//! Typed access to snapshot content.
//!
//! A snapshot is whatever JSON the game server wrote: objects, lists, strings,
//! numbers, booleans, null. Accessors return `None` on any shape mismatch so the
//! heuristics above them can fall through instead of failing.
use std::collections::HashSet;

use serde_json::Value;

pub trait ValueExt {
    /// Field of an object; `None` for non-objects.
    fn field(&self, key: &str) -> Option<&Value>;
    /// Nested object fields, e.g. `["pokedex", "caught"]`.
    fn at(&self, path: &[&str]) -> Option<&Value>;
    fn list(&self) -> Option<&[Value]>;
    fn text(&self) -> Option<&str>;
    /// Non-negative integer only. Floats, negatives and booleans miss.
    fn count(&self) -> Option<u64>;
}

impl ValueExt for Value {
    fn field(&self, key: &str) -> Option<&Value> {
        self.as_object()?.get(key)
    }

    fn at(&self, path: &[&str]) -> Option<&Value> {
        path.iter().try_fold(self, |v, key| v.field(key))
    }

    fn list(&self) -> Option<&[Value]> {
        self.as_array().map(Vec::as_slice)
    }

    fn text(&self) -> Option<&str> {
        self.as_str()
    }

    fn count(&self) -> Option<u64> {
        self.as_u64()
    }
}

/// Text identity of a list element: strings by their raw text, anything else
/// by its compact JSON. `"25"` and `25` are the same element.
pub fn element_key(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Distinct elements of a list by [`element_key`].
pub fn distinct_count(items: &[Value]) -> usize {
    items.iter().map(element_key).collect::<HashSet<_>>().len()
}

/// Receives every `(key, value)` pair of every object in a tree.
pub trait Visitor {
    fn visit_entry(&mut self, key: &str, value: &Value);
}

/// Depth-first walk over the whole tree with an explicit stack, so nesting depth
/// is bounded by memory, not by the call stack. Every node is visited once.
pub fn walk<V: Visitor + ?Sized>(root: &Value, visitor: &mut V) {
    let mut stack: Vec<&Value> = vec![root];
    while let Some(node) = stack.pop() {
        match node {
            Value::Object(map) => {
                for (k, v) in map.iter().rev() {
                    visitor.visit_entry(k, v);
                    stack.push(v);
                }
            }
            Value::Array(items) => stack.extend(items.iter().rev()),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accessors_miss_on_wrong_shape() {
        let v = json!({ "pokedex": { "caught": ["a"], "caughtCount": 3 }, "n": -4, "f": 2.0, "b": true });
        assert_eq!(v.at(&["pokedex", "caught"]).and_then(ValueExt::list).map(<[Value]>::len), Some(1));
        assert_eq!(v.at(&["pokedex", "caughtCount"]).and_then(ValueExt::count), Some(3));
        assert!(v.at(&["pokedex", "caught", "deeper"]).is_none());
        assert!(v.field("n").and_then(ValueExt::count).is_none());
        assert!(v.field("f").and_then(ValueExt::count).is_none());
        assert!(v.field("b").and_then(ValueExt::count).is_none());
        assert!(json!([1, 2]).field("pokedex").is_none());
    }

    #[test]
    fn distinct_collapses_by_text() {
        let items = vec![json!("a"), json!("a"), json!("b")];
        assert_eq!(distinct_count(&items), 2);

        let mixed = vec![json!("25"), json!(25), json!({"id": 1}), json!({"id": 1}), json!(null)];
        assert_eq!(distinct_count(&mixed), 3);
    }

    struct Keys(Vec<String>);
    impl Visitor for Keys {
        fn visit_entry(&mut self, key: &str, _value: &Value) {
            self.0.push(key.to_string());
        }
    }

    #[test]
    fn walk_reaches_every_object_key() {
        let v = json!({ "a": { "b": [ { "c": 1 }, [ { "d": null } ] ] }, "e": "x" });
        let mut keys = Keys(Vec::new());
        walk(&v, &mut keys);
        keys.0.sort();
        assert_eq!(keys.0, vec!["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn walk_survives_deep_nesting() {
        let mut v = json!({ "captured": ["x"] });
        for _ in 0..5_000 {
            v = Value::Array(vec![v]);
        }
        let mut keys = Keys(Vec::new());
        walk(&v, &mut keys);
        assert_eq!(keys.0, vec!["captured"]);
        // dropping a tree this deep recurses
        std::mem::forget(v);
    }
}
