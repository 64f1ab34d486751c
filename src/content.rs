//! Helpers for navigating and combining [`ParsedContent`]
//!
//! Keys are addressed with dotted paths (`train.optimizer.lr`); a numeric
//! segment indexes into a sequence when reading.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::loader::ParsedContent;

/// Look up a dotted key.
///
/// A top-level key that literally contains dots wins over path traversal.
pub fn lookup<'a>(content: &'a ParsedContent, key: &str) -> Option<&'a Value> {
    if let Some(value) = content.get(key) {
        return Some(value);
    }

    let mut segments = key.split('.');
    let mut current = content.get(segments.next()?)?;
    for segment in segments {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Insert `value` under a dotted key, creating intermediate mappings.
///
/// Non-mapping values found on the way are replaced.
pub fn insert_path(target: &mut ParsedContent, key: &str, value: Value) {
    match key.split_once('.') {
        None => {
            target.insert(key.to_string(), value);
        }
        Some((head, rest)) => {
            let slot = target
                .entry(head.to_string())
                .or_insert_with(|| Value::Object(ParsedContent::new()));
            if !slot.is_object() {
                *slot = Value::Object(ParsedContent::new());
            }
            if let Value::Object(child) = slot {
                insert_path(child, rest, value);
            }
        }
    }
}

/// Merge `source` into `target`.
///
/// Mappings present on both sides merge recursively; any other value from
/// `source` overwrites the one in `target`.
pub fn deep_merge(target: &mut ParsedContent, source: ParsedContent) {
    for (key, value) in source {
        match (target.get_mut(&key), value) {
            (Some(Value::Object(existing)), Value::Object(incoming)) => {
                deep_merge(existing, incoming);
            }
            (_, value) => {
                target.insert(key, value);
            }
        }
    }
}

/// Flatten nested mappings into dotted keys.
///
/// Sequences and empty mappings are leaves.
pub fn flatten(content: &ParsedContent) -> BTreeMap<String, Value> {
    fn walk(prefix: &str, content: &ParsedContent, out: &mut BTreeMap<String, Value>) {
        for (key, value) in content {
            let path = if prefix.is_empty() {
                key.clone()
            } else {
                format!("{}.{}", prefix, key)
            };
            match value {
                Value::Object(child) if !child.is_empty() => walk(&path, child, out),
                leaf => {
                    out.insert(path, leaf.clone());
                }
            }
        }
    }

    let mut out = BTreeMap::new();
    walk("", content, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn content(value: Value) -> ParsedContent {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    #[test]
    fn test_lookup() {
        let c = content(json!({
            "lr": 0.1,
            "train": {"epochs": 5, "layers": [64, 32]},
            "a.b": "literal"
        }));
        assert_eq!(lookup(&c, "lr"), Some(&json!(0.1)));
        assert_eq!(lookup(&c, "train.epochs"), Some(&json!(5)));
        assert_eq!(lookup(&c, "train.layers.1"), Some(&json!(32)));
        assert_eq!(lookup(&c, "a.b"), Some(&json!("literal")));
        assert_eq!(lookup(&c, "train.missing"), None);
        assert_eq!(lookup(&c, "lr.x"), None);
        assert_eq!(lookup(&c, "train.layers.x"), None);
    }

    #[test]
    fn test_insert_path() {
        let mut c = ParsedContent::new();
        insert_path(&mut c, "train.optimizer.lr", json!(0.1));
        insert_path(&mut c, "train.epochs", json!(5));
        insert_path(&mut c, "seed", json!(1));
        assert_eq!(
            Value::Object(c.clone()),
            json!({"train": {"optimizer": {"lr": 0.1}, "epochs": 5}, "seed": 1})
        );

        // Scalars in the way are replaced
        insert_path(&mut c, "seed.value", json!(2));
        assert_eq!(c["seed"], json!({"value": 2}));
    }

    #[test]
    fn test_deep_merge() {
        let mut target = content(json!({"train": {"lr": 0.1, "epochs": 5}, "seed": 1}));
        deep_merge(
            &mut target,
            content(json!({"train": {"epochs": 10, "batch": 32}, "seed": {"value": 2}})),
        );
        assert_eq!(
            Value::Object(target),
            json!({"train": {"lr": 0.1, "epochs": 10, "batch": 32}, "seed": {"value": 2}})
        );
    }

    #[test]
    fn test_flatten() {
        let c = content(json!({
            "lr": 0.1,
            "train": {"epochs": 5, "opt": {"name": "adam"}},
            "layers": [64, 32],
            "empty": {}
        }));
        let flat = flatten(&c);
        let keys: Vec<&str> = flat.keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            vec!["empty", "layers", "lr", "train.epochs", "train.opt.name"]
        );
        assert_eq!(flat["layers"], json!([64, 32]));
        assert_eq!(flat["empty"], json!({}));
    }
}
