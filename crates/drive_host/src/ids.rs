//! Canonicalization of backend identifier shapes.
//!
//! The backend encodes ids inconsistently: bare strings, `{ "$oid": … }` wrappers, or whole
//! documents carrying `_id`/`id`. Every id comparison in the client goes through
//! [`normalize_id`] first.

use serde_json::Value;

/// Nesting depth past which a wrapper is treated as unresolvable.
const MAX_ID_NESTING: usize = 8;

/// Keys probed, in order, when an id arrives wrapped in an object.
const ID_KEYS: [&str; 3] = ["$oid", "_id", "id"];

/// Resolves any supported id shape to its canonical string key.
///
/// Tries the value as a direct string, then the wrapper's `$oid`, then `_id`, then `id`,
/// recursing into nested wrappers. Numbers are accepted as their decimal text. Returns `None`
/// for `null`, empty/whitespace-only strings, and shapes with no resolvable id.
pub fn normalize_id(value: &Value) -> Option<String> {
    normalize_at_depth(value, 0)
}

fn normalize_at_depth(value: &Value, depth: usize) -> Option<String> {
    if depth > MAX_ID_NESTING {
        return None;
    }
    match value {
        Value::String(raw) => normalize_id_str(raw),
        Value::Number(number) => Some(number.to_string()),
        Value::Object(map) => ID_KEYS
            .iter()
            .filter_map(|key| map.get(*key))
            .find_map(|inner| normalize_at_depth(inner, depth + 1)),
        _ => None,
    }
}

/// Normalizes an id that is already a string.
pub fn normalize_id_str(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Compares two id values after normalization. Unresolvable ids never compare equal.
pub fn same_id(a: &Value, b: &Value) -> bool {
    match (normalize_id(a), normalize_id(b)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn normalize_id_matches_expected_cases() {
        let cases = [
            (json!("abc"), Some("abc")),
            (json!("  abc "), Some("abc")),
            (json!(""), None),
            (json!("   "), None),
            (Value::Null, None),
            (json!({"$oid": "65f0"}), Some("65f0")),
            (json!({"_id": {"$oid": "65f1"}}), Some("65f1")),
            (json!({"_id": "65f2", "name": "Docs"}), Some("65f2")),
            (json!({"id": "65f3"}), Some("65f3")),
            (json!({"_id": "", "id": "fallback"}), Some("fallback")),
            (json!({"name": "no id"}), None),
            (json!(42), Some("42")),
            (json!(true), None),
            (json!(["a"]), None),
        ];

        for (input, expected) in cases {
            assert_eq!(
                normalize_id(&input).as_deref(),
                expected,
                "input={input:?}"
            );
        }
    }

    #[test]
    fn normalize_is_idempotent_for_every_shape() {
        let inputs = [
            json!(" x1 "),
            json!({"$oid": "x2"}),
            json!({"_id": {"$oid": "x3"}}),
            json!({"id": 7}),
            Value::Null,
            json!({}),
        ];
        for input in inputs {
            let once = normalize_id(&input);
            let twice = once
                .clone()
                .map(Value::String)
                .and_then(|v| normalize_id(&v));
            assert_eq!(once, twice, "input={input:?}");
        }
    }

    #[test]
    fn deeply_nested_wrappers_stop_resolving() {
        let mut value = json!("deep");
        for _ in 0..20 {
            value = json!({ "_id": value });
        }
        assert_eq!(normalize_id(&value), None);
    }

    #[test]
    fn same_id_normalizes_both_sides() {
        assert!(same_id(&json!({"$oid": "f1"}), &json!("f1")));
        assert!(!same_id(&Value::Null, &Value::Null));
        assert!(!same_id(&json!("f1"), &json!("f2")));
    }
}
