//! Time helpers shared across host contracts and adapters.

#[cfg(not(target_arch = "wasm32"))]
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::DateTime;
use serde_json::Value;

/// Returns the current unix timestamp in milliseconds.
pub fn unix_time_ms_now() -> i64 {
    #[cfg(target_arch = "wasm32")]
    {
        js_sys::Date::now().max(0.0) as i64
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as i64
    }
}

/// Parses a backend timestamp into unix milliseconds.
///
/// Accepts RFC 3339 strings (`2024-05-01T10:00:00.000Z`), unix-millisecond numbers, numeric
/// strings, and `{ "$date": … }` wrappers.
pub fn parse_timestamp_ms(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().map(|ms| ms as i64)),
        Value::String(raw) => {
            let raw = raw.trim();
            DateTime::parse_from_rfc3339(raw)
                .map(|parsed| parsed.timestamp_millis())
                .ok()
                .or_else(|| raw.parse::<i64>().ok())
        }
        Value::Object(map) => map.get("$date").and_then(parse_timestamp_ms),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn parses_supported_timestamp_shapes() {
        assert_eq!(
            parse_timestamp_ms(&json!("2024-05-01T10:00:00.000Z")),
            Some(1_714_557_600_000)
        );
        assert_eq!(
            parse_timestamp_ms(&json!("2024-05-01T12:00:00+02:00")),
            Some(1_714_557_600_000)
        );
        assert_eq!(parse_timestamp_ms(&json!(1_700_000_000_000_i64)), Some(1_700_000_000_000));
        assert_eq!(parse_timestamp_ms(&json!("1700000000000")), Some(1_700_000_000_000));
        assert_eq!(
            parse_timestamp_ms(&json!({"$date": "2024-05-01T10:00:00Z"})),
            Some(1_714_557_600_000)
        );
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_timestamp_ms(&json!("yesterday")), None);
        assert_eq!(parse_timestamp_ms(&Value::Null), None);
        assert_eq!(parse_timestamp_ms(&json!([1])), None);
    }

    #[test]
    fn clock_is_after_2020() {
        assert!(unix_time_ms_now() > 1_577_836_800_000);
    }
}
