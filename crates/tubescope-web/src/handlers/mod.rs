//! HTTP handlers for all web routes.

pub mod channels;
pub mod dashboard;
pub mod keywords;
pub mod videos;

use serde_json::Value;
use tubescope_common::error::ApiError;
use tubescope_common::listing::lenient_number;

/// Largest page any listing will return.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Fallback for known paths hit with the wrong method.
pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

/// Trimmed, non-empty string parameter.
pub(crate) fn non_empty(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}

/// A numeric JSON field sent either as a number or as a string.
pub(crate) fn json_number(value: Option<&Value>, default: i64) -> i64 {
    match value {
        Some(Value::Number(n)) => match n.as_f64() {
            Some(f) if f.is_finite() && f != 0.0 => f.trunc() as i64,
            _ => default,
        },
        Some(Value::String(s)) => lenient_number(Some(s), default),
        _ => default,
    }
}

pub(crate) fn require_channel_id(raw: Option<&str>) -> Result<&str, ApiError> {
    non_empty(raw).ok_or_else(|| ApiError::BadRequest("Channel ID is required".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_number() {
        assert_eq!(json_number(Some(&json!(30)), 0), 30);
        assert_eq!(json_number(Some(&json!("90")), 0), 90);
        assert_eq!(json_number(Some(&json!("abc")), 5), 5);
        assert_eq!(json_number(Some(&json!(null)), 5), 5);
        assert_eq!(json_number(None, 20), 20);
    }

    #[test]
    fn test_require_channel_id() {
        assert_eq!(require_channel_id(Some(" UC1 ")).unwrap(), "UC1");
        assert!(require_channel_id(Some("  ")).is_err());
        assert!(require_channel_id(None).is_err());
    }
}
