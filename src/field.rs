use serde_json::Value;

/// Sentinel shown for every absent, null, blank or empty value.
pub const NOT_AVAILABLE: &str = "not available";

/// Convert a loosely-typed metadata value into its display string.
///
/// Never fails: anything that cannot be made into a non-blank string becomes
/// [`NOT_AVAILABLE`].
pub fn normalize_field(value: Option<&Value>) -> String {
    field_text(value).unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// Like [`normalize_field`], but keeps "absent" as `None` so callers can branch on it.
pub fn field_text(value: Option<&Value>) -> Option<String> {
    let text = match value? {
        Value::Null => return None,
        Value::Array(items) => {
            // Blank elements are dropped so `[null, ""]` reads as absent.
            let parts = items
                .iter()
                .map(element_text)
                .filter(|s| !s.trim().is_empty())
                .collect::<Vec<_>>();
            if parts.is_empty() {
                return None;
            }
            parts.join(", ")
        }
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        obj @ Value::Object(_) => serde_json::to_string(obj).ok()?,
    };
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

/// Display form of an already-normalized optional string.
pub fn display(value: Option<&str>) -> &str {
    value.unwrap_or(NOT_AVAILABLE)
}

/// Plain string values only, trimmed; blank counts as absent.
pub fn scalar_text(value: Option<&Value>) -> Option<String> {
    let s = value?.as_str()?.trim();
    (!s.is_empty()).then(|| s.to_string())
}

/// Loose truthiness of a JSON value, as used for field precedence.
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn element_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        // Nested sequences flatten with a bare comma.
        Value::Array(items) => items
            .iter()
            .map(element_text)
            .filter(|s| !s.trim().is_empty())
            .collect::<Vec<_>>()
            .join(","),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn absent_values_are_not_available() {
        for v in [json!(null), json!(""), json!("   "), json!([])] {
            assert_eq!(normalize_field(Some(&v)), NOT_AVAILABLE, "value: {v}");
        }
        assert_eq!(normalize_field(None), NOT_AVAILABLE);
    }

    #[test]
    fn strings_are_trimmed_with_case_preserved() {
        assert_eq!(normalize_field(Some(&json!("  Jane Doe "))), "Jane Doe");
    }

    #[test]
    fn scalars_are_stringified() {
        assert_eq!(normalize_field(Some(&json!(42))), "42");
        assert_eq!(normalize_field(Some(&json!(true))), "true");
        assert_eq!(normalize_field(Some(&json!({"a": 1}))), r#"{"a":1}"#);
    }

    #[test]
    fn arrays_of_blanks_collapse_to_not_available() {
        assert_eq!(normalize_field(Some(&json!([null, ""]))), NOT_AVAILABLE);
        assert_eq!(normalize_field(Some(&json!(["", "", ""]))), NOT_AVAILABLE);
        assert_eq!(normalize_field(Some(&json!([" ", null, [""]]))), NOT_AVAILABLE);
        assert_eq!(normalize_field(Some(&json!(["a", "", null, "b"]))), "a, b");
        assert_eq!(normalize_field(Some(&json!(["a", ["b", "c"]]))), "a, b,c");
    }

    #[test]
    fn sequences_join_in_order() {
        proptest::proptest!(|(items in proptest::collection::vec("[A-Za-z0-9]{1,12}", 1..8))| {
            let v = Value::Array(items.iter().cloned().map(Value::String).collect());
            proptest::prop_assert_eq!(normalize_field(Some(&v)), items.join(", "));
        })
    }

    #[test]
    fn normalize_is_idempotent() {
        proptest::proptest!(|(s in "\\PC{0,32}")| {
            let once = normalize_field(Some(&Value::String(s)));
            let twice = normalize_field(Some(&Value::String(once.clone())));
            proptest::prop_assert_eq!(once, twice);
        })
    }

    #[test]
    fn truthiness_matches_precedence_rules() {
        assert!(!truthy(&json!("")));
        assert!(!truthy(&json!(0)));
        assert!(truthy(&json!([])));
        assert!(truthy(&json!("x")));
    }
}
