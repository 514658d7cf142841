// src/forecast/definitions/permission.rs
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Per-period flags computed by the backend. Missing flags mean "not allowed".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionConfig {
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub post_allowed: bool,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub save_allowed: bool,
}

// The backend sends 0/1, but booleans and numeric strings show up too.
fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(flag_from_value(&value))
}

fn flag_from_value(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => {
            let s = s.trim();
            s.eq_ignore_ascii_case("true") || s.parse::<f64>().is_ok_and(|f| f != 0.0)
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_numeric_flags() {
        let p: PermissionConfig =
            serde_json::from_str(r#"{"post_allowed": 1, "save_allowed": 0}"#).unwrap();
        assert!(p.post_allowed);
        assert!(!p.save_allowed);
    }

    #[test]
    fn reads_loose_flags() {
        let p: PermissionConfig =
            serde_json::from_str(r#"{"post_allowed": "1", "save_allowed": true}"#).unwrap();
        assert!(p.post_allowed && p.save_allowed);
        let p: PermissionConfig =
            serde_json::from_str(r#"{"post_allowed": null, "save_allowed": "no"}"#).unwrap();
        assert!(!p.post_allowed && !p.save_allowed);
    }

    #[test]
    fn missing_flags_deny() {
        let p: PermissionConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(p, PermissionConfig::default());
    }
}
