use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Name of an entry in the published table, e.g. `"Turret/kP"`.
///
/// Segments are separated by `/` by convention only; the engine never splits keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Key(String);

impl Key {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Key {
    fn from(name: &str) -> Self {
        Self(name.to_owned())
    }
}

impl From<String> for Key {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl AsRef<str> for Key {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Key {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// A scalar stored under a key.
///
/// Serialized untagged so a backup file reads as plain JSON:
/// `true`, `1.5`, `"left"`. The variant order matters for deserialization:
/// JSON booleans and strings never match `Number`, and integers widen to `f64`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Boolean(bool),
    Number(f64),
    String(String),
}

/// The type of a `Value`, without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Boolean,
    Number,
    String,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean => write!(f, "boolean"),
            Self::Number => write!(f, "number"),
            Self::String => write!(f, "string"),
        }
    }
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Boolean(_) => ValueKind::Boolean,
            Self::Number(_) => ValueKind::Number,
            Self::String(_) => ValueKind::String,
        }
    }

    /// Whether this value has an exact JSON encoding. NaN and infinities do not.
    pub fn is_representable(&self) -> bool {
        match self {
            Self::Number(n) => n.is_finite(),
            _ => true,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::String(s) => write!(f, "{s:?}"),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn key_borrows_as_str_for_map_lookup() {
        let mut map = BTreeMap::new();
        map.insert(Key::from("Turret/kP"), 1);
        assert_eq!(map.get("Turret/kP"), Some(&1));
    }

    #[test]
    fn value_json_is_untagged() {
        assert_eq!(serde_json::to_string(&Value::Boolean(true)).unwrap(), "true");
        assert_eq!(serde_json::to_string(&Value::Number(1.5)).unwrap(), "1.5");
        assert_eq!(
            serde_json::to_string(&Value::from("left")).unwrap(),
            "\"left\""
        );
    }

    #[test]
    fn value_keeps_type_distinction_on_parse() {
        let b: Value = serde_json::from_str("false").unwrap();
        let n: Value = serde_json::from_str("0.0").unwrap();
        let s: Value = serde_json::from_str("\"false\"").unwrap();
        assert_eq!(b, Value::Boolean(false));
        assert_eq!(n, Value::Number(0.0));
        assert_eq!(s, Value::String("false".into()));
    }

    #[test]
    fn integer_json_widens_to_number() {
        let v: Value = serde_json::from_str("3").unwrap();
        assert_eq!(v, Value::Number(3.0));
    }

    #[test]
    fn float_precision_survives_json() {
        let original = Value::Number(0.1 + 0.2);
        let text = serde_json::to_string(&original).unwrap();
        let parsed: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, original);
    }

    #[test]
    fn non_finite_numbers_are_not_representable() {
        assert!(!Value::Number(f64::NAN).is_representable());
        assert!(!Value::Number(f64::INFINITY).is_representable());
        assert!(Value::Number(-0.0).is_representable());
        assert!(Value::from("x").is_representable());
    }

    #[test]
    fn value_kind_matches_variant() {
        assert_eq!(Value::from(true).kind(), ValueKind::Boolean);
        assert_eq!(Value::from(2.0).kind(), ValueKind::Number);
        assert_eq!(Value::from("a").kind(), ValueKind::String);
        assert_eq!(ValueKind::Number.to_string(), "number");
    }
}
