//! Dynamic form values and form state
//!
//! Form values are dynamically typed: a schema field can hold strings,
//! numbers, booleans, lists, sets, or nested maps, and a field that is
//! conditionally hidden holds an explicit `Null`. Sets and maps are
//! insertion-ordered (`indexmap`) because discriminator logic depends on
//! "the first element" of a selection being deterministic.

use indexmap::{IndexMap, IndexSet};
use serde::Serialize;

/// A single form field value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Number(f64),
    Str(String),
    List(Vec<FieldValue>),
    Set(IndexSet<String>),
    Map(IndexMap<String, FieldValue>),
}

impl FieldValue {
    /// Build a set value preserving the insertion order of `items`
    pub fn set<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FieldValue::Set(items.into_iter().map(Into::into).collect())
    }

    /// Convert a JSON value into a form value.
    ///
    /// JSON has no set type, so arrays always become `List`; schema-aware
    /// callers promote set-typed fields via [`FieldValue::set`].
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => FieldValue::Null,
            serde_json::Value::Bool(b) => FieldValue::Bool(*b),
            serde_json::Value::Number(n) => FieldValue::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => FieldValue::Str(s.clone()),
            serde_json::Value::Array(items) => {
                FieldValue::List(items.iter().map(Self::from_json).collect())
            }
            serde_json::Value::Object(obj) => FieldValue::Map(
                obj.iter()
                    .map(|(k, v)| (k.clone(), Self::from_json(v)))
                    .collect(),
            ),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_set(&self) -> Option<&IndexSet<String>> {
        match self {
            FieldValue::Set(s) => Some(s),
            _ => None,
        }
    }

    /// Length of a sequence-like value. `Null` counts as empty; scalar
    /// values have no length.
    pub fn len(&self) -> usize {
        match self {
            FieldValue::Str(s) => s.chars().count(),
            FieldValue::List(items) => items.len(),
            FieldValue::Set(items) => items.len(),
            FieldValue::Map(entries) => entries.len(),
            _ => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Str(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Str(s)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        FieldValue::Number(n)
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        FieldValue::Number(n as f64)
    }
}

/// The mutable value store backing one rendered form.
///
/// Keys follow field declaration order. All discriminator-driven resets go
/// through [`apply_discriminator_change`]; everything else only reads.
///
/// [`apply_discriminator_change`]: crate::conditional::apply_discriminator_change
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormState {
    values: IndexMap<String, FieldValue>,
}

impl FormState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.values.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<FieldValue>) {
        self.values.insert(key.into(), value.into());
    }

    /// The `protocol` discriminator of a service form, if set and non-empty
    pub fn protocol(&self) -> Option<&str> {
        self.get("protocol")
            .and_then(FieldValue::as_str)
            .filter(|p| !p.is_empty())
    }

    /// The `protocols` discriminator of a route form, if set and non-empty
    pub fn protocols(&self) -> Option<&IndexSet<String>> {
        self.get("protocols")
            .and_then(FieldValue::as_set)
            .filter(|set| !set.is_empty())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K: Into<String>, V: Into<FieldValue>> FromIterator<(K, V)> for FormState {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_preserves_insertion_order() {
        let value = FieldValue::set(["tls", "tcp", "udp"]);
        let set = value.as_set().unwrap();
        let ordered: Vec<_> = set.iter().collect();
        assert_eq!(ordered, ["tls", "tcp", "udp"]);
        assert_eq!(set.iter().next().map(String::as_str), Some("tls"));
    }

    #[test]
    fn test_from_json_arrays_become_lists() {
        let json = serde_json::json!({"hosts": ["a", "b"], "port": 80, "on": true});
        let value = FieldValue::from_json(&json);
        match value {
            FieldValue::Map(entries) => {
                assert_eq!(
                    entries.get("hosts"),
                    Some(&FieldValue::List(vec!["a".into(), "b".into()]))
                );
                assert_eq!(entries.get("port"), Some(&FieldValue::Number(80.0)));
                assert_eq!(entries.get("on"), Some(&FieldValue::Bool(true)));
            }
            other => panic!("expected map, got {:?}", other),
        }
    }

    #[test]
    fn test_len_counts_chars_and_elements() {
        assert_eq!(FieldValue::Str("héllo".into()).len(), 5);
        assert_eq!(FieldValue::List(vec!["a".into()]).len(), 1);
        assert_eq!(FieldValue::Null.len(), 0);
        assert_eq!(FieldValue::Bool(true).len(), 0);
    }

    #[test]
    fn test_form_state_discriminators() {
        let mut state = FormState::new();
        assert!(state.protocol().is_none());

        state.set("protocol", "https");
        assert_eq!(state.protocol(), Some("https"));

        state.set("protocol", "");
        assert!(state.protocol().is_none());

        state.set("protocols", FieldValue::set(["grpc", "grpcs"]));
        assert_eq!(
            state.protocols().unwrap().iter().next().map(String::as_str),
            Some("grpc")
        );
    }
}
