//! Shallow-mergeable view props.

use serde_json::{Map, Value};

use crate::error::PropsError;

/// Key/value props handed to a rendered view.
///
/// Merging is shallow: a key present in the incoming props replaces the whole
/// value stored under that key, nested objects included.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Props(Map<String, Value>);

impl Props {
    /// Create empty props.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Insert a single prop, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    /// Get a prop by key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Get a string prop by key.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// Check if a prop is set.
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Shallow-merge `other` into `self`; `other` wins on conflicting keys.
    pub fn merge(&mut self, other: &Props) {
        for (key, value) in &other.0 {
            self.0.insert(key.clone(), value.clone());
        }
    }

    /// Create new props by merging `overlay` on top of `self`.
    pub fn merged(&self, overlay: &Props) -> Props {
        let mut result = self.clone();
        result.merge(overlay);
        result
    }

    /// Number of props.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if there are no props.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over props in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Convert into a JSON object value.
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<Map<String, Value>> for Props {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl TryFrom<Value> for Props {
    type Error = PropsError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            Value::Null => Ok(Self::default()),
            Value::Bool(_) => Err(PropsError::NotAnObject("bool")),
            Value::Number(_) => Err(PropsError::NotAnObject("number")),
            Value::String(_) => Err(PropsError::NotAnObject("string")),
            Value::Array(_) => Err(PropsError::NotAnObject("array")),
        }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Props {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_merge_is_shallow_and_overlay_wins() {
        let base = Props::try_from(json!({"title": "a", "style": {"bold": true}})).unwrap();
        let overlay = Props::try_from(json!({"style": {"italic": true}, "body": "b"})).unwrap();

        let merged = base.merged(&overlay);
        assert_eq!(merged.get_str("title"), Some("a"));
        assert_eq!(merged.get_str("body"), Some("b"));
        assert_eq!(merged.get("style"), Some(&json!({"italic": true})));
    }

    #[test]
    fn test_null_is_empty_props() {
        assert!(Props::try_from(Value::Null).unwrap().is_empty());
    }

    #[test]
    fn test_non_object_is_rejected() {
        assert_eq!(
            Props::try_from(json!([1, 2])),
            Err(PropsError::NotAnObject("array"))
        );
    }

    #[test]
    fn test_from_iter_and_builder() {
        let props: Props = [("a", 1), ("b", 2)].into_iter().collect();
        assert_eq!(props.len(), 2);

        let built = Props::new().with("a", 1).with("b", 2);
        assert_eq!(props, built);
    }
}
