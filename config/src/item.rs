//! # Configuration Items
//!
//! Frozen, deeply immutable configuration trees.
//!
//! A loaded tree is converted once by [`freeze_configuration`] and then shared
//! by reference counting. Nothing in this module hands out mutable access.
//!
//! ## Sequence handling
//! Sequences are frozen into mappings keyed by their stringified positions
//! (`"0"`, `"1"`, ...). The frozen mapping remembers insertion order, so
//! iterating a frozen sequence still walks it positionally and mapping keys
//! come back in the order the source document declared them.

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Number, Value};
use std::collections::HashMap;
use std::fmt;
use std::ops::Index;
use std::sync::Arc;

/// A single frozen value: a scalar or a nested immutable mapping.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValue {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Map(ConfigurationItem)
}

impl ConfigValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Number(n) => n.as_i64(),
            _ => None
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => n.as_f64(),
            _ => None
        }
    }

    pub fn as_map(&self) -> Option<&ConfigurationItem> {
        match self {
            Self::Map(item) => Some(item),
            _ => None
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Looks up `key` when this value is a mapping.
    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.as_map().and_then(|item| item.get(key))
    }

    /// Converts the frozen value back into a plain JSON tree.
    ///
    /// Frozen sequences come back as objects keyed by index; the conversion
    /// is not reversed.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Bool(b) => Value::Bool(*b),
            Self::Number(n) => Value::Number(n.clone()),
            Self::String(s) => Value::String(s.clone()),
            Self::Map(item) => item.to_json()
        }
    }
}

impl Index<&str> for ConfigValue {
    type Output = ConfigValue;

    fn index(&self, key: &str) -> &Self::Output {
        match self {
            Self::Map(item) => &item[key],
            other => panic!("cannot index a non-mapping configuration value {other:?} with \"{key}\"")
        }
    }
}

impl Serialize for ConfigValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Number(n) => n.serialize(serializer),
            Self::String(s) => serializer.serialize_str(s),
            Self::Map(item) => item.serialize(serializer)
        }
    }
}

#[derive(Default)]
struct FrozenMap {
    order: Vec<String>,
    entries: HashMap<String, ConfigValue>
}

/// Immutable key to value mapping produced by a configuration load.
///
/// Cloning is cheap: clones share the same frozen storage.
#[derive(Clone, Default)]
pub struct ConfigurationItem {
    inner: Arc<FrozenMap>
}

impl ConfigurationItem {
    fn from_pairs(pairs: impl IntoIterator<Item = (String, ConfigValue)>) -> Self {
        let mut map = FrozenMap::default();
        for (key, value) in pairs {
            if map.entries.insert(key.clone(), value).is_none() {
                map.order.push(key);
            }
        }
        Self {
            inner: Arc::new(map)
        }
    }

    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.inner.entries.get(key)
    }

    /// Resolves a dotted path such as `"section.items.0"` through nested mappings.
    pub fn get_path(&self, path: &str) -> Option<&ConfigValue> {
        let mut segments = path.split('.');
        let mut current = self.get(segments.next()?)?;
        for segment in segments {
            current = current.get(segment)?;
        }
        Some(current)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.inner.entries.contains_key(key)
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.inner.order.iter().map(String::as_str)
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ConfigValue)> {
        self.inner
            .order
            .iter()
            .filter_map(|key| self.inner.entries.get(key).map(|v| (key.as_str(), v)))
    }

    pub fn len(&self) -> usize {
        self.inner.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.order.is_empty()
    }

    /// True when both handles point at the same frozen storage.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn to_json(&self) -> Value {
        let map: Map<String, Value> = self
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_json()))
            .collect();
        Value::Object(map)
    }
}

impl PartialEq for ConfigurationItem {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || self.inner.entries == other.inner.entries
    }
}

impl fmt::Debug for ConfigurationItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl Index<&str> for ConfigurationItem {
    type Output = ConfigValue;

    fn index(&self, key: &str) -> &Self::Output {
        self.get(key)
            .unwrap_or_else(|| panic!("configuration key \"{key}\" not found"))
    }
}

impl Serialize for ConfigurationItem {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (key, value) in self.iter() {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Values that can be turned into a frozen configuration value.
///
/// Implemented for raw JSON trees and for already-frozen values, for which
/// freezing is the identity.
pub trait Freeze {
    fn freeze(self) -> ConfigValue;
}

impl Freeze for Value {
    fn freeze(self) -> ConfigValue {
        freeze_configuration(self)
    }
}

impl Freeze for ConfigValue {
    fn freeze(self) -> ConfigValue {
        self
    }
}

impl Freeze for ConfigurationItem {
    fn freeze(self) -> ConfigValue {
        ConfigValue::Map(self)
    }
}

/// Recursively freezes a raw configuration tree.
///
/// - objects become [`ConfigurationItem`]s with frozen values
/// - arrays become [`ConfigurationItem`]s keyed by `"0"`, `"1"`, ...
/// - scalars pass through unchanged
pub fn freeze_configuration(value: Value) -> ConfigValue {
    match value {
        Value::Null => ConfigValue::Null,
        Value::Bool(b) => ConfigValue::Bool(b),
        Value::Number(n) => ConfigValue::Number(n),
        Value::String(s) => ConfigValue::String(s),
        Value::Object(map) => ConfigValue::Map(ConfigurationItem::from_pairs(
            map.into_iter()
                .map(|(key, value)| (key, freeze_configuration(value)))
        )),
        Value::Array(items) => ConfigValue::Map(ConfigurationItem::from_pairs(
            items
                .into_iter()
                .enumerate()
                .map(|(index, value)| (index.to_string(), freeze_configuration(value)))
        ))
    }
}

/// Freezes a tree whose root must be a mapping or a sequence.
///
/// Scalars are handed back untouched in the `Err` variant.
pub fn freeze_tree(value: Value) -> Result<ConfigurationItem, Value> {
    match value {
        Value::Object(_) | Value::Array(_) => match freeze_configuration(value) {
            ConfigValue::Map(item) => Ok(item),
            other => Err(other.to_json())
        },
        scalar => Err(scalar)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_freeze_configuration_with_dict() {
        let frozen = freeze_configuration(json!({"key": {"inner_key": "value"}}));

        let item = frozen.as_map().expect("mapping");
        assert_eq!(item.len(), 1);
        assert_eq!(item["key"]["inner_key"].as_str(), Some("value"));
        assert!(item["key"].as_map().is_some());
    }

    #[test]
    fn test_freeze_configuration_with_list() {
        let frozen = freeze_configuration(json!(["value1", {"key": "value2"}]));

        let item = frozen.as_map().expect("mapping");
        assert_eq!(item.keys().collect::<Vec<_>>(), vec!["0", "1"]);
        assert_eq!(item["0"].as_str(), Some("value1"));
        assert_eq!(item["1"]["key"].as_str(), Some("value2"));
    }

    #[test]
    fn test_freeze_configuration_with_primitive_value() {
        assert_eq!(
            freeze_configuration(json!(42)),
            ConfigValue::Number(Number::from(42))
        );
        assert_eq!(freeze_configuration(json!("text")).as_str(), Some("text"));
        assert_eq!(freeze_configuration(json!(true)).as_bool(), Some(true));
        assert!(freeze_configuration(Value::Null).is_null());
    }

    #[test]
    fn test_long_sequence_keeps_positional_order() {
        let values: Vec<i64> = (0..12).collect();
        let frozen = freeze_tree(json!(values)).unwrap();

        let keys: Vec<_> = frozen.keys().collect();
        let expected: Vec<String> = (0..12).map(|i| i.to_string()).collect();
        assert_eq!(keys, expected.iter().map(String::as_str).collect::<Vec<_>>());
        assert_eq!(frozen["10"].as_i64(), Some(10));
    }

    #[test]
    fn test_freeze_tree_rejects_scalars() {
        assert_eq!(freeze_tree(json!(42)), Err(json!(42)));
        assert_eq!(freeze_tree(Value::Null), Err(Value::Null));
        assert!(freeze_tree(json!({})).unwrap().is_empty());
    }

    #[test]
    fn test_get_path() {
        let item = freeze_tree(json!({"a": {"b": [10, {"c": "deep"}]}})).unwrap();

        assert_eq!(item.get_path("a.b.0").and_then(ConfigValue::as_i64), Some(10));
        assert_eq!(item.get_path("a.b.1.c").and_then(ConfigValue::as_str), Some("deep"));
        assert!(item.get_path("a.missing").is_none());
        assert!(item.get_path("a.b.0.x").is_none());
    }

    #[test]
    fn test_freeze_is_identity_on_frozen_values() {
        let frozen = freeze_configuration(json!({"k": [1, 2]}));
        assert_eq!(frozen.clone().freeze(), frozen);

        let item = frozen.as_map().unwrap().clone();
        let refrozen = item.clone().freeze();
        assert!(refrozen.as_map().unwrap().ptr_eq(&item));
    }

    #[test]
    fn test_mapping_keeps_declaration_order() {
        let item = freeze_tree(json!({"zeta": 1, "alpha": {"mid": 2, "beta": 3}})).unwrap();
        assert_eq!(item.keys().collect::<Vec<_>>(), vec!["zeta", "alpha"]);
        assert_eq!(
            item["alpha"].as_map().unwrap().keys().collect::<Vec<_>>(),
            vec!["mid", "beta"]
        );
        assert_eq!(
            serde_json::to_string(&item).unwrap(),
            r#"{"zeta":1,"alpha":{"mid":2,"beta":3}}"#
        );
    }

    #[test]
    fn test_equality_ignores_key_order() {
        let a = freeze_tree(json!({"x": 1, "y": 2})).unwrap();
        let b = ConfigurationItem::from_pairs(vec![
            ("y".to_string(), ConfigValue::Number(2.into())),
            ("x".to_string(), ConfigValue::Number(1.into())),
        ]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_serialize_preserves_sequence_order() {
        let item = freeze_tree(json!({"list": ["a", "b", "c"]})).unwrap();
        let rendered = serde_json::to_string(&item).unwrap();
        assert_eq!(rendered, r#"{"list":{"0":"a","1":"b","2":"c"}}"#);
    }

    #[test]
    #[should_panic(expected = "configuration key \"missing\" not found")]
    fn test_index_missing_key_panics() {
        let item = freeze_tree(json!({"present": 1})).unwrap();
        let _ = &item["missing"];
    }

    fn arb_json() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::from),
            any::<i64>().prop_map(Value::from),
            "[a-z ]{0,8}".prop_map(Value::from),
        ];
        leaf.prop_recursive(4, 48, 6, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
                prop::collection::btree_map("[a-z]{1,6}", inner, 0..6)
                    .prop_map(|m| Value::Object(m.into_iter().collect())),
            ]
        })
    }

    /// Expected shape after freezing: arrays rewritten as index-keyed objects.
    fn index_keyed(value: &Value) -> Value {
        match value {
            Value::Array(items) => Value::Object(
                items
                    .iter()
                    .enumerate()
                    .map(|(i, v)| (i.to_string(), index_keyed(v)))
                    .collect()
            ),
            Value::Object(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), index_keyed(v)))
                    .collect()
            ),
            scalar => scalar.clone()
        }
    }

    proptest! {
        #[test]
        fn test_freeze_preserves_leaves_and_keys(value in arb_json()) {
            let frozen = freeze_configuration(value.clone());
            prop_assert_eq!(frozen.to_json(), index_keyed(&value));
        }

        #[test]
        fn test_freeze_is_idempotent(value in arb_json()) {
            let frozen = freeze_configuration(value);
            let refrozen = freeze_configuration(frozen.to_json());
            prop_assert_eq!(refrozen, frozen);
        }
    }
}
