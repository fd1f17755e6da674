//! Typed component attribute bag (SPEC_FULL.md §3 "Property map", §9).
//!
//! The file format stores component properties as a free-form JSON object;
//! the kernel keeps them as a small typed map instead of passing raw
//! `serde_json::Value`s around. Keys a component kind is known to read are
//! schema-checked against that kind's expected type at load time (see
//! [`validate_properties`]); keys the kind doesn't declare pass through
//! unchecked, since they may belong to a kernel this crate doesn't ship.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::component::ComponentKind;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl PropertyValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropertyValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            PropertyValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// Keyed by short ASCII property names (e.g. `"ticks_to_settle"`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyMap(BTreeMap<String, PropertyValue>);

impl PropertyMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&PropertyValue> {
        self.0.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn set(&mut self, key: impl Into<String>, value: PropertyValue) {
        self.0.insert(key.into(), value);
    }

    pub fn get_int_or(&self, key: &str, default: i64) -> i64 {
        self.get(key).and_then(PropertyValue::as_int).unwrap_or(default)
    }

    pub fn get_bool_or(&self, key: &str, default: bool) -> bool {
        self.get(key).and_then(PropertyValue::as_bool).unwrap_or(default)
    }

    pub fn is_default(&self) -> bool {
        self.0.is_empty()
    }
}

/// The type a given kind is known to require for one of its own property
/// keys, if any. `None` means the kind doesn't declare that key, so no
/// check applies to it.
fn expected_type(kind: ComponentKind, key: &str) -> Option<&'static str> {
    match (kind, key) {
        (ComponentKind::DpdtRelay, "ticks_to_settle") => Some("int"),
        _ => None,
    }
}

/// Checks `properties` against every key `kind` is known to read. Returns
/// the first mismatch found, naming the key and the type it must be.
pub fn validate_properties(kind: ComponentKind, properties: &PropertyMap) -> Result<(), String> {
    for (key, value) in properties.iter() {
        let Some(expected) = expected_type(kind, key) else {
            continue;
        };
        let matches = match expected {
            "int" => value.as_int().is_some(),
            "bool" => value.as_bool().is_some(),
            _ => true,
        };
        if !matches {
            return Err(format!(
                "property \"{key}\" on {kind:?} must be {expected}, found {value:?}"
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_key_absent() {
        let props = PropertyMap::new();
        assert_eq!(props.get_int_or("ticks_to_settle", 10), 10);
        assert!(!props.get_bool_or("pushbutton", false));
    }

    #[test]
    fn set_then_get_roundtrips() {
        let mut props = PropertyMap::new();
        props.set("ticks_to_settle", PropertyValue::Int(25));
        assert_eq!(props.get_int_or("ticks_to_settle", 10), 25);
    }

    #[test]
    fn relay_ticks_to_settle_must_be_int() {
        let mut props = PropertyMap::new();
        props.set("ticks_to_settle", PropertyValue::Text("soon".to_string()));
        assert!(validate_properties(ComponentKind::DpdtRelay, &props).is_err());
    }

    #[test]
    fn unrelated_kind_ignores_relay_only_keys() {
        let mut props = PropertyMap::new();
        props.set("ticks_to_settle", PropertyValue::Text("soon".to_string()));
        assert!(validate_properties(ComponentKind::Switch, &props).is_ok());
    }
}
