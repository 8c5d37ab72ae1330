//! Per-request option maps and layered merging.
//!
//! Options are the protocol-level knobs forwarded to the transport engine.
//! A request's final `OptionMap` is built by merging, in order, the global
//! defaults, the method defaults and the per-request overrides; later layers
//! win per key, and `Setting::Unset` removes a key inherited from an earlier
//! layer. The merged map is immutable and moved into the engine when its
//! transfer is staged.

mod defaults;
mod key;

pub use defaults::{global_defaults, method_defaults, user_agent};
pub use key::OptKey;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// One part of a multipart form body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormPart {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

/// Value of an option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptValue {
    Bool(bool),
    Int(i64),
    Text(String),
    List(Vec<String>),
    Form(Vec<FormPart>),
}

impl OptValue {
    /// Empty strings, lists and forms carry no meaning and are dropped from
    /// fingerprints.
    pub fn is_empty(&self) -> bool {
        match self {
            OptValue::Text(s) => s.is_empty(),
            OptValue::List(l) => l.is_empty(),
            OptValue::Form(f) => f.is_empty(),
            OptValue::Bool(_) | OptValue::Int(_) => false,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            OptValue::Bool(b) => Some(*b),
            OptValue::Int(i) => Some(*i != 0),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            OptValue::Int(i) => Some(*i),
            OptValue::Bool(b) => Some(i64::from(*b)),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            OptValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<bool> for OptValue {
    fn from(v: bool) -> Self {
        OptValue::Bool(v)
    }
}

impl From<i32> for OptValue {
    fn from(v: i32) -> Self {
        OptValue::Int(i64::from(v))
    }
}

impl From<i64> for OptValue {
    fn from(v: i64) -> Self {
        OptValue::Int(v)
    }
}

impl From<&str> for OptValue {
    fn from(v: &str) -> Self {
        OptValue::Text(v.to_string())
    }
}

impl From<String> for OptValue {
    fn from(v: String) -> Self {
        OptValue::Text(v)
    }
}

impl From<Vec<String>> for OptValue {
    fn from(v: Vec<String>) -> Self {
        OptValue::List(v)
    }
}

/// A layer entry: either a value or an explicit removal of an inherited value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Setting {
    Set(OptValue),
    Unset,
}

/// One merge layer (global defaults, method defaults, or request overrides).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionLayer {
    entries: BTreeMap<OptKey, Setting>,
}

impl OptionLayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: OptKey, value: impl Into<OptValue>) -> &mut Self {
        self.entries.insert(key, Setting::Set(value.into()));
        self
    }

    pub fn unset(&mut self, key: OptKey) -> &mut Self {
        self.entries.insert(key, Setting::Unset);
        self
    }

    pub fn with(mut self, key: OptKey, value: impl Into<OptValue>) -> Self {
        self.set(key, value);
        self
    }

    pub fn without(mut self, key: OptKey) -> Self {
        self.unset(key);
        self
    }

    pub fn get(&self, key: OptKey) -> Option<&Setting> {
        self.entries.get(&key)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Layers `other` over `self` at the layer level, keeping `Unset` markers.
    pub fn overlay(&mut self, other: &OptionLayer) {
        for (k, s) in &other.entries {
            self.entries.insert(*k, s.clone());
        }
    }

    /// Build a layer from named options (e.g. a `[options]` config table).
    /// Unknown names are rejected.
    pub fn from_named<'a, I>(named: I) -> Result<Self, String>
    where
        I: IntoIterator<Item = (&'a String, &'a OptValue)>,
    {
        let mut layer = OptionLayer::new();
        for (name, value) in named {
            let key: OptKey = name.parse()?;
            layer.set(key, value.clone());
        }
        Ok(layer)
    }

    fn iter(&self) -> impl Iterator<Item = (&OptKey, &Setting)> {
        self.entries.iter()
    }
}

/// Final, merged options for one transfer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionMap {
    values: BTreeMap<OptKey, OptValue>,
}

impl OptionMap {
    pub fn get(&self, key: OptKey) -> Option<&OptValue> {
        self.values.get(&key)
    }

    pub fn flag(&self, key: OptKey) -> bool {
        self.get(key).and_then(OptValue::as_bool).unwrap_or(false)
    }

    pub fn text(&self, key: OptKey) -> Option<&str> {
        self.get(key).and_then(OptValue::as_text)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Entries in key order (the order the engine applies them).
    pub fn iter(&self) -> impl Iterator<Item = (OptKey, &OptValue)> {
        self.values.iter().map(|(k, v)| (*k, v))
    }

    /// Name-keyed view without empty values, used for fingerprints.
    pub fn canonical(&self) -> BTreeMap<&'static str, &OptValue> {
        self.values
            .iter()
            .filter(|(_, v)| !v.is_empty())
            .map(|(k, v)| (k.name(), v))
            .collect()
    }
}

/// Merge layers left to right; the rightmost layer wins per key.
pub fn merge<'a, I>(layers: I) -> OptionMap
where
    I: IntoIterator<Item = &'a OptionLayer>,
{
    let mut values = BTreeMap::new();
    for layer in layers {
        for (key, setting) in layer.iter() {
            match setting {
                Setting::Set(v) => {
                    values.insert(*key, v.clone());
                }
                Setting::Unset => {
                    values.remove(key);
                }
            }
        }
    }
    OptionMap { values }
}
