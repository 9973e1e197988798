use std::collections::BTreeMap;
use std::fmt;
use serde::{Deserialize, Serialize};

/// A single raw attribute value as entered by a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Number(f64),
    Text(String),
}

impl RawValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Number(_) => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            Self::Text(_) => None,
        }
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(value) => write!(f, "{}", value),
            Self::Text(text) => f.write_str(text),
        }
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i32> for RawValue {
    fn from(value: i32) -> Self {
        Self::Number(f64::from(value))
    }
}

/// Raw attribute values for one customer, keyed by attribute name.
///
/// A key may be present with a `null` value; validation treats that the same as
/// an absent key. Deserializes from a flat JSON object:
///
/// ```
/// use churnlens::RawInput;
///
/// let input: RawInput = serde_json::from_str(r#"{"Tenure": 12, "Contract": "One_year"}"#).unwrap();
/// assert_eq!(input.get("Contract").and_then(|v| v.as_str()), Some("One_year"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawInput {
    values: BTreeMap<String, Option<RawValue>>,
}

impl RawInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a value and returns the input, for building records fluently.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<RawValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<RawValue>) {
        self.values.insert(name.into(), Some(value.into()));
    }

    pub fn insert_null(&mut self, name: impl Into<String>) {
        self.values.insert(name.into(), None);
    }

    pub fn remove(&mut self, name: &str) -> Option<RawValue> {
        self.values.remove(name).flatten()
    }

    /// Returns the value for `name` when it is present and not null.
    pub fn get(&self, name: &str) -> Option<&RawValue> {
        self.values.get(name).and_then(Option::as_ref)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
