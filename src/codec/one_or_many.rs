//! Serde helpers for fields whose runtime shape varies.
//!
//! [`OneOrMany`] accepts either a single value or a list of them. It is the
//! adapter the XML codec puts on every repeatable element, since a node
//! tree built from XML cannot tell one child from a list of one. SPDX JSON
//! uses it for license fields that producers write as a string or an array.
//!
//! The `lenient_*` functions decode a sequence element by element and drop
//! (with a warning) the entries whose shape does not match, so a single
//! malformed record never fails the whole document.

use serde::de::{DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};

/// A single value or a list of values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    /// Flatten into a list, whichever shape was present.
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Self::One(value) => vec![value],
            Self::Many(values) => values,
        }
    }

    /// Pick the tightest shape for writing: nothing, a scalar, or a list.
    pub fn from_vec(mut values: Vec<T>) -> Option<Self> {
        match values.len() {
            0 => None,
            1 => values.pop().map(Self::One),
            _ => Some(Self::Many(values)),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::One(_) => 1,
            Self::Many(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> Default for OneOrMany<T> {
    fn default() -> Self {
        Self::Many(Vec::new())
    }
}

impl<T> IntoIterator for OneOrMany<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.into_vec().into_iter()
    }
}

/// Short type name for log messages.
fn record_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    full.rsplit("::").next().unwrap_or(full)
}

fn decode_each<T: DeserializeOwned>(raw: Vec<serde_json::Value>) -> Vec<T> {
    let what = record_name::<T>();
    raw.into_iter()
        .enumerate()
        .filter_map(|(index, value)| match serde_json::from_value(value) {
            Ok(item) => Some(item),
            Err(e) => {
                tracing::warn!("Skipping malformed {} entry #{}: {}", what, index, e);
                None
            }
        })
        .collect()
}

/// `deserialize_with` target for a JSON array of records.
///
/// A `null` or missing field yields an empty list.
pub fn lenient_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw = Option::<Vec<serde_json::Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(decode_each(raw))
}

/// `deserialize_with` target for a field that may hold one record or many.
pub fn lenient_one_or_many<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw = Option::<OneOrMany<serde_json::Value>>::deserialize(deserializer)?
        .map(OneOrMany::into_vec)
        .unwrap_or_default();
    Ok(decode_each(raw))
}

/// `deserialize_with` target for an optional record that is dropped, not
/// fatal, when malformed.
pub fn lenient_option<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let Some(raw) = Option::<serde_json::Value>::deserialize(deserializer)? else {
        return Ok(None);
    };
    Ok(decode_each(vec![raw]).pop())
}
