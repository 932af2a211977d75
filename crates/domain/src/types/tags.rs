//! Point tags attached to a metric name

use std::collections::btree_map;
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A single point-tag value.
///
/// Tags may be strings or numbers at the API; all of them are rendered as
/// strings on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TagValue {
    /// Integer value
    Int(i64),
    /// Floating point value
    Float(f64),
    /// Text value
    Str(String),
}

impl fmt::Display for TagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Str(v) => f.write_str(v),
        }
    }
}

impl From<&str> for TagValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for TagValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<i64> for TagValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for TagValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u32> for TagValue {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for TagValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

/// Key/value metadata attached to a metric name.
///
/// Backed by a `BTreeMap` so iteration and serialisation are always in
/// sorted key order, independent of insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PointTags(BTreeMap<String, TagValue>);

impl PointTags {
    /// Empty tag set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    ///
    /// ```rust
    /// use telemeter_domain::PointTags;
    ///
    /// let tags = PointTags::new().with("region", "us-west").with("shard", 3);
    /// assert_eq!(tags.len(), 2);
    /// ```
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<TagValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Set `key`, returning the value it replaced.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<TagValue>) -> Option<TagValue> {
        self.0.insert(key.into(), value.into())
    }

    /// Value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&TagValue> {
        self.0.get(key)
    }

    /// Number of tags.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when no tags are set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Tags in sorted key order.
    #[must_use]
    pub fn iter(&self) -> btree_map::Iter<'_, String, TagValue> {
        self.0.iter()
    }

    /// Returns `base` overlaid with `self`; on key collision `self` wins.
    #[must_use]
    pub fn merged_over(&self, base: &PointTags) -> PointTags {
        let mut merged = base.clone();
        for (key, value) in self.iter() {
            merged.0.insert(key.clone(), value.clone());
        }
        merged
    }

    /// Deterministic JSON-style encoding with sorted keys.
    ///
    /// Non-finite floats have no JSON form; they are written bare (`NaN`,
    /// `inf`, `-inf`) so each stays distinct from every other tag value.
    #[must_use]
    pub fn encode(&self) -> String {
        let mut out = String::from("{");
        for (i, (key, value)) in self.0.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            out.push_str(&to_json(key));
            out.push(':');
            match value {
                TagValue::Float(v) if !v.is_finite() => out.push_str(&v.to_string()),
                other => out.push_str(&to_json(other)),
            }
        }
        out.push('}');
        out
    }
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> String {
    // Strings, integers and finite floats always serialise
    serde_json::to_string(value).unwrap_or_default()
}

impl<K, V> FromIterator<(K, V)> for PointTags
where
    K: Into<String>,
    V: Into<TagValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl<'a> IntoIterator for &'a PointTags {
    type Item = (&'a String, &'a TagValue);
    type IntoIter = btree_map::Iter<'a, String, TagValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
