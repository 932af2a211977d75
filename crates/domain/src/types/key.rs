//! Registry identity of a metric

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use super::PointTags;
use crate::constants::TAGS_KEY_SEPARATOR;

/// Identity of a metric: its name plus point tags.
///
/// Equality and hashing use the encoded form (`name` when untagged,
/// otherwise `name-tags=<sorted JSON>`), so two keys built from the same name
/// and the same tags compare equal regardless of tag insertion order. Cloning
/// is cheap.
#[derive(Debug, Clone)]
pub struct MetricKey {
    name: Arc<str>,
    tags: PointTags,
    encoded: Arc<str>,
}

impl MetricKey {
    /// Key for `name` with `tags`.
    #[must_use]
    pub fn new(name: impl Into<String>, tags: PointTags) -> Self {
        let name: String = name.into();
        let encoded = if tags.is_empty() {
            name.clone()
        } else {
            format!("{name}{TAGS_KEY_SEPARATOR}{}", tags.encode())
        };

        Self { name: Arc::from(name), tags, encoded: Arc::from(encoded) }
    }

    /// Key without point tags.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self::new(name, PointTags::new())
    }

    /// Metric name without tags.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Point tags of this key.
    #[must_use]
    pub fn tags(&self) -> &PointTags {
        &self.tags
    }

    /// Deterministic registry key string.
    #[must_use]
    pub fn encoded(&self) -> &str {
        &self.encoded
    }

    /// A key identifies something only when its name is not blank.
    #[must_use]
    pub fn has_identity(&self) -> bool {
        !self.name.trim().is_empty()
    }
}

impl PartialEq for MetricKey {
    fn eq(&self, other: &Self) -> bool {
        self.encoded == other.encoded
    }
}

impl Eq for MetricKey {}

impl Hash for MetricKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.encoded.hash(state);
    }
}

impl fmt::Display for MetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encoded)
    }
}

impl From<&str> for MetricKey {
    fn from(name: &str) -> Self {
        Self::named(name)
    }
}
