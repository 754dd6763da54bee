//! Message ordering keys.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Totally-ordered, globally unique identity key of a message.
///
/// Serials are opaque strings whose lexicographic order is the single total
/// order of the room: any two messages can be compared for relative
/// position. The `before`/`after` predicates are both derived from the one
/// `Ord` implementation so search and merge logic share the same order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Serial(String);

impl Serial {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True if this serial sorts strictly before `other`.
    pub fn before(&self, other: &Serial) -> bool {
        self.cmp(other) == Ordering::Less
    }

    /// True if this serial sorts strictly after `other`.
    pub fn after(&self, other: &Serial) -> bool {
        self.cmp(other) == Ordering::Greater
    }
}

impl fmt::Display for Serial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Serial {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for Serial {
    fn from(value: String) -> Self {
        Self(value)
    }
}
