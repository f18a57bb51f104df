//! Fully-qualified names.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A dotted, fully-qualified name such as `kiln.interop.sizeOf`.
///
/// The empty name is the root package.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FqName(String);

impl FqName {
    /// Create a name from its dotted form.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The root package.
    pub fn root() -> Self {
        Self(String::new())
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Append a segment to this name.
    pub fn child(&self, segment: &str) -> Self {
        if self.is_root() {
            Self(segment.to_string())
        } else {
            Self(format!("{}.{}", self.0, segment))
        }
    }

    /// The last segment of this name.
    pub fn short_name(&self) -> &str {
        self.0.rsplit('.').next().unwrap_or_default()
    }
}

impl fmt::Display for FqName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            write!(f, "<root>")
        } else {
            f.write_str(&self.0)
        }
    }
}

impl From<&str> for FqName {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}
