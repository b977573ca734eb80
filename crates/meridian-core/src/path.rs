//! Dotted schema paths.
//!
//! A [`Path`] addresses one property location inside a record tree,
//! rooted at the record's root type: `identificationInfo.citation.title`.
//! Paths are the shared addressing scheme of the tree model and the
//! queryable-attribute registry.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// A dotted sequence of property names addressing a location in a form.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Path(String);

impl Path {
    /// Parses a path from its dotted string form.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` if the path is empty, has empty
    /// segments, or contains whitespace.
    pub fn parse(path: &str) -> Result<Self> {
        if path.is_empty() {
            return Err(Error::InvalidInput("path cannot be empty".into()));
        }
        for segment in path.split('.') {
            if segment.is_empty() {
                return Err(Error::InvalidInput(format!(
                    "path '{path}' has an empty segment"
                )));
            }
            if segment.chars().any(char::is_whitespace) {
                return Err(Error::InvalidInput(format!(
                    "path segment '{segment}' contains whitespace"
                )));
            }
        }
        Ok(Self(path.to_string()))
    }

    /// Returns the property-name segments in root-to-leaf order.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('.')
    }

    /// Returns the final (leaf) property name.
    #[must_use]
    pub fn leaf(&self) -> &str {
        self.0.rsplit('.').next().unwrap_or(&self.0)
    }

    /// Returns the parent path, or `None` for a single-segment path.
    #[must_use]
    pub fn parent(&self) -> Option<Path> {
        self.0.rfind('.').map(|idx| Self(self.0[..idx].to_string()))
    }

    /// Returns a new path with `segment` appended.
    #[must_use]
    pub fn child(&self, segment: &str) -> Path {
        Self(format!("{}.{segment}", self.0))
    }

    /// Returns the path as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Path {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
