//! Record identifiers.
//!
//! A [`RecordId`] is the opaque identifier of one catalog record. Ids are
//! either assigned by the caller (a natural key carried inside the
//! metadata itself), generated fresh, or derived from record content:
//!
//! - **Generated**: ULIDs, lexicographically sortable by creation time
//! - **Content-derived**: sha-256 hex over a canonical byte rendering,
//!   so re-submitting identical content yields the same id
//! - **Caller-assigned**: any non-empty string accepted verbatim

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;
use ulid::Ulid;

use crate::error::{Error, Result};

/// The opaque identifier of a catalog record.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Creates a record id from a caller-assigned string.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidId` if the string is empty or contains
    /// whitespace.
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        if id.is_empty() {
            return Err(Error::InvalidId {
                message: "record id cannot be empty".into(),
            });
        }
        if id.chars().any(char::is_whitespace) {
            return Err(Error::InvalidId {
                message: format!("record id '{id}' contains whitespace"),
            });
        }
        Ok(Self(id))
    }

    /// Generates a new unique record id.
    ///
    /// Uses ULID generation: lexicographically sortable by creation time
    /// and globally unique without coordination.
    #[must_use]
    pub fn generate() -> Self {
        Self(Ulid::new().to_string())
    }

    /// Derives a record id from record content.
    ///
    /// Two byte-identical renderings always produce the same id, which
    /// makes content-keyed inserts idempotent.
    #[must_use]
    pub fn from_content(content: &[u8]) -> Self {
        let digest = Sha256::digest(content);
        Self(format!("{digest:x}"))
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RecordId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_unique() {
        let a = RecordId::generate();
        let b = RecordId::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn content_ids_are_stable() {
        let a = RecordId::from_content(b"lake survey 2020");
        let b = RecordId::from_content(b"lake survey 2020");
        let c = RecordId::from_content(b"lake survey 2021");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn caller_assigned_roundtrip() {
        let id = RecordId::new("urn:lake-survey-2020").unwrap();
        let parsed: RecordId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn empty_id_rejected() {
        assert!(RecordId::new("").is_err());
    }

    #[test]
    fn whitespace_id_rejected() {
        assert!(RecordId::new("lake survey").is_err());
    }
}
