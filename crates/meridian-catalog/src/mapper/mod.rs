//! Object/tree mapper.
//!
//! Converts typed record object graphs to and from the stored tree
//! representation. The two passes are symmetric:
//!
//! - the **write path** walks an object graph and appends leaf, node and
//!   link values to a fresh [`Form`], encoding enumerations through their
//!   external-code tables and dates in canonical form;
//! - the **read path** walks a form's arena and reconstructs the object
//!   graph, re-linking aliased subtrees to a single shared instance.
//!
//! Both passes thread an explicit visited map through the recursion,
//! scoped to one form. Property-level problems (a value of the wrong
//! shape, an unknown enumeration code, an unmatchable receiving
//! property) are logged and skipped; only structural problems (an
//! unregistered root type, a form without a root) fail the call.

mod read;
mod write;

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};

use meridian_core::{Form, SchemaRegistry, Standard};
use meridian_records::ObjectRef;

use crate::error::Result;

/// Bidirectional converter between object graphs and forms.
#[derive(Clone)]
pub struct Mapper {
    registry: Arc<SchemaRegistry>,
}

impl Mapper {
    /// Creates a mapper over a shared schema registry.
    #[must_use]
    pub fn new(registry: Arc<SchemaRegistry>) -> Self {
        Self { registry }
    }

    /// Writes an object graph into a fresh form with the given title.
    ///
    /// # Errors
    ///
    /// Returns an error if the root type is unregistered or the graph
    /// violates the form's structural invariants.
    pub fn write(&self, object: &ObjectRef, title: &str) -> Result<Form> {
        write::write_form(&self.registry, object, title)
    }

    /// Reads an object graph back out of a form.
    ///
    /// # Errors
    ///
    /// Returns an error if the form has no root node or the root type is
    /// unregistered.
    pub fn read(&self, standard: Standard, form: &Form) -> Result<ObjectRef> {
        read::read_form(&self.registry, standard, form)
    }
}

/// Date layouts accepted by the lenient parser, tried in order.
const DATE_LAYOUTS: [&str; 4] = ["%Y-%m-%d", "%d-%m-%Y", "%Y/%m/%d", "%d/%m/%Y"];

/// Best-effort canonicalization of a date payload.
///
/// Timestamps normalize to RFC 3339 UTC; plain dates normalize to
/// `YYYY-MM-DD`. Returns `None` when no layout matches.
pub(crate) fn canonicalize_date(raw: &str) -> Option<String> {
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return Some(
            timestamp
                .with_timezone(&Utc)
                .to_rfc3339_opts(SecondsFormat::Secs, true),
        );
    }
    for layout in DATE_LAYOUTS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, layout) {
            return Some(date.format("%Y-%m-%d").to_string());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonicalize_accepts_several_layouts() {
        assert_eq!(canonicalize_date("2020-05-01").as_deref(), Some("2020-05-01"));
        assert_eq!(canonicalize_date("01-05-2020").as_deref(), Some("2020-05-01"));
        assert_eq!(canonicalize_date("2020/05/01").as_deref(), Some("2020-05-01"));
        assert_eq!(canonicalize_date("01/05/2020").as_deref(), Some("2020-05-01"));
    }

    #[test]
    fn canonicalize_normalizes_timestamps_to_utc() {
        let canonical = canonicalize_date("2020-05-01T12:30:00+02:00").unwrap();
        assert_eq!(canonical, "2020-05-01T10:30:00Z");
    }

    #[test]
    fn canonicalize_rejects_noise() {
        assert!(canonicalize_date("last tuesday").is_none());
        assert!(canonicalize_date("").is_none());
    }
}
