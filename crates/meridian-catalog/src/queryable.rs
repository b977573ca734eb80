//! Queryable-attribute registry.
//!
//! The protocol exposes a fixed set of logical search attributes
//! (`Title`, `Subject`, ...). Each supported standard maps every
//! attribute to one or more schema paths inside its own record trees;
//! a query by logical name is translated per record using that record's
//! standard. Building the table is configuration, not computation, but
//! its completeness is load-bearing for every search, so construction
//! asserts it in debug builds and the contract tests assert it always.

use std::collections::{BTreeMap, HashMap};

use meridian_core::{Path, Standard};

/// The protocol's fixed queryable attribute set.
pub const QUERYABLE_ATTRIBUTES: [&str; 9] = [
    "Identifier",
    "Title",
    "Abstract",
    "Subject",
    "AnyText",
    "Format",
    "Modified",
    "Type",
    "BoundingBox",
];

/// Static map from logical attribute names to schema paths, per standard.
#[derive(Debug)]
pub struct QueryableRegistry {
    tables: HashMap<Standard, BTreeMap<&'static str, Vec<Path>>>,
}

impl QueryableRegistry {
    /// Builds the registry for the bundled standards.
    #[must_use]
    pub fn bundled() -> Self {
        let mut tables = HashMap::new();
        tables.insert(Standard::Iso19115, iso19115_table());
        tables.insert(Standard::DublinCore, dublin_core_table());
        let registry = Self { tables };
        debug_assert!(
            registry.missing_entries().is_empty(),
            "queryable table incomplete: {:?}",
            registry.missing_entries()
        );
        registry
    }

    /// Returns the paths registered for an attribute under a standard.
    #[must_use]
    pub fn paths(&self, standard: Standard, attribute: &str) -> Option<&[Path]> {
        self.tables
            .get(&standard)?
            .get(attribute)
            .map(Vec::as_slice)
    }

    /// Whether `attribute` is one of the protocol's queryable names.
    #[must_use]
    pub fn is_queryable(attribute: &str) -> bool {
        QUERYABLE_ATTRIBUTES.contains(&attribute)
    }

    /// Returns every (standard, attribute) pair lacking a path mapping.
    #[must_use]
    pub fn missing_entries(&self) -> Vec<(Standard, &'static str)> {
        let mut missing = Vec::new();
        for standard in Standard::all() {
            for attribute in QUERYABLE_ATTRIBUTES {
                let present = self
                    .paths(standard, attribute)
                    .is_some_and(|paths| !paths.is_empty());
                if !present {
                    missing.push((standard, attribute));
                }
            }
        }
        missing
    }
}

fn parse_paths(paths: &[&str]) -> Vec<Path> {
    paths
        .iter()
        .map(|p| Path::parse(p).expect("queryable table paths are well-formed"))
        .collect()
}

fn iso19115_table() -> BTreeMap<&'static str, Vec<Path>> {
    let mut table = BTreeMap::new();
    table.insert("Identifier", parse_paths(&["fileIdentifier"]));
    table.insert("Title", parse_paths(&["identificationInfo.citation.title"]));
    table.insert("Abstract", parse_paths(&["identificationInfo.abstract"]));
    table.insert(
        "Subject",
        parse_paths(&[
            "identificationInfo.descriptiveKeywords.keyword",
            "identificationInfo.topicCategory",
        ]),
    );
    table.insert(
        "Format",
        parse_paths(&["distributionInfo.distributionFormat"]),
    );
    table.insert("Modified", parse_paths(&["dateStamp"]));
    table.insert("Type", parse_paths(&["hierarchyLevel"]));
    table.insert(
        "BoundingBox",
        parse_paths(&[
            "identificationInfo.extent.westBoundLongitude",
            "identificationInfo.extent.southBoundLatitude",
            "identificationInfo.extent.eastBoundLongitude",
            "identificationInfo.extent.northBoundLatitude",
        ]),
    );
    let any_text = table.values().flatten().cloned().collect();
    table.insert("AnyText", any_text);
    table
}

fn dublin_core_table() -> BTreeMap<&'static str, Vec<Path>> {
    let mut table = BTreeMap::new();
    table.insert("Identifier", parse_paths(&["identifier"]));
    table.insert("Title", parse_paths(&["title"]));
    table.insert("Abstract", parse_paths(&["description"]));
    table.insert("Subject", parse_paths(&["subject"]));
    table.insert("Format", parse_paths(&["format"]));
    table.insert("Modified", parse_paths(&["date"]));
    table.insert("Type", parse_paths(&["type"]));
    table.insert("BoundingBox", parse_paths(&["spatial"]));
    let any_text = table.values().flatten().cloned().collect();
    table.insert("AnyText", any_text);
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_table_is_complete() {
        let registry = QueryableRegistry::bundled();
        assert!(registry.missing_entries().is_empty());
    }

    #[test]
    fn any_text_unions_every_path() {
        let registry = QueryableRegistry::bundled();
        for standard in Standard::all() {
            let any_text = registry.paths(standard, "AnyText").unwrap();
            let title = registry.paths(standard, "Title").unwrap();
            for path in title {
                assert!(any_text.contains(path), "AnyText must cover {path}");
            }
        }
    }

    #[test]
    fn unknown_attribute_has_no_paths() {
        let registry = QueryableRegistry::bundled();
        assert!(registry.paths(Standard::Iso19115, "Lineage").is_none());
        assert!(!QueryableRegistry::is_queryable("Lineage"));
    }

    #[test]
    fn translation_differs_per_standard() {
        let registry = QueryableRegistry::bundled();
        let iso = registry.paths(Standard::Iso19115, "Title").unwrap();
        let dc = registry.paths(Standard::DublinCore, "Title").unwrap();
        assert_ne!(iso, dc);
    }
}
