//! Record projection by element set.
//!
//! All detail levels derive from one resolver: the full projection is
//! built from a record's search document, and brief/summary/named
//! subsets are copied from it field by field. Unknown names in a named
//! subset are ignored.

use serde_json::{Map, Value};

use meridian_catalog::SearchDocument;

use crate::protocol::ElementSet;

/// Elements of the brief projection.
const BRIEF_ELEMENTS: [&str; 3] = ["Identifier", "Title", "Type"];

/// Elements added by the summary projection.
const SUMMARY_ELEMENTS: [&str; 7] = [
    "Identifier",
    "Title",
    "Type",
    "Subject",
    "Format",
    "Modified",
    "Abstract",
];

/// Projects a search document to the requested detail level.
#[must_use]
pub fn project(document: &SearchDocument, element_set: &ElementSet) -> Value {
    let full = full_projection(document);
    let selected: Map<String, Value> = match element_set {
        ElementSet::Full => full,
        ElementSet::Brief => copy_elements(&full, &BRIEF_ELEMENTS),
        ElementSet::Summary => copy_elements(&full, &SUMMARY_ELEMENTS),
        ElementSet::Named(names) => {
            let names: Vec<&str> = names.iter().map(String::as_str).collect();
            copy_elements(&full, &names)
        }
    };
    Value::Object(selected)
}

/// The full projection: identifier, title and every populated queryable.
fn full_projection(document: &SearchDocument) -> Map<String, Value> {
    let mut full = Map::new();
    full.insert(
        "Identifier".to_string(),
        Value::String(document.id.to_string()),
    );
    full.insert("Title".to_string(), Value::String(document.title.clone()));
    for (attribute, value) in &document.fields {
        if attribute == "AnyText" {
            continue;
        }
        full.entry(attribute.clone())
            .or_insert_with(|| Value::String(value.clone()));
    }
    full
}

fn copy_elements(full: &Map<String, Value>, names: &[&str]) -> Map<String, Value> {
    let mut selected = Map::new();
    for name in names {
        if let Some(value) = full.get(*name) {
            selected.insert((*name).to_string(), value.clone());
        }
    }
    selected
}
