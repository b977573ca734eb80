//! Harvested-record conversion.
//!
//! Peers return records as flat attribute projections. Storage goes
//! through the same insert path as Transaction/Insert, which takes typed
//! record JSON, so each projection is first translated into a record of
//! the output schema's standard. Missing attributes are simply omitted;
//! enumeration payloads arrive as stored codes and are decoded back to
//! symbolic names where the code is known.

use serde_json::{json, Map, Value};

use meridian_core::{SchemaRegistry, Standard};

/// Translates one harvested projection into wire record JSON.
pub(crate) fn projection_to_record(
    registry: &SchemaRegistry,
    standard: Standard,
    projection: &Value,
) -> Value {
    match standard {
        Standard::DublinCore => dublin_core_record(registry, projection),
        Standard::Iso19115 => iso_record(registry, projection),
    }
}

fn attribute<'v>(projection: &'v Value, name: &str) -> Option<&'v str> {
    projection.get(name).and_then(Value::as_str)
}

fn split_list(value: &str) -> Vec<Value> {
    value
        .split(", ")
        .filter(|part| !part.is_empty())
        .map(|part| Value::String(part.to_string()))
        .collect()
}

fn decode_enum(registry: &SchemaRegistry, standard: Standard, type_name: &str, code: &str) -> String {
    registry
        .descriptor(standard, type_name)
        .ok()
        .and_then(|descriptor| descriptor.name_for_code(code))
        .map_or_else(|| code.to_string(), str::to_string)
}

fn dublin_core_record(registry: &SchemaRegistry, projection: &Value) -> Value {
    let mut fields = Map::new();
    let mut leaf = |property: &str, attribute_name: &str| {
        if let Some(value) = attribute(projection, attribute_name) {
            fields.insert(property.to_string(), json!([value]));
        }
    };
    leaf("identifier", "Identifier");
    leaf("title", "Title");
    leaf("description", "Abstract");
    leaf("format", "Format");
    leaf("date", "Modified");

    if let Some(subjects) = attribute(projection, "Subject") {
        fields.insert("subject".to_string(), Value::Array(split_list(subjects)));
    }
    if let Some(kind) = attribute(projection, "Type") {
        let symbolic = decode_enum(registry, Standard::DublinCore, "DCMIType", kind);
        fields.insert("type".to_string(), json!([symbolic]));
    }
    if let Some(bounds) = attribute(projection, "BoundingBox") {
        fields.insert("spatial".to_string(), Value::Array(split_list(bounds)));
    }

    json!({ "type": "Record", "fields": Value::Object(fields) })
}

fn iso_record(registry: &SchemaRegistry, projection: &Value) -> Value {
    let mut fields = Map::new();
    if let Some(identifier) = attribute(projection, "Identifier") {
        fields.insert("fileIdentifier".to_string(), json!([identifier]));
    }
    if let Some(modified) = attribute(projection, "Modified") {
        fields.insert("dateStamp".to_string(), json!([modified]));
    }
    if let Some(kind) = attribute(projection, "Type") {
        let symbolic = decode_enum(registry, Standard::Iso19115, "MD_ScopeCode", kind);
        fields.insert("hierarchyLevel".to_string(), json!([symbolic]));
    }

    let mut identification = Map::new();
    if let Some(title) = attribute(projection, "Title") {
        identification.insert(
            "citation".to_string(),
            json!([{ "type": "CI_Citation", "fields": { "title": [title] } }]),
        );
    }
    if let Some(summary) = attribute(projection, "Abstract") {
        identification.insert("abstract".to_string(), json!([summary]));
    }
    if let Some(subjects) = attribute(projection, "Subject") {
        identification.insert(
            "descriptiveKeywords".to_string(),
            json!([{
                "type": "MD_Keywords",
                "fields": { "keyword": Value::Array(split_list(subjects)) },
            }]),
        );
    }
    if let Some(bounds) = attribute(projection, "BoundingBox") {
        let parts = split_list(bounds);
        // Bounds are joined west, south, east, north.
        if parts.len() == 4 {
            identification.insert(
                "extent".to_string(),
                json!([{
                    "type": "EX_GeographicBoundingBox",
                    "fields": {
                        "westBoundLongitude": [parts[0].clone()],
                        "southBoundLatitude": [parts[1].clone()],
                        "eastBoundLongitude": [parts[2].clone()],
                        "northBoundLatitude": [parts[3].clone()],
                    },
                }]),
            );
        }
    }
    if !identification.is_empty() {
        fields.insert(
            "identificationInfo".to_string(),
            json!([{ "type": "MD_DataIdentification", "fields": Value::Object(identification) }]),
        );
    }
    if let Some(format) = attribute(projection, "Format") {
        fields.insert(
            "distributionInfo".to_string(),
            json!([{ "type": "MD_Distribution", "fields": { "distributionFormat": [format] } }]),
        );
    }

    json!({ "type": "MD_Metadata", "fields": Value::Object(fields) })
}
