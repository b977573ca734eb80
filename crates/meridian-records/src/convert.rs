//! JSON rendering of record object graphs.
//!
//! The protocol wire carries records as plain JSON trees: a `type` name
//! and a `fields` map whose values are always arrays (single-valued
//! properties carry one element). Leaves are strings; nested objects
//! repeat the same shape.
//!
//! JSON cannot express aliasing, so a shared instance is rendered once
//! per occurrence; aliasing is preserved in memory and in stored forms,
//! not on the wire. Reading is tolerant: unknown properties are logged
//! and skipped, scalar payloads are coerced to strings.

use serde_json::{Map, Value};
use std::collections::HashSet;
use std::rc::Rc;

use meridian_core::{Error, Result, SchemaRegistry, Standard};

use crate::object::{FieldValue, ObjectNode, ObjectRef};

/// Renders an object graph to its wire JSON form.
#[must_use]
pub fn object_to_json(object: &ObjectRef) -> Value {
    let mut visiting = HashSet::new();
    render(object, &mut visiting)
}

fn render(object: &ObjectRef, visiting: &mut HashSet<usize>) -> Value {
    let pointer = Rc::as_ptr(object) as usize;
    if !visiting.insert(pointer) {
        // A cycle cannot be rendered in a tree; emit the type alone.
        tracing::warn!(
            type_name = object.borrow().type_name(),
            "cycle encountered while rendering record to JSON; truncating"
        );
        return serde_json::json!({
            "type": object.borrow().type_name(),
            "fields": {},
        });
    }

    let node = object.borrow();
    let mut fields = Map::new();
    for (property, values) in node.fields() {
        let rendered: Vec<Value> = values
            .iter()
            .map(|value| match value {
                FieldValue::Leaf(payload) => Value::String(payload.clone()),
                FieldValue::Object(child) => render(child, visiting),
            })
            .collect();
        fields.insert(property.to_string(), Value::Array(rendered));
    }
    drop(node);
    visiting.remove(&pointer);

    serde_json::json!({
        "type": object.borrow().type_name(),
        "fields": Value::Object(fields),
    })
}

/// Parses an object graph from its wire JSON form.
///
/// Unknown properties are logged and dropped; leaf payloads may arrive
/// as strings, numbers or booleans and are coerced to canonical strings.
///
/// # Errors
///
/// Returns `Error::Serialization` if the value is not an object or lacks
/// a `type` name, and `Error::Schema` if the type is unregistered.
pub fn object_from_json(
    registry: &SchemaRegistry,
    standard: Standard,
    value: &Value,
) -> Result<ObjectRef> {
    let map = value.as_object().ok_or_else(|| Error::Serialization {
        message: "record JSON must be an object".into(),
    })?;
    let type_name = map
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| Error::Serialization {
            message: "record JSON is missing its 'type' name".into(),
        })?;

    let object = ObjectNode::create(registry, standard, type_name)?;
    let Some(fields) = map.get("fields").and_then(Value::as_object) else {
        return Ok(object);
    };

    for (property, values) in fields {
        let Some(descriptor) = registry.property(standard, type_name, property)? else {
            tracing::warn!(
                type_name,
                property = property.as_str(),
                "unknown property in record JSON; skipping"
            );
            continue;
        };
        let target_primitive = registry
            .descriptor(standard, &descriptor.target)?
            .is_primitive();

        // Single values may arrive bare; normalize to a slice.
        let items: Vec<&Value> = match values {
            Value::Array(items) => items.iter().collect(),
            other => vec![other],
        };

        for item in items {
            let parsed = if target_primitive {
                match leaf_payload(item) {
                    Some(payload) => FieldValue::Leaf(payload),
                    None => {
                        tracing::warn!(
                            type_name,
                            property = property.as_str(),
                            "expected a leaf payload; skipping value"
                        );
                        continue;
                    }
                }
            } else {
                FieldValue::Object(object_from_json(registry, standard, item)?)
            };
            object.borrow_mut().assign(registry, property, parsed)?;
        }
    }

    Ok(object)
}

fn leaf_payload(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::nodes_equal;
    use crate::standards::{bundled_registry, dublin_core, iso19115};

    #[test]
    fn json_roundtrip_dublin_core() {
        let registry = bundled_registry();
        let record = dublin_core::record(&registry).unwrap();
        {
            let mut node = record.borrow_mut();
            node.set(&registry, "title", FieldValue::Leaf("Lake Survey 2020".into()))
                .unwrap();
            node.push(&registry, "subject", FieldValue::Leaf("lakes".into()))
                .unwrap();
            node.push(&registry, "subject", FieldValue::Leaf("water".into()))
                .unwrap();
        }

        let json = object_to_json(&record);
        let parsed = object_from_json(&registry, Standard::DublinCore, &json).unwrap();
        assert!(nodes_equal(&record, &parsed));
    }

    #[test]
    fn json_roundtrip_nested_iso() {
        let registry = bundled_registry();
        let metadata = iso19115::metadata(&registry).unwrap();
        let ident =
            ObjectNode::create(&registry, Standard::Iso19115, "MD_DataIdentification").unwrap();
        ident
            .borrow_mut()
            .set(
                &registry,
                "citation",
                FieldValue::Object(iso19115::citation(&registry, "Lake Survey", "2020-05-01").unwrap()),
            )
            .unwrap();
        metadata
            .borrow_mut()
            .set(&registry, "identificationInfo", FieldValue::Object(ident))
            .unwrap();

        let json = object_to_json(&metadata);
        let parsed = object_from_json(&registry, Standard::Iso19115, &json).unwrap();
        assert!(nodes_equal(&metadata, &parsed));
    }

    #[test]
    fn unknown_properties_are_skipped() {
        let registry = bundled_registry();
        let json = serde_json::json!({
            "type": "Record",
            "fields": {
                "title": ["Lake Survey 2020"],
                "colourScheme": ["mauve"],
            },
        });
        let parsed = object_from_json(&registry, Standard::DublinCore, &json).unwrap();
        let node = parsed.borrow();
        assert!(node.get("title").is_some());
        assert!(node.get("colourScheme").is_none());
    }

    #[test]
    fn scalar_payloads_are_coerced() {
        let registry = bundled_registry();
        let json = serde_json::json!({
            "type": "Record",
            "fields": { "title": "Bare Title", "format": [42] },
        });
        let parsed = object_from_json(&registry, Standard::DublinCore, &json).unwrap();
        let node = parsed.borrow();
        assert_eq!(node.get("title").unwrap()[0].as_leaf(), Some("Bare Title"));
        assert_eq!(node.get("format").unwrap()[0].as_leaf(), Some("42"));
    }

    #[test]
    fn missing_type_is_serialization_error() {
        let registry = bundled_registry();
        let json = serde_json::json!({ "fields": {} });
        let result = object_from_json(&registry, Standard::DublinCore, &json);
        assert!(matches!(result, Err(Error::Serialization { .. })));
    }
}
