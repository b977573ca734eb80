//! Mapper read path: form to object graph.

use std::collections::HashMap;

use meridian_core::{Form, SchemaRegistry, Standard, TypeKind, ValueId, ValueNode};
use meridian_records::{FieldValue, ObjectNode, ObjectRef};

use crate::error::{CatalogError, Result};
use crate::metrics::record_skipped_property;

/// Reconstructs the object graph stored in `form`.
pub(crate) fn read_form(
    registry: &SchemaRegistry,
    standard: Standard,
    form: &Form,
) -> Result<ObjectRef> {
    let root_value = form
        .roots()
        .find(|v| matches!(v.node, ValueNode::Node { .. }))
        .ok_or_else(|| CatalogError::mapping("form has no root node"))?;
    let ValueNode::Node { type_name } = &root_value.node else {
        return Err(CatalogError::mapping("form root is not a node"));
    };

    let root_object = ObjectNode::create(registry, standard, type_name)?;
    // Constructed values, keyed by arena id; links resolve against this.
    // The writer never emits forward references, so a link's target is
    // always constructed before the link is visited.
    let mut constructed: HashMap<ValueId, ObjectRef> = HashMap::new();
    constructed.insert(root_value.id, root_object.clone());

    read_children(
        registry,
        standard,
        form,
        root_value.id,
        &root_object,
        &mut constructed,
    )?;
    Ok(root_object)
}

fn read_children(
    registry: &SchemaRegistry,
    standard: Standard,
    form: &Form,
    parent_id: ValueId,
    parent_object: &ObjectRef,
    constructed: &mut HashMap<ValueId, ObjectRef>,
) -> Result<()> {
    for child in form.children_of(parent_id) {
        let property = child.path.leaf();
        match &child.node {
            ValueNode::Leaf { type_name, payload } => {
                let decoded = decode_leaf(registry, standard, type_name, payload);
                assign(registry, standard, parent_object, property, FieldValue::Leaf(decoded));
            }
            ValueNode::Node { type_name } => {
                let child_object = match ObjectNode::create(registry, standard, type_name) {
                    Ok(object) => object,
                    Err(error) => {
                        tracing::warn!(
                            type_name = type_name.as_str(),
                            %error,
                            "cannot instantiate stored node type; skipping subtree"
                        );
                        record_skipped_property("read");
                        continue;
                    }
                };
                constructed.insert(child.id, child_object.clone());
                read_children(registry, standard, form, child.id, &child_object, constructed)?;
                assign(
                    registry,
                    standard,
                    parent_object,
                    property,
                    FieldValue::Object(child_object),
                );
            }
            ValueNode::Link { target } => match constructed.get(target) {
                Some(target_object) => {
                    assign(
                        registry,
                        standard,
                        parent_object,
                        property,
                        FieldValue::Object(target_object.clone()),
                    );
                }
                None => {
                    tracing::warn!(
                        target = %target,
                        "link target not yet constructed; skipping"
                    );
                    record_skipped_property("read");
                }
            },
        }
    }
    Ok(())
}

/// Assigns a value to the receiving property, searching for the property
/// name with fallbacks: exact, pluralized, singularized. Superclass
/// properties are covered by the registry's chain walk. A value whose
/// property cannot be matched is logged and dropped.
fn assign(
    registry: &SchemaRegistry,
    standard: Standard,
    parent: &ObjectRef,
    property: &str,
    value: FieldValue,
) {
    let parent_type = parent.borrow().type_name().to_string();
    let plural = format!("{property}s");
    let mut candidates = vec![property, plural.as_str()];
    if let Some(singular) = property.strip_suffix('s') {
        candidates.push(singular);
    }

    for candidate in candidates {
        let known = matches!(
            registry.property(standard, &parent_type, candidate),
            Ok(Some(_))
        );
        if known {
            if let Err(error) = parent.borrow_mut().assign(registry, candidate, value) {
                tracing::warn!(
                    parent = parent_type.as_str(),
                    property = candidate,
                    %error,
                    "failed to assign property; dropping value"
                );
                record_skipped_property("read");
            }
            return;
        }
    }

    tracing::warn!(
        parent = parent_type.as_str(),
        property,
        "no receiving property after fallbacks; dropping value"
    );
    record_skipped_property("read");
}

/// Decodes a stored leaf payload back to its symbolic form.
fn decode_leaf(
    registry: &SchemaRegistry,
    standard: Standard,
    type_name: &str,
    payload: &str,
) -> String {
    let Ok(descriptor) = registry.descriptor(standard, type_name) else {
        tracing::warn!(type_name, "unknown leaf type; keeping payload verbatim");
        return payload.to_string();
    };
    if let TypeKind::Enumeration(_) = descriptor.kind {
        match descriptor.name_for_code(payload) {
            Some(name) => return name.to_string(),
            None => {
                tracing::warn!(
                    type_name,
                    code = payload,
                    "unknown enumeration code; keeping payload verbatim"
                );
                return payload.to_string();
            }
        }
    }
    if descriptor.name == "Date" {
        if let Some(canonical) = super::canonicalize_date(payload) {
            return canonical;
        }
        tracing::warn!(value = payload, "unparsable stored date; keeping verbatim");
    }
    payload.to_string()
}
