//! Mapper write path: object graph to form.

use std::collections::HashMap;
use std::rc::Rc;

use meridian_core::{Form, Path, SchemaRegistry, TypeDescriptor, TypeKind, ValueId};
use meridian_records::{FieldValue, ObjectRef};

use crate::error::{CatalogError, Result};
use crate::metrics::record_skipped_property;

/// Writes `object` (and everything reachable from it) into a new form.
pub(crate) fn write_form(
    registry: &SchemaRegistry,
    object: &ObjectRef,
    title: &str,
) -> Result<Form> {
    let (standard, root_type) = {
        let node = object.borrow();
        (node.standard(), node.type_name().to_string())
    };
    // Fails fast if the root type is unregistered.
    registry.descriptor(standard, &root_type)?;

    let mut form = Form::new(title);
    let root_path = Path::parse(&root_type)
        .map_err(|e| CatalogError::mapping(format!("root type is not a valid path: {e}")))?;
    let root_id = form.push_node(None, root_path, &root_type)?;

    // The visited map is scoped to this call: one map per form write.
    let mut visited: HashMap<usize, ValueId> = HashMap::new();
    visited.insert(Rc::as_ptr(object) as usize, root_id);

    write_children(registry, &mut form, object, root_id, None, &mut visited)?;
    Ok(form)
}

fn write_children(
    registry: &SchemaRegistry,
    form: &mut Form,
    object: &ObjectRef,
    parent: ValueId,
    prefix: Option<&Path>,
    visited: &mut HashMap<usize, ValueId>,
) -> Result<()> {
    let node = object.borrow();
    let standard = node.standard();
    let chain = registry.superclass_chain(standard, node.type_name())?;

    // Base-class properties first, declaration order within each type,
    // so sibling ordinals come out deterministic.
    for descriptor in chain.iter().rev() {
        for property in &descriptor.properties {
            let Some(values) = node.get(&property.name) else {
                continue;
            };
            let child_path = match prefix {
                Some(parent_path) => parent_path.child(&property.name),
                None => Path::parse(&property.name)?,
            };
            let target = registry.descriptor(standard, &property.target)?;

            for value in values {
                match value {
                    FieldValue::Leaf(payload) => {
                        if !target.is_primitive() {
                            tracing::warn!(
                                property = property.name.as_str(),
                                target = property.target.as_str(),
                                "leaf payload on a structured property; skipping"
                            );
                            record_skipped_property("write");
                            continue;
                        }
                        let encoded = encode_leaf(target, payload);
                        form.push_leaf(Some(parent), child_path.clone(), &property.target, encoded)?;
                    }
                    FieldValue::Object(child) => {
                        if target.is_primitive() {
                            tracing::warn!(
                                property = property.name.as_str(),
                                target = property.target.as_str(),
                                "structured value on a primitive property; skipping"
                            );
                            record_skipped_property("write");
                            continue;
                        }
                        let pointer = Rc::as_ptr(child) as usize;
                        if let Some(&existing) = visited.get(&pointer) {
                            // Shared instance: alias the earlier value
                            // instead of recursing again.
                            form.push_link(Some(parent), child_path.clone(), existing)?;
                        } else {
                            let child_type = child.borrow().type_name().to_string();
                            let child_id = form.push_node(
                                Some(parent),
                                child_path.clone(),
                                &child_type,
                            )?;
                            visited.insert(pointer, child_id);
                            write_children(
                                registry,
                                form,
                                child,
                                child_id,
                                Some(&child_path),
                                visited,
                            )?;
                        }
                    }
                }
            }
        }
    }
    Ok(())
}

/// Encodes a leaf payload into its canonical stored string.
fn encode_leaf(target: &TypeDescriptor, payload: &str) -> String {
    if let TypeKind::Enumeration(_) = target.kind {
        match target.code_for(payload) {
            Some(code) => return code.to_string(),
            None => {
                tracing::warn!(
                    type_name = target.name.as_str(),
                    value = payload,
                    "unknown enumeration value; storing verbatim"
                );
                return payload.to_string();
            }
        }
    }
    if target.name == "Date" {
        match super::canonicalize_date(payload) {
            Some(canonical) => return canonical,
            None => {
                tracing::warn!(value = payload, "unparsable date; storing verbatim");
                return payload.to_string();
            }
        }
    }
    payload.to_string()
}
