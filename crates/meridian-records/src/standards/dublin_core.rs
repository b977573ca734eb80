//! Dublin Core descriptor table and builders.
//!
//! The flat Dublin Core record: one root type with mostly repeatable
//! string properties, plus the DCMI type vocabulary as an enumeration.

use meridian_core::{Result, SchemaRegistry, Standard, TypeDescriptor};

use crate::object::{ObjectNode, ObjectRef};

/// Root type name of a Dublin Core record.
pub const ROOT_TYPE: &str = "Record";

/// Registers the Dublin Core descriptor table.
///
/// # Errors
///
/// Returns `Error::Schema` if any type is already registered.
pub fn register(registry: &mut SchemaRegistry) -> Result<()> {
    let standard = Standard::DublinCore;

    registry.register(TypeDescriptor::primitive(standard, "CharacterString"))?;
    registry.register(TypeDescriptor::primitive(standard, "Date"))?;

    registry.register(TypeDescriptor::enumeration(
        standard,
        "DCMIType",
        [
            ("collection", "Collection"),
            ("dataset", "Dataset"),
            ("service", "Service"),
            ("text", "Text"),
        ],
    ))?;

    registry.register(
        TypeDescriptor::class(standard, ROOT_TYPE)
            .property("identifier", "CharacterString")
            .property("title", "CharacterString")
            .repeated("creator", "CharacterString")
            .repeated("subject", "CharacterString")
            .property("description", "CharacterString")
            .repeated("publisher", "CharacterString")
            .property("format", "CharacterString")
            .property("date", "Date")
            .property("type", "DCMIType")
            .repeated("spatial", "CharacterString"),
    )?;

    Ok(())
}

/// Creates an empty Dublin Core record object.
///
/// # Errors
///
/// Returns `Error::Schema` if the table is not registered.
pub fn record(registry: &SchemaRegistry) -> Result<ObjectRef> {
    ObjectNode::create(registry, Standard::DublinCore, ROOT_TYPE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::FieldValue;
    use crate::standards::bundled_registry;

    #[test]
    fn dcmi_type_codes() {
        let registry = bundled_registry();
        let dcmi = registry.descriptor(Standard::DublinCore, "DCMIType").unwrap();
        assert_eq!(dcmi.code_for("dataset"), Some("Dataset"));
        assert_eq!(dcmi.name_for_code("Text"), Some("text"));
    }

    #[test]
    fn subject_is_repeatable() {
        let registry = bundled_registry();
        let rec = record(&registry).unwrap();
        rec.borrow_mut()
            .push(&registry, "subject", FieldValue::Leaf("lakes".into()))
            .unwrap();
        rec.borrow_mut()
            .push(&registry, "subject", FieldValue::Leaf("water".into()))
            .unwrap();
        assert_eq!(rec.borrow().get("subject").unwrap().len(), 2);
    }
}
