//! ISO 19115 descriptor table and builders.
//!
//! A working subset of the ISO 19115 geographic metadata model: enough
//! depth for nested citations, repeatable keywords, shared responsible
//! parties and the geographic bounding box, with the role and scope code
//! lists carrying their external codes.

use meridian_core::{Result, SchemaRegistry, Standard, TypeDescriptor};

use crate::object::{FieldValue, ObjectNode, ObjectRef};

/// Root type name of an ISO 19115 record.
pub const ROOT_TYPE: &str = "MD_Metadata";

/// Registers the ISO 19115 descriptor table.
///
/// # Errors
///
/// Returns `Error::Schema` if any type is already registered.
pub fn register(registry: &mut SchemaRegistry) -> Result<()> {
    let standard = Standard::Iso19115;

    registry.register(TypeDescriptor::primitive(standard, "CharacterString"))?;
    registry.register(TypeDescriptor::primitive(standard, "Date"))?;
    registry.register(TypeDescriptor::primitive(standard, "Decimal"))?;

    registry.register(TypeDescriptor::enumeration(
        standard,
        "CI_RoleCode",
        [
            ("resourceProvider", "001"),
            ("custodian", "002"),
            ("owner", "003"),
            ("originator", "005"),
            ("pointOfContact", "007"),
            ("publisher", "010"),
            ("author", "011"),
        ],
    ))?;

    registry.register(TypeDescriptor::enumeration(
        standard,
        "MD_ScopeCode",
        [("dataset", "005"), ("series", "006"), ("service", "014")],
    ))?;

    registry.register(
        TypeDescriptor::class(standard, "CI_ResponsibleParty")
            .property("individualName", "CharacterString")
            .property("organisationName", "CharacterString")
            .property("role", "CI_RoleCode"),
    )?;

    registry.register(
        TypeDescriptor::class(standard, "CI_Citation")
            .property("title", "CharacterString")
            .repeated("alternateTitle", "CharacterString")
            .property("date", "Date"),
    )?;

    registry.register(
        TypeDescriptor::class(standard, "MD_Keywords").repeated("keyword", "CharacterString"),
    )?;

    registry.register(
        TypeDescriptor::class(standard, "EX_GeographicBoundingBox")
            .property("westBoundLongitude", "Decimal")
            .property("eastBoundLongitude", "Decimal")
            .property("southBoundLatitude", "Decimal")
            .property("northBoundLatitude", "Decimal"),
    )?;

    registry.register(
        TypeDescriptor::class(standard, "MD_Identification")
            .property("citation", "CI_Citation")
            .property("abstract", "CharacterString")
            .repeated("pointOfContact", "CI_ResponsibleParty")
            .repeated("descriptiveKeywords", "MD_Keywords"),
    )?;

    registry.register(
        TypeDescriptor::class(standard, "MD_DataIdentification")
            .with_superclass("MD_Identification")
            .repeated("topicCategory", "CharacterString")
            .property("language", "CharacterString")
            .property("extent", "EX_GeographicBoundingBox"),
    )?;

    registry.register(
        TypeDescriptor::class(standard, "MD_Distribution")
            .property("distributionFormat", "CharacterString")
            .repeated("distributor", "CI_ResponsibleParty"),
    )?;

    registry.register(
        TypeDescriptor::class(standard, ROOT_TYPE)
            .property("fileIdentifier", "CharacterString")
            .property("dateStamp", "Date")
            .property("hierarchyLevel", "MD_ScopeCode")
            .repeated("contact", "CI_ResponsibleParty")
            .property("identificationInfo", "MD_DataIdentification")
            .property("distributionInfo", "MD_Distribution"),
    )?;

    Ok(())
}

/// Creates an empty `MD_Metadata` root object.
///
/// # Errors
///
/// Returns `Error::Schema` if the table is not registered.
pub fn metadata(registry: &SchemaRegistry) -> Result<ObjectRef> {
    ObjectNode::create(registry, Standard::Iso19115, ROOT_TYPE)
}

/// Creates a responsible party with the given names and symbolic role.
///
/// # Errors
///
/// Returns `Error::Schema` if the table is not registered.
pub fn responsible_party(
    registry: &SchemaRegistry,
    individual: &str,
    organisation: &str,
    role: &str,
) -> Result<ObjectRef> {
    let party = ObjectNode::create(registry, Standard::Iso19115, "CI_ResponsibleParty")?;
    {
        let mut node = party.borrow_mut();
        node.set(registry, "individualName", FieldValue::Leaf(individual.into()))?;
        node.set(
            registry,
            "organisationName",
            FieldValue::Leaf(organisation.into()),
        )?;
        node.set(registry, "role", FieldValue::Leaf(role.into()))?;
    }
    Ok(party)
}

/// Creates a citation with a title and an ISO date (`YYYY-MM-DD`).
///
/// # Errors
///
/// Returns `Error::Schema` if the table is not registered.
pub fn citation(registry: &SchemaRegistry, title: &str, date: &str) -> Result<ObjectRef> {
    let citation = ObjectNode::create(registry, Standard::Iso19115, "CI_Citation")?;
    {
        let mut node = citation.borrow_mut();
        node.set(registry, "title", FieldValue::Leaf(title.into()))?;
        node.set(registry, "date", FieldValue::Leaf(date.into()))?;
    }
    Ok(citation)
}
