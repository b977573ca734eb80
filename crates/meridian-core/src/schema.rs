//! Schema registry: standards, type descriptors and enumeration codes.
//!
//! The registry is the process-wide table mapping a (standard, type name)
//! pair to a [`TypeDescriptor`]: its ordered properties, its superclass
//! chain and, for enumerations, the discrete legal values with their
//! external codes. It is populated once at startup by explicit
//! registration calls and read-only thereafter; components receive it by
//! shared reference.
//!
//! Property lookup walks the superclass chain, so a property declared on
//! a base type is visible from every derived type. Path resolution
//! follows property targets segment by segment and always resolves
//! inside exactly one standard.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::error::{Error, Result};
use crate::path::Path;

/// A supported metadata vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Standard {
    /// ISO 19115 geographic metadata.
    Iso19115,
    /// Dublin Core.
    DublinCore,
}

impl Standard {
    /// Returns the canonical name of the standard.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Iso19115 => "ISO-19115",
            Self::DublinCore => "DublinCore",
        }
    }

    /// Parses a standard from its canonical name.
    ///
    /// # Errors
    ///
    /// Returns `Error::Schema` for an unknown name.
    pub fn parse(name: &str) -> Result<Self> {
        match name {
            "ISO-19115" => Ok(Self::Iso19115),
            "DublinCore" => Ok(Self::DublinCore),
            other => Err(Error::schema(format!("unknown standard '{other}'"))),
        }
    }

    /// All bundled standards.
    #[must_use]
    pub const fn all() -> [Standard; 2] {
        [Self::Iso19115, Self::DublinCore]
    }
}

impl fmt::Display for Standard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One legal value of an enumeration type, with its external code.
///
/// The symbolic name is what typed records carry in memory; the code is
/// the canonical string stored in forms and on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumValue {
    /// Symbolic name (e.g. `pointOfContact`).
    pub name: String,
    /// External code (e.g. `010`).
    pub code: String,
}

/// Classification of a type descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TypeKind {
    /// A structured type with properties.
    Class,
    /// A leaf type whose values are canonical strings.
    Primitive,
    /// A closed set of legal values with external codes.
    Enumeration(Vec<EnumValue>),
}

/// A property of a type: name, target type and multiplicity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDescriptor {
    /// Property name.
    pub name: String,
    /// Name of the target type, within the same standard.
    pub target: String,
    /// Whether the property may hold multiple values.
    pub repeatable: bool,
}

/// A registered type: identity, properties and superclass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeDescriptor {
    /// The standard this type belongs to.
    pub standard: Standard,
    /// Type name, unique within the standard.
    pub name: String,
    /// Classification (class, primitive or enumeration).
    pub kind: TypeKind,
    /// Superclass name, if the type derives from another.
    pub superclass: Option<String>,
    /// Ordered list of declared properties (excluding inherited ones).
    pub properties: Vec<PropertyDescriptor>,
}

impl TypeDescriptor {
    /// Creates a structured (class) descriptor with no properties yet.
    #[must_use]
    pub fn class(standard: Standard, name: impl Into<String>) -> Self {
        Self {
            standard,
            name: name.into(),
            kind: TypeKind::Class,
            superclass: None,
            properties: Vec::new(),
        }
    }

    /// Creates a primitive (leaf) descriptor.
    #[must_use]
    pub fn primitive(standard: Standard, name: impl Into<String>) -> Self {
        Self {
            standard,
            name: name.into(),
            kind: TypeKind::Primitive,
            superclass: None,
            properties: Vec::new(),
        }
    }

    /// Creates an enumeration descriptor from (name, code) pairs.
    #[must_use]
    pub fn enumeration<N, C>(
        standard: Standard,
        name: impl Into<String>,
        values: impl IntoIterator<Item = (N, C)>,
    ) -> Self
    where
        N: Into<String>,
        C: Into<String>,
    {
        Self {
            standard,
            name: name.into(),
            kind: TypeKind::Enumeration(
                values
                    .into_iter()
                    .map(|(name, code)| EnumValue {
                        name: name.into(),
                        code: code.into(),
                    })
                    .collect(),
            ),
            superclass: None,
            properties: Vec::new(),
        }
    }

    /// Sets the superclass name.
    #[must_use]
    pub fn with_superclass(mut self, superclass: impl Into<String>) -> Self {
        self.superclass = Some(superclass.into());
        self
    }

    /// Appends a single-valued property.
    #[must_use]
    pub fn property(mut self, name: impl Into<String>, target: impl Into<String>) -> Self {
        self.properties.push(PropertyDescriptor {
            name: name.into(),
            target: target.into(),
            repeatable: false,
        });
        self
    }

    /// Appends a repeatable property.
    #[must_use]
    pub fn repeated(mut self, name: impl Into<String>, target: impl Into<String>) -> Self {
        self.properties.push(PropertyDescriptor {
            name: name.into(),
            target: target.into(),
            repeatable: true,
        });
        self
    }

    /// Whether values of this type are leaves (canonical strings).
    ///
    /// A type with zero properties, or marked as an enumeration, maps to
    /// a leaf value.
    #[must_use]
    pub fn is_primitive(&self) -> bool {
        match self.kind {
            TypeKind::Primitive | TypeKind::Enumeration(_) => true,
            TypeKind::Class => self.properties.is_empty(),
        }
    }

    /// For an enumeration, returns the external code of a symbolic name.
    #[must_use]
    pub fn code_for(&self, name: &str) -> Option<&str> {
        match &self.kind {
            TypeKind::Enumeration(values) => values
                .iter()
                .find(|v| v.name == name)
                .map(|v| v.code.as_str()),
            _ => None,
        }
    }

    /// For an enumeration, returns the symbolic name of an external code.
    #[must_use]
    pub fn name_for_code(&self, code: &str) -> Option<&str> {
        match &self.kind {
            TypeKind::Enumeration(values) => values
                .iter()
                .find(|v| v.code == code)
                .map(|v| v.name.as_str()),
            _ => None,
        }
    }

    /// Returns a declared property by exact name (no superclass walk).
    #[must_use]
    pub fn declared_property(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.properties.iter().find(|p| p.name == name)
    }
}

/// Process-wide table of registered type descriptors.
///
/// Built once at startup; every lookup after construction is read-only.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    types: HashMap<(Standard, String), TypeDescriptor>,
}

impl SchemaRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a type descriptor.
    ///
    /// # Errors
    ///
    /// Returns `Error::Schema` if a descriptor with the same
    /// (standard, name) key is already registered.
    pub fn register(&mut self, descriptor: TypeDescriptor) -> Result<()> {
        let key = (descriptor.standard, descriptor.name.clone());
        if self.types.contains_key(&key) {
            return Err(Error::schema(format!(
                "type '{}' already registered for {}",
                key.1, key.0
            )));
        }
        self.types.insert(key, descriptor);
        Ok(())
    }

    /// Looks up a descriptor by standard and type name.
    ///
    /// # Errors
    ///
    /// Returns `Error::Schema` if the type is not registered.
    pub fn descriptor(&self, standard: Standard, name: &str) -> Result<&TypeDescriptor> {
        self.types
            .get(&(standard, name.to_string()))
            .ok_or_else(|| Error::schema(format!("unknown type '{name}' in {standard}")))
    }

    /// Returns the descriptor chain from `name` up through its
    /// superclasses, most derived first.
    ///
    /// # Errors
    ///
    /// Returns `Error::Schema` if any type in the chain is unregistered.
    pub fn superclass_chain(&self, standard: Standard, name: &str) -> Result<Vec<&TypeDescriptor>> {
        let mut chain = Vec::new();
        let mut current = Some(name.to_string());
        while let Some(type_name) = current {
            let descriptor = self.descriptor(standard, &type_name)?;
            // A cycle in superclass declarations would loop forever.
            if chain
                .iter()
                .any(|d: &&TypeDescriptor| d.name == descriptor.name)
            {
                return Err(Error::schema(format!(
                    "superclass cycle at '{}' in {standard}",
                    descriptor.name
                )));
            }
            current = descriptor.superclass.clone();
            chain.push(descriptor);
        }
        Ok(chain)
    }

    /// Finds a property by name on a type, walking up the superclass
    /// chain if it is not declared on the most derived type.
    ///
    /// # Errors
    ///
    /// Returns `Error::Schema` if the type (or a superclass) is
    /// unregistered; an absent property returns `Ok(None)`.
    pub fn property(
        &self,
        standard: Standard,
        type_name: &str,
        property: &str,
    ) -> Result<Option<&PropertyDescriptor>> {
        for descriptor in self.superclass_chain(standard, type_name)? {
            if let Some(found) = descriptor.declared_property(property) {
                return Ok(Some(found));
            }
        }
        Ok(None)
    }

    /// Resolves a dotted path from a root type to its property chain.
    ///
    /// Every segment must name a property reachable from the previous
    /// segment's target type (superclass properties included).
    ///
    /// # Errors
    ///
    /// Returns `Error::Schema` if any segment fails to resolve.
    pub fn resolve_path(
        &self,
        standard: Standard,
        root_type: &str,
        path: &Path,
    ) -> Result<Vec<&PropertyDescriptor>> {
        let mut chain = Vec::new();
        let mut current_type = root_type.to_string();
        for segment in path.segments() {
            let property = self
                .property(standard, &current_type, segment)?
                .ok_or_else(|| {
                    Error::schema(format!(
                        "path '{path}' does not resolve: no property '{segment}' on '{current_type}' in {standard}"
                    ))
                })?;
            current_type = property.target.clone();
            chain.push(property);
        }
        Ok(chain)
    }

    /// Returns every descriptor registered for a standard, sorted by name.
    #[must_use]
    pub fn types_for(&self, standard: Standard) -> Vec<&TypeDescriptor> {
        let mut types: Vec<_> = self
            .types
            .values()
            .filter(|d| d.standard == standard)
            .collect();
        types.sort_by(|a, b| a.name.cmp(&b.name));
        types
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_registry() -> SchemaRegistry {
        let mut registry = SchemaRegistry::new();
        registry
            .register(TypeDescriptor::primitive(Standard::Iso19115, "CharacterString"))
            .unwrap();
        registry
            .register(TypeDescriptor::enumeration(
                Standard::Iso19115,
                "RoleCode",
                [("pointOfContact", "010"), ("author", "011")],
            ))
            .unwrap();
        registry
            .register(
                TypeDescriptor::class(Standard::Iso19115, "Citation")
                    .property("title", "CharacterString")
                    .repeated("alternateTitle", "CharacterString"),
            )
            .unwrap();
        registry
            .register(
                TypeDescriptor::class(Standard::Iso19115, "Identification")
                    .property("citation", "Citation")
                    .property("role", "RoleCode"),
            )
            .unwrap();
        registry
            .register(
                TypeDescriptor::class(Standard::Iso19115, "DataIdentification")
                    .with_superclass("Identification")
                    .property("spatialResolution", "CharacterString"),
            )
            .unwrap();
        registry
    }

    #[test]
    fn duplicate_registration_rejected() {
        let mut registry = sample_registry();
        let result = registry.register(TypeDescriptor::class(Standard::Iso19115, "Citation"));
        assert!(result.is_err());
    }

    #[test]
    fn primitive_classification() {
        let registry = sample_registry();
        assert!(registry
            .descriptor(Standard::Iso19115, "CharacterString")
            .unwrap()
            .is_primitive());
        assert!(registry
            .descriptor(Standard::Iso19115, "RoleCode")
            .unwrap()
            .is_primitive());
        assert!(!registry
            .descriptor(Standard::Iso19115, "Citation")
            .unwrap()
            .is_primitive());
    }

    #[test]
    fn enum_code_table() {
        let registry = sample_registry();
        let role = registry.descriptor(Standard::Iso19115, "RoleCode").unwrap();
        assert_eq!(role.code_for("pointOfContact"), Some("010"));
        assert_eq!(role.name_for_code("011"), Some("author"));
        assert_eq!(role.code_for("publisher"), None);
    }

    #[test]
    fn property_walks_superclass_chain() {
        let registry = sample_registry();
        // Declared on the derived type itself.
        let own = registry
            .property(Standard::Iso19115, "DataIdentification", "spatialResolution")
            .unwrap();
        assert!(own.is_some());
        // Declared on the superclass.
        let inherited = registry
            .property(Standard::Iso19115, "DataIdentification", "citation")
            .unwrap();
        assert!(inherited.is_some());
        // Absent everywhere.
        let missing = registry
            .property(Standard::Iso19115, "DataIdentification", "lineage")
            .unwrap();
        assert!(missing.is_none());
    }

    #[test]
    fn path_resolution() {
        let registry = sample_registry();
        let path = Path::parse("citation.title").unwrap();
        let chain = registry
            .resolve_path(Standard::Iso19115, "DataIdentification", &path)
            .unwrap();
        assert_eq!(chain.len(), 2);
        assert_eq!(chain[1].target, "CharacterString");
    }

    #[test]
    fn unresolvable_path_is_schema_error() {
        let registry = sample_registry();
        let path = Path::parse("citation.publisher").unwrap();
        let result = registry.resolve_path(Standard::Iso19115, "Identification", &path);
        assert!(matches!(result, Err(Error::Schema { .. })));
    }

    #[test]
    fn standard_parse_roundtrip() {
        for standard in Standard::all() {
            assert_eq!(Standard::parse(standard.as_str()).unwrap(), standard);
        }
        assert!(Standard::parse("FGDC").is_err());
    }
}
