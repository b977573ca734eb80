//! Descriptor-driven record object graphs.
//!
//! An [`ObjectNode`] is one instance of a registered class type. Its
//! fields are validated against the schema registry on every mutation:
//! setting a property the type (and its superclasses) does not declare is
//! a schema error, and setting a second value on a non-repeatable
//! property replaces the first while repeatable properties accumulate.
//!
//! Nodes are held behind `Rc<RefCell<_>>` so a single instance can be
//! shared by several properties; pointer identity is what the mapper uses
//! to detect shared references and cycles.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use meridian_core::{Error, Result, SchemaRegistry, Standard, TypeKind};

/// A shared, mutable handle to an object node.
pub type ObjectRef = Rc<RefCell<ObjectNode>>;

/// One value held by a property.
#[derive(Debug, Clone)]
pub enum FieldValue {
    /// A primitive value in symbolic form (enum values carry their
    /// symbolic name here; external codes appear only in stored forms).
    Leaf(String),
    /// A nested object.
    Object(ObjectRef),
}

impl FieldValue {
    /// Returns the leaf payload, if this value is a leaf.
    #[must_use]
    pub fn as_leaf(&self) -> Option<&str> {
        match self {
            Self::Leaf(s) => Some(s),
            Self::Object(_) => None,
        }
    }

    /// Returns the object handle, if this value is an object.
    #[must_use]
    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Self::Leaf(_) => None,
            Self::Object(o) => Some(o),
        }
    }
}

/// One instance of a registered class type.
#[derive(Debug)]
pub struct ObjectNode {
    standard: Standard,
    type_name: String,
    fields: BTreeMap<String, Vec<FieldValue>>,
}

impl ObjectNode {
    /// Creates an empty instance of a registered class type.
    ///
    /// # Errors
    ///
    /// Returns `Error::Schema` if the type is unregistered or is not a
    /// class (primitives and enumerations never stand alone as objects).
    pub fn create(
        registry: &SchemaRegistry,
        standard: Standard,
        type_name: &str,
    ) -> Result<ObjectRef> {
        let descriptor = registry.descriptor(standard, type_name)?;
        if !matches!(descriptor.kind, TypeKind::Class) {
            return Err(Error::schema(format!(
                "'{type_name}' is not a class type and cannot be instantiated"
            )));
        }
        Ok(Rc::new(RefCell::new(Self {
            standard,
            type_name: type_name.to_string(),
            fields: BTreeMap::new(),
        })))
    }

    /// The standard this object's type belongs to.
    #[must_use]
    pub fn standard(&self) -> Standard {
        self.standard
    }

    /// The object's type name.
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Returns the values currently held by a property.
    #[must_use]
    pub fn get(&self, property: &str) -> Option<&[FieldValue]> {
        self.fields.get(property).map(Vec::as_slice)
    }

    /// Iterates over (property, values) pairs that currently hold values.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &[FieldValue])> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Sets a property, replacing any existing values.
    ///
    /// # Errors
    ///
    /// Returns `Error::Schema` if the property is not declared on the
    /// type or any of its superclasses.
    pub fn set(
        &mut self,
        registry: &SchemaRegistry,
        property: &str,
        value: FieldValue,
    ) -> Result<()> {
        self.resolve(registry, property)?;
        self.fields.insert(property.to_string(), vec![value]);
        Ok(())
    }

    /// Appends a value to a repeatable property.
    ///
    /// # Errors
    ///
    /// Returns `Error::Schema` if the property is unknown or is not
    /// repeatable.
    pub fn push(
        &mut self,
        registry: &SchemaRegistry,
        property: &str,
        value: FieldValue,
    ) -> Result<()> {
        let repeatable = self.resolve(registry, property)?;
        if !repeatable {
            return Err(Error::schema(format!(
                "property '{property}' of '{}' is not repeatable",
                self.type_name
            )));
        }
        self.fields.entry(property.to_string()).or_default().push(value);
        Ok(())
    }

    /// Assigns a value: repeatable properties accumulate, single-valued
    /// properties are replaced.
    ///
    /// # Errors
    ///
    /// Returns `Error::Schema` if the property is unknown.
    pub fn assign(
        &mut self,
        registry: &SchemaRegistry,
        property: &str,
        value: FieldValue,
    ) -> Result<()> {
        if self.resolve(registry, property)? {
            self.fields.entry(property.to_string()).or_default().push(value);
        } else {
            self.fields.insert(property.to_string(), vec![value]);
        }
        Ok(())
    }

    /// Resolves the property against the descriptor chain and returns
    /// its repeatable flag.
    fn resolve(&self, registry: &SchemaRegistry, property: &str) -> Result<bool> {
        registry
            .property(self.standard, &self.type_name, property)?
            .map(|p| p.repeatable)
            .ok_or_else(|| {
                Error::schema(format!(
                    "no property '{property}' on '{}' in {}",
                    self.type_name, self.standard
                ))
            })
    }
}

/// Structural equality over object graphs.
///
/// Property order is irrelevant (fields are kept sorted), leaf values
/// compare as strings, and nested objects compare recursively. Pairs of
/// nodes already under comparison are assumed equal, which makes the
/// comparison terminate on cyclic and aliased graphs.
#[must_use]
pub fn nodes_equal(a: &ObjectRef, b: &ObjectRef) -> bool {
    fn values_equal(a: &FieldValue, b: &FieldValue, seen: &mut Vec<(usize, usize)>) -> bool {
        match (a, b) {
            (FieldValue::Leaf(x), FieldValue::Leaf(y)) => x == y,
            (FieldValue::Object(x), FieldValue::Object(y)) => inner(x, y, seen),
            _ => false,
        }
    }

    fn inner(a: &ObjectRef, b: &ObjectRef, seen: &mut Vec<(usize, usize)>) -> bool {
        let pair = (Rc::as_ptr(a) as usize, Rc::as_ptr(b) as usize);
        if seen.contains(&pair) {
            return true;
        }
        seen.push(pair);

        let a = a.borrow();
        let b = b.borrow();
        if a.standard != b.standard
            || a.type_name != b.type_name
            || a.fields.len() != b.fields.len()
        {
            return false;
        }
        a.fields.iter().all(|(name, left)| {
            b.fields.get(name).is_some_and(|right| {
                left.len() == right.len()
                    && left
                        .iter()
                        .zip(right.iter())
                        .all(|(l, r)| values_equal(l, r, seen))
            })
        })
    }

    inner(a, b, &mut Vec::new())
}
