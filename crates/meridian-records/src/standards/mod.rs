//! Bundled metadata standards.
//!
//! Each submodule owns the descriptor table of one standard and the
//! builder helpers for its root types. Registration is explicit: the
//! process constructs the registry once at startup via
//! [`bundled_registry`] (or registers standards selectively) and shares
//! it by reference from then on.

pub mod dublin_core;
pub mod iso19115;

use meridian_core::SchemaRegistry;

/// Builds a registry holding every bundled standard.
#[must_use]
pub fn bundled_registry() -> SchemaRegistry {
    let mut registry = SchemaRegistry::new();
    // The bundled tables use distinct type names per standard, so
    // registration cannot collide.
    iso19115::register(&mut registry)
        .and_then(|()| dublin_core::register(&mut registry))
        .expect("bundled descriptor tables are internally consistent");
    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use meridian_core::Standard;

    #[test]
    fn bundled_registry_holds_both_standards() {
        let registry = bundled_registry();
        assert!(registry
            .descriptor(Standard::Iso19115, "MD_Metadata")
            .is_ok());
        assert!(registry.descriptor(Standard::DublinCore, "Record").is_ok());
    }
}
