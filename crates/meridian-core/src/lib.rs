//! # meridian-core
//!
//! Shared foundation for the Meridian geospatial metadata catalog.
//!
//! This crate provides:
//!
//! - **Schema Registry**: Process-wide table of metadata vocabularies
//!   (standards), their type descriptors and enumeration code tables
//! - **Record Tree Model**: The generic stored representation of one
//!   catalog record (a [`Form`] holding a flat arena of values)
//! - **Record Store**: The abstract key/value-tree storage contract plus
//!   an in-memory reference implementation
//! - **Observability**: Logging initialization and span helpers
//!
//! ## Architecture
//!
//! The registry is populated once at process start by explicit
//! registration and is read-only thereafter. Forms are write-once:
//! a form is populated by the mapper, stored, and replaced wholesale on
//! update. Value nodes reference their parent by id, so a form encodes a
//! tree without nested containers, and link values can alias an earlier
//! node to preserve shared references.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![warn(clippy::pedantic)]
#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod error;
pub mod form;
pub mod id;
pub mod observability;
pub mod path;
pub mod schema;
pub mod store;

pub use error::{Error, Result};
pub use form::{Form, StoredValue, ValueId, ValueNode};
pub use id::RecordId;
pub use path::Path;
pub use schema::{
    EnumValue, PropertyDescriptor, SchemaRegistry, Standard, TypeDescriptor, TypeKind,
};
pub use store::{MemoryStore, RecordStore, StoredRecord, WriteOutcome};
