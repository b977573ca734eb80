//! # meridian-records
//!
//! Typed record library for the Meridian catalog.
//!
//! Metadata records are held in memory as graphs of [`ObjectNode`]s: one
//! generic, identity-bearing node type whose legal properties come from
//! the schema registry's descriptor tables. There is no runtime
//! reflection; every property access resolves against the registered
//! [`meridian_core::TypeDescriptor`] for the node's type, walking the
//! superclass chain where needed.
//!
//! The crate also bundles the descriptor tables and builder helpers for
//! the two supported standards (`ISO-19115` and `DublinCore`), plus a
//! JSON rendering used on the protocol wire.
//!
//! Nodes are reference-counted, so one instance can legitimately appear
//! under two different properties of the same record; the mapper
//! preserves that aliasing when it writes the graph to a form.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![warn(clippy::pedantic)]
#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod convert;
pub mod object;
pub mod standards;

pub use convert::{object_from_json, object_to_json};
pub use object::{nodes_equal, FieldValue, ObjectNode, ObjectRef};
pub use standards::bundled_registry;
