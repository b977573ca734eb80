//! # meridian-catalog
//!
//! Catalog engine for Meridian, providing:
//!
//! - **Mapper**: bidirectional conversion between typed record object
//!   graphs and their stored tree representation ([`meridian_core::Form`]),
//!   preserving shared references and repeated-property order
//! - **Queryable attributes**: the static table mapping protocol-level
//!   search fields to schema paths, one mapping per supported standard
//! - **Search index**: derived search documents over the record corpus
//!   with ranked, sorted and paginated queries
//!
//! ## Consistency model
//!
//! The index is rebuilt explicitly over the full corpus (at startup or
//! after a bulk ingest). Rebuilds are exclusive against each other but
//! never block readers: a rebuild prepares a fresh generation and swaps
//! it in atomically, so concurrent searches keep reading the previous
//! generation until the swap.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![warn(clippy::pedantic)]
#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod error;
pub mod index;
pub mod mapper;
pub mod metrics;
pub mod queryable;

pub use error::{CatalogError, Result};
pub use index::{FieldOp, IndexQuery, QueryTerm, SearchDocument, SearchHits, SearchIndex, SortKey, SortOrder};
pub use mapper::Mapper;
pub use queryable::{QueryableRegistry, QUERYABLE_ATTRIBUTES};
