//! # meridian-csw
//!
//! The catalog protocol worker: request/response handlers for the
//! CSW-style operations of the Meridian catalog.
//!
//! This crate is responsible for:
//! - Validating requests against the accepted literal sets (service tag,
//!   version dialects, output schemas and formats)
//! - Compiling structured filters into the search index's query form
//! - Projecting records to the requested detail level
//! - Upserting typed records through the mapper (Transaction/Insert)
//! - Delegating synchronous harvests to a [`protocol::RemoteHarvester`]
//!
//! Workers are stateless per request: one [`CatalogWorker`] can serve any
//! number of concurrent requests, sharing only read-only references to
//! the schema registry, queryable table, search index and record store.
//! Transport framing is out of scope; envelopes serialize as JSON and the
//! caller supplies whatever carrier it likes.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![warn(clippy::pedantic)]
#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod element_set;
pub mod error;
pub mod ingest;
pub mod metrics;
pub mod ops;
pub mod protocol;
mod validate;
pub mod worker;

pub use error::{CswError, Result};
pub use worker::CatalogWorker;
