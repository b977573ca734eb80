//! # meridian-harvest
//!
//! Federated harvester for the Meridian catalog.
//!
//! Given a remote catalog's base address, the harvester:
//!
//! 1. Probes capabilities with a lightweight GET first, then a POST body,
//!    then the older protocol version, stopping at the first success
//! 2. Extracts the advertised version, output schemas and record types,
//!    falling back to a conservative built-in set, and recognizes known
//!    non-conforming vendor profiles by service title
//! 3. Pages through every supported output schema by the server-reported
//!    next-record cursor
//! 4. Stores every returned record with insert/update upsert semantics,
//!    continuing past individual record failures
//! 5. Records protocol-level errors per output schema and only fails the
//!    source when no schema yielded a page and at least one hard error
//!    occurred
//!
//! Responses are normalized before parsing to tolerate common peer
//! non-conformances (vendor-prefixed envelope keys, percent-escaped
//! bodies). Harvesting several sources runs with bounded concurrency so
//! one unresponsive peer cannot stall the rest; every HTTP round trip
//! carries a timeout. A harvest is not transactional: partial results
//! stay in place and re-running is idempotent per record.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![warn(clippy::pedantic)]
#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod client;
mod convert;
pub mod error;
mod normalize;
mod probe;
pub mod report;
pub mod run;

pub use client::PeerClient;
pub use error::{HarvestError, Result};
pub use report::SourceOutcome;
pub use run::Harvester;
