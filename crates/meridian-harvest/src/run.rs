//! The harvest loop.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Semaphore;
use tracing::Instrument;

use meridian_catalog::{Mapper, QueryableRegistry};
use meridian_core::observability::harvest_span;
use meridian_core::{RecordStore, SchemaRegistry, WriteOutcome};
use meridian_csw::ingest::prepare_record;
use meridian_csw::protocol::{
    standard_for_output_schema, ElementSet, HarvestReport, RemoteHarvester, ResultMode,
    SearchRequest, RECORD_TYPE_CSW, SERVICE,
};
use meridian_csw::CswError;

use crate::client::PeerClient;
use crate::convert::projection_to_record;
use crate::error::{HarvestError, Result};
use crate::probe::{probe, PeerProfile, VendorQuirk};
use crate::report::SourceOutcome;

/// Page size requested from conforming peers.
const PAGE_SIZE: u32 = 25;

/// Default cap on concurrently harvested sources.
const DEFAULT_MAX_IN_FLIGHT: usize = 4;

/// Crawls remote catalogs and merges their records into the local store.
#[derive(Clone)]
pub struct Harvester {
    registry: Arc<SchemaRegistry>,
    queryables: Arc<QueryableRegistry>,
    store: Arc<dyn RecordStore>,
    mapper: Mapper,
    client: PeerClient,
    max_in_flight: usize,
}

impl Harvester {
    /// Creates a harvester over the shared catalog components.
    #[must_use]
    pub fn new(
        registry: Arc<SchemaRegistry>,
        queryables: Arc<QueryableRegistry>,
        store: Arc<dyn RecordStore>,
    ) -> Self {
        let mapper = Mapper::new(Arc::clone(&registry));
        Self {
            registry,
            queryables,
            store,
            mapper,
            client: PeerClient::new(),
            max_in_flight: DEFAULT_MAX_IN_FLIGHT,
        }
    }

    /// Replaces the peer client (e.g. to shorten timeouts).
    #[must_use]
    pub fn with_client(mut self, client: PeerClient) -> Self {
        self.client = client;
        self
    }

    /// Caps the number of concurrently harvested sources.
    #[must_use]
    pub fn with_max_in_flight(mut self, max_in_flight: usize) -> Self {
        self.max_in_flight = max_in_flight.max(1);
        self
    }

    /// Harvests one remote source.
    ///
    /// Every advertised output schema is paged through independently;
    /// per-record and per-schema failures are recorded in the summary.
    ///
    /// # Errors
    ///
    /// Fails when the peer cannot be probed at all, or when no output
    /// schema yielded even one page and at least one produced a hard
    /// error.
    pub async fn harvest_source(&self, source: &str) -> Result<HarvestReport> {
        let span = harvest_span(source);
        self.harvest_source_inner(source).instrument(span).await
    }

    async fn harvest_source_inner(&self, source: &str) -> Result<HarvestReport> {
        let profile = probe(&self.client, source).await?;
        tracing::info!(
            version = profile.version.as_str(),
            schemas = profile.output_schemas.len(),
            quirk = ?profile.quirk,
            "peer probed"
        );

        let mut report = HarvestReport::default();
        let mut successful_pages: u64 = 0;
        let mut hard_errors: u64 = 0;

        for schema in &profile.output_schemas {
            match self
                .harvest_schema(source, &profile, schema, &mut report)
                .await
            {
                Ok(pages) => successful_pages += pages,
                Err(error) => {
                    // Recorded, but the remaining schemas still run.
                    tracing::warn!(schema = schema.as_str(), %error, "output schema failed");
                    hard_errors += 1;
                    report.errors.push(format!("{schema}: {error}"));
                }
            }
        }

        if successful_pages == 0 && hard_errors > 0 {
            return Err(HarvestError::AllSchemasFailed {
                source_id: source.to_string(),
            });
        }
        Ok(report)
    }

    /// Pages through one output schema. Returns the number of pages
    /// fetched successfully.
    async fn harvest_schema(
        &self,
        source: &str,
        profile: &PeerProfile,
        schema: &str,
        report: &mut HarvestReport,
    ) -> Result<u64> {
        let mut start: u32 = 1;
        let mut pages: u64 = 0;

        loop {
            let request = build_search_request(profile, schema, start);
            let results = self.client.get_records(source, &request).await?;
            pages += 1;
            report.pages += 1;

            if results.records.is_empty() {
                break;
            }
            for projection in &results.records {
                report.records_seen += 1;
                match self.store_record(schema, projection).await {
                    Ok(WriteOutcome::Inserted) => report.inserted += 1,
                    Ok(WriteOutcome::Updated) => report.updated += 1,
                    Err(error @ HarvestError::Storage { .. }) => return Err(error),
                    Err(error) => {
                        tracing::warn!(%error, "harvested record rejected");
                        report.errors.push(error.to_string());
                    }
                }
            }

            if results.next_record == 0 || results.next_record <= start {
                break;
            }
            start = results.next_record;
        }
        Ok(pages)
    }

    /// Stores one harvested projection with upsert semantics.
    async fn store_record(
        &self,
        schema: &str,
        projection: &serde_json::Value,
    ) -> Result<WriteOutcome> {
        let standard =
            standard_for_output_schema(schema).unwrap_or(meridian_core::Standard::DublinCore);
        // Conversion and mapping stay synchronous; only the store write
        // awaits.
        let prepared = {
            let payload = projection_to_record(&self.registry, standard, projection);
            prepare_record(&self.registry, &self.mapper, &self.queryables, standard, &payload)
                .map_err(|e| HarvestError::Record {
                    message: e.to_string(),
                })?
        };
        self.store
            .put(prepared)
            .await
            .map_err(|e| HarvestError::Storage {
                message: e.to_string(),
            })
    }

    /// Harvests a set of sources with bounded concurrency.
    ///
    /// One task runs per source, capped at the configured in-flight
    /// count, so a slow peer cannot stall the others. Each source's
    /// failure is contained in its own outcome.
    pub async fn harvest_all(&self, sources: Vec<String>) -> Vec<SourceOutcome> {
        let semaphore = Arc::new(Semaphore::new(self.max_in_flight));
        let mut handles = Vec::with_capacity(sources.len());

        for source in sources {
            let harvester = self.clone();
            let semaphore = Arc::clone(&semaphore);
            handles.push(tokio::spawn(async move {
                let _permit = semaphore.acquire_owned().await;
                let result = harvester.harvest_source(&source).await;
                SourceOutcome { source, result }
            }));
        }

        let mut outcomes = Vec::with_capacity(handles.len());
        for handle in handles {
            match handle.await {
                Ok(outcome) => outcomes.push(outcome),
                Err(join_error) => outcomes.push(SourceOutcome {
                    source: String::new(),
                    result: Err(HarvestError::Unreachable {
                        message: format!("harvest task failed: {join_error}"),
                    }),
                }),
            }
        }
        outcomes
    }
}

#[async_trait]
impl RemoteHarvester for Harvester {
    async fn harvest(&self, source: &str) -> meridian_csw::Result<HarvestReport> {
        self.harvest_source(source).await.map_err(|error| match error {
            HarvestError::Storage { message } => CswError::ServiceUnavailable { message },
            other => CswError::NoApplicableCode {
                message: other.to_string(),
            },
        })
    }
}

/// Builds the page request for a peer, applying vendor quirk templates.
fn build_search_request(profile: &PeerProfile, schema: &str, start: u32) -> SearchRequest {
    let base = SearchRequest {
        service: Some(SERVICE.to_string()),
        version: Some(profile.version.clone()),
        output_schema: Some(schema.to_string()),
        result_mode: ResultMode::Results,
        start_position: Some(start),
        ..SearchRequest::default()
    };
    match profile.quirk {
        VendorQuirk::None => SearchRequest {
            record_types: profile.record_types.clone(),
            element_set: Some(ElementSet::Full),
            max_records: Some(PAGE_SIZE),
            ..base
        },
        // Hand-tuned template: this profile only answers Dublin Core
        // summaries and rejects larger pages.
        VendorQuirk::Esri => SearchRequest {
            record_types: vec![RECORD_TYPE_CSW.to_string()],
            element_set: Some(ElementSet::Summary),
            max_records: Some(10),
            ..base
        },
    }
}
