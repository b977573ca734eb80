//! The catalog worker.
//!
//! One worker instance serves any number of concurrent requests. It holds
//! only shared read-only references plus request counters; per-request
//! state lives on the stack of each operation. Index rebuilds are the one
//! serialized mutation, and they swap generations without blocking
//! concurrent readers.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::Instrument;

use meridian_catalog::{Mapper, QueryableRegistry, SearchIndex};
use meridian_core::observability::worker_span;
use meridian_core::{RecordStore, SchemaRegistry};

use crate::error::Result;
use crate::metrics::{record_failure, record_request};
use crate::ops;
use crate::protocol::{
    Capabilities, CapabilitiesRequest, DescribeRequest, DescribeResponse, DomainRequest,
    DomainResponse, FetchRequest, FetchResponse, HarvestRequest, HarvestResponse, RemoteHarvester,
    SearchRequest, SearchResponse, TransactionRequest, TransactionResponse,
};

/// Protocol-level request handler over the shared catalog components.
pub struct CatalogWorker {
    registry: Arc<SchemaRegistry>,
    store: Arc<dyn RecordStore>,
    index: Arc<SearchIndex>,
    queryables: Arc<QueryableRegistry>,
    mapper: Mapper,
    harvester: Option<Arc<dyn RemoteHarvester>>,
    requests_served: AtomicU64,
}

impl CatalogWorker {
    /// Creates a worker over the shared catalog components.
    #[must_use]
    pub fn new(
        registry: Arc<SchemaRegistry>,
        store: Arc<dyn RecordStore>,
        index: Arc<SearchIndex>,
        queryables: Arc<QueryableRegistry>,
    ) -> Self {
        let mapper = Mapper::new(Arc::clone(&registry));
        Self {
            registry,
            store,
            index,
            queryables,
            mapper,
            harvester: None,
            requests_served: AtomicU64::new(0),
        }
    }

    /// Wires in the harvester serving the Harvest operation.
    #[must_use]
    pub fn with_harvester(mut self, harvester: Arc<dyn RemoteHarvester>) -> Self {
        self.harvester = Some(harvester);
        self
    }

    pub(crate) fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    pub(crate) fn store(&self) -> &dyn RecordStore {
        self.store.as_ref()
    }

    pub(crate) fn index(&self) -> &SearchIndex {
        &self.index
    }

    pub(crate) fn queryables(&self) -> &QueryableRegistry {
        &self.queryables
    }

    pub(crate) fn mapper(&self) -> &Mapper {
        &self.mapper
    }

    pub(crate) fn harvester(&self) -> Option<&Arc<dyn RemoteHarvester>> {
        self.harvester.as_ref()
    }

    /// Number of requests this worker has served.
    #[must_use]
    pub fn requests_served(&self) -> u64 {
        self.requests_served.load(Ordering::Relaxed)
    }

    fn next_request_id(&self) -> String {
        let n = self.requests_served.fetch_add(1, Ordering::Relaxed);
        format!("req-{n}")
    }

    /// Returns the section-filtered service description.
    ///
    /// # Errors
    ///
    /// Fails on an unacceptable service tag or version offer.
    pub fn capabilities(&self, request: &CapabilitiesRequest) -> Result<Capabilities> {
        let span = worker_span("GetCapabilities", &self.next_request_id());
        let _guard = span.enter();
        record_request("GetCapabilities");
        ops::capabilities::execute(request).inspect_err(|e| {
            record_failure("GetCapabilities", e.code());
        })
    }

    /// Executes a search request.
    ///
    /// # Errors
    ///
    /// Fails on request validation errors; an unparsable constraint is
    /// reported as an invalid `constraint` parameter.
    pub async fn search(&self, request: SearchRequest) -> Result<SearchResponse> {
        let span = worker_span("GetRecords", &self.next_request_id());
        record_request("GetRecords");
        ops::search::execute(self, request)
            .instrument(span)
            .await
            .inspect_err(|e| record_failure("GetRecords", e.code()))
    }

    /// Resolves records by identifier (or business title).
    ///
    /// # Errors
    ///
    /// Fails only when every requested identifier fails to resolve.
    pub async fn fetch_by_id(&self, request: FetchRequest) -> Result<FetchResponse> {
        let span = worker_span("GetRecordById", &self.next_request_id());
        record_request("GetRecordById");
        ops::fetch::execute(self, request)
            .instrument(span)
            .await
            .inspect_err(|e| record_failure("GetRecordById", e.code()))
    }

    /// Describes the structural schema of record types.
    ///
    /// # Errors
    ///
    /// Fails on an unacceptable service or version tag.
    pub fn describe_record(&self, request: &DescribeRequest) -> Result<DescribeResponse> {
        let span = worker_span("DescribeRecord", &self.next_request_id());
        let _guard = span.enter();
        record_request("DescribeRecord");
        ops::describe::execute(self, request)
            .inspect_err(|e| record_failure("DescribeRecord", e.code()))
    }

    /// Returns a parameter's legal values or an attribute's stored values.
    ///
    /// # Errors
    ///
    /// Fails when neither a parameter nor a property name is given, or
    /// the given name is unknown.
    pub async fn attribute_domain(&self, request: DomainRequest) -> Result<DomainResponse> {
        let span = worker_span("GetDomain", &self.next_request_id());
        record_request("GetDomain");
        ops::domain::execute(self, request)
            .instrument(span)
            .await
            .inspect_err(|e| record_failure("GetDomain", e.code()))
    }

    /// Applies a transaction (inserts only).
    ///
    /// # Errors
    ///
    /// Update and Delete kinds are reported as unsupported; an insert
    /// where every record fails is rejected.
    pub async fn transaction(&self, request: TransactionRequest) -> Result<TransactionResponse> {
        let span = worker_span("Transaction", &self.next_request_id());
        record_request("Transaction");
        ops::transaction::execute(self, request)
            .instrument(span)
            .await
            .inspect_err(|e| record_failure("Transaction", e.code()))
    }

    /// Synchronously harvests a remote catalog into the local store.
    ///
    /// # Errors
    ///
    /// Fails when no harvester is wired in, asynchronous mode is
    /// requested, or the harvest yielded nothing but hard errors.
    pub async fn harvest(&self, request: HarvestRequest) -> Result<HarvestResponse> {
        let span = worker_span("Harvest", &self.next_request_id());
        record_request("Harvest");
        ops::harvest::execute(self, request)
            .instrument(span)
            .await
            .inspect_err(|e| record_failure("Harvest", e.code()))
    }

    /// Rebuilds the search index over the full corpus.
    ///
    /// Exclusive against concurrent rebuilds; readers keep the previous
    /// generation until the swap.
    ///
    /// # Errors
    ///
    /// Fails when the corpus cannot be listed.
    pub async fn rebuild_index(&self) -> Result<usize> {
        let count = self
            .index
            .rebuild(self.store.as_ref(), &self.queryables)
            .await?;
        Ok(count)
    }
}
