//! Protocol contracts for the catalog worker.
//!
//! # Invariants Tested
//!
//! 1. Pagination: successive searches driven by the returned cursor visit
//!    every record exactly once and the final page reports cursor 0
//! 2. Partial failure: fetch with one good and one bad id succeeds; fetch
//!    with only bad ids fails
//! 3. Validation failures carry the offending parameter name
//! 4. Inserting an existing natural key counts as an update, not an error
//! 5. The Lake Survey sort scenario from the search requirements

use std::sync::Arc;

use async_trait::async_trait;

use meridian_catalog::{QueryableRegistry, SearchIndex, SortOrder};
use meridian_core::MemoryStore;
use meridian_csw::protocol::{
    CapabilitiesRequest, DomainRequest, ElementSet, FetchRequest, Filter, HarvestReport,
    HarvestRequest, RemoteHarvester, ResultMode, SearchRequest, SearchResponse, SortSpec,
    TransactionOp, TransactionRequest, RECORD_TYPE_CSW, SERVICE, VERSION,
};
use meridian_csw::{CatalogWorker, CswError};
use meridian_records::bundled_registry;

fn dc_payload(id: &str, title: &str, subject: &str, date: &str) -> serde_json::Value {
    serde_json::json!({
        "type": "Record",
        "fields": {
            "identifier": [id],
            "title": [title],
            "subject": [subject],
            "date": [date],
            "type": ["dataset"],
        },
    })
}

fn worker() -> CatalogWorker {
    CatalogWorker::new(
        Arc::new(bundled_registry()),
        Arc::new(MemoryStore::new()),
        Arc::new(SearchIndex::new()),
        Arc::new(QueryableRegistry::bundled()),
    )
}

async fn insert(worker: &CatalogWorker, payloads: Vec<serde_json::Value>) {
    let request = TransactionRequest {
        service: Some(SERVICE.into()),
        version: Some(VERSION.into()),
        operations: vec![TransactionOp::Insert {
            record_type: RECORD_TYPE_CSW.into(),
            records: payloads,
        }],
    };
    worker.transaction(request).await.expect("insert");
    worker.rebuild_index().await.expect("rebuild");
}

fn search_request(query: &str, start: u32, page: u32) -> SearchRequest {
    SearchRequest {
        service: Some(SERVICE.into()),
        version: Some(VERSION.into()),
        record_types: vec![RECORD_TYPE_CSW.into()],
        filter: Some(Filter::AnyText {
            query: query.into(),
        }),
        start_position: Some(start),
        max_records: Some(page),
        ..SearchRequest::default()
    }
}

#[tokio::test]
async fn contract_pagination_visits_every_record_once() {
    let worker = worker();
    let payloads = (1..=5)
        .map(|n| dc_payload(&format!("r{n}"), &format!("Lake Basin {n}"), "lakes", "2020-01-01"))
        .collect();
    insert(&worker, payloads).await;

    let mut seen = Vec::new();
    let mut start = 1;
    loop {
        let response = worker.search(search_request("lake", start, 2)).await.unwrap();
        let results = response.results().expect("results mode").clone();
        assert_eq!(results.number_of_records_matched, 5);
        for record in &results.records {
            seen.push(record["Identifier"].as_str().unwrap().to_string());
        }
        if results.next_record == 0 {
            break;
        }
        start = results.next_record;
    }

    seen.sort();
    seen.dedup();
    assert_eq!(seen.len(), 5, "every record visited exactly once");
}

#[tokio::test]
async fn contract_hits_mode_returns_count_only() {
    let worker = worker();
    insert(
        &worker,
        vec![
            dc_payload("r1", "Lake Survey 2020", "lakes", "2020-05-01"),
            dc_payload("r2", "Lake Survey 2021", "lakes", "2021-05-01"),
        ],
    )
    .await;

    let mut request = search_request("lake", 1, 10);
    request.result_mode = ResultMode::Hits;
    let response = worker.search(request).await.unwrap();
    let results = response.results().unwrap();
    assert_eq!(results.number_of_records_matched, 2);
    assert_eq!(results.number_of_records_returned, 0);
    assert_eq!(results.next_record, 0);
    assert!(results.records.is_empty());
}

#[tokio::test]
async fn contract_validate_mode_echoes_without_executing() {
    let worker = worker();
    let mut request = search_request("lake", 1, 10);
    request.result_mode = ResultMode::Validate;
    let response = worker.search(request).await.unwrap();
    match response {
        SearchResponse::Acknowledgement(ack) => {
            assert_eq!(ack.echoed_request.record_types, vec![RECORD_TYPE_CSW]);
        }
        SearchResponse::Results(_) => panic!("validate mode must not execute"),
    }
}

#[tokio::test]
async fn contract_lake_survey_sort_scenario() {
    let worker = worker();
    insert(
        &worker,
        vec![
            dc_payload("r2021", "Lake Survey 2021", "lakes", "2021-05-01"),
            dc_payload("r2020", "Lake Survey 2020", "lakes", "2020-05-01"),
        ],
    )
    .await;

    let mut ascending = search_request("Lake", 1, 1);
    ascending.sort = Some(SortSpec {
        attribute: "Modified".into(),
        order: SortOrder::Ascending,
    });
    let results = worker.search(ascending).await.unwrap();
    let results = results.results().unwrap().clone();
    assert_eq!(results.number_of_records_matched, 2);
    assert_eq!(results.records[0]["Identifier"], "r2020");

    let mut descending = search_request("Lake", 1, 1);
    descending.sort = Some(SortSpec {
        attribute: "Modified".into(),
        order: SortOrder::Descending,
    });
    let results = worker.search(descending).await.unwrap();
    assert_eq!(results.results().unwrap().records[0]["Identifier"], "r2021");
}

#[tokio::test]
async fn contract_validation_failures_name_the_parameter() {
    let worker = worker();

    let mut missing_service = search_request("lake", 1, 10);
    missing_service.service = None;
    let error = worker.search(missing_service).await.unwrap_err();
    assert_eq!(error.locator(), Some("service"));

    let mut bad_format = search_request("lake", 1, 10);
    bad_format.output_format = Some("text/csv".into());
    let error = worker.search(bad_format).await.unwrap_err();
    assert_eq!(error.locator(), Some("outputFormat"));

    let mut bad_schema = search_request("lake", 1, 10);
    bad_schema.output_schema = Some("urn:nowhere".into());
    let error = worker.search(bad_schema).await.unwrap_err();
    assert_eq!(error.locator(), Some("outputSchema"));

    let mut bad_start = search_request("lake", 1, 10);
    bad_start.start_position = Some(0);
    let error = worker.search(bad_start).await.unwrap_err();
    assert_eq!(error.locator(), Some("startPosition"));

    let mut empty_sort = search_request("lake", 1, 10);
    empty_sort.sort = Some(SortSpec {
        attribute: "  ".into(),
        order: SortOrder::Ascending,
    });
    let error = worker.search(empty_sort).await.unwrap_err();
    assert_eq!(error.locator(), Some("sortBy"));

    let mut no_types = search_request("lake", 1, 10);
    no_types.record_types.clear();
    let error = worker.search(no_types).await.unwrap_err();
    assert_eq!(error.locator(), Some("typeNames"));
}

#[tokio::test]
async fn contract_fetch_partial_failure_tolerance() {
    let worker = worker();
    insert(
        &worker,
        vec![dc_payload("r1", "Lake Survey 2020", "lakes", "2020-05-01")],
    )
    .await;

    // One good id, one bad: succeeds with a per-item failure.
    let response = worker
        .fetch_by_id(FetchRequest {
            service: Some(SERVICE.into()),
            version: Some(VERSION.into()),
            ids: vec!["r1".into(), "missing".into()],
            element_set: Some(ElementSet::Brief),
        })
        .await
        .unwrap();
    assert_eq!(response.records.len(), 1);
    assert_eq!(response.failures.len(), 1);
    assert_eq!(response.failures[0].id, "missing");

    // Titles resolve as business identifiers.
    let response = worker
        .fetch_by_id(FetchRequest {
            service: Some(SERVICE.into()),
            version: Some(VERSION.into()),
            ids: vec!["Lake Survey 2020".into()],
            element_set: None,
        })
        .await
        .unwrap();
    assert_eq!(response.records.len(), 1);

    // Only bad ids: the whole call fails.
    let error = worker
        .fetch_by_id(FetchRequest {
            service: Some(SERVICE.into()),
            version: Some(VERSION.into()),
            ids: vec!["missing-1".into(), "missing-2".into()],
            element_set: None,
        })
        .await
        .unwrap_err();
    assert_eq!(error.locator(), Some("id"));
}

#[tokio::test]
async fn contract_insert_of_existing_key_counts_as_update() {
    let worker = worker();
    let request = TransactionRequest {
        service: Some(SERVICE.into()),
        version: Some(VERSION.into()),
        operations: vec![TransactionOp::Insert {
            record_type: RECORD_TYPE_CSW.into(),
            records: vec![dc_payload("r1", "Lake Survey 2020", "lakes", "2020-05-01")],
        }],
    };
    let first = worker.transaction(request.clone()).await.unwrap();
    assert_eq!(first.summary.total_inserted, 1);
    assert_eq!(first.summary.total_updated, 0);

    let second = worker.transaction(request).await.unwrap();
    assert_eq!(second.summary.total_inserted, 0);
    assert_eq!(second.summary.total_updated, 1);
}

#[tokio::test]
async fn contract_update_and_delete_are_reported_unsupported() {
    let worker = worker();
    for operation in [
        TransactionOp::Update { constraint: None },
        TransactionOp::Delete { constraint: None },
    ] {
        let error = worker
            .transaction(TransactionRequest {
                service: Some(SERVICE.into()),
                version: Some(VERSION.into()),
                operations: vec![operation],
            })
            .await
            .unwrap_err();
        assert!(matches!(error, CswError::OperationNotSupported { .. }));
    }
}

#[tokio::test]
async fn contract_domain_static_and_stored_values() {
    let worker = worker();
    insert(
        &worker,
        vec![
            dc_payload("r1", "Lake Survey 2020", "lakes", "2020-05-01"),
            dc_payload("r2", "River Atlas", "rivers", "2019-01-01"),
        ],
    )
    .await;

    // Static parameter enumeration.
    let response = worker
        .attribute_domain(DomainRequest {
            service: Some(SERVICE.into()),
            version: Some(VERSION.into()),
            parameter_name: Some("GetRecords.resultType".into()),
            property_name: None,
        })
        .await
        .unwrap();
    assert_eq!(response.domains[0].values, ["hits", "results", "validate"]);

    // Distinct values actually present in storage.
    let response = worker
        .attribute_domain(DomainRequest {
            service: Some(SERVICE.into()),
            version: Some(VERSION.into()),
            parameter_name: None,
            property_name: Some("Subject".into()),
        })
        .await
        .unwrap();
    assert_eq!(response.domains[0].values, ["lakes", "rivers"]);

    // Neither name given.
    let error = worker
        .attribute_domain(DomainRequest {
            service: Some(SERVICE.into()),
            version: Some(VERSION.into()),
            parameter_name: None,
            property_name: None,
        })
        .await
        .unwrap_err();
    assert_eq!(error.locator(), Some("parameterName"));
}

#[tokio::test]
async fn contract_capabilities_ignores_unknown_sections() {
    let worker = worker();
    let capabilities = worker
        .capabilities(&CapabilitiesRequest {
            service: Some(SERVICE.into()),
            accept_versions: Vec::new(),
            sections: vec!["NoSuchSection".into()],
        })
        .unwrap();
    assert!(capabilities.service_identification.is_none());
    assert!(!capabilities.filter_capabilities.queryables.is_empty());
}

struct FixedHarvester(HarvestReport);

#[async_trait]
impl RemoteHarvester for FixedHarvester {
    async fn harvest(&self, _source: &str) -> meridian_csw::Result<HarvestReport> {
        Ok(self.0.clone())
    }
}

#[tokio::test]
async fn contract_harvest_folds_counters_and_requires_sync_mode() {
    let report = HarvestReport {
        inserted: 3,
        updated: 2,
        pages: 1,
        records_seen: 5,
        errors: vec!["one page failed".into()],
    };
    let worker = worker().with_harvester(Arc::new(FixedHarvester(report)));

    let response = worker
        .harvest(HarvestRequest {
            service: Some(SERVICE.into()),
            version: Some(VERSION.into()),
            source: Some("http://peer.example/csw".into()),
            response_handler: None,
        })
        .await
        .unwrap();
    assert_eq!(response.summary.total_inserted, 3);
    assert_eq!(response.summary.total_updated, 2);
    assert_eq!(response.summary.total_deleted, 0);
    assert_eq!(response.errors.len(), 1);

    // Asynchronous mode is explicitly unsupported.
    let error = worker
        .harvest(HarvestRequest {
            service: Some(SERVICE.into()),
            version: Some(VERSION.into()),
            source: Some("http://peer.example/csw".into()),
            response_handler: Some("http://callback.example/".into()),
        })
        .await
        .unwrap_err();
    assert!(matches!(error, CswError::OperationNotSupported { .. }));
}

#[tokio::test]
async fn contract_harvest_without_harvester_is_unsupported() {
    let worker = worker();
    let error = worker
        .harvest(HarvestRequest {
            service: Some(SERVICE.into()),
            version: Some(VERSION.into()),
            source: Some("http://peer.example/csw".into()),
            response_handler: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(error, CswError::OperationNotSupported { .. }));
}
