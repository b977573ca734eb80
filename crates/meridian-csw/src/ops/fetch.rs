//! Fetch-by-identifier operation (`GetRecordById`).

use meridian_catalog::SearchDocument;
use meridian_core::{RecordId, StoredRecord};

use crate::element_set::project;
use crate::error::{CswError, Result};
use crate::protocol::{FetchFailure, FetchRequest, FetchResponse};
use crate::validate;
use crate::worker::CatalogWorker;

pub(crate) async fn execute(
    worker: &CatalogWorker,
    request: FetchRequest,
) -> Result<FetchResponse> {
    validate::service_tag(request.service.as_deref())?;
    validate::version_tag(request.version.as_deref())?;

    if request.ids.is_empty() {
        return Err(CswError::MissingParameter { parameter: "id" });
    }

    let element_set = request.element_set.clone().unwrap_or_default();
    let mut records = Vec::new();
    let mut failures = Vec::new();

    for raw in &request.ids {
        // Storage failures abort the request; an unresolvable id is a
        // per-item failure and the batch carries on.
        match resolve(worker, raw).await? {
            Some(record) => {
                let document = SearchDocument::build(&record, worker.queryables());
                records.push(project(&document, &element_set));
            }
            None => {
                tracing::debug!(id = raw.as_str(), "identifier did not resolve");
                failures.push(FetchFailure {
                    id: raw.clone(),
                    reason: "no record with this identifier or title".to_string(),
                });
            }
        }
    }

    if records.is_empty() {
        return Err(CswError::invalid(
            "id",
            "no requested identifier resolved to a record",
        ));
    }
    Ok(FetchResponse { records, failures })
}

/// Resolves an identifier, accepting the literal storage id or a
/// business title, in that order.
async fn resolve(worker: &CatalogWorker, raw: &str) -> Result<Option<StoredRecord>> {
    if let Ok(id) = RecordId::new(raw) {
        if let Some(record) = worker.store().get(&id).await? {
            return Ok(Some(record));
        }
    }
    Ok(worker.store().get_by_title(raw).await?)
}
