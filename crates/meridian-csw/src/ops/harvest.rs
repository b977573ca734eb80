//! Harvest operation (synchronous mode only).

use crate::error::{CswError, Result};
use crate::protocol::{HarvestRequest, HarvestResponse, TransactionSummary};
use crate::validate;
use crate::worker::CatalogWorker;

pub(crate) async fn execute(
    worker: &CatalogWorker,
    request: HarvestRequest,
) -> Result<HarvestResponse> {
    validate::service_tag(request.service.as_deref())?;
    validate::version_tag(request.version.as_deref())?;

    let source = request
        .source
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(CswError::MissingParameter { parameter: "source" })?;
    if request.response_handler.is_some() {
        return Err(CswError::OperationNotSupported {
            operation: "asynchronous Harvest".to_string(),
        });
    }
    let harvester = worker
        .harvester()
        .ok_or_else(|| CswError::OperationNotSupported {
            operation: "Harvest".to_string(),
        })?;

    let report = harvester.harvest(source).await?;
    tracing::info!(
        source,
        inserted = report.inserted,
        updated = report.updated,
        pages = report.pages,
        "harvest finished"
    );

    Ok(HarvestResponse {
        summary: TransactionSummary {
            total_inserted: report.inserted,
            total_updated: report.updated,
            total_deleted: 0,
        },
        errors: report.errors,
    })
}
