//! Transaction operation (inserts only).

use meridian_core::WriteOutcome;

use crate::error::{CswError, Result};
use crate::ingest::prepare_record;
use crate::protocol::{
    standard_for_record_type, TransactionOp, TransactionRequest, TransactionResponse,
    TransactionSummary,
};
use crate::validate;
use crate::worker::CatalogWorker;

pub(crate) async fn execute(
    worker: &CatalogWorker,
    request: TransactionRequest,
) -> Result<TransactionResponse> {
    validate::service_tag(request.service.as_deref())?;
    validate::version_tag(request.version.as_deref())?;

    if request.operations.is_empty() {
        return Err(CswError::MissingParameter {
            parameter: "transaction",
        });
    }

    let mut summary = TransactionSummary::default();
    let mut failures = Vec::new();
    let mut attempted: u64 = 0;

    for operation in &request.operations {
        match operation {
            TransactionOp::Update { .. } => {
                return Err(CswError::OperationNotSupported {
                    operation: "Transaction/Update".to_string(),
                });
            }
            TransactionOp::Delete { .. } => {
                return Err(CswError::OperationNotSupported {
                    operation: "Transaction/Delete".to_string(),
                });
            }
            TransactionOp::Insert {
                record_type,
                records,
            } => {
                let standard = standard_for_record_type(record_type).ok_or_else(|| {
                    CswError::invalid(
                        "typeName",
                        format!("'{record_type}' is not a supported record type"),
                    )
                })?;
                for payload in records {
                    attempted += 1;
                    // Parsing and mapping happen synchronously so the
                    // object graph never crosses an await point.
                    let prepared = prepare_record(
                        worker.registry(),
                        worker.mapper(),
                        worker.queryables(),
                        standard,
                        payload,
                    );
                    match prepared {
                        Ok(record) => match worker.store().put(record).await? {
                            WriteOutcome::Inserted => summary.total_inserted += 1,
                            WriteOutcome::Updated => summary.total_updated += 1,
                        },
                        Err(error) => {
                            tracing::warn!(%error, "record rejected by insert");
                            failures.push(error.to_string());
                        }
                    }
                }
            }
        }
    }

    if attempted > 0 && summary.total_inserted + summary.total_updated == 0 {
        return Err(CswError::invalid(
            "transaction",
            "no record could be inserted",
        ));
    }
    Ok(TransactionResponse { summary, failures })
}
