//! Attribute/parameter domain operation (`GetDomain`).

use meridian_catalog::QueryableRegistry;
use meridian_core::Standard;

use crate::error::{CswError, Result};
use crate::protocol::{
    DomainRequest, DomainResponse, DomainValues, SUPPORTED_OUTPUT_FORMATS,
    SUPPORTED_OUTPUT_SCHEMAS, SUPPORTED_RECORD_TYPES,
};
use crate::validate;
use crate::worker::CatalogWorker;

/// Static enumerations of operation parameters, shared with the
/// capabilities block.
pub(crate) const OPERATION_PARAMETERS: [(&str, &[&str]); 6] = [
    ("GetRecords.resultType", &["hits", "results", "validate"]),
    ("GetRecords.outputFormat", &SUPPORTED_OUTPUT_FORMATS),
    ("GetRecords.outputSchema", &SUPPORTED_OUTPUT_SCHEMAS),
    ("GetRecords.typeNames", &SUPPORTED_RECORD_TYPES),
    ("GetRecordById.elementSetName", &["brief", "summary", "full"]),
    (
        "GetCapabilities.sections",
        &["ServiceIdentification", "OperationsMetadata", "FilterCapabilities"],
    ),
];

pub(crate) async fn execute(
    worker: &CatalogWorker,
    request: DomainRequest,
) -> Result<DomainResponse> {
    validate::service_tag(request.service.as_deref())?;
    validate::version_tag(request.version.as_deref())?;

    match (&request.parameter_name, &request.property_name) {
        (Some(parameter), _) => {
            let values = OPERATION_PARAMETERS
                .iter()
                .find(|(name, _)| *name == parameter.as_str())
                .map(|(_, values)| values.iter().map(ToString::to_string).collect())
                .ok_or_else(|| {
                    CswError::invalid(
                        "parameterName",
                        format!("'{parameter}' is not an operation parameter"),
                    )
                })?;
            Ok(DomainResponse {
                domains: vec![DomainValues {
                    name: parameter.clone(),
                    values,
                }],
            })
        }
        (None, Some(attribute)) => {
            if !QueryableRegistry::is_queryable(attribute) {
                return Err(CswError::invalid(
                    "propertyName",
                    format!("'{attribute}' is not a queryable attribute"),
                ));
            }
            // Distinct values actually present in storage, across every
            // standard's own paths for the attribute.
            let mut values = Vec::new();
            for standard in Standard::all() {
                if let Some(paths) = worker.queryables().paths(standard, attribute) {
                    values.extend(worker.store().distinct_values(standard, paths).await?);
                }
            }
            values.sort();
            values.dedup();
            Ok(DomainResponse {
                domains: vec![DomainValues {
                    name: attribute.clone(),
                    values,
                }],
            })
        }
        (None, None) => Err(CswError::MissingParameter {
            parameter: "parameterName",
        }),
    }
}
