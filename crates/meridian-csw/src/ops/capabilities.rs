//! Capabilities operation.

use std::collections::BTreeMap;

use meridian_catalog::QUERYABLE_ATTRIBUTES;

use crate::error::{CswError, Result};
use crate::ops::domain::OPERATION_PARAMETERS;
use crate::protocol::{
    Capabilities, CapabilitiesRequest, FilterCapabilities, OperationInfo, OperationsMetadata,
    ServiceIdentification, SERVICE, SUPPORTED_VERSIONS, VERSION,
};
use crate::validate;

/// Known section names. Anything else in the request is ignored.
const SECTION_SERVICE_IDENTIFICATION: &str = "ServiceIdentification";
const SECTION_OPERATIONS_METADATA: &str = "OperationsMetadata";

pub(crate) fn execute(request: &CapabilitiesRequest) -> Result<Capabilities> {
    validate::service_tag(request.service.as_deref())?;

    let version = if request.accept_versions.is_empty() {
        VERSION
    } else {
        request
            .accept_versions
            .iter()
            .find(|v| SUPPORTED_VERSIONS.contains(&v.as_str()))
            .map(String::as_str)
            .ok_or_else(|| CswError::VersionNegotiation {
                message: format!(
                    "none of {:?} is supported; accepted: {SUPPORTED_VERSIONS:?}",
                    request.accept_versions
                ),
            })?
    };

    let all_sections = request.sections.is_empty();
    let wants = |section: &str| {
        all_sections
            || request
                .sections
                .iter()
                .any(|s| s.eq_ignore_ascii_case(section))
    };

    Ok(Capabilities {
        version: version.to_string(),
        service_identification: wants(SECTION_SERVICE_IDENTIFICATION)
            .then(service_identification),
        operations_metadata: wants(SECTION_OPERATIONS_METADATA).then(operations_metadata),
        // The filter block is included regardless of the selection.
        filter_capabilities: filter_capabilities(),
    })
}

fn service_identification() -> ServiceIdentification {
    ServiceIdentification {
        title: "Meridian Catalog Service".to_string(),
        summary: "Geospatial metadata catalog with federated harvesting".to_string(),
        service_type: SERVICE.to_string(),
        service_type_versions: SUPPORTED_VERSIONS.iter().map(ToString::to_string).collect(),
    }
}

fn operations_metadata() -> OperationsMetadata {
    let mut by_operation: BTreeMap<&str, BTreeMap<String, Vec<String>>> = BTreeMap::new();
    for operation in [
        "GetCapabilities",
        "GetRecords",
        "GetRecordById",
        "DescribeRecord",
        "GetDomain",
        "Transaction",
        "Harvest",
    ] {
        by_operation.insert(operation, BTreeMap::new());
    }
    for (name, values) in OPERATION_PARAMETERS {
        if let Some((operation, parameter)) = name.split_once('.') {
            if let Some(parameters) = by_operation.get_mut(operation) {
                parameters.insert(
                    parameter.to_string(),
                    values.iter().map(ToString::to_string).collect(),
                );
            }
        }
    }
    OperationsMetadata {
        operations: by_operation
            .into_iter()
            .map(|(name, parameters)| OperationInfo {
                name: name.to_string(),
                parameters,
            })
            .collect(),
    }
}

fn filter_capabilities() -> FilterCapabilities {
    FilterCapabilities {
        logical_operators: vec!["And".to_string(), "Or".to_string()],
        comparison_operators: vec!["EqualTo".to_string(), "Like".to_string()],
        queryables: QUERYABLE_ATTRIBUTES.iter().map(ToString::to_string).collect(),
    }
}
