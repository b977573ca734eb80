//! Schema description operation (`DescribeRecord`).

use std::collections::BTreeSet;

use meridian_core::{SchemaRegistry, Standard};

use crate::error::{CswError, Result};
use crate::protocol::{
    root_type_for_standard, standard_for_record_type, DescribeRequest, DescribeResponse,
    SchemaComponent, SUPPORTED_RECORD_TYPES,
};
use crate::validate;
use crate::worker::CatalogWorker;

pub(crate) fn execute(
    worker: &CatalogWorker,
    request: &DescribeRequest,
) -> Result<DescribeResponse> {
    validate::service_tag(request.service.as_deref())?;
    validate::version_tag(request.version.as_deref())?;

    let requested: Vec<&str> = if request.record_types.is_empty() {
        SUPPORTED_RECORD_TYPES.to_vec()
    } else {
        request.record_types.iter().map(String::as_str).collect()
    };

    let mut components = Vec::new();
    for name in requested {
        let Some(standard) = standard_for_record_type(name) else {
            tracing::debug!(record_type = name, "unknown record type; skipping");
            continue;
        };
        components.push(SchemaComponent {
            record_type: name.to_string(),
            standard,
            types: describe_closure(worker.registry(), standard)?,
        });
    }
    Ok(DescribeResponse { components })
}

/// Renders every type descriptor reachable from the standard's root.
fn describe_closure(registry: &SchemaRegistry, standard: Standard) -> Result<serde_json::Value> {
    let root = root_type_for_standard(standard);
    let mut seen = BTreeSet::new();
    let mut queue = vec![root.to_string()];
    while let Some(name) = queue.pop() {
        if !seen.insert(name.clone()) {
            continue;
        }
        let descriptor = registry.descriptor(standard, &name)?;
        if let Some(superclass) = &descriptor.superclass {
            queue.push(superclass.clone());
        }
        for property in &descriptor.properties {
            queue.push(property.target.clone());
        }
    }

    let descriptors: Vec<_> = seen
        .iter()
        .map(|name| registry.descriptor(standard, name))
        .collect::<meridian_core::Result<_>>()?;
    serde_json::to_value(descriptors).map_err(|e| CswError::NoApplicableCode {
        message: format!("failed to render schema description: {e}"),
    })
}
