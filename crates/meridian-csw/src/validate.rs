//! Shared request validation.
//!
//! Every operation validates its service and version tags against the
//! accepted literal sets before doing anything else; failures name the
//! offending parameter.

use crate::error::{CswError, Result};
use crate::protocol::{
    SUPPORTED_OUTPUT_FORMATS, SUPPORTED_OUTPUT_SCHEMAS, SUPPORTED_VERSIONS, OUTPUT_FORMAT_JSON,
    OUTPUT_SCHEMA_CSW, SERVICE,
};

/// Validates the service tag.
pub(crate) fn service_tag(service: Option<&str>) -> Result<()> {
    match service {
        None => Err(CswError::MissingParameter {
            parameter: "service",
        }),
        Some(SERVICE) => Ok(()),
        Some(other) => Err(CswError::invalid(
            "service",
            format!("expected '{SERVICE}', got '{other}'"),
        )),
    }
}

/// Validates the version tag against the accepted dialects.
pub(crate) fn version_tag(version: Option<&str>) -> Result<()> {
    match version {
        None => Err(CswError::MissingParameter {
            parameter: "version",
        }),
        Some(v) if SUPPORTED_VERSIONS.contains(&v) => Ok(()),
        Some(other) => Err(CswError::VersionNegotiation {
            message: format!(
                "version '{other}' is not supported; accepted: {SUPPORTED_VERSIONS:?}"
            ),
        }),
    }
}

/// Resolves the effective output schema, defaulting to the Dublin Core
/// rendering.
pub(crate) fn output_schema(schema: Option<&str>) -> Result<&str> {
    match schema {
        None => Ok(OUTPUT_SCHEMA_CSW),
        Some(s) if SUPPORTED_OUTPUT_SCHEMAS.contains(&s) => Ok(s),
        Some(other) => Err(CswError::invalid(
            "outputSchema",
            format!("'{other}' is not a supported output schema"),
        )),
    }
}

/// Resolves the effective output format against the allow-list.
pub(crate) fn output_format(format: Option<&str>) -> Result<&str> {
    match format {
        None => Ok(OUTPUT_FORMAT_JSON),
        Some(f) if SUPPORTED_OUTPUT_FORMATS.contains(&f) => Ok(f),
        Some(other) => Err(CswError::invalid(
            "outputFormat",
            format!("'{other}' is not an accepted output format"),
        )),
    }
}
