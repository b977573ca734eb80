//! Protocol error types with stable machine-readable codes.
//!
//! Every failure carries a reason code and, where applicable, the name of
//! the offending parameter. Storage failures surface as a generic
//! service-unavailable condition; raw causes are logged, never echoed to
//! the caller.

use thiserror::Error;

use meridian_catalog::CatalogError;

/// Result type alias for protocol operations.
pub type Result<T> = std::result::Result<T, CswError>;

/// Errors reported to protocol callers.
#[derive(Debug, Error)]
pub enum CswError {
    /// A required parameter was absent.
    #[error("missing parameter: {parameter}")]
    MissingParameter {
        /// The absent parameter.
        parameter: &'static str,
    },

    /// A parameter carried an unacceptable value.
    #[error("invalid value for {parameter}: {message}")]
    InvalidParameter {
        /// The offending parameter.
        parameter: &'static str,
        /// What made the value unacceptable.
        message: String,
    },

    /// No requested protocol version is supported.
    #[error("version negotiation failed: {message}")]
    VersionNegotiation {
        /// The versions offered and accepted.
        message: String,
    },

    /// The operation (or operation mode) is not supported.
    #[error("operation not supported: {operation}")]
    OperationNotSupported {
        /// The unsupported operation.
        operation: String,
    },

    /// The storage backend failed; the request may be retried later.
    #[error("service unavailable: {message}")]
    ServiceUnavailable {
        /// Safe description of the failure.
        message: String,
    },

    /// An unclassified internal failure.
    #[error("{message}")]
    NoApplicableCode {
        /// Safe description of the failure.
        message: String,
    },
}

impl CswError {
    /// Creates an invalid-parameter error.
    #[must_use]
    pub fn invalid(parameter: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            parameter,
            message: message.into(),
        }
    }

    /// The stable machine-readable reason code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::MissingParameter { .. } => "MissingParameterValue",
            Self::InvalidParameter { .. } => "InvalidParameterValue",
            Self::VersionNegotiation { .. } => "VersionNegotiationFailed",
            Self::OperationNotSupported { .. } => "OperationNotSupported",
            Self::ServiceUnavailable { .. } => "ServiceUnavailable",
            Self::NoApplicableCode { .. } => "NoApplicableCode",
        }
    }

    /// The offending parameter name, where one applies.
    #[must_use]
    pub const fn locator(&self) -> Option<&'static str> {
        match self {
            Self::MissingParameter { parameter } | Self::InvalidParameter { parameter, .. } => {
                Some(parameter)
            }
            _ => None,
        }
    }
}

impl From<meridian_core::Error> for CswError {
    fn from(error: meridian_core::Error) -> Self {
        match error {
            meridian_core::Error::Storage { message, .. } => {
                tracing::error!(%message, "storage failure");
                Self::ServiceUnavailable {
                    message: "record storage unavailable".into(),
                }
            }
            other => Self::NoApplicableCode {
                message: other.to_string(),
            },
        }
    }
}

impl From<CatalogError> for CswError {
    fn from(error: CatalogError) -> Self {
        match error {
            CatalogError::BadQuery { message } => Self::InvalidParameter {
                parameter: "constraint",
                message,
            },
            CatalogError::Mapping { message } => Self::NoApplicableCode { message },
            CatalogError::Core(core) => core.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_and_locators() {
        let error = CswError::MissingParameter { parameter: "service" };
        assert_eq!(error.code(), "MissingParameterValue");
        assert_eq!(error.locator(), Some("service"));

        let error = CswError::invalid("outputFormat", "text/csv is not supported");
        assert_eq!(error.code(), "InvalidParameterValue");
        assert_eq!(error.locator(), Some("outputFormat"));

        let error = CswError::OperationNotSupported {
            operation: "Update".into(),
        };
        assert_eq!(error.locator(), None);
    }

    #[test]
    fn storage_failures_become_service_unavailable() {
        let error: CswError = meridian_core::Error::storage("connection refused").into();
        assert_eq!(error.code(), "ServiceUnavailable");
        // The raw cause is not echoed.
        assert!(!error.to_string().contains("connection refused"));
    }

    #[test]
    fn bad_queries_name_the_constraint_parameter() {
        let error: CswError =
            CatalogError::bad_query("unterminated phrase").into();
        assert_eq!(error.code(), "InvalidParameterValue");
        assert_eq!(error.locator(), Some("constraint"));
    }
}
