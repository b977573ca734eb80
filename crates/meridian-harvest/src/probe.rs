//! Capability probing and peer profiling.
//!
//! The probe ladder is fixed: GET with the current version, POST with the
//! current version, POST with the legacy version. The first success wins.
//! Whatever the capabilities response omits is filled from a conservative
//! built-in set, and one known non-conforming vendor profile is
//! recognized by its service title.

use serde_json::Value;

use meridian_csw::protocol::{
    LEGACY_VERSION, OUTPUT_SCHEMA_CSW, RECORD_TYPE_CSW, SUPPORTED_OUTPUT_SCHEMAS,
    SUPPORTED_RECORD_TYPES, SUPPORTED_VERSIONS, VERSION,
};

use crate::client::PeerClient;
use crate::error::Result;

/// Known vendor profiles needing hand-tuned request templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum VendorQuirk {
    /// A conforming peer.
    None,
    /// ESRI-titled services: summary element set, Dublin Core only.
    Esri,
}

/// What the probe learned about a peer.
#[derive(Debug, Clone)]
pub(crate) struct PeerProfile {
    pub version: String,
    pub output_schemas: Vec<String>,
    pub record_types: Vec<String>,
    pub quirk: VendorQuirk,
}

/// Runs the probe ladder and extracts the peer's profile.
pub(crate) async fn probe(client: &PeerClient, base: &str) -> Result<PeerProfile> {
    let capabilities = match client.capabilities_get(base, VERSION).await {
        Ok(value) => value,
        Err(first) => {
            tracing::debug!(%first, "GET probe failed; trying POST");
            match client.capabilities_post(base, VERSION).await {
                Ok(value) => value,
                Err(second) => {
                    tracing::debug!(%second, "POST probe failed; trying legacy version");
                    client.capabilities_post(base, LEGACY_VERSION).await?
                }
            }
        }
    };
    Ok(extract_profile(&capabilities))
}

/// Extracts a profile from a (normalized) capabilities value, defaulting
/// conservatively where the peer omits information.
pub(crate) fn extract_profile(capabilities: &Value) -> PeerProfile {
    let version = capabilities
        .get("version")
        .and_then(Value::as_str)
        .filter(|v| SUPPORTED_VERSIONS.contains(v))
        .unwrap_or(VERSION)
        .to_string();

    let output_schemas = advertised(capabilities, "outputSchema")
        .into_iter()
        .filter(|s| SUPPORTED_OUTPUT_SCHEMAS.contains(&s.as_str()))
        .collect::<Vec<_>>();
    let output_schemas = if output_schemas.is_empty() {
        vec![OUTPUT_SCHEMA_CSW.to_string()]
    } else {
        output_schemas
    };

    let record_types = advertised(capabilities, "typeNames")
        .into_iter()
        .filter(|t| SUPPORTED_RECORD_TYPES.contains(&t.as_str()))
        .collect::<Vec<_>>();
    let record_types = if record_types.is_empty() {
        vec![RECORD_TYPE_CSW.to_string()]
    } else {
        record_types
    };

    let title = capabilities
        .pointer("/serviceIdentification/title")
        .and_then(Value::as_str)
        .unwrap_or("");
    let quirk = if title.to_lowercase().contains("esri") {
        VendorQuirk::Esri
    } else {
        VendorQuirk::None
    };

    PeerProfile {
        version,
        output_schemas,
        record_types,
        quirk,
    }
}

/// Collects the values a capabilities response advertises for one
/// `GetRecords` parameter.
fn advertised(capabilities: &Value, parameter: &str) -> Vec<String> {
    let Some(operations) = capabilities
        .pointer("/operationsMetadata/operations")
        .and_then(Value::as_array)
    else {
        return Vec::new();
    };
    operations
        .iter()
        .filter(|op| op.get("name").and_then(Value::as_str) == Some("GetRecords"))
        .filter_map(|op| op.pointer(&format!("/parameters/{parameter}")))
        .filter_map(Value::as_array)
        .flatten()
        .filter_map(Value::as_str)
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use meridian_csw::protocol::OUTPUT_SCHEMA_ISO;

    #[test]
    fn missing_blocks_default_conservatively() {
        let profile = extract_profile(&serde_json::json!({}));
        assert_eq!(profile.version, VERSION);
        assert_eq!(profile.output_schemas, [OUTPUT_SCHEMA_CSW]);
        assert_eq!(profile.record_types, [RECORD_TYPE_CSW]);
        assert_eq!(profile.quirk, VendorQuirk::None);
    }

    #[test]
    fn advertised_values_are_filtered_to_supported() {
        let capabilities = serde_json::json!({
            "version": "2.0.1",
            "operationsMetadata": {
                "operations": [{
                    "name": "GetRecords",
                    "parameters": {
                        "outputSchema": [OUTPUT_SCHEMA_CSW, OUTPUT_SCHEMA_ISO, "urn:vendor"],
                        "typeNames": ["csw:Record", "rim:RegistryObject"],
                    },
                }],
            },
        });
        let profile = extract_profile(&capabilities);
        assert_eq!(profile.version, "2.0.1");
        assert_eq!(profile.output_schemas, [OUTPUT_SCHEMA_CSW, OUTPUT_SCHEMA_ISO]);
        assert_eq!(profile.record_types, ["csw:Record"]);
    }

    #[test]
    fn esri_profile_recognized_by_title() {
        let capabilities = serde_json::json!({
            "serviceIdentification": { "title": "ESRI Geoportal Server" },
        });
        assert_eq!(extract_profile(&capabilities).quirk, VendorQuirk::Esri);
    }

    #[test]
    fn unsupported_version_falls_back() {
        let capabilities = serde_json::json!({ "version": "3.0.0" });
        assert_eq!(extract_profile(&capabilities).version, VERSION);
    }
}
