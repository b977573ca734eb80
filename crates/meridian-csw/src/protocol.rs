//! Protocol envelopes and accepted literals.
//!
//! The logical request/response contract of the catalog service,
//! independent of wire framing: envelopes serialize as JSON via serde and
//! the same types are spoken client-side by the harvester against peer
//! catalogs. Two protocol-version dialects are accepted.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use meridian_catalog::SortOrder;
use meridian_core::Standard;
use meridian_records::standards::{dublin_core, iso19115};

use crate::error::Result;

/// Accepted service tag.
pub const SERVICE: &str = "CSW";
/// Current protocol version.
pub const VERSION: &str = "2.0.2";
/// Older dialect still accepted and spoken to legacy peers.
pub const LEGACY_VERSION: &str = "2.0.1";
/// All accepted protocol versions, newest first.
pub const SUPPORTED_VERSIONS: [&str; 2] = [VERSION, LEGACY_VERSION];

/// Output schema identifier of the Dublin Core record rendering.
pub const OUTPUT_SCHEMA_CSW: &str = "http://www.opengis.net/cat/csw/2.0.2";
/// Output schema identifier of the ISO 19115 record rendering.
pub const OUTPUT_SCHEMA_ISO: &str = "http://www.isotc211.org/2005/gmd";
/// All supported output schemas.
pub const SUPPORTED_OUTPUT_SCHEMAS: [&str; 2] = [OUTPUT_SCHEMA_CSW, OUTPUT_SCHEMA_ISO];

/// The only accepted output format.
pub const OUTPUT_FORMAT_JSON: &str = "application/json";
/// Allow-list of output formats.
pub const SUPPORTED_OUTPUT_FORMATS: [&str; 1] = [OUTPUT_FORMAT_JSON];

/// Dublin Core record type name.
pub const RECORD_TYPE_CSW: &str = "csw:Record";
/// ISO 19115 record type name.
pub const RECORD_TYPE_ISO: &str = "gmd:MD_Metadata";
/// All supported record type names.
pub const SUPPORTED_RECORD_TYPES: [&str; 2] = [RECORD_TYPE_CSW, RECORD_TYPE_ISO];

/// Maps a protocol record type name to its standard.
#[must_use]
pub fn standard_for_record_type(name: &str) -> Option<Standard> {
    match name {
        RECORD_TYPE_CSW => Some(Standard::DublinCore),
        RECORD_TYPE_ISO => Some(Standard::Iso19115),
        _ => None,
    }
}

/// Maps an output schema identifier to its standard.
#[must_use]
pub fn standard_for_output_schema(schema: &str) -> Option<Standard> {
    match schema {
        OUTPUT_SCHEMA_CSW => Some(Standard::DublinCore),
        OUTPUT_SCHEMA_ISO => Some(Standard::Iso19115),
        _ => None,
    }
}

/// Returns the root type name of a standard's records.
#[must_use]
pub fn root_type_for_standard(standard: Standard) -> &'static str {
    match standard {
        Standard::Iso19115 => iso19115::ROOT_TYPE,
        Standard::DublinCore => dublin_core::ROOT_TYPE,
    }
}

// ============================================================================
// Capabilities
// ============================================================================

/// Capabilities request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapabilitiesRequest {
    /// Service tag; must be `CSW`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    /// Versions the caller accepts, in preference order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub accept_versions: Vec<String>,
    /// Requested sections; empty means all. Unknown names are ignored.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sections: Vec<String>,
}

/// Service identification block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceIdentification {
    /// Service title.
    pub title: String,
    /// Service abstract.
    #[serde(rename = "abstract")]
    pub summary: String,
    /// Service type (`CSW`).
    pub service_type: String,
    /// Supported protocol versions.
    pub service_type_versions: Vec<String>,
}

/// One advertised operation with its parameter domains.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationInfo {
    /// Operation name.
    pub name: String,
    /// Parameter name to its enumerated legal values.
    pub parameters: BTreeMap<String, Vec<String>>,
}

/// Operations metadata block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationsMetadata {
    /// Advertised operations.
    pub operations: Vec<OperationInfo>,
}

/// Advertised filter capabilities. Always included in responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterCapabilities {
    /// Supported logical operators.
    pub logical_operators: Vec<String>,
    /// Supported comparison operators.
    pub comparison_operators: Vec<String>,
    /// Queryable attribute names.
    pub queryables: Vec<String>,
}

/// Capabilities response, section-filtered per request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Capabilities {
    /// Negotiated protocol version.
    pub version: String,
    /// Identification block, if requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_identification: Option<ServiceIdentification>,
    /// Operations block, if requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operations_metadata: Option<OperationsMetadata>,
    /// Filter capabilities; present regardless of the caller's selection.
    pub filter_capabilities: FilterCapabilities,
}

// ============================================================================
// Search (GetRecords)
// ============================================================================

/// How search results are reported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResultMode {
    /// Return only the total match count.
    Hits,
    /// Return a page of projected records.
    #[default]
    Results,
    /// Validate the request and return an acknowledgement echo.
    Validate,
}

/// Response detail level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ElementSet {
    /// Identifier, title and type.
    Brief,
    /// Brief plus subject, format, modified and abstract.
    Summary,
    /// Every populated queryable.
    Full,
    /// An explicit element subset, copied from the full projection.
    Named(Vec<String>),
}

impl Default for ElementSet {
    fn default() -> Self {
        Self::Summary
    }
}

/// Comparison operator of a property constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ComparisonOp {
    /// Exact, case-insensitive equality.
    EqualTo,
    /// `%`-wildcard pattern match.
    Like,
}

/// A structured search constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Filter {
    /// Free-text query against the default field.
    AnyText {
        /// Term/phrase query string.
        query: String,
    },
    /// Constraint on one queryable attribute.
    Property {
        /// Logical attribute name.
        name: String,
        /// Comparison operator.
        op: ComparisonOp,
        /// Comparison value or pattern.
        value: String,
    },
    /// Every branch must hold.
    And(Vec<Filter>),
    /// At least one branch must hold.
    Or(Vec<Filter>),
}

/// Sort specification over a queryable attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortSpec {
    /// Attribute to sort by; must be non-empty.
    pub attribute: String,
    /// Sort direction.
    pub order: SortOrder,
}

/// Search request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    /// Service tag; must be `CSW`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    /// Protocol version; must be an accepted dialect.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Requested record type names; at least one must be supported.
    #[serde(default)]
    pub record_types: Vec<String>,
    /// Requested output schema; defaults to the Dublin Core schema.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_schema: Option<String>,
    /// Requested output format; defaults to `application/json`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_format: Option<String>,
    /// Result reporting mode.
    #[serde(default)]
    pub result_mode: ResultMode,
    /// Response detail level; defaults to summary.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub element_set: Option<ElementSet>,
    /// Structured constraint, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<Filter>,
    /// Sort specification, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<SortSpec>,
    /// 1-based position of the first record to return.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_position: Option<u32>,
    /// Page size.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_records: Option<u32>,
}

/// One page of search results.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResults {
    /// Total number of records matching the query.
    pub number_of_records_matched: u32,
    /// Number of records in this page.
    pub number_of_records_returned: u32,
    /// 1-based cursor of the next record, or 0 when exhausted.
    pub next_record: u32,
    /// Projected records.
    pub records: Vec<serde_json::Value>,
}

/// Echo returned in validate-only mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Acknowledgement {
    /// Time the request was received.
    pub time_stamp: DateTime<Utc>,
    /// The request, echoed unexecuted.
    pub echoed_request: Box<SearchRequest>,
}

/// Search response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SearchResponse {
    /// Validate-only acknowledgement.
    Acknowledgement(Acknowledgement),
    /// Executed search results.
    Results(SearchResults),
}

impl SearchResponse {
    /// Returns the results, if the search was executed.
    #[must_use]
    pub fn results(&self) -> Option<&SearchResults> {
        match self {
            Self::Results(results) => Some(results),
            Self::Acknowledgement(_) => None,
        }
    }
}

// ============================================================================
// Fetch by identifier (GetRecordById)
// ============================================================================

/// Fetch-by-identifier request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchRequest {
    /// Service tag; must be `CSW`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    /// Protocol version; must be an accepted dialect.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Identifiers to resolve; storage ids or business titles.
    #[serde(default)]
    pub ids: Vec<String>,
    /// Response detail level; defaults to summary.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub element_set: Option<ElementSet>,
}

/// A per-identifier resolution failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchFailure {
    /// The identifier that failed to resolve.
    pub id: String,
    /// Why it failed.
    pub reason: String,
}

/// Fetch-by-identifier response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchResponse {
    /// Projected records for the identifiers that resolved.
    pub records: Vec<serde_json::Value>,
    /// Identifiers that did not resolve.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<FetchFailure>,
}

// ============================================================================
// Describe schema (DescribeRecord)
// ============================================================================

/// Schema description request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DescribeRequest {
    /// Service tag; must be `CSW`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    /// Protocol version; must be an accepted dialect.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Record types to describe; empty means every supported type.
    #[serde(default)]
    pub record_types: Vec<String>,
}

/// The structural description of one record type.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaComponent {
    /// Protocol record type name.
    pub record_type: String,
    /// The standard the type belongs to.
    pub standard: Standard,
    /// The type descriptors reachable from the root type.
    pub types: serde_json::Value,
}

/// Schema description response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DescribeResponse {
    /// One component per described record type.
    pub components: Vec<SchemaComponent>,
}

// ============================================================================
// Attribute domain (GetDomain)
// ============================================================================

/// Attribute/parameter domain request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainRequest {
    /// Service tag; must be `CSW`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    /// Protocol version; must be an accepted dialect.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// `Operation.parameter` name for static enumerations.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameter_name: Option<String>,
    /// Queryable attribute name for a distinct-value scan.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property_name: Option<String>,
}

/// The domain of one parameter or attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainValues {
    /// The name the domain was requested for.
    pub name: String,
    /// The legal or observed values.
    pub values: Vec<String>,
}

/// Attribute/parameter domain response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainResponse {
    /// One entry per requested name.
    pub domains: Vec<DomainValues>,
}

// ============================================================================
// Transaction
// ============================================================================

/// One transaction operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TransactionOp {
    /// Insert (or update, by natural key) typed records.
    Insert {
        /// Record type name of the payloads.
        record_type: String,
        /// Record payloads in wire JSON form.
        records: Vec<serde_json::Value>,
    },
    /// Update by constraint. Not supported.
    Update {
        /// Constraint naming the records to update.
        constraint: Option<Filter>,
    },
    /// Delete by constraint. Not supported.
    Delete {
        /// Constraint naming the records to delete.
        constraint: Option<Filter>,
    },
}

/// Transaction request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
    /// Service tag; must be `CSW`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    /// Protocol version; must be an accepted dialect.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// The operations to apply.
    #[serde(default)]
    pub operations: Vec<TransactionOp>,
}

/// Insert/update/delete counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionSummary {
    /// Records whose natural key was new.
    pub total_inserted: u64,
    /// Records whose natural key already existed.
    pub total_updated: u64,
    /// Records deleted. Always zero; deletes are unsupported.
    pub total_deleted: u64,
}

/// Transaction response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionResponse {
    /// Outcome counters.
    pub summary: TransactionSummary,
    /// Per-record failures; present when the transaction partially
    /// succeeded.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<String>,
}

// ============================================================================
// Harvest
// ============================================================================

/// Harvest request (synchronous mode only).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HarvestRequest {
    /// Service tag; must be `CSW`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    /// Protocol version; must be an accepted dialect.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Base address of the remote catalog.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Asynchronous response address. Unsupported; must be absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_handler: Option<String>,
}

/// Summary of one harvested source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HarvestReport {
    /// Records inserted.
    pub inserted: u64,
    /// Records that already existed and were replaced.
    pub updated: u64,
    /// Result pages fetched.
    pub pages: u64,
    /// Records seen across all output schemas.
    pub records_seen: u64,
    /// Protocol and per-record errors encountered and tolerated.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

/// Harvest response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HarvestResponse {
    /// Counters folded into transaction semantics.
    pub summary: TransactionSummary,
    /// Errors tolerated during the harvest.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

/// A client able to harvest one remote catalog into the local store.
///
/// Implemented by the harvester crate; the worker only depends on the
/// contract.
#[async_trait]
pub trait RemoteHarvester: Send + Sync + 'static {
    /// Crawls the remote catalog at `source` and returns its summary.
    async fn harvest(&self, source: &str) -> Result<HarvestReport>;
}
