//! Catalog metrics.
//!
//! Provides metrics for index rebuilds and mapper recoveries. These
//! complement the structured logging approach already in place.

use metrics::{counter, describe_counter, describe_histogram, histogram};

/// Documents indexed counter.
pub const INDEX_DOCUMENTS: &str = "meridian_index_documents_total";

/// Index rebuild duration histogram.
pub const INDEX_REBUILD_DURATION: &str = "meridian_index_rebuild_duration_seconds";

/// Mapper skipped-properties counter.
pub const MAPPER_SKIPPED_PROPERTIES: &str = "meridian_mapper_skipped_properties_total";

/// Registers all catalog metric descriptions.
///
/// Call this once at application startup after initializing the metrics
/// recorder.
pub fn register_metrics() {
    describe_counter!(INDEX_DOCUMENTS, "Total documents indexed across rebuilds");
    describe_histogram!(
        INDEX_REBUILD_DURATION,
        "Duration of index rebuilds in seconds"
    );
    describe_counter!(
        MAPPER_SKIPPED_PROPERTIES,
        "Total properties skipped during mapping"
    );
}

/// Records an index rebuild.
pub fn record_index_rebuild(documents: u64, duration_secs: f64) {
    counter!(INDEX_DOCUMENTS).increment(documents);
    histogram!(INDEX_REBUILD_DURATION).record(duration_secs);
}

/// Records a property skipped by the mapper.
pub fn record_skipped_property(direction: &'static str) {
    counter!(MAPPER_SKIPPED_PROPERTIES, "direction" => direction).increment(1);
}
