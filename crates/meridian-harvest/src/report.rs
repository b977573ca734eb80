//! Per-source harvest outcomes.

use meridian_csw::protocol::HarvestReport;

use crate::error::HarvestError;

/// The outcome of harvesting one remote source.
#[derive(Debug)]
pub struct SourceOutcome {
    /// The source's base address.
    pub source: String,
    /// Its summary, or the error that aborted it.
    pub result: Result<HarvestReport, HarvestError>,
}

/// Sums the successful summaries of a multi-source run.
#[must_use]
pub fn aggregate(outcomes: &[SourceOutcome]) -> HarvestReport {
    let mut total = HarvestReport::default();
    for outcome in outcomes {
        match &outcome.result {
            Ok(report) => {
                total.inserted += report.inserted;
                total.updated += report.updated;
                total.pages += report.pages;
                total.records_seen += report.records_seen;
                total.errors.extend(report.errors.iter().cloned());
            }
            Err(error) => {
                total.errors.push(format!("{}: {error}", outcome.source));
            }
        }
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aggregate_sums_and_collects_errors() {
        let outcomes = vec![
            SourceOutcome {
                source: "http://a".into(),
                result: Ok(HarvestReport {
                    inserted: 2,
                    updated: 1,
                    pages: 1,
                    records_seen: 3,
                    errors: vec![],
                }),
            },
            SourceOutcome {
                source: "http://b".into(),
                result: Err(HarvestError::Unreachable {
                    message: "connection refused".into(),
                }),
            },
        ];
        let total = aggregate(&outcomes);
        assert_eq!(total.inserted, 2);
        assert_eq!(total.updated, 1);
        assert_eq!(total.errors.len(), 1);
        assert!(total.errors[0].starts_with("http://b"));
    }
}
