//! Search operation (`GetRecords`).

use chrono::Utc;

use meridian_catalog::{FieldOp, IndexQuery, QueryableRegistry, SortKey};

use crate::element_set::project;
use crate::error::{CswError, Result};
use crate::protocol::{
    standard_for_record_type, Acknowledgement, ComparisonOp, Filter, ResultMode,
    SearchRequest, SearchResponse, SearchResults,
};
use crate::validate;
use crate::worker::CatalogWorker;

pub(crate) async fn execute(
    worker: &CatalogWorker,
    request: SearchRequest,
) -> Result<SearchResponse> {
    validate::service_tag(request.service.as_deref())?;
    validate::version_tag(request.version.as_deref())?;

    if request.record_types.is_empty() {
        return Err(CswError::MissingParameter {
            parameter: "typeNames",
        });
    }
    if !request
        .record_types
        .iter()
        .any(|name| standard_for_record_type(name).is_some())
    {
        return Err(CswError::invalid(
            "typeNames",
            format!("no supported record type among {:?}", request.record_types),
        ));
    }
    validate::output_schema(request.output_schema.as_deref())?;
    validate::output_format(request.output_format.as_deref())?;

    let start = request.start_position.unwrap_or(1);
    if start < 1 {
        return Err(CswError::invalid("startPosition", "must be at least 1"));
    }

    let sort = match &request.sort {
        Some(spec) if spec.attribute.trim().is_empty() => {
            return Err(CswError::invalid("sortBy", "sort attribute must be non-empty"));
        }
        Some(spec) => Some(SortKey {
            attribute: spec.attribute.clone(),
            order: spec.order,
        }),
        None => None,
    };

    let query = compile_filter(request.filter.as_ref())?;

    if request.result_mode == ResultMode::Validate {
        // Validated but not executed.
        return Ok(SearchResponse::Acknowledgement(Acknowledgement {
            time_stamp: Utc::now(),
            echoed_request: Box::new(request),
        }));
    }

    let offset = (start - 1) as usize;
    let limit = match request.result_mode {
        ResultMode::Hits => 0,
        _ => request.max_records.unwrap_or(10) as usize,
    };

    let hits = worker.index().search(&query, sort.as_ref(), offset, limit);
    let matched = u32::try_from(hits.total).unwrap_or(u32::MAX);
    let returned = u32::try_from(hits.ids.len()).unwrap_or(u32::MAX);
    let next_record = if request.result_mode == ResultMode::Hits
        || offset + hits.ids.len() >= hits.total
    {
        0
    } else {
        start + returned
    };

    let element_set = request.element_set.clone().unwrap_or_default();
    let records = hits
        .ids
        .iter()
        .filter_map(|id| worker.index().document(id))
        .map(|document| project(&document, &element_set))
        .collect();

    Ok(SearchResponse::Results(SearchResults {
        number_of_records_matched: matched,
        number_of_records_returned: returned,
        next_record,
        records,
    }))
}

/// Compiles the caller's structured filter into the index's query form.
pub(crate) fn compile_filter(filter: Option<&Filter>) -> Result<IndexQuery> {
    match filter {
        None => Ok(IndexQuery::MatchAll),
        Some(Filter::AnyText { query }) => Ok(IndexQuery::parse_text(query)?),
        Some(Filter::Property { name, op, value }) => {
            if !QueryableRegistry::is_queryable(name) {
                return Err(CswError::invalid(
                    "constraint",
                    format!("'{name}' is not a queryable attribute"),
                ));
            }
            Ok(IndexQuery::Field {
                attribute: name.clone(),
                op: match op {
                    ComparisonOp::EqualTo => FieldOp::Equals,
                    ComparisonOp::Like => FieldOp::Like,
                },
                value: value.clone(),
            })
        }
        Some(Filter::And(branches)) => Ok(IndexQuery::And(compile_branches(branches)?)),
        Some(Filter::Or(branches)) => Ok(IndexQuery::Or(compile_branches(branches)?)),
    }
}

fn compile_branches(branches: &[Filter]) -> Result<Vec<IndexQuery>> {
    branches
        .iter()
        .map(|branch| compile_filter(Some(branch)))
        .collect()
}
