use crate::api::errors::RankingError;
use serde::{Deserialize, Serialize};

/// One ranked page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankingRow {
    pub path: String,
    pub views: u64,
}

// Only the fields the ranking reads; everything else in the response is ignored.
#[derive(Debug, Deserialize)]
struct GetReportsResponse {
    #[serde(default)]
    reports: Vec<Report>,
}

#[derive(Debug, Deserialize)]
struct Report {
    data: Option<ReportData>,
}

#[derive(Debug, Deserialize)]
struct ReportData {
    #[serde(default)]
    rows: Option<Vec<ReportRow>>,
}

#[derive(Debug, Deserialize)]
struct ReportRow {
    #[serde(default)]
    dimensions: Vec<String>,
    #[serde(default)]
    metrics: Vec<DateRangeValues>,
}

#[derive(Debug, Deserialize)]
struct DateRangeValues {
    #[serde(default)]
    values: Vec<String>,
}

/// Reduce a raw `reports:batchGet` response to `{path, views}` pairs in received order.
///
/// A first report without rows is a successful empty ranking. A missing
/// report, missing dimension or metric, or a non-integer view count is an error.
pub fn format_report(raw: &serde_json::Value) -> Result<Vec<RankingRow>, RankingError> {
    let response = GetReportsResponse::deserialize(raw)
        .map_err(|e| RankingError::Format(format!("unexpected response shape: {e}")))?;

    let report = response
        .reports
        .into_iter()
        .next()
        .ok_or_else(|| RankingError::Format("response contains no report".to_string()))?;
    let data = report
        .data
        .ok_or_else(|| RankingError::Format("report has no data".to_string()))?;

    let rows = data
        .rows
        .unwrap_or_default()
        .into_iter()
        .enumerate()
        .map(|(index, row)| format_row(index, row))
        .collect::<Result<Vec<_>, _>>()?;

    if rows.is_empty() {
        tracing::info!("got report successfully, but no data");
    }
    Ok(rows)
}

fn format_row(index: usize, row: ReportRow) -> Result<RankingRow, RankingError> {
    let path = row
        .dimensions
        .into_iter()
        .next()
        .ok_or_else(|| RankingError::Format(format!("row {index} has no dimension value")))?;
    let value = row
        .metrics
        .into_iter()
        .next()
        .and_then(|m| m.values.into_iter().next())
        .ok_or_else(|| RankingError::Format(format!("row {index} has no metric value")))?;
    let views = value.trim().parse::<u64>().map_err(|e| {
        RankingError::Format(format!("row {index} views {value:?} is not an integer: {e}"))
    })?;
    Ok(RankingRow { path, views })
}
