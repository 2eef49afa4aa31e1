use crate::api::errors::RankingError;
use crate::config::Config;
use crate::ranking::credential::parse_credential;
use crate::ranking::filter::PathFilter;
use crate::ranking::format::{format_report, RankingRow};
use crate::ranking::params::RankingParams;
use crate::ranking::report::{GetReportsRequest, ReportingBackend};
use axum::extract::{Query, State};
use axum::Json;
use std::sync::Arc;
use std::time::Duration;

/// Shared application state. Read-only after startup.
pub struct AppState {
    pub config: Config,
    pub backend: Arc<dyn ReportingBackend>,
}

/// GET /api/ranking — Top pages by pageviews, optionally restricted by path patterns.
///
/// The whole pipeline runs under `request_timeout_secs`; running out of time is
/// a failure like any other stage, so the single response is produced here
/// from the returned `Result`.
pub async fn get_ranking(
    State(state): State<Arc<AppState>>,
    Query(query): Query<Vec<(String, String)>>,
) -> Result<Json<Vec<RankingRow>>, RankingError> {
    let params = RankingParams::normalize(query);
    tracing::debug!(?params, "Ranking request");

    let deadline = Duration::from_secs(state.config.request_timeout_secs);
    let rows = tokio::time::timeout(deadline, rank_pages(&state, &params))
        .await
        .map_err(|_| {
            RankingError::ReportFetch(format!("ranking exceeded {}s deadline", deadline.as_secs()))
        })??;

    tracing::debug!(rows = rows.len(), "Ranking served");
    Ok(Json(rows))
}

/// Stages run strictly in order and the first failure ends the request.
async fn rank_pages(
    state: &AppState,
    params: &RankingParams,
) -> Result<Vec<RankingRow>, RankingError> {
    let credential = parse_credential(state.config.credential.as_deref())?;
    let client = state.backend.authorize(&credential).await?;

    let filter = PathFilter::parse(params.includes_paths())?;
    let request = GetReportsRequest::page_ranking(&state.config.view_id, &filter);
    let report = state.backend.batch_get(&client, &request).await?;

    format_report(&report)
}
