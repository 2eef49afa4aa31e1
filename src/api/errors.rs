use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

/// Failure of one stage of the ranking pipeline.
///
/// Every variant collapses to the same opaque 500 response; the cause is only
/// ever written to the log.
#[derive(Debug, thiserror::Error)]
pub enum RankingError {
    #[error("invalid credential file: {0}")]
    CredentialParse(String),
    #[error("authentication failed: {0}")]
    Auth(String),
    #[error("includes_paths is not valid: {0}")]
    PathFilter(String),
    #[error("fail at getting report: {0}")]
    ReportFetch(String),
    #[error("fail at formatting report data: {0}")]
    Format(String),
}

impl RankingError {
    /// Short, stable name of the stage that failed.
    pub const fn stage(&self) -> &'static str {
        match self {
            Self::CredentialParse(_) => "credential",
            Self::Auth(_) => "auth",
            Self::PathFilter(_) => "path_filter",
            Self::ReportFetch(_) => "report_fetch",
            Self::Format(_) => "format",
        }
    }
}

impl IntoResponse for RankingError {
    fn into_response(self) -> Response {
        tracing::error!(stage = self.stage(), error = %self, "Ranking request failed");
        let body = serde_json::json!({ "error": "internal error" });
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}
