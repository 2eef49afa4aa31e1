use crate::api::errors::RankingError;
use crate::config::Config;
use crate::ranking::auth::{self, AuthClient};
use crate::ranking::credential::ServiceAccountCredential;
use crate::ranking::filter::PathFilter;
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

pub const PAGE_PATH_DIMENSION: &str = "ga:pagePath";
pub const PAGEVIEWS_METRIC: &str = "ga:pageviews";
pub const RANKING_PAGE_SIZE: u32 = 10;
const START_DATE: &str = "30daysAgo";
const END_DATE: &str = "1daysAgo";

/// Body of a `reports:batchGet` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetReportsRequest {
    pub report_requests: Vec<ReportRequest>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRequest {
    pub view_id: String,
    pub date_ranges: Vec<DateRange>,
    pub dimensions: Vec<Dimension>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dimension_filter_clauses: Vec<DimensionFilterClause>,
    pub metrics: Vec<Metric>,
    pub order_bys: Vec<OrderBy>,
    pub page_size: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    pub start_date: String,
    pub end_date: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dimension {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DimensionFilterClause {
    pub operator: String,
    pub filters: Vec<DimensionFilter>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DimensionFilter {
    pub dimension_name: String,
    pub operator: String,
    pub expressions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Metric {
    pub expression: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderBy {
    pub field_name: String,
    pub sort_order: String,
}

impl GetReportsRequest {
    /// Top pages by pageviews over the trailing 30 days, ending yesterday.
    ///
    /// Each pattern becomes one `REGEXP` filter, OR-combined. An empty filter
    /// omits the clause so the ranking covers every path.
    pub fn page_ranking(view_id: &str, filter: &PathFilter) -> Self {
        let dimension_filter_clauses = if filter.is_empty() {
            Vec::new()
        } else {
            vec![DimensionFilterClause {
                operator: "OR".to_string(),
                filters: filter
                    .patterns()
                    .iter()
                    .map(|pattern| DimensionFilter {
                        dimension_name: PAGE_PATH_DIMENSION.to_string(),
                        operator: "REGEXP".to_string(),
                        expressions: vec![pattern.clone()],
                    })
                    .collect(),
            }]
        };

        Self {
            report_requests: vec![ReportRequest {
                view_id: view_id.to_string(),
                date_ranges: vec![DateRange {
                    start_date: START_DATE.to_string(),
                    end_date: END_DATE.to_string(),
                }],
                dimensions: vec![Dimension {
                    name: PAGE_PATH_DIMENSION.to_string(),
                }],
                dimension_filter_clauses,
                metrics: vec![Metric {
                    expression: PAGEVIEWS_METRIC.to_string(),
                }],
                order_bys: vec![OrderBy {
                    field_name: PAGEVIEWS_METRIC.to_string(),
                    sort_order: "DESCENDING".to_string(),
                }],
                page_size: RANKING_PAGE_SIZE,
            }],
        }
    }

    /// Every regular expression sent to the service, in request order.
    pub fn filter_expressions(&self) -> Vec<&str> {
        self.report_requests
            .iter()
            .flat_map(|r| &r.dimension_filter_clauses)
            .flat_map(|c| &c.filters)
            .flat_map(|f| &f.expressions)
            .map(String::as_str)
            .collect()
    }
}

/// Outbound side of the ranking pipeline: token exchange and report query.
#[async_trait]
pub trait ReportingBackend: Send + Sync {
    async fn authorize(
        &self,
        credential: &ServiceAccountCredential,
    ) -> Result<AuthClient, RankingError>;

    /// Run the query and return the service's response body untouched.
    async fn batch_get(
        &self,
        client: &AuthClient,
        request: &GetReportsRequest,
    ) -> Result<serde_json::Value, RankingError>;
}

/// `ReportingBackend` that talks to the Google endpoints over HTTPS.
pub struct HttpReportingBackend {
    http: reqwest::Client,
    reporting_url: String,
    token_url: Option<String>,
}

impl HttpReportingBackend {
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self {
            http,
            reporting_url: config.reporting_url.clone(),
            token_url: config.token_url.clone(),
        })
    }
}

#[async_trait]
impl ReportingBackend for HttpReportingBackend {
    async fn authorize(
        &self,
        credential: &ServiceAccountCredential,
    ) -> Result<AuthClient, RankingError> {
        auth::exchange(&self.http, credential, self.token_url.as_deref()).await
    }

    async fn batch_get(
        &self,
        client: &AuthClient,
        request: &GetReportsRequest,
    ) -> Result<serde_json::Value, RankingError> {
        let response = self
            .http
            .post(&self.reporting_url)
            .header(
                reqwest::header::AUTHORIZATION,
                format!("{} {}", client.token_type(), client.access_token()),
            )
            .json(request)
            .send()
            .await
            .map_err(|e| RankingError::ReportFetch(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RankingError::ReportFetch(format!(
                "reporting service returned {status}: {body}"
            )));
        }

        response
            .json()
            .await
            .map_err(|e| RankingError::ReportFetch(format!("unreadable response body: {e}")))
    }
}
