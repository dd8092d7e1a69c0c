use crate::metrics_defs::TRENDS_REQUESTS;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use trends::aggregate::Aggregator;
use trends::error::{QueryError, TrendsError};
use trends::normalize::normalize;
use trends::query::TrendsQuery;
use trends::series::LongRecord;

pub const API_KEY_HEADER: &str = "x-api-key";

/// Shared per-request state, built once by the composition root.
#[derive(Clone)]
pub struct AppState {
    pub aggregator: Aggregator,
    /// Shared secret; `None` or empty disables auth.
    pub api_key: Option<String>,
    pub max_keywords: usize,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/trends", get(trends))
        .with_state(state)
}

async fn index() -> &'static str {
    "trends gateway: ok\n"
}

#[derive(Deserialize, Debug)]
struct TrendsParams {
    keyword: Option<String>,
    geo: Option<String>,
    /// Query window; `time` wins over the `timeframe` alias.
    time: Option<String>,
    timeframe: Option<String>,
    api_key: Option<String>,
}

async fn trends(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<TrendsParams>,
) -> Result<Json<Vec<LongRecord>>, ApiError> {
    metrics::counter!(TRENDS_REQUESTS.name).increment(1);

    authorize(state.api_key.as_deref(), &headers, params.api_key.as_deref())?;

    let query = TrendsQuery::parse(
        params.keyword.as_deref(),
        params.geo.as_deref(),
        params.time.as_deref().or(params.timeframe.as_deref()),
        state.max_keywords,
    )?;

    let records = state.aggregator.interest_over_time(&query).await?;
    Ok(Json(normalize(records)))
}

/// Exact-equality check of the static secret against the `X-API-KEY` header
/// or the `api_key` query parameter. Open when no secret is configured.
fn authorize(
    secret: Option<&str>,
    headers: &HeaderMap,
    query_key: Option<&str>,
) -> Result<(), ApiError> {
    let secret = match secret {
        Some(secret) if !secret.is_empty() => secret,
        _ => return Ok(()),
    };

    let supplied = headers
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .or(query_key);

    match supplied {
        Some(key) if key == secret => Ok(()),
        _ => Err(ApiError::Unauthorized),
    }
}

/// User-visible request errors.
///
/// Upstream failure details never appear here; they are logged server-side
/// and the client only ever sees one of these.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Query(#[from] QueryError),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("No data found")]
    NoDataFound,
}

impl From<TrendsError> for ApiError {
    fn from(error: TrendsError) -> Self {
        match error {
            TrendsError::Query(error) => ApiError::Query(error),
            TrendsError::NoDataFound => ApiError::NoDataFound,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Query(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::NoDataFound => StatusCode::NOT_FOUND,
        };

        let body = Json(ErrorBody {
            error: self.to_string(),
        });

        (status, body).into_response()
    }
}
