use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use hedgebot_core::{HedgeRow, HedgeStatus, HedgeStore};
use hedgebot_hedge_engine::{HedgeEngine, HedgeError, HedgeRequest, HedgeResponse};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// JSON error body returned by every failing endpoint.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

/// Maps engine errors to HTTP: bad input is 422, a failed upstream read is 502.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorBody,
}

impl ApiError {
    fn unprocessable(field: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            body: ErrorBody {
                error: error.into(),
                field: Some(field.into()),
            },
        }
    }

    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<HedgeError> for ApiError {
    fn from(err: HedgeError) -> Self {
        match err {
            HedgeError::InvalidRequest { field, reason } => Self::unprocessable(field, reason),
            HedgeError::Collaborator(message) => Self {
                status: StatusCode::BAD_GATEWAY,
                body: ErrorBody {
                    error: message,
                    field: None,
                },
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::warn!(status = %self.status, error = %self.body.error, "Request failed");
        }
        (self.status, Json(self.body)).into_response()
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        timestamp: Utc::now(),
    })
}

/// Runs one hedge cycle for the posted request.
///
/// # Errors
/// Returns 422 if the request is invalid, or 502 if the ledger or hedge
/// registry cannot be read.
pub async fn evaluate(
    State(engine): State<Arc<HedgeEngine>>,
    Json(request): Json<HedgeRequest>,
) -> Result<Json<HedgeResponse>, ApiError> {
    let response = engine.evaluate(request).await?;
    Ok(Json(response))
}

#[derive(Debug, Deserialize)]
pub struct ListHedgesQuery {
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HedgeListResponse {
    pub hedges: Vec<HedgeRow>,
}

/// Lists registry rows, optionally filtered by `?status=OPEN|CLOSED|CANCELLED`.
///
/// # Errors
/// Returns 422 for an unknown status, or 502 if the registry cannot be read.
pub async fn list_hedges(
    State(engine): State<Arc<HedgeEngine>>,
    Query(query): Query<ListHedgesQuery>,
) -> Result<Json<HedgeListResponse>, ApiError> {
    let status = query
        .status
        .as_deref()
        .map(str::parse::<HedgeStatus>)
        .transpose()
        .map_err(|e| ApiError::unprocessable("status", e.to_string()))?;

    let hedges = engine
        .store()
        .list_hedges(status)
        .await
        .map_err(|e| HedgeError::collaborator(&e))?;
    Ok(Json(HedgeListResponse { hedges }))
}
