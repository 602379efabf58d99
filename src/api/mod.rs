//! HTTP surface: `GET /match-testers/` and `GET /devices/`.
//!
//! Query strings are read raw so repeated keys (`countries=US&countries=GB`)
//! survive; `MatchRequest` merges them with the comma-separated form.

use std::sync::Arc;

use axum::extract::{RawQuery, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::core::query::{MatchRequest, COUNTRIES_PARAM, DEVICES_PARAM};
use crate::core::service::MatchService;
use crate::domain::model::{Device, TesterExperience};
use crate::domain::ports::DomainStore;
use crate::utils::error::MatchError;

/// Stable error codes. Clients match on these, never on the message.
pub mod error_code {
    pub const VALIDATION_FAILED: &str = "VALIDATION_FAILED";
    pub const INTERNAL: &str = "INTERNAL";
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    param: Option<&'static str>,
    message: String,
}

/// Maps crate errors onto HTTP responses: bad filters are 400, everything
/// else is a 500 with the detail kept in the log.
#[derive(Debug)]
pub struct ApiError(pub MatchError);

impl From<MatchError> for ApiError {
    fn from(err: MatchError) -> Self {
        Self(err)
    }
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        if self.0.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }

    fn param(&self) -> Option<&'static str> {
        match self.0 {
            MatchError::InvalidCountry { .. } => Some(COUNTRIES_PARAM),
            MatchError::InvalidDevice { .. } => Some(DEVICES_PARAM),
            _ => None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = if self.0.is_client_error() {
            ErrorBody {
                code: error_code::VALIDATION_FAILED,
                param: self.param(),
                message: self.0.user_friendly_message(),
            }
        } else {
            tracing::error!(
                "request failed: {} (Category: {:?}, Severity: {:?})",
                self.0,
                self.0.category(),
                self.0.severity()
            );
            ErrorBody {
                code: error_code::INTERNAL,
                param: None,
                message: "internal error".to_string(),
            }
        };
        (status, Json(body)).into_response()
    }
}

type AppState<S> = Arc<MatchService<S>>;

/// Build the application routes.
pub fn router<S: DomainStore + 'static>(service: AppState<S>) -> Router {
    Router::new()
        .route("/match-testers/", get(match_testers::<S>))
        .route("/match-testers", get(match_testers::<S>))
        .route("/devices/", get(list_devices::<S>))
        .route("/devices", get(list_devices::<S>))
        .route("/healthz", get(healthz))
        .with_state(service)
}

async fn match_testers<S: DomainStore>(
    State(svc): State<AppState<S>>,
    RawQuery(query): RawQuery,
) -> Result<Json<Vec<TesterExperience>>, ApiError> {
    let request = MatchRequest::from_query(query.as_deref());
    tracing::debug!(?request, "GET /match-testers/");
    Ok(Json(svc.match_testers(&request)?))
}

async fn list_devices<S: DomainStore>(
    State(svc): State<AppState<S>>,
) -> Result<Json<Vec<Device>>, ApiError> {
    Ok(Json(svc.list_devices()?))
}

async fn healthz() -> &'static str {
    "ok"
}
