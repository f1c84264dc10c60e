use crate::app::CarServiceError;
use crate::domain::{CarId, CarPayload};
use crate::transport::http::types::ErrorBody;
use axum::body::Bytes;
use axum::extract::rejection::{BytesRejection, PathRejection};
use axum::extract::Path;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

/// Everything a car handler can answer with besides success.
///
/// The display string is the client-facing message; storage details never
/// reach it and are logged where the error is created.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ApiError {
    #[error("Invalid car ID")]
    InvalidId,
    #[error("Invalid car data")]
    InvalidPayload,
    #[error("Car not found")]
    NotFound,
    #[error("Not found")]
    RouteNotFound,
    #[error("Method not allowed")]
    MethodNotAllowed,
    #[error("{0}")]
    Internal(&'static str),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidId | ApiError::InvalidPayload => StatusCode::BAD_REQUEST,
            ApiError::NotFound | ApiError::RouteNotFound => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Maps a service failure; anything but not-found becomes `Internal(failure)`.
    pub fn from_service(err: CarServiceError, failure: &'static str) -> Self {
        match err {
            CarServiceError::NotFound => ApiError::NotFound,
            other => {
                tracing::error!(error = %other, "{}", failure);
                ApiError::Internal(failure)
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status(),
            Json(ErrorBody {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

pub fn parse_car_id(path: Result<Path<String>, PathRejection>) -> Result<CarId, ApiError> {
    let Path(raw) = path.map_err(|e| {
        tracing::warn!(error = %e, "rejected car id path");
        ApiError::InvalidId
    })?;
    raw.parse::<CarId>().map_err(|e| {
        tracing::warn!(id = %raw, error = %e, "rejected car id");
        ApiError::InvalidId
    })
}

/// Decodes a car from the raw request body, whatever its content type.
///
/// A JSON `null` is a car with every field at its zero value; anything that is
/// not a JSON car (including an empty body) is rejected.
pub fn car_payload(body: Result<Bytes, BytesRejection>) -> Result<CarPayload, ApiError> {
    let bytes = body.map_err(|e| {
        tracing::warn!(error = %e, "failed to read car payload");
        ApiError::InvalidPayload
    })?;
    match serde_json::from_slice::<Option<CarPayload>>(&bytes) {
        Ok(payload) => Ok(payload.unwrap_or_default()),
        Err(e) => {
            tracing::warn!(error = %e, "rejected car payload");
            Err(ApiError::InvalidPayload)
        }
    }
}

/// Answers requests that match no route.
pub async fn route_not_found() -> ApiError {
    ApiError::RouteNotFound
}

/// Answers requests whose path exists but whose method is not routed.
pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}
