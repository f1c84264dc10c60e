use crate::domain::Car;
use crate::transport::http::handlers::common::{car_payload, parse_car_id, ApiError};
use crate::transport::http::types::AppState;
use axum::body::Bytes;
use axum::extract::rejection::{BytesRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use tracing::info;

#[utoipa::path(
    get,
    path = "/cars",
    responses(
        (status = 200, description = "All stored cars", body = [Car]),
        (status = 500, description = "Storage failure", body = crate::transport::http::types::ErrorBody)
    )
)]
pub async fn list_cars_handler(State(state): State<AppState>) -> Result<Json<Vec<Car>>, ApiError> {
    info!("GET /cars");
    let cars = state
        .cars
        .list_cars()
        .await
        .map_err(|e| ApiError::from_service(e, "Failed to fetch cars"))?;
    Ok(Json(cars))
}

#[utoipa::path(
    post,
    path = "/cars",
    request_body = crate::domain::CarPayload,
    responses(
        (status = 201, description = "Car created", body = Car),
        (status = 400, description = "Body is not a car", body = crate::transport::http::types::ErrorBody),
        (status = 500, description = "Storage failure", body = crate::transport::http::types::ErrorBody)
    )
)]
pub async fn create_car_handler(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<(StatusCode, Json<Car>), ApiError> {
    info!("POST /cars");
    let payload = car_payload(body)?;
    let car = state
        .cars
        .create_car(payload)
        .await
        .map_err(|e| ApiError::from_service(e, "Failed to add car"))?;
    info!(id = %car.id, "car created");
    Ok((StatusCode::CREATED, Json(car)))
}

#[utoipa::path(
    get,
    path = "/car/{id}",
    params(
        ("id" = String, Path, description = "Car id (24 hex characters)")
    ),
    responses(
        (status = 200, description = "The car", body = Car),
        (status = 400, description = "Malformed id", body = crate::transport::http::types::ErrorBody),
        (status = 404, description = "No car with this id", body = crate::transport::http::types::ErrorBody),
        (status = 500, description = "Storage failure", body = crate::transport::http::types::ErrorBody)
    )
)]
pub async fn get_car_handler(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<Car>, ApiError> {
    let id = parse_car_id(path)?;
    info!(%id, "GET /car");
    let car = state
        .cars
        .get_car(&id)
        .await
        .map_err(|e| ApiError::from_service(e, "Failed to fetch car"))?;
    Ok(Json(car))
}

#[utoipa::path(
    put,
    path = "/car/{id}",
    params(
        ("id" = String, Path, description = "Car id (24 hex characters)")
    ),
    request_body = crate::domain::CarPayload,
    responses(
        (status = 200, description = "Car replaced", body = Car),
        (status = 400, description = "Malformed id or body", body = crate::transport::http::types::ErrorBody),
        (status = 404, description = "No car with this id", body = crate::transport::http::types::ErrorBody),
        (status = 500, description = "Storage failure", body = crate::transport::http::types::ErrorBody)
    )
)]
pub async fn update_car_handler(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<Car>, ApiError> {
    let id = parse_car_id(path)?;
    let payload = car_payload(body)?;
    info!(%id, "PUT /car");
    let car = state
        .cars
        .update_car(&id, payload)
        .await
        .map_err(|e| ApiError::from_service(e, "Failed to update car"))?;
    Ok(Json(car))
}

#[utoipa::path(
    delete,
    path = "/car/{id}",
    params(
        ("id" = String, Path, description = "Car id (24 hex characters)")
    ),
    responses(
        (status = 204, description = "Car deleted"),
        (status = 400, description = "Malformed id", body = crate::transport::http::types::ErrorBody),
        (status = 404, description = "No car with this id", body = crate::transport::http::types::ErrorBody),
        (status = 500, description = "Storage failure", body = crate::transport::http::types::ErrorBody)
    )
)]
pub async fn delete_car_handler(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let id = parse_car_id(path)?;
    info!(%id, "DELETE /car");
    state
        .cars
        .delete_car(&id)
        .await
        .map_err(|e| ApiError::from_service(e, "Failed to delete car"))?;
    Ok(StatusCode::NO_CONTENT)
}
