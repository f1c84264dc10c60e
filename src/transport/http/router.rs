use crate::domain::{Car, CarPayload};
use crate::transport::http::handlers::common::{method_not_allowed, route_not_found};
use crate::transport::http::handlers::{cars, health};
use crate::transport::http::types::{AppState, ErrorBody, HealthResponse};
use axum::http::{header, HeaderValue, Method};
use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        health::healthcheck_handler,
        cars::list_cars_handler,
        cars::create_car_handler,
        cars::get_car_handler,
        cars::update_car_handler,
        cars::delete_car_handler
    ),
    components(schemas(Car, CarPayload, ErrorBody, HealthResponse))
)]
pub struct ApiDoc;

pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route(
            "/health",
            get(health::healthcheck_handler).fallback(method_not_allowed),
        )
        .route(
            "/cars",
            get(cars::list_cars_handler)
                .post(cars::create_car_handler)
                .fallback(method_not_allowed),
        )
        .route(
            "/car/:id",
            get(cars::get_car_handler)
                .put(cars::update_car_handler)
                .delete(cars::delete_car_handler)
                .fallback(method_not_allowed),
        )
        .fallback(route_not_found)
        .with_state(app_state)
}

/// CORS policy for browser clients. Origins that are not valid header values
/// are skipped with a warning.
pub fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!(%origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::ORIGIN, header::CONTENT_TYPE, header::AUTHORIZATION])
}
