// src/bin/api_server.rs

use carstore::infra::{config, telemetry};
use carstore::transport;
use carstore::CarService;
use tracing::{error, info};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    telemetry::init();

    // --- Storage Initialization (fatal if storage is unreachable) ---
    info!("initializing car storage");
    let cars = match CarService::from_env().await {
        Ok(service) => service,
        Err(e) => {
            error!("failed to connect to storage: {:#}", e);
            return Err(e);
        }
    };
    info!(timeout = ?cars.timeout(), "car storage ready");

    // --- API Server Initialization ---
    let allowed_origins = config::cors_allowed_origins();
    info!(origins = ?allowed_origins, "configuring CORS");
    let app = transport::http::create_router(transport::http::AppState::new(cars))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", transport::http::ApiDoc::openapi()))
        .layer(transport::http::cors_layer(&allowed_origins));

    let bind_addr = config::bind_addr();
    let listener = tokio::net::TcpListener::bind(bind_addr.as_str()).await?;
    info!("server listening on http://{}", listener.local_addr()?);
    info!("Swagger UI available at /swagger-ui");

    tokio::select! {
        result = axum::serve(listener, app) => {
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("shutdown signal received");
        }
    }

    info!("server stopped");
    Ok(())
}
