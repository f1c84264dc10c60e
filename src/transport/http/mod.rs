pub mod router;
pub mod types;
pub mod handlers {
    pub mod cars;
    pub mod common;
    pub mod health;
}

pub use handlers::common::ApiError;
pub use router::{cors_layer, create_router, ApiDoc};
pub use types::{AppState, ErrorBody, HealthResponse};
