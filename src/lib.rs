pub mod app;
pub mod domain;
pub mod infra;
pub mod storage;
pub mod transport;

// Convenience re-exports (keeps call-sites clean)
pub use app::{CarService, CarServiceError};
pub use domain::{Car, CarId, CarPayload};
pub use storage::{CarCollection, InMemoryCarCollection, PostgresCarCollection};
