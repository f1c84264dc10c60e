pub mod car_service;

pub use car_service::{CarResult, CarService, CarServiceError};
