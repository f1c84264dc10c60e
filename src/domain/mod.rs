pub mod car;

pub use car::{Car, CarId, CarPayload, InvalidCarId};
