//! The storage collaborator behind the car handlers.

use crate::domain::{Car, CarId, CarPayload};
use anyhow::Result;
use async_trait::async_trait;

/// A collection of car documents.
///
/// Implementations must be safe to share between concurrent requests. Any error
/// returned here is an infrastructure failure; "no match" is reported through
/// `Option` or a zero count, never through `Err`.
#[async_trait]
pub trait CarCollection: Send + Sync {
    /// Round-trips to the backend to prove it is reachable.
    async fn ping(&self) -> Result<()>;

    /// Every stored car, in no particular order.
    async fn find_all(&self) -> Result<Vec<Car>>;

    /// Stores a new car and returns the identifier assigned to it.
    async fn insert_one(&self, car: &CarPayload) -> Result<CarId>;

    async fn find_one(&self, id: &CarId) -> Result<Option<Car>>;

    /// Replaces all non-id fields of the matching car.
    /// Returns the number of matched records (0 or 1).
    async fn update_one(&self, id: &CarId, car: &CarPayload) -> Result<u64>;

    /// Returns the number of deleted records (0 or 1).
    async fn delete_one(&self, id: &CarId) -> Result<u64>;
}
