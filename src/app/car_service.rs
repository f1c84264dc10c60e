//! The car service.
//!
//! Sits between the HTTP handlers and the storage collaborator. Every storage
//! call made here is bounded by the configured deadline, and every outcome is
//! folded into `CarServiceError` so the transport maps it to a status once.

use crate::domain::{Car, CarId, CarPayload};
use crate::infra::config::{self, StorageBackend};
use crate::storage::{CarCollection, InMemoryCarCollection, PostgresCarCollection};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CarServiceError {
    #[error("car not found")]
    NotFound,
    #[error("storage call exceeded its {0:?} deadline")]
    DeadlineExceeded(Duration),
    #[error("storage failure: {0:#}")]
    Storage(#[from] anyhow::Error),
}

pub type CarResult<T> = Result<T, CarServiceError>;

#[derive(Clone)]
pub struct CarService {
    collection: Arc<dyn CarCollection>,
    timeout: Duration,
}

impl CarService {
    pub fn new(collection: Arc<dyn CarCollection>, timeout: Duration) -> Self {
        Self { collection, timeout }
    }

    /// Builds the service from the environment and checks storage connectivity.
    ///
    /// Returns an error if the backend cannot be reached; callers treat that as fatal.
    pub async fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();
        let timeout = config::storage_timeout()?;

        let collection: Arc<dyn CarCollection> = match config::storage_backend()? {
            StorageBackend::Postgres => {
                let database_url = config::database_url()?;
                let max_connections = config::db_max_connections()?;
                tracing::info!(max_connections, "connecting to postgres");
                Arc::new(PostgresCarCollection::connect(&database_url, max_connections).await?)
            }
            StorageBackend::Memory => {
                tracing::warn!("using in-memory storage; cars are lost on restart");
                Arc::new(InMemoryCarCollection::new())
            }
        };

        let service = Self::new(collection, timeout);
        service
            .ping()
            .await
            .map_err(|e| anyhow::anyhow!("storage connectivity check failed: {}", e))?;
        Ok(service)
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Runs one storage call under the deadline. The timer is dropped as soon
    /// as the call resolves, on success and on failure alike.
    async fn timed<T, F>(&self, call: F) -> CarResult<T>
    where
        F: Future<Output = anyhow::Result<T>>,
    {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result.map_err(CarServiceError::Storage),
            Err(_) => Err(CarServiceError::DeadlineExceeded(self.timeout)),
        }
    }

    pub async fn ping(&self) -> CarResult<()> {
        self.timed(self.collection.ping()).await
    }

    pub async fn list_cars(&self) -> CarResult<Vec<Car>> {
        self.timed(self.collection.find_all()).await
    }

    pub async fn create_car(&self, payload: CarPayload) -> CarResult<Car> {
        let id = self.timed(self.collection.insert_one(&payload)).await?;
        Ok(Car::from_payload(id, payload))
    }

    pub async fn get_car(&self, id: &CarId) -> CarResult<Car> {
        self.timed(self.collection.find_one(id))
            .await?
            .ok_or(CarServiceError::NotFound)
    }

    /// Replaces every non-id field; the returned car echoes the id and payload.
    pub async fn update_car(&self, id: &CarId, payload: CarPayload) -> CarResult<Car> {
        let matched = self.timed(self.collection.update_one(id, &payload)).await?;
        if matched == 0 {
            return Err(CarServiceError::NotFound);
        }
        Ok(Car::from_payload(*id, payload))
    }

    pub async fn delete_car(&self, id: &CarId) -> CarResult<()> {
        let deleted = self.timed(self.collection.delete_one(id)).await?;
        if deleted == 0 {
            return Err(CarServiceError::NotFound);
        }
        Ok(())
    }
}
