//! In-process car collection, used by tests and by `STORAGE_BACKEND=memory`.

use crate::domain::{Car, CarId, CarPayload};
use crate::storage::collection::CarCollection;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Default)]
pub struct InMemoryCarCollection {
    cars: RwLock<HashMap<CarId, CarPayload>>,
}

impl InMemoryCarCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.cars.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.cars.read().await.is_empty()
    }
}

#[async_trait]
impl CarCollection for InMemoryCarCollection {
    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    async fn find_all(&self) -> Result<Vec<Car>> {
        let cars = self.cars.read().await;
        Ok(cars
            .iter()
            .map(|(id, payload)| Car::from_payload(*id, payload.clone()))
            .collect())
    }

    async fn insert_one(&self, car: &CarPayload) -> Result<CarId> {
        let mut cars = self.cars.write().await;
        let mut id = CarId::generate();
        while cars.contains_key(&id) {
            id = CarId::generate();
        }
        cars.insert(id, car.clone());
        Ok(id)
    }

    async fn find_one(&self, id: &CarId) -> Result<Option<Car>> {
        let cars = self.cars.read().await;
        Ok(cars
            .get(id)
            .map(|payload| Car::from_payload(*id, payload.clone())))
    }

    async fn update_one(&self, id: &CarId, car: &CarPayload) -> Result<u64> {
        let mut cars = self.cars.write().await;
        match cars.get_mut(id) {
            Some(stored) => {
                *stored = car.clone();
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete_one(&self, id: &CarId) -> Result<u64> {
        let mut cars = self.cars.write().await;
        Ok(cars.remove(id).map_or(0, |_| 1))
    }
}
