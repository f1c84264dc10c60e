//! Persistent car collection using PostgreSQL.

use crate::domain::{Car, CarId, CarPayload};
use crate::storage::collection::CarCollection;
use anyhow::Result;
use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};

pub const CARS_TABLE: &str = "cars";

const CREATE_CARS_TABLE_SQL: &str = "CREATE TABLE IF NOT EXISTS cars (
    id BYTEA PRIMARY KEY,
    make TEXT NOT NULL,
    model TEXT NOT NULL,
    year INTEGER NOT NULL,
    price DOUBLE PRECISION NOT NULL
)";

/// A car collection backed by a PostgreSQL connection pool.
#[derive(Clone)]
pub struct PostgresCarCollection {
    pool: PgPool,
}

impl PostgresCarCollection {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects to `database_url` and makes sure the `cars` table exists.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        let collection = Self::new(pool);
        collection.ensure_schema().await?;
        Ok(collection)
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(CREATE_CARS_TABLE_SQL)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Whether the `cars` table is present in the current schema.
    pub async fn schema_exists(&self) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (
                SELECT 1 FROM information_schema.tables
                WHERE table_schema = current_schema() AND table_name = $1
            )",
        )
        .bind(CARS_TABLE)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    pub async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM cars")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

fn row_to_car(row: &PgRow) -> Result<Car> {
    let id_bytes: Vec<u8> = row.try_get("id")?;
    let id = CarId::from_slice(&id_bytes)
        .map_err(|e| anyhow::anyhow!("Invalid stored car id: {}", e))?;
    Ok(Car {
        id,
        make: row.try_get("make")?,
        model: row.try_get("model")?,
        year: row.try_get("year")?,
        price: row.try_get("price")?,
    })
}

#[async_trait]
impl CarCollection for PostgresCarCollection {
    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn find_all(&self) -> Result<Vec<Car>> {
        let rows = sqlx::query("SELECT id, make, model, year, price FROM cars")
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(row_to_car).collect()
    }

    async fn insert_one(&self, car: &CarPayload) -> Result<CarId> {
        let id = CarId::generate();
        sqlx::query("INSERT INTO cars (id, make, model, year, price) VALUES ($1, $2, $3, $4, $5)")
            .bind(id.as_bytes().as_slice())
            .bind(&car.make)
            .bind(&car.model)
            .bind(car.year)
            .bind(car.price)
            .execute(&self.pool)
            .await?;
        Ok(id)
    }

    async fn find_one(&self, id: &CarId) -> Result<Option<Car>> {
        let row = sqlx::query("SELECT id, make, model, year, price FROM cars WHERE id = $1")
            .bind(id.as_bytes().as_slice())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_car).transpose()
    }

    async fn update_one(&self, id: &CarId, car: &CarPayload) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE cars SET make = $2, model = $3, year = $4, price = $5 WHERE id = $1",
        )
        .bind(id.as_bytes().as_slice())
        .bind(&car.make)
        .bind(&car.model)
        .bind(car.year)
        .bind(car.price)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn delete_one(&self, id: &CarId) -> Result<u64> {
        let result = sqlx::query("DELETE FROM cars WHERE id = $1")
            .bind(id.as_bytes().as_slice())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
