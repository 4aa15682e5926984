use crate::errors::{Error, Result};
use crate::model::{NewReading, Reading};
use chrono::NaiveDateTime;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use std::future::Future;
use std::time::Duration;
use tracing::info;

/// Persistence used by the HTTP handlers.
///
/// `upsert` must be a single atomic store operation: two ingests for the same
/// device racing into one bucket leave exactly one row holding the values of
/// whichever write landed last.
pub trait ReadingStore: Clone + Send + Sync + 'static {
    fn upsert(
        &self,
        reading: &NewReading,
        created_at: NaiveDateTime,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Readings with `created_at >= start`, oldest first.
    fn since(&self, start: NaiveDateTime) -> impl Future<Output = Result<Vec<Reading>>> + Send;
}

pub async fn make_pool(options: PgConnectOptions, max_connections: u32) -> Result<PgPool> {
    info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(10))
        .connect_with(options)
        .await
        .map_err(Error::Connection)?;

    info!("Database connection established");
    info!("Running database migrations...");
    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("Migrations completed");

    Ok(pool)
}

pub async fn upsert_reading(
    pool: &PgPool,
    reading: &NewReading,
    created_at: NaiveDateTime,
) -> Result<()> {
    let query = r#"
        INSERT INTO readings (device_id, temperature, humidity, alert, created_at)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (device_id, created_at) DO UPDATE SET
            temperature = EXCLUDED.temperature,
            humidity = EXCLUDED.humidity,
            alert = EXCLUDED.alert
        "#;

    sqlx::query(query)
        .bind(&reading.device_id)
        .bind(reading.temperature)
        .bind(reading.humidity)
        .bind(reading.alert)
        .bind(created_at)
        .execute(pool)
        .await?;

    Ok(())
}

pub async fn readings_since(pool: &PgPool, start: NaiveDateTime) -> Result<Vec<Reading>> {
    let query = r#"
        SELECT id, device_id, temperature, humidity, alert, created_at AS timestamp
        FROM readings
        WHERE created_at >= $1
        ORDER BY created_at ASC, id ASC
        "#;

    let readings = sqlx::query_as::<_, Reading>(query)
        .bind(start)
        .fetch_all(pool)
        .await?;

    Ok(readings)
}

impl ReadingStore for PgPool {
    fn upsert(
        &self,
        reading: &NewReading,
        created_at: NaiveDateTime,
    ) -> impl Future<Output = Result<()>> + Send {
        upsert_reading(self, reading, created_at)
    }

    fn since(&self, start: NaiveDateTime) -> impl Future<Output = Result<Vec<Reading>>> + Send {
        readings_since(self, start)
    }
}
