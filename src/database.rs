use futures::TryStreamExt;
use serde_json::Value;
use sqlx::{postgres::PgPoolOptions, Pool, Postgres};
use std::time::Duration;
use tracing::info;

use crate::store::{Collection, Order};

#[derive(Clone)]
pub struct Database {
    pub pool: Pool<Postgres>,
}

impl Database {
    pub async fn new(database_url: &str, pool_size: u32) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(pool_size)
            .acquire_timeout(Duration::from_secs(5))
            .connect(database_url)
            .await?;

        Ok(Database { pool })
    }

    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        info!("Running database migrations...");
        sqlx::migrate!("./src/migrations")
            .run(&self.pool)
            .await?;
        info!("Migrations completed");
        Ok(())
    }
}

// === Записи сайта (таблица records) ===

impl Database {
    pub async fn insert_record(&self, collection: Collection, payload: &Value) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "INSERT INTO records (kind, partition_key, payload)
             VALUES ($1, $2, $3)
             RETURNING id"
        )
        .bind(collection.kind())
        .bind(collection.partition_key())
        .bind(payload)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn list_records(
        &self,
        collection: Collection,
        order: Option<Order>,
        limit: Option<usize>,
    ) -> Result<Vec<Value>, sqlx::Error> {
        // LIMIT NULL в Postgres означает "без ограничения"
        let limit = limit.map(|l| i64::try_from(l).unwrap_or(i64::MAX));

        match order {
            Some(order) => {
                let direction = if order.descending { "DESC" } else { "ASC" };
                let sql = format!(
                    "SELECT payload FROM records
                     WHERE kind = $1 AND partition_key = $2
                     ORDER BY payload->>$3 {direction} NULLS LAST, id
                     LIMIT $4"
                );
                sqlx::query_scalar::<_, Value>(&sql)
                    .bind(collection.kind())
                    .bind(collection.partition_key())
                    .bind(order.field)
                    .bind(limit)
                    .fetch_all(&self.pool)
                    .await
            }
            None => {
                sqlx::query_scalar::<_, Value>(
                    "SELECT payload FROM records
                     WHERE kind = $1 AND partition_key = $2
                     ORDER BY id
                     LIMIT $3"
                )
                .bind(collection.kind())
                .bind(collection.partition_key())
                .bind(limit)
                .fetch_all(&self.pool)
                .await
            }
        }
    }

    /// Проходит весь курсор до конца и оставляет последнюю совпавшую запись.
    pub async fn find_last_record(
        &self,
        collection: Collection,
        field: &str,
        value: &str,
    ) -> Result<Option<Value>, sqlx::Error> {
        let mut rows = sqlx::query_scalar::<_, Value>(
            "SELECT payload FROM records
             WHERE kind = $1 AND partition_key = $2 AND payload->>$3 = $4
             ORDER BY id"
        )
        .bind(collection.kind())
        .bind(collection.partition_key())
        .bind(field)
        .bind(value)
        .fetch(&self.pool);

        let mut found = None;
        while let Some(payload) = rows.try_next().await? {
            found = Some(payload);
        }
        Ok(found)
    }
}
