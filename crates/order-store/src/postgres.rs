use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};

use crate::{Order, OrderId, OrderRecord, Result, StoreError, partition_key, store::OrderStore};

/// PostgreSQL-backed order store.
///
/// Connections come from a pool; each call checks one out for the duration
/// of a single statement and the pool reclaims it when the call returns,
/// whichever way it returns. Every statement runs under `query_timeout`;
/// one that outlives it is reported as `Unavailable`.
#[derive(Clone)]
pub struct PostgresOrderStore {
    pool: PgPool,
    query_timeout: Duration,
}

const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(5);

impl PostgresOrderStore {
    /// Creates a new PostgreSQL order store.
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            query_timeout: DEFAULT_QUERY_TIMEOUT,
        }
    }

    /// Bounds how long a single insert or lookup may take.
    pub fn with_query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = timeout;
        self
    }

    pub fn query_timeout(&self) -> Duration {
        self.query_timeout
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Creates the orders table if it does not exist yet.
    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }

    async fn bounded<T, F>(&self, query: F) -> Result<T>
    where
        F: Future<Output = std::result::Result<T, sqlx::Error>>,
    {
        with_deadline(self.query_timeout, query).await
    }

    fn row_to_record(row: PgRow) -> Result<OrderRecord> {
        Ok(OrderRecord {
            pk: row.try_get("pk")?,
            order_id: row.try_get("order_id")?,
            customer_id: row.try_get("customer_id")?,
            products: row.try_get("products")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

#[async_trait]
impl OrderStore for PostgresOrderStore {
    #[tracing::instrument(skip(self, order), fields(order_id = %order.order_id))]
    async fn insert(&self, order: &Order) -> Result<()> {
        let record = OrderRecord::from_order(order);

        let insert = sqlx::query(
            r#"
            INSERT INTO orders (pk, order_id, customer_id, products, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (pk) DO NOTHING
            "#,
        )
        .bind(&record.pk)
        .bind(&record.order_id)
        .bind(&record.customer_id)
        .bind(&record.products)
        .bind(&record.created_at)
        .execute(&self.pool);
        let result = self.bounded(insert).await?;

        // Nothing inserted means the key was already taken.
        if result.rows_affected() == 0 {
            return Err(StoreError::AlreadyExists(order.order_id.clone()));
        }

        tracing::debug!(pk = %record.pk, "order record inserted");
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn get(&self, order_id: &OrderId) -> Result<Order> {
        let lookup = sqlx::query(
            r#"
            SELECT pk, order_id, customer_id, products, created_at
            FROM orders
            WHERE pk = $1
            "#,
        )
        .bind(partition_key(order_id))
        .fetch_optional(&self.pool);
        let row: Option<PgRow> = self.bounded(lookup).await?;

        match row {
            Some(row) => Self::row_to_record(row)?.into_order(),
            None => Err(StoreError::NotFound(order_id.clone())),
        }
    }
}

/// Runs `query`, giving up after `timeout`.
async fn with_deadline<T, F>(timeout: Duration, query: F) -> Result<T>
where
    F: Future<Output = std::result::Result<T, sqlx::Error>>,
{
    match tokio::time::timeout(timeout, query).await {
        Ok(result) => Ok(result?),
        Err(_) => Err(StoreError::Unavailable(format!(
            "query did not complete within {timeout:?}"
        ))),
    }
}
