//! PostgreSQL repository adapter.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use payments_types::{
    Payment, PaymentId, PaymentRepository, PaymentStatus, RepoError, StatusUpdate,
};

use crate::types::{PgPaymentRow, PgStatusRow};

const SELECT_PAYMENT: &str = r#"SELECT id, amount, currency, method, provider, status,
       provider_reference, failure_reason, created_at, updated_at
  FROM payments"#;

// ─────────────────────────────────────────────────────────────────────────────
// PostgreSQL Repository
// ─────────────────────────────────────────────────────────────────────────────

/// PostgreSQL repository.
pub struct PostgresRepo {
    pool: PgPool,
}

/// Executes SQL statements from a migration file, splitting by semicolons.
async fn execute_migration(pool: &PgPool, sql: &str, name: &str) -> Result<(), anyhow::Error> {
    for statement in sql.split(';') {
        let stmt = statement.trim();
        if !stmt.is_empty() {
            sqlx::query(stmt)
                .execute(pool)
                .await
                .map_err(|e| anyhow::anyhow!("Migration {} failed: {}", name, e))?;
        }
    }
    Ok(())
}

/// Runs all database migrations.
async fn run_migrations(pool: &PgPool) -> Result<(), anyhow::Error> {
    execute_migration(
        pool,
        include_str!("../migrations/0001_create_payments_pg.sql"),
        "0001",
    )
    .await
}

impl PostgresRepo {
    /// Creates a new PostgreSQL repository with automatic migration.
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPool::connect(database_url).await?;
        run_migrations(&pool).await?;
        Ok(Self { pool })
    }

    /// Creates the database schema (for testing with existing pool).
    pub async fn create_schema(&self) -> Result<(), RepoError> {
        run_migrations(&self.pool)
            .await
            .map_err(|e| RepoError::Database(e.to_string()))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Repository implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl PaymentRepository for PostgresRepo {
    async fn create(&self, payment: &Payment) -> Result<PaymentId, RepoError> {
        sqlx::query(
            r#"INSERT INTO payments
                   (id, amount, currency, method, provider, status,
                    provider_reference, failure_reason, created_at, updated_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)"#,
        )
        .bind(payment.id.into_uuid())
        .bind(payment.amount.amount())
        .bind(payment.amount.currency().code())
        .bind(payment.method.as_str())
        .bind(&payment.provider)
        .bind(payment.status.as_str())
        .bind(&payment.provider_reference)
        .bind(&payment.failure_reason)
        .bind(payment.created_at)
        .bind(payment.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                RepoError::Conflict(format!("payment {} already exists", payment.id))
            }
            _ => RepoError::Database(e.to_string()),
        })?;

        Ok(payment.id)
    }

    async fn update_status(&self, id: PaymentId, update: &StatusUpdate) -> Result<(), RepoError> {
        update.ensure_terminal()?;

        let result = sqlx::query(
            r#"UPDATE payments
                  SET status = $1, provider_reference = $2, failure_reason = $3, updated_at = $4
                WHERE id = $5 AND status = 'PENDING'"#,
        )
        .bind(update.status.as_str())
        .bind(&update.provider_reference)
        .bind(&update.failure_reason)
        .bind(update.updated_at)
        .bind(id.into_uuid())
        .execute(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        if result.rows_affected() > 0 {
            return Ok(());
        }

        let row: Option<PgStatusRow> =
            sqlx::query_as(r#"SELECT status FROM payments WHERE id = $1"#)
                .bind(id.into_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| RepoError::Database(e.to_string()))?;

        match row {
            None => Err(RepoError::NotFound),
            Some(row) => {
                let status: PaymentStatus = row.status.parse()?;
                Err(RepoError::Conflict(format!(
                    "payment {} is already {}",
                    id, status
                )))
            }
        }
    }

    async fn find_by_id(&self, id: PaymentId) -> Result<Option<Payment>, RepoError> {
        let row: Option<PgPaymentRow> =
            sqlx::query_as(&format!("{} WHERE id = $1", SELECT_PAYMENT))
                .bind(id.into_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| RepoError::Database(e.to_string()))?;

        row.map(PgPaymentRow::into_domain).transpose()
    }

    async fn list_stale_pending(
        &self,
        created_before: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<Payment>, RepoError> {
        let rows: Vec<PgPaymentRow> = sqlx::query_as(&format!(
            "{} WHERE status = 'PENDING' AND created_at < $1 ORDER BY created_at ASC LIMIT $2",
            SELECT_PAYMENT
        ))
        .bind(created_before)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        rows.into_iter().map(PgPaymentRow::into_domain).collect()
    }
}
