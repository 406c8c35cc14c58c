//! SQLite repository adapter.
#![allow(clippy::collapsible_if)]

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::SqlitePool;
use sqlx::sqlite::SqliteConnectOptions;
use std::str::FromStr;

use payments_types::{
    Payment, PaymentId, PaymentRepository, PaymentStatus, RepoError, StatusUpdate,
};

use crate::types::{SqlitePaymentRow, SqliteStatusRow};

const SELECT_PAYMENT: &str = r#"SELECT id, amount, currency, method, provider, status,
       provider_reference, failure_reason, created_at, updated_at
  FROM payments"#;

/// Fixed-width UTC timestamps so TEXT comparison matches time ordering.
fn ts(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

// ─────────────────────────────────────────────────────────────────────────────
// SQLite Repository
// ─────────────────────────────────────────────────────────────────────────────

/// SQLite repository implementation.
pub struct SqliteRepo {
    pool: SqlitePool,
}

impl SqliteRepo {
    /// Creates a new SQLite repository with automatic migration.
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        // Ensure on-disk SQLite target directory exists (no-op for in-memory).
        if let Some(path) = database_url.strip_prefix("sqlite://") {
            let path = path.split('?').next().unwrap_or(path);
            if path != ":memory:" {
                let p = std::path::Path::new(path);
                if let Some(parent) = p.parent() {
                    if !parent.as_os_str().is_empty() {
                        tokio::fs::create_dir_all(parent).await?;
                    }
                }
            }
        }

        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePool::connect_with(options).await?;

        let repo = Self { pool };
        repo.create_schema().await?;
        Ok(repo)
    }

    /// Creates the database schema. Safe to call more than once.
    pub async fn create_schema(&self) -> Result<(), RepoError> {
        let ddl = include_str!("../migrations/0001_create_payments.sql");
        sqlx::raw_sql(ddl)
            .execute(&self.pool)
            .await
            .map_err(|e| RepoError::Database(e.to_string()))?;
        Ok(())
    }

    async fn current_status(&self, id: PaymentId) -> Result<Option<PaymentStatus>, RepoError> {
        let row: Option<SqliteStatusRow> =
            sqlx::query_as(r#"SELECT status FROM payments WHERE id = ?"#)
                .bind(id.to_string())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| RepoError::Database(e.to_string()))?;

        row.map(|r| r.status.parse().map_err(RepoError::Domain))
            .transpose()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Repository implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl PaymentRepository for SqliteRepo {
    async fn create(&self, payment: &Payment) -> Result<PaymentId, RepoError> {
        sqlx::query(
            r#"INSERT INTO payments
                   (id, amount, currency, method, provider, status,
                    provider_reference, failure_reason, created_at, updated_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(payment.id.to_string())
        .bind(payment.amount.amount().to_string())
        .bind(payment.amount.currency().code())
        .bind(payment.method.as_str())
        .bind(&payment.provider)
        .bind(payment.status.as_str())
        .bind(&payment.provider_reference)
        .bind(&payment.failure_reason)
        .bind(ts(payment.created_at))
        .bind(ts(payment.updated_at))
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                RepoError::Conflict(format!("payment {} already exists", payment.id))
            } else {
                RepoError::Database(e.to_string())
            }
        })?;

        Ok(payment.id)
    }

    async fn update_status(&self, id: PaymentId, update: &StatusUpdate) -> Result<(), RepoError> {
        update.ensure_terminal()?;

        let result = sqlx::query(
            r#"UPDATE payments
                  SET status = ?, provider_reference = ?, failure_reason = ?, updated_at = ?
                WHERE id = ? AND status = 'PENDING'"#,
        )
        .bind(update.status.as_str())
        .bind(&update.provider_reference)
        .bind(&update.failure_reason)
        .bind(ts(update.updated_at))
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return match self.current_status(id).await? {
                None => Err(RepoError::NotFound),
                Some(status) => Err(RepoError::Conflict(format!(
                    "payment {} is already {}",
                    id, status
                ))),
            };
        }

        Ok(())
    }

    async fn find_by_id(&self, id: PaymentId) -> Result<Option<Payment>, RepoError> {
        let row: Option<SqlitePaymentRow> =
            sqlx::query_as(&format!("{} WHERE id = ?", SELECT_PAYMENT))
                .bind(id.to_string())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| RepoError::Database(e.to_string()))?;

        row.map(SqlitePaymentRow::into_domain).transpose()
    }

    async fn list_stale_pending(
        &self,
        created_before: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<Payment>, RepoError> {
        let rows: Vec<SqlitePaymentRow> = sqlx::query_as(&format!(
            "{} WHERE status = 'PENDING' AND created_at < ? ORDER BY created_at ASC LIMIT ?",
            SELECT_PAYMENT
        ))
        .bind(ts(created_before))
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        rows.into_iter().map(SqlitePaymentRow::into_domain).collect()
    }
}
