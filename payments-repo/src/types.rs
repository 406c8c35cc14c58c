//! Database row types for SQLite and PostgreSQL.

use sqlx::FromRow;

use payments_types::{
    Currency, Money, Payment, PaymentId, PaymentMethod, PaymentStatus, RepoError,
};

// ─────────────────────────────────────────────────────────────────────────────
// Shared column decoding
// ─────────────────────────────────────────────────────────────────────────────

struct Columns {
    currency: Currency,
    method: PaymentMethod,
    status: PaymentStatus,
}

fn decode_columns(currency: &str, method: &str, status: &str) -> Result<Columns, RepoError> {
    Ok(Columns {
        currency: currency.parse()?,
        method: method.parse()?,
        status: status.parse()?,
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// SQLite rows (TEXT columns)
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(feature = "sqlite")]
pub(crate) use sqlite_rows::*;

#[cfg(feature = "sqlite")]
mod sqlite_rows {
    use super::*;
    use chrono::{DateTime, Utc};
    use rust_decimal::Decimal;
    use std::str::FromStr;
    use uuid::Uuid;

    /// Payment row from SQLite.
    #[derive(FromRow)]
    pub struct SqlitePaymentRow {
        pub id: String,
        pub amount: String,
        pub currency: String,
        pub method: String,
        pub provider: String,
        pub status: String,
        pub provider_reference: Option<String>,
        pub failure_reason: Option<String>,
        pub created_at: String,
        pub updated_at: String,
    }

    /// Status-only projection used after a conditional update misses.
    #[derive(FromRow)]
    pub struct SqliteStatusRow {
        pub status: String,
    }

    fn parse_time(value: &str) -> Result<DateTime<Utc>, RepoError> {
        DateTime::parse_from_rfc3339(value)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| RepoError::Database(format!("Invalid timestamp '{}': {}", value, e)))
    }

    impl SqlitePaymentRow {
        pub fn into_domain(self) -> Result<Payment, RepoError> {
            let id = Uuid::parse_str(&self.id)
                .map_err(|e| RepoError::Database(format!("Invalid payment id: {}", e)))?;
            let amount = Decimal::from_str(&self.amount)
                .map_err(|e| RepoError::Database(format!("Invalid amount: {}", e)))?;
            let cols = decode_columns(&self.currency, &self.method, &self.status)?;

            Ok(Payment::from_parts(
                PaymentId::from_uuid(id),
                Money::new(amount, cols.currency)?,
                cols.method,
                self.provider,
                cols.status,
                self.provider_reference,
                self.failure_reason,
                parse_time(&self.created_at)?,
                parse_time(&self.updated_at)?,
            ))
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// PostgreSQL rows (native types)
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(feature = "postgres")]
pub(crate) use pg_rows::*;

#[cfg(feature = "postgres")]
mod pg_rows {
    use super::*;
    use chrono::{DateTime, Utc};
    use rust_decimal::Decimal;
    use uuid::Uuid;

    /// Payment row from PostgreSQL.
    #[derive(FromRow)]
    pub struct PgPaymentRow {
        pub id: Uuid,
        pub amount: Decimal,
        pub currency: String,
        pub method: String,
        pub provider: String,
        pub status: String,
        pub provider_reference: Option<String>,
        pub failure_reason: Option<String>,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }

    #[derive(FromRow)]
    pub struct PgStatusRow {
        pub status: String,
    }

    impl PgPaymentRow {
        pub fn into_domain(self) -> Result<Payment, RepoError> {
            let cols = decode_columns(&self.currency, &self.method, &self.status)?;

            Ok(Payment::from_parts(
                PaymentId::from_uuid(self.id),
                Money::new(self.amount.normalize(), cols.currency)?,
                cols.method,
                self.provider,
                cols.status,
                self.provider_reference,
                self.failure_reason,
                self.created_at,
                self.updated_at,
            ))
        }
    }
}
