//! Repository port trait.
//!
//! This is the primary port in our hexagonal architecture.
//! Adapters (Postgres, SQLite, InMemory) will implement this trait.

use chrono::{DateTime, Utc};

use crate::domain::{Payment, PaymentId, StatusUpdate};
use crate::error::RepoError;

/// The payment record store.
///
/// Implementations are shared between concurrent orchestrations and must be
/// safe to call from many tasks at once.
#[async_trait::async_trait]
pub trait PaymentRepository: Send + Sync + 'static {
    /// Persists a new payment and returns its identity.
    async fn create(&self, payment: &Payment) -> Result<PaymentId, RepoError>;

    /// Moves a `PENDING` payment to a terminal status.
    ///
    /// Fails with `NotFound` for an unknown id and `Conflict` if the payment
    /// already left `PENDING`.
    async fn update_status(&self, id: PaymentId, update: &StatusUpdate) -> Result<(), RepoError>;

    /// Gets a payment by ID.
    async fn find_by_id(&self, id: PaymentId) -> Result<Option<Payment>, RepoError>;

    /// Lists `PENDING` payments created before the cutoff, oldest first.
    async fn list_stale_pending(
        &self,
        created_before: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<Payment>, RepoError>;
}
