//! In-memory repository adapter.
//!
//! Used for local development (`DATABASE_URL=memory://`) and tests. Data lives
//! for the lifetime of the process.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;

use payments_types::{
    Payment, PaymentId, PaymentRepository, PaymentStatus, RepoError, StatusUpdate,
};

/// Concurrent map-backed payment store.
#[derive(Default)]
pub struct InMemoryRepo {
    payments: DashMap<PaymentId, Payment>,
}

impl InMemoryRepo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored payments.
    pub fn len(&self) -> usize {
        self.payments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payments.is_empty()
    }
}

#[async_trait]
impl PaymentRepository for InMemoryRepo {
    async fn create(&self, payment: &Payment) -> Result<PaymentId, RepoError> {
        use dashmap::mapref::entry::Entry;

        match self.payments.entry(payment.id) {
            Entry::Occupied(_) => Err(RepoError::Conflict(format!(
                "payment {} already exists",
                payment.id
            ))),
            Entry::Vacant(slot) => {
                slot.insert(payment.clone());
                Ok(payment.id)
            }
        }
    }

    async fn update_status(&self, id: PaymentId, update: &StatusUpdate) -> Result<(), RepoError> {
        update.ensure_terminal()?;

        let mut entry = self.payments.get_mut(&id).ok_or(RepoError::NotFound)?;
        if entry.status != PaymentStatus::Pending {
            return Err(RepoError::Conflict(format!(
                "payment {} is already {}",
                id, entry.status
            )));
        }

        entry.status = update.status;
        entry.provider_reference = update.provider_reference.clone();
        entry.failure_reason = update.failure_reason.clone();
        entry.updated_at = update.updated_at;
        Ok(())
    }

    async fn find_by_id(&self, id: PaymentId) -> Result<Option<Payment>, RepoError> {
        Ok(self.payments.get(&id).map(|p| p.value().clone()))
    }

    async fn list_stale_pending(
        &self,
        created_before: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<Payment>, RepoError> {
        let mut stale: Vec<Payment> = self
            .payments
            .iter()
            .filter(|p| p.status == PaymentStatus::Pending && p.created_at < created_before)
            .map(|p| p.value().clone())
            .collect();

        stale.sort_by_key(|p| p.created_at);
        stale.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(stale)
    }
}
