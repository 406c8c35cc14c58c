//! Payment Application Service
//!
//! Orchestrates payment creation across the repository port, the provider
//! registry and the event bus. Contains NO infrastructure logic.

use std::time::Duration;

use chrono::Utc;
use tracing::{error, info, instrument, warn};

use payments_types::{
    AppError, ChargeOutcome, ChargeRequest, CreatePaymentRequest, Payment, PaymentEvent,
    PaymentId, PaymentRepository, ProviderError, RepoError,
};

use crate::events::EventBus;
use crate::registry::ProviderRegistry;

/// Failure reason recorded when the provider call errors or times out.
pub const INTEGRATION_FAILURE: &str = "provider_integration_failure";
/// Failure reason recorded when the reconcile sweep expires a PENDING payment.
pub const RECONCILIATION_EXPIRED: &str = "reconciliation_expired";
/// Provider call deadline unless overridden.
pub const DEFAULT_PROVIDER_TIMEOUT: Duration = Duration::from_secs(5);
/// Stale payments handled per sweep.
pub const RECONCILE_BATCH_SIZE: i64 = 50;

/// Application service for payment operations.
///
/// Generic over `R: PaymentRepository` - the adapter is injected at compile time.
/// The registry and event bus are injected at construction.
pub struct PaymentService<R: PaymentRepository> {
    repo: R,
    registry: ProviderRegistry,
    bus: EventBus,
    provider_timeout: Duration,
}

impl<R: PaymentRepository> PaymentService<R> {
    /// Creates a new payment service.
    pub fn new(repo: R, registry: ProviderRegistry, bus: EventBus) -> Self {
        Self {
            repo,
            registry,
            bus,
            provider_timeout: DEFAULT_PROVIDER_TIMEOUT,
        }
    }

    /// Overrides how long a provider may take to answer.
    pub fn with_provider_timeout(mut self, timeout: Duration) -> Self {
        self.provider_timeout = timeout;
        self
    }

    /// Returns a reference to the underlying repository.
    pub fn repo(&self) -> &R {
        &self.repo
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Payment Operations
    // ─────────────────────────────────────────────────────────────────────────────

    /// Creates a payment, charges it through the requested provider and
    /// returns it in its terminal status.
    ///
    /// Exactly one event is published per successful call, after the final
    /// status is persisted. Listener work is not awaited.
    #[instrument(
        skip(self, req),
        fields(provider = %req.provider, currency = %req.currency, payment_id = tracing::field::Empty)
    )]
    pub async fn create_payment(&self, req: CreatePaymentRequest) -> Result<Payment, AppError> {
        // 1. Validate
        let draft = req.validate()?;

        // 2. Resolve provider
        let provider = self.registry.resolve(&draft.provider)?;

        // 3. Record PENDING
        let mut payment = Payment::pending(draft);
        tracing::Span::current().record("payment_id", tracing::field::display(payment.id));
        self.repo.create(&payment).await.map_err(|e| {
            error!(error = %e, "Failed to record pending payment");
            AppError::from(e)
        })?;
        info!(amount = %payment.amount, method = %payment.method, "Payment created");

        // 4. Charge, bounded by the provider timeout
        let request = ChargeRequest {
            payment_id: payment.id,
            amount: payment.amount,
            method: payment.method,
        };
        let charged = tokio::time::timeout(self.provider_timeout, provider.charge(&request))
            .await
            .unwrap_or_else(|_| {
                Err(ProviderError::Timeout(
                    self.provider_timeout.as_millis() as u64,
                ))
            });
        let outcome = match charged {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(error = %e, "Provider integration failure");
                ChargeOutcome::Declined {
                    reason: INTEGRATION_FAILURE.to_string(),
                }
            }
        };

        // 5. Persist terminal status, then publish
        match outcome {
            ChargeOutcome::Approved { reference } => payment.approve(reference)?,
            ChargeOutcome::Declined { reason } => {
                warn!(%reason, "Payment declined");
                payment.fail(reason)?
            }
        }

        match self
            .repo
            .update_status(payment.id, &payment.status_update())
            .await
        {
            Ok(()) => {}
            // The reconcile sweep got there first and already published.
            Err(RepoError::Conflict(_)) => {
                let stored = self.get_payment(payment.id).await?;
                warn!(
                    status = %stored.status,
                    charged = %payment.status,
                    "Payment was resolved concurrently; returning stored outcome"
                );
                return Ok(stored);
            }
            Err(e) => {
                error!(error = %e, "Failed to persist payment outcome; record left PENDING");
                return Err(e.into());
            }
        }
        info!(status = %payment.status, "Payment resolved");

        self.publish_outcome(&payment);

        // 6. Return terminal payment
        Ok(payment)
    }

    /// Gets a payment by ID.
    #[instrument(skip(self))]
    pub async fn get_payment(&self, id: PaymentId) -> Result<Payment, AppError> {
        self.repo
            .find_by_id(id)
            .await
            .map_err(Into::into)
            .and_then(|opt| opt.ok_or_else(|| AppError::NotFound(format!("Payment {}", id))))
    }

    /// Registered provider names, sorted.
    pub fn list_providers(&self) -> Vec<String> {
        self.registry.names()
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Reconciliation
    // ─────────────────────────────────────────────────────────────────────────────

    /// Fails PENDING payments older than `grace` and publishes their
    /// `PaymentFailed` events. Returns how many payments were resolved.
    #[instrument(skip(self))]
    pub async fn reconcile_stale_pending(&self, grace: Duration) -> Result<usize, AppError> {
        let grace = chrono::Duration::from_std(grace)
            .map_err(|e| AppError::Internal(format!("Invalid grace period: {}", e)))?;
        let cutoff = Utc::now() - grace;

        let stale = self
            .repo
            .list_stale_pending(cutoff, RECONCILE_BATCH_SIZE)
            .await?;

        let mut resolved = 0;
        for mut payment in stale {
            payment.fail(RECONCILIATION_EXPIRED)?;

            match self
                .repo
                .update_status(payment.id, &payment.status_update())
                .await
            {
                Ok(()) => {
                    warn!(payment_id = %payment.id, "Dangling PENDING payment expired");
                    self.publish_outcome(&payment);
                    resolved += 1;
                }
                Err(RepoError::Conflict(_)) => {
                    info!(payment_id = %payment.id, "Payment resolved concurrently; skipping");
                }
                Err(e) => {
                    error!(payment_id = %payment.id, error = %e, "Failed to expire payment");
                }
            }
        }

        Ok(resolved)
    }

    fn publish_outcome(&self, payment: &Payment) {
        if let Some(event) = PaymentEvent::from_resolved(payment) {
            self.bus.publish(event);
        }
    }
}
