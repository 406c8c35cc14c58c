//! Payment provider port.
//!
//! One implementation per external payment network. Implementations can be
//! HTTP clients, simulators, etc.

use serde::{Deserialize, Serialize};

use crate::domain::{Money, PaymentId, PaymentMethod};

/// Error type for provider integration failures.
///
/// A business decline is NOT an error; it is [`ChargeOutcome::Declined`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProviderError {
    #[error("Provider unreachable: {0}")]
    Unreachable(String),

    #[error("Malformed provider response: {0}")]
    MalformedResponse(String),

    #[error("Provider did not answer within {0} ms")]
    Timeout(u64),
}

/// What the provider is asked to charge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChargeRequest {
    pub payment_id: PaymentId,
    pub amount: Money,
    pub method: PaymentMethod,
}

/// Business result of a charge attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChargeOutcome {
    /// The provider accepted the charge.
    Approved { reference: String },
    /// The provider refused the charge.
    Declined { reason: String },
}

/// Port trait for payment providers.
#[async_trait::async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Canonical name used for routing, e.g. `"Stripe"`.
    fn name(&self) -> &str;

    /// Attempts to charge the customer.
    async fn charge(&self, request: &ChargeRequest) -> Result<ChargeOutcome, ProviderError>;
}
