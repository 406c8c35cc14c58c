//! Stripe-like card processor.

use async_trait::async_trait;
use rust_decimal::Decimal;
use tracing::debug;
use uuid::Uuid;

use payments_types::{ChargeOutcome, ChargeRequest, PaymentProvider, ProviderError};

use crate::behavior::{Simulation, Verdict};

/// Simulated Stripe adapter.
///
/// Declines any single charge above `amount_limit` (in major units) before
/// consulting the simulated network.
pub struct StripeProvider {
    simulation: Simulation,
    amount_limit: Decimal,
}

impl StripeProvider {
    pub const NAME: &'static str = "Stripe";

    pub fn new(simulation: Simulation) -> Self {
        Self {
            simulation,
            amount_limit: Decimal::from(10_000),
        }
    }

    pub fn with_amount_limit(mut self, limit: Decimal) -> Self {
        self.amount_limit = limit;
        self
    }

    fn reference() -> String {
        let id = Uuid::new_v4().simple().to_string();
        format!("ch_{}", &id[..24])
    }
}

#[async_trait]
impl PaymentProvider for StripeProvider {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn charge(&self, request: &ChargeRequest) -> Result<ChargeOutcome, ProviderError> {
        if request.amount.amount() > self.amount_limit {
            return Ok(ChargeOutcome::Declined {
                reason: "amount_exceeds_limit".to_string(),
            });
        }

        let verdict = self.simulation.round_trip().await;
        debug!(payment_id = %request.payment_id, ?verdict, "stripe charge simulated");

        match verdict {
            Verdict::Approve => Ok(ChargeOutcome::Approved {
                reference: Self::reference(),
            }),
            Verdict::Decline => Ok(ChargeOutcome::Declined {
                reason: "card_declined".to_string(),
            }),
            Verdict::Error => Err(ProviderError::Unreachable(
                "api.stripe.com: connection refused".to_string(),
            )),
        }
    }
}
