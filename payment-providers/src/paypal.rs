//! Paypal-like wallet processor.

use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

use payments_types::{ChargeOutcome, ChargeRequest, PaymentMethod, PaymentProvider, ProviderError};

use crate::behavior::{Simulation, Verdict};

/// Simulated Paypal adapter. Card payments only; bank transfers are declined.
pub struct PaypalProvider {
    simulation: Simulation,
}

impl PaypalProvider {
    pub const NAME: &'static str = "Paypal";

    pub fn new(simulation: Simulation) -> Self {
        Self { simulation }
    }

    fn reference() -> String {
        let id = Uuid::new_v4().simple().to_string().to_uppercase();
        format!("PAY-{}", &id[..20])
    }
}

#[async_trait]
impl PaymentProvider for PaypalProvider {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn charge(&self, request: &ChargeRequest) -> Result<ChargeOutcome, ProviderError> {
        if request.method == PaymentMethod::BankTransfer {
            return Ok(ChargeOutcome::Declined {
                reason: "method_not_supported".to_string(),
            });
        }

        let verdict = self.simulation.round_trip().await;
        debug!(payment_id = %request.payment_id, ?verdict, "paypal charge simulated");

        match verdict {
            Verdict::Approve => Ok(ChargeOutcome::Approved {
                reference: Self::reference(),
            }),
            Verdict::Decline => Ok(ChargeOutcome::Declined {
                reason: "INSTRUMENT_DECLINED".to_string(),
            }),
            Verdict::Error => Err(ProviderError::MalformedResponse(
                "unexpected payload from /v2/checkout/orders".to_string(),
            )),
        }
    }
}
