//! Simulated Payment Provider Adapters
//!
//! Stand-ins for external payment networks, implementing the
//! [`PaymentProvider`] port. Each adapter applies its own business rules and
//! then asks a configurable [`Simulation`] how the "network" answers.
//!
//! # Example
//! ```
//! use payment_providers::{ProviderSettings, SimulatedBehavior, simulated_providers};
//!
//! let settings = ProviderSettings {
//!     stripe: SimulatedBehavior::AlwaysApprove,
//!     paypal: "RANDOM:0.8".parse().unwrap(),
//!     ..Default::default()
//! };
//! let providers = simulated_providers(&settings);
//! assert_eq!(providers.len(), 2);
//! ```

use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;

use payments_types::PaymentProvider;

mod behavior;
mod paypal;
mod stripe;

pub use behavior::{BehaviorParseError, SimulatedBehavior, Simulation};
pub use paypal::PaypalProvider;
pub use stripe::StripeProvider;

/// Startup settings for the built-in simulated providers.
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    pub stripe: SimulatedBehavior,
    pub paypal: SimulatedBehavior,
    pub latency: Duration,
    pub stripe_amount_limit: Decimal,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            stripe: SimulatedBehavior::AlwaysApprove,
            paypal: SimulatedBehavior::Random { approval_rate: 0.8 },
            latency: Duration::ZERO,
            stripe_amount_limit: Decimal::from(10_000),
        }
    }
}

/// Builds every built-in provider, ready to be registered.
pub fn simulated_providers(settings: &ProviderSettings) -> Vec<Arc<dyn PaymentProvider>> {
    vec![
        Arc::new(
            StripeProvider::new(Simulation::new(settings.stripe).with_latency(settings.latency))
                .with_amount_limit(settings.stripe_amount_limit),
        ),
        Arc::new(PaypalProvider::new(
            Simulation::new(settings.paypal).with_latency(settings.latency),
        )),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_names() {
        let providers = simulated_providers(&ProviderSettings::default());
        let names: Vec<&str> = providers.iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["Stripe", "Paypal"]);
    }
}
