//! Configurable behavior shared by the simulated providers.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use rand::Rng;

/// How a simulated provider answers a charge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SimulatedBehavior {
    /// Every charge is approved.
    AlwaysApprove,
    /// Every charge is declined (business decline).
    AlwaysDecline,
    /// Every call fails at the integration level.
    AlwaysError,
    /// The provider never answers.
    Hang,
    /// Approves with the given probability, declines otherwise.
    Random { approval_rate: f64 },
}

/// Error returned when a behavior string cannot be parsed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Invalid provider behavior '{0}'. Expected ALWAYS_APPROVE, ALWAYS_DECLINE, ALWAYS_ERROR, HANG or RANDOM:<0.0-1.0>")]
pub struct BehaviorParseError(pub String);

impl FromStr for SimulatedBehavior {
    type Err = BehaviorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_uppercase();
        match normalized.as_str() {
            "ALWAYS_APPROVE" => Ok(SimulatedBehavior::AlwaysApprove),
            "ALWAYS_DECLINE" => Ok(SimulatedBehavior::AlwaysDecline),
            "ALWAYS_ERROR" => Ok(SimulatedBehavior::AlwaysError),
            "HANG" => Ok(SimulatedBehavior::Hang),
            other => {
                let rate = other
                    .strip_prefix("RANDOM:")
                    .and_then(|r| r.parse::<f64>().ok())
                    .filter(|r| (0.0..=1.0).contains(r))
                    .ok_or_else(|| BehaviorParseError(s.to_string()))?;
                Ok(SimulatedBehavior::Random {
                    approval_rate: rate,
                })
            }
        }
    }
}

impl fmt::Display for SimulatedBehavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimulatedBehavior::AlwaysApprove => write!(f, "ALWAYS_APPROVE"),
            SimulatedBehavior::AlwaysDecline => write!(f, "ALWAYS_DECLINE"),
            SimulatedBehavior::AlwaysError => write!(f, "ALWAYS_ERROR"),
            SimulatedBehavior::Hang => write!(f, "HANG"),
            SimulatedBehavior::Random { approval_rate } => write!(f, "RANDOM:{}", approval_rate),
        }
    }
}

/// What the simulated network decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Verdict {
    Approve,
    Decline,
    Error,
}

/// Behavior plus artificial network latency.
#[derive(Debug, Clone)]
pub struct Simulation {
    pub behavior: SimulatedBehavior,
    pub latency: Duration,
}

impl Simulation {
    pub fn new(behavior: SimulatedBehavior) -> Self {
        Self {
            behavior,
            latency: Duration::ZERO,
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Waits out the simulated round trip and returns the network's verdict.
    pub(crate) async fn round_trip(&self) -> Verdict {
        let verdict = match self.behavior {
            SimulatedBehavior::AlwaysApprove => Verdict::Approve,
            SimulatedBehavior::AlwaysDecline => Verdict::Decline,
            SimulatedBehavior::AlwaysError => Verdict::Error,
            SimulatedBehavior::Random { approval_rate } => {
                if roll(approval_rate) {
                    Verdict::Approve
                } else {
                    Verdict::Decline
                }
            }
            SimulatedBehavior::Hang => std::future::pending::<Verdict>().await,
        };

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        verdict
    }
}

// Kept out of the async body so the thread-local RNG never lives across an await.
// NaN compares false everywhere and would survive `clamp`; treat it as "never".
fn roll(approval_rate: f64) -> bool {
    if approval_rate.is_nan() {
        return false;
    }
    rand::rng().random_bool(approval_rate.clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fixed_behaviors() {
        assert_eq!(
            "ALWAYS_APPROVE".parse::<SimulatedBehavior>().unwrap(),
            SimulatedBehavior::AlwaysApprove
        );
        assert_eq!(
            "always_decline".parse::<SimulatedBehavior>().unwrap(),
            SimulatedBehavior::AlwaysDecline
        );
        assert_eq!(
            " HANG ".parse::<SimulatedBehavior>().unwrap(),
            SimulatedBehavior::Hang
        );
    }

    #[test]
    fn test_parse_random_behavior() {
        assert_eq!(
            "RANDOM:0.8".parse::<SimulatedBehavior>().unwrap(),
            SimulatedBehavior::Random { approval_rate: 0.8 }
        );
        assert!("RANDOM:1.5".parse::<SimulatedBehavior>().is_err());
        assert!("RANDOM:".parse::<SimulatedBehavior>().is_err());
        assert!("SOMETIMES".parse::<SimulatedBehavior>().is_err());
    }

    #[test]
    fn test_display_round_trips() {
        for behavior in [
            SimulatedBehavior::AlwaysApprove,
            SimulatedBehavior::AlwaysError,
            SimulatedBehavior::Random { approval_rate: 0.25 },
        ] {
            assert_eq!(
                behavior.to_string().parse::<SimulatedBehavior>().unwrap(),
                behavior
            );
        }
    }

    #[tokio::test]
    async fn test_random_extremes_are_deterministic() {
        let always = Simulation::new(SimulatedBehavior::Random { approval_rate: 1.0 });
        let never = Simulation::new(SimulatedBehavior::Random { approval_rate: 0.0 });
        for _ in 0..20 {
            assert_eq!(always.round_trip().await, Verdict::Approve);
            assert_eq!(never.round_trip().await, Verdict::Decline);
        }
    }

    #[tokio::test]
    async fn test_out_of_range_rates_do_not_panic() {
        let nan = Simulation::new(SimulatedBehavior::Random {
            approval_rate: f64::NAN,
        });
        let high = Simulation::new(SimulatedBehavior::Random { approval_rate: 7.0 });

        assert_eq!(nan.round_trip().await, Verdict::Decline);
        assert_eq!(high.round_trip().await, Verdict::Approve);
    }

    #[tokio::test]
    async fn test_hang_never_answers() {
        let sim = Simulation::new(SimulatedBehavior::Hang);
        let result =
            tokio::time::timeout(Duration::from_millis(20), sim.round_trip()).await;
        assert!(result.is_err());
    }
}
