//! Domain events emitted once a payment reaches a terminal status.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::payment::{Payment, PaymentId, PaymentStatus};

/// Event types listeners can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentEventKind {
    PaymentApproved,
    PaymentFailed,
}

impl PaymentEventKind {
    pub const ALL: [PaymentEventKind; 2] = [
        PaymentEventKind::PaymentApproved,
        PaymentEventKind::PaymentFailed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentEventKind::PaymentApproved => "payment.approved",
            PaymentEventKind::PaymentFailed => "payment.failed",
        }
    }
}

impl std::fmt::Display for PaymentEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentApproved {
    pub event_id: Uuid,
    pub payment_id: PaymentId,
    pub provider: String,
    pub provider_reference: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentFailed {
    pub event_id: Uuid,
    pub payment_id: PaymentId,
    pub provider: String,
    pub reason: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

/// Immutable fact about a payment outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PaymentEvent {
    PaymentApproved(PaymentApproved),
    PaymentFailed(PaymentFailed),
}

impl PaymentEvent {
    /// Builds the event matching a payment's terminal status.
    ///
    /// Returns `None` while the payment is still `Pending`.
    pub fn from_resolved(payment: &Payment) -> Option<Self> {
        let event_id = Uuid::new_v4();
        let occurred_at = Utc::now();

        match payment.status {
            PaymentStatus::Pending => None,
            PaymentStatus::Approved => Some(PaymentEvent::PaymentApproved(PaymentApproved {
                event_id,
                payment_id: payment.id,
                provider: payment.provider.clone(),
                provider_reference: payment.provider_reference.clone(),
                occurred_at,
            })),
            PaymentStatus::Failed => Some(PaymentEvent::PaymentFailed(PaymentFailed {
                event_id,
                payment_id: payment.id,
                provider: payment.provider.clone(),
                reason: payment.failure_reason.clone(),
                occurred_at,
            })),
        }
    }

    pub fn kind(&self) -> PaymentEventKind {
        match self {
            PaymentEvent::PaymentApproved(_) => PaymentEventKind::PaymentApproved,
            PaymentEvent::PaymentFailed(_) => PaymentEventKind::PaymentFailed,
        }
    }

    pub fn event_id(&self) -> Uuid {
        match self {
            PaymentEvent::PaymentApproved(e) => e.event_id,
            PaymentEvent::PaymentFailed(e) => e.event_id,
        }
    }

    pub fn payment_id(&self) -> PaymentId {
        match self {
            PaymentEvent::PaymentApproved(e) => e.payment_id,
            PaymentEvent::PaymentFailed(e) => e.payment_id,
        }
    }

    pub fn provider(&self) -> &str {
        match self {
            PaymentEvent::PaymentApproved(e) => &e.provider,
            PaymentEvent::PaymentFailed(e) => &e.provider,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Currency, Money, PaymentDraft, PaymentMethod};
    use rust_decimal_macros::dec;

    fn payment(provider: &str) -> Payment {
        Payment::pending(PaymentDraft {
            amount: Money::new(dec!(10), Currency::USD).unwrap(),
            method: PaymentMethod::DebitCard,
            provider: provider.to_string(),
        })
    }

    #[test]
    fn test_pending_payment_has_no_event() {
        assert!(PaymentEvent::from_resolved(&payment("Stripe")).is_none());
    }

    #[test]
    fn test_failed_event_carries_provider() {
        let mut p = payment("Paypal");
        p.fail("insufficient_funds").unwrap();

        let event = PaymentEvent::from_resolved(&p).unwrap();
        assert_eq!(event.kind(), PaymentEventKind::PaymentFailed);
        assert_eq!(event.payment_id(), p.id);
        assert_eq!(event.provider(), "Paypal");
    }

    #[test]
    fn test_event_serializes_with_type_tag() {
        let mut p = payment("Stripe");
        p.approve("ch_1").unwrap();

        let json = serde_json::to_value(PaymentEvent::from_resolved(&p).unwrap()).unwrap();
        assert_eq!(json["type"], "PaymentApproved");
        assert_eq!(json["payment_id"], p.id.to_string());
    }
}
