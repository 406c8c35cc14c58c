//! Payment domain model and its status state machine.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::money::Money;
use crate::error::DomainError;

/// Unique identifier for a Payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = String, format = Uuid)]
pub struct PaymentId(Uuid);

impl PaymentId {
    /// Creates a new random PaymentId.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a PaymentId from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the UUID value.
    pub fn into_uuid(self) -> Uuid {
        self.0
    }
}

impl Default for PaymentId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for PaymentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for PaymentId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// How the customer pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    CreditCard,
    DebitCard,
    BankTransfer,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 3] = [
        PaymentMethod::CreditCard,
        PaymentMethod::DebitCard,
        PaymentMethod::BankTransfer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::CreditCard => "CREDIT_CARD",
            PaymentMethod::DebitCard => "DEBIT_CARD",
            PaymentMethod::BankTransfer => "BANK_TRANSFER",
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PaymentMethod::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| DomainError::UnsupportedMethod(s.to_string()))
    }
}

/// Lifecycle status of a payment.
///
/// `Pending` is the only non-terminal state. A payment leaves it exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Approved,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "PENDING",
            PaymentStatus::Approved => "APPROVED",
            PaymentStatus::Failed => "FAILED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, PaymentStatus::Pending)
    }

    /// Returns true if moving from `self` to `next` is a legal transition.
    pub fn can_transition_to(&self, next: PaymentStatus) -> bool {
        matches!(
            (self, next),
            (PaymentStatus::Pending, PaymentStatus::Approved)
                | (PaymentStatus::Pending, PaymentStatus::Failed)
        )
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PaymentStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(PaymentStatus::Pending),
            "APPROVED" => Ok(PaymentStatus::Approved),
            "FAILED" => Ok(PaymentStatus::Failed),
            other => Err(DomainError::UnknownStatus(other.to_string())),
        }
    }
}

/// A validated payment request, ready to become a [`Payment`].
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentDraft {
    pub amount: Money,
    pub method: PaymentMethod,
    pub provider: String,
}

/// A payment attempt routed to one provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    /// Unique identifier
    pub id: PaymentId,
    /// Amount charged (includes currency information)
    pub amount: Money,
    /// Payment method used by the customer
    pub method: PaymentMethod,
    /// Canonical name of the provider the payment was routed to
    pub provider: String,
    /// Current lifecycle status
    pub status: PaymentStatus,
    /// Provider-issued reference, set on approval
    pub provider_reference: Option<String>,
    /// Why the payment failed, set on failure
    pub failure_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Payment {
    /// Creates a new payment in `Pending` status.
    pub fn pending(draft: PaymentDraft) -> Self {
        let now = now();
        Self {
            id: PaymentId::new(),
            amount: draft.amount,
            method: draft.method,
            provider: draft.provider,
            status: PaymentStatus::Pending,
            provider_reference: None,
            failure_reason: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Reconstructs a payment from database fields.
    #[allow(clippy::too_many_arguments)]
    pub fn from_parts(
        id: PaymentId,
        amount: Money,
        method: PaymentMethod,
        provider: String,
        status: PaymentStatus,
        provider_reference: Option<String>,
        failure_reason: Option<String>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            amount,
            method,
            provider,
            status,
            provider_reference,
            failure_reason,
            created_at,
            updated_at,
        }
    }

    /// Marks the payment approved by the provider.
    pub fn approve(&mut self, reference: impl Into<String>) -> Result<(), DomainError> {
        self.transition(PaymentStatus::Approved)?;
        self.provider_reference = Some(reference.into());
        Ok(())
    }

    /// Marks the payment failed.
    pub fn fail(&mut self, reason: impl Into<String>) -> Result<(), DomainError> {
        self.transition(PaymentStatus::Failed)?;
        self.failure_reason = Some(reason.into());
        Ok(())
    }

    /// The persisted form of the current (terminal) status.
    pub fn status_update(&self) -> StatusUpdate {
        StatusUpdate {
            status: self.status,
            provider_reference: self.provider_reference.clone(),
            failure_reason: self.failure_reason.clone(),
            updated_at: self.updated_at,
        }
    }

    fn transition(&mut self, next: PaymentStatus) -> Result<(), DomainError> {
        if !self.status.can_transition_to(next) {
            return Err(DomainError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        self.updated_at = now();
        Ok(())
    }
}

/// Status change written by the store's conditional update.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusUpdate {
    pub status: PaymentStatus,
    pub provider_reference: Option<String>,
    pub failure_reason: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl StatusUpdate {
    /// Rejects updates that would move a payment back to `Pending`.
    pub fn ensure_terminal(&self) -> Result<(), DomainError> {
        if self.status.is_terminal() {
            Ok(())
        } else {
            Err(DomainError::InvalidTransition {
                from: PaymentStatus::Pending,
                to: self.status,
            })
        }
    }
}

// Timestamps are kept at microsecond precision so they survive a database round-trip.
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Currency;
    use rust_decimal_macros::dec;

    fn draft() -> PaymentDraft {
        PaymentDraft {
            amount: Money::new(dec!(100.50), Currency::BRL).unwrap(),
            method: PaymentMethod::CreditCard,
            provider: "Stripe".to_string(),
        }
    }

    #[test]
    fn test_new_payment_is_pending() {
        let payment = Payment::pending(draft());
        assert_eq!(payment.status, PaymentStatus::Pending);
        assert!(payment.provider_reference.is_none());
        assert!(payment.failure_reason.is_none());
        assert_eq!(payment.created_at, payment.updated_at);
    }

    #[test]
    fn test_approve_sets_reference() {
        let mut payment = Payment::pending(draft());
        payment.approve("ch_123").unwrap();
        assert_eq!(payment.status, PaymentStatus::Approved);
        assert_eq!(payment.provider_reference.as_deref(), Some("ch_123"));
    }

    #[test]
    fn test_status_is_set_only_once() {
        let mut payment = Payment::pending(draft());
        payment.fail("card_declined").unwrap();

        let again = payment.approve("ch_123");
        assert!(matches!(
            again,
            Err(DomainError::InvalidTransition {
                from: PaymentStatus::Failed,
                to: PaymentStatus::Approved
            })
        ));
        assert!(payment.fail("other").is_err());
        assert_eq!(payment.failure_reason.as_deref(), Some("card_declined"));
    }

    #[test]
    fn test_pending_update_is_rejected() {
        let payment = Payment::pending(draft());
        assert!(payment.status_update().ensure_terminal().is_err());
    }

    #[test]
    fn test_method_parse_is_exact() {
        assert_eq!(
            "BANK_TRANSFER".parse::<PaymentMethod>().unwrap(),
            PaymentMethod::BankTransfer
        );
        assert!(matches!(
            "credit_card".parse::<PaymentMethod>(),
            Err(DomainError::UnsupportedMethod(_))
        ));
    }

    #[test]
    fn test_status_round_trips_through_str() {
        for status in [
            PaymentStatus::Pending,
            PaymentStatus::Approved,
            PaymentStatus::Failed,
        ] {
            assert_eq!(status.as_str().parse::<PaymentStatus>().unwrap(), status);
        }
    }
}
