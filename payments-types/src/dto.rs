//! Data Transfer Objects (DTOs) for requests and responses.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{
    Currency, Money, Payment, PaymentDraft, PaymentId, PaymentMethod, PaymentStatus,
};
use crate::error::DomainError;

// ─────────────────────────────────────────────────────────────────────────────
// Payment DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Request to create a payment.
///
/// Currency and method are plain strings here so that unknown values are
/// reported as validation failures with a reason code.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreatePaymentRequest {
    /// Amount in major units (e.g. `100.50`)
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(example = 100.50)]
    pub amount: Decimal,
    /// ISO-4217 currency code
    #[schema(example = "BRL")]
    pub currency: String,
    /// One of `CREDIT_CARD`, `DEBIT_CARD`, `BANK_TRANSFER`
    #[schema(example = "CREDIT_CARD")]
    pub method: String,
    /// Canonical provider name (case-sensitive)
    #[schema(example = "Stripe")]
    pub provider: String,
}

impl CreatePaymentRequest {
    /// Checks every field and produces a typed draft.
    pub fn validate(&self) -> Result<PaymentDraft, DomainError> {
        let currency: Currency = self.currency.parse()?;
        let amount = Money::new(self.amount, currency)?;
        let method: PaymentMethod = self.method.parse()?;

        if self.provider.trim().is_empty() {
            return Err(DomainError::MissingProvider);
        }

        Ok(PaymentDraft {
            amount,
            method,
            provider: self.provider.clone(),
        })
    }
}

/// Payment representation returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PaymentResponse {
    /// Unique payment identifier
    pub id: PaymentId,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(example = 100.50)]
    pub amount: Decimal,
    pub currency: Currency,
    pub method: PaymentMethod,
    #[schema(example = "Stripe")]
    pub provider: String,
    pub status: PaymentStatus,
    /// Provider-issued reference (approved payments)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_reference: Option<String>,
    /// Failure reason (failed payments)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Payment> for PaymentResponse {
    fn from(payment: &Payment) -> Self {
        Self {
            id: payment.id,
            amount: payment.amount.amount(),
            currency: payment.amount.currency(),
            method: payment.method,
            provider: payment.provider.clone(),
            status: payment.status,
            provider_reference: payment.provider_reference.clone(),
            failure_reason: payment.failure_reason.clone(),
            created_at: payment.created_at,
            updated_at: payment.updated_at,
        }
    }
}

impl From<Payment> for PaymentResponse {
    fn from(payment: Payment) -> Self {
        Self::from(&payment)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Provider DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Registered provider names.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProvidersResponse {
    #[schema(example = json!(["Paypal", "Stripe"]))]
    pub providers: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn request(amount: Decimal, currency: &str, method: &str, provider: &str) -> CreatePaymentRequest {
        CreatePaymentRequest {
            amount,
            currency: currency.to_string(),
            method: method.to_string(),
            provider: provider.to_string(),
        }
    }

    #[test]
    fn test_valid_request() {
        let draft = request(dec!(100.50), "BRL", "CREDIT_CARD", "Stripe")
            .validate()
            .unwrap();
        assert_eq!(draft.amount.amount(), dec!(100.50));
        assert_eq!(draft.amount.currency(), Currency::BRL);
        assert_eq!(draft.method, PaymentMethod::CreditCard);
        assert_eq!(draft.provider, "Stripe");
    }

    #[test]
    fn test_negative_amount_rejected() {
        let err = request(dec!(-5), "BRL", "CREDIT_CARD", "Stripe")
            .validate()
            .unwrap_err();
        assert_eq!(err.reason(), "INVALID_AMOUNT");
    }

    #[test]
    fn test_unknown_currency_and_method_rejected() {
        let err = request(dec!(1), "XYZ", "CREDIT_CARD", "Stripe")
            .validate()
            .unwrap_err();
        assert_eq!(err.reason(), "UNSUPPORTED_CURRENCY");

        let err = request(dec!(1), "USD", "CASH", "Stripe")
            .validate()
            .unwrap_err();
        assert_eq!(err.reason(), "UNSUPPORTED_METHOD");
    }

    #[test]
    fn test_blank_provider_rejected() {
        let err = request(dec!(1), "USD", "DEBIT_CARD", "  ")
            .validate()
            .unwrap_err();
        assert_eq!(err, DomainError::MissingProvider);
    }

    #[test]
    fn test_request_accepts_json_number() {
        let req: CreatePaymentRequest = serde_json::from_str(
            r#"{"amount":100.50,"currency":"BRL","method":"CREDIT_CARD","provider":"Stripe"}"#,
        )
        .unwrap();
        assert_eq!(req.amount, dec!(100.50));
    }

    #[test]
    fn test_response_shape() {
        let mut payment = Payment::pending(
            request(dec!(100.50), "BRL", "CREDIT_CARD", "Stripe")
                .validate()
                .unwrap(),
        );
        payment.approve("ch_1").unwrap();

        let json = serde_json::to_value(PaymentResponse::from(&payment)).unwrap();
        assert_eq!(json["amount"], 100.5);
        assert_eq!(json["currency"], "BRL");
        assert_eq!(json["method"], "CREDIT_CARD");
        assert_eq!(json["status"], "APPROVED");
        assert!(json.get("failure_reason").is_none());
    }
}
