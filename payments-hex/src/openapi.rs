//! OpenAPI specification and documentation.

#![allow(dead_code)] // Path functions are only used by utoipa for documentation generation

use payments_types::domain::{Currency, PaymentId, PaymentMethod, PaymentStatus};
use payments_types::dto::{CreatePaymentRequest, PaymentResponse, ProvidersResponse};
use utoipa::OpenApi;

// Dummy functions to generate path documentation
// These are not the actual handlers, just for OpenAPI path generation

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = inline(serde_json::Value), example = json!({"status": "healthy"}))
    )
)]
async fn health() {}

/// Create and process a payment
///
/// The provider is called synchronously; the response carries the terminal
/// status. Declined and integration-failed payments are still `201`.
#[utoipa::path(
    post,
    path = "/api/payments",
    tag = "payments",
    request_body = CreatePaymentRequest,
    responses(
        (status = 201, description = "Payment processed (APPROVED or FAILED)", body = PaymentResponse),
        (status = 400, description = "Validation failed", example = json!({"error": "Amount must be greater than zero", "code": 400, "reason": "INVALID_AMOUNT"})),
        (status = 422, description = "Unknown provider", example = json!({"error": "Provider not found: Unknown", "code": 422, "reason": "PROVIDER_NOT_FOUND"})),
        (status = 429, description = "Rate limit exceeded"),
        (status = 500, description = "Payment could not be persisted")
    )
)]
async fn create_payment() {}

/// Get payment by ID
#[utoipa::path(
    get,
    path = "/api/payments/{id}",
    tag = "payments",
    params(
        ("id" = PaymentId, Path, description = "Payment ID (UUID)")
    ),
    responses(
        (status = 200, description = "Payment details", body = PaymentResponse),
        (status = 400, description = "Malformed payment ID"),
        (status = 404, description = "Payment not found")
    )
)]
async fn get_payment() {}

/// List registered providers
#[utoipa::path(
    get,
    path = "/api/providers",
    tag = "providers",
    responses(
        (status = 200, description = "Provider names, sorted", body = ProvidersResponse)
    )
)]
async fn list_providers() {}

/// OpenAPI documentation for the Payments API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Payment Orchestration API",
        version = "1.0.0",
        description = "Routes payments to pluggable providers and publishes the outcome to in-process listeners.\n\nProvider names are case-sensitive (`Stripe`, `Paypal`).",
        license(name = "MIT"),
    ),
    paths(health, create_payment, get_payment, list_providers),
    components(
        schemas(
            CreatePaymentRequest,
            PaymentResponse,
            ProvidersResponse,
            PaymentId,
            Currency,
            PaymentMethod,
            PaymentStatus,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "payments", description = "Payment creation and lookup"),
        (name = "providers", description = "Registered payment providers"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_payment_paths() {
        let doc = ApiDoc::openapi();

        assert!(doc.paths.paths.contains_key("/api/payments"));
        assert!(doc.paths.paths.contains_key("/api/payments/{id}"));
        assert!(doc.paths.paths.contains_key("/api/providers"));
    }
}
