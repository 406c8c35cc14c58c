//! # Payments Client SDK
//!
//! A typed Rust client for the Payments API.

use payments_types::{CreatePaymentRequest, PaymentId, PaymentResponse, ProvidersResponse};
use reqwest::Client;
use serde::de::DeserializeOwned;

/// Error type for client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {status} {} - {message}", reason.as_deref().unwrap_or("UNKNOWN"))]
    Api {
        status: u16,
        /// Machine-readable reason code, when the server sent one
        reason: Option<String>,
        message: String,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ClientError {
    /// The server's reason code (`INVALID_AMOUNT`, `PROVIDER_NOT_FOUND`, ...).
    pub fn reason(&self) -> Option<&str> {
        match self {
            ClientError::Api { reason, .. } => reason.as_deref(),
            _ => None,
        }
    }
}

/// Payments API client.
pub struct PaymentsClient {
    base_url: String,
    http: Client,
}

impl PaymentsClient {
    /// Creates a new client.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    /// Checks if the API is healthy.
    pub async fn health(&self) -> Result<bool, ClientError> {
        let resp = self
            .http
            .get(format!("{}/health", self.base_url))
            .send()
            .await?;
        Ok(resp.status().is_success())
    }

    /// Creates a payment and returns it in its terminal status.
    ///
    /// A declined payment is a successful call; inspect `status`.
    pub async fn create_payment(
        &self,
        req: &CreatePaymentRequest,
    ) -> Result<PaymentResponse, ClientError> {
        self.post("/api/payments", req).await
    }

    /// Gets a payment by ID.
    pub async fn get_payment(&self, id: PaymentId) -> Result<PaymentResponse, ClientError> {
        self.get(&format!("/api/payments/{}", id)).await
    }

    /// Lists registered provider names.
    pub async fn list_providers(&self) -> Result<Vec<String>, ClientError> {
        let resp: ProvidersResponse = self.get("/api/providers").await?;
        Ok(resp.providers)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let resp = self
            .http
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await?;
        self.handle_response(resp).await
    }

    async fn post<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let resp = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .json(body)
            .send()
            .await?;
        self.handle_response(resp).await
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            Ok(serde_json::from_str(&body)?)
        } else {
            let body = resp.text().await.unwrap_or_default();
            Err(api_error(status.as_u16(), body))
        }
    }
}

/// Builds an `Api` error from a `{"error", "code", "reason"}` body, falling
/// back to the raw body text.
fn api_error(status: u16, body: String) -> ClientError {
    let parsed = serde_json::from_str::<serde_json::Value>(&body).ok();
    let field = |name: &str| {
        parsed
            .as_ref()
            .and_then(|v| v.get(name))
            .and_then(|e| e.as_str())
            .map(String::from)
    };

    ClientError::Api {
        status,
        reason: field("reason"),
        message: field("error").unwrap_or(body),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = PaymentsClient::new("http://localhost:3000");
        assert_eq!(client.base_url, "http://localhost:3000");
    }

    #[test]
    fn test_client_with_trailing_slash() {
        let client = PaymentsClient::new("http://localhost:3000/");
        assert_eq!(client.base_url, "http://localhost:3000");
    }

    #[test]
    fn test_api_error_reads_reason() {
        let err = api_error(
            422,
            r#"{"error":"Provider not found: Unknown","code":422,"reason":"PROVIDER_NOT_FOUND"}"#
                .to_string(),
        );

        assert_eq!(err.reason(), Some("PROVIDER_NOT_FOUND"));
        assert!(matches!(err, ClientError::Api { status: 422, ref message, .. } if message == "Provider not found: Unknown"));
    }

    #[test]
    fn test_api_error_falls_back_to_body() {
        let err = api_error(502, "Bad Gateway".to_string());

        assert_eq!(err.reason(), None);
        assert!(matches!(err, ClientError::Api { ref message, .. } if message == "Bad Gateway"));
    }
}
