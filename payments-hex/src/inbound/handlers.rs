//! HTTP request handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use payments_types::{
    AppError, CreatePaymentRequest, PaymentId, PaymentRepository, PaymentResponse,
    ProvidersResponse,
};

use crate::PaymentService;

/// Application state shared across handlers.
pub struct AppState<R: PaymentRepository> {
    pub service: Arc<PaymentService<R>>,
}

/// Wrapper to implement IntoResponse for AppError (orphan rule workaround).
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::ProviderNotFound(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let message = match &self.0 {
            AppError::Validation { message, .. } => message.clone(),
            AppError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        };

        let body = serde_json::json!({
            "error": message,
            "code": status.as_u16(),
            "reason": self.0.reason(),
        });

        (status, Json(body)).into_response()
    }
}

/// Health check endpoint.
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "healthy" }))
}

/// Create and process a payment.
///
/// Answers `201 Created` for both approved and failed payments.
#[tracing::instrument(skip(state, body))]
pub async fn create_payment<R: PaymentRepository>(
    State(state): State<Arc<AppState<R>>>,
    body: Result<Json<CreatePaymentRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = body.map_err(|e| AppError::Validation {
        reason: "MALFORMED_REQUEST",
        message: e.body_text(),
    })?;

    let payment = state.service.create_payment(req).await?;
    Ok((StatusCode::CREATED, Json(PaymentResponse::from(payment))))
}

/// Get payment by ID.
#[tracing::instrument(skip(state), fields(payment_id = %id))]
pub async fn get_payment<R: PaymentRepository>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let payment_id: PaymentId = id.parse().map_err(|_| AppError::Validation {
        reason: "INVALID_ID",
        message: "Invalid payment ID".into(),
    })?;

    let payment = state.service.get_payment(payment_id).await?;
    Ok(Json(PaymentResponse::from(payment)))
}

/// List registered provider names.
#[tracing::instrument(skip(state))]
pub async fn list_providers<R: PaymentRepository>(
    State(state): State<Arc<AppState<R>>>,
) -> impl IntoResponse {
    Json(ProvidersResponse {
        providers: state.service.list_providers(),
    })
}
