//! Error types for the payment service.

use crate::domain::{Currency, PaymentStatus};

/// Domain-level errors (business rule violations).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DomainError {
    #[error("Amount must be greater than zero")]
    NonPositiveAmount,

    #[error("Amount must be less than {0}")]
    AmountTooLarge(rust_decimal::Decimal),

    #[error("Amount has more than {max_places} decimal places for {currency}")]
    AmountPrecision { currency: Currency, max_places: u32 },

    #[error("Unsupported currency: {0}")]
    UnsupportedCurrency(String),

    #[error("Unsupported payment method: {0}")]
    UnsupportedMethod(String),

    #[error("Provider name cannot be empty")]
    MissingProvider,

    #[error("Unknown payment status: {0}")]
    UnknownStatus(String),

    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition {
        from: PaymentStatus,
        to: PaymentStatus,
    },
}

impl DomainError {
    /// Machine-readable reason code returned to API clients.
    pub fn reason(&self) -> &'static str {
        match self {
            DomainError::NonPositiveAmount
            | DomainError::AmountTooLarge(_)
            | DomainError::AmountPrecision { .. } => "INVALID_AMOUNT",
            DomainError::UnsupportedCurrency(_) => "UNSUPPORTED_CURRENCY",
            DomainError::UnsupportedMethod(_) => "UNSUPPORTED_METHOD",
            DomainError::MissingProvider => "MISSING_PROVIDER",
            DomainError::UnknownStatus(_) => "UNKNOWN_STATUS",
            DomainError::InvalidTransition { .. } => "INVALID_TRANSITION",
        }
    }
}

/// Repository-level errors (data access failures).
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Entity not found")]
    NotFound,

    #[error("Conflict: {0}")]
    Conflict(String),
}

/// Provider lookup errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RegistryError {
    #[error("Provider not found: {0}")]
    ProviderNotFound(String),

    #[error("Provider registered twice: {0}")]
    DuplicateProvider(String),
}

/// Application-level errors (for HTTP responses).
///
/// Maps cleanly to HTTP status codes.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Validation failed ({reason}): {message}")]
    Validation {
        reason: &'static str,
        message: String,
    },

    #[error("Provider not found: {0}")]
    ProviderNotFound(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Machine-readable reason code.
    pub fn reason(&self) -> &'static str {
        match self {
            AppError::Validation { reason, .. } => *reason,
            AppError::ProviderNotFound(_) => "PROVIDER_NOT_FOUND",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::UnknownStatus(_) | DomainError::InvalidTransition { .. } => {
                AppError::Internal(err.to_string())
            }
            e => AppError::Validation {
                reason: e.reason(),
                message: e.to_string(),
            },
        }
    }
}

impl From<RegistryError> for AppError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::ProviderNotFound(name) => AppError::ProviderNotFound(name),
            e @ RegistryError::DuplicateProvider(_) => AppError::Internal(e.to_string()),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::Domain(e) => e.into(),
            RepoError::NotFound => AppError::NotFound("Resource not found".into()),
            RepoError::Database(e) => AppError::Internal(e),
            RepoError::Conflict(e) => AppError::Internal(e),
        }
    }
}
