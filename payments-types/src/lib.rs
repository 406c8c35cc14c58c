//! # Payments Types
//!
//! Domain types and port traits for the payment orchestration service.
//! This crate has ZERO external IO dependencies - only data structures,
//! business rules, and trait definitions.
//!
//! ## Architecture
//!
//! This crate represents the **innermost core** of the hexagonal architecture:
//! - `domain/` - Pure domain types (Money, Payment, PaymentEvent)
//! - `ports/` - Trait definitions that adapters must implement
//! - `dto/` - Data Transfer Objects for API boundaries
//! - `error/` - Domain and application error types

pub mod domain;
pub mod dto;
pub mod error;
pub mod ports;

// Re-export commonly used types
pub use domain::{
    Currency, Money, Payment, PaymentApproved, PaymentDraft, PaymentEvent, PaymentEventKind,
    PaymentFailed, PaymentId, PaymentMethod, PaymentStatus, StatusUpdate,
};
pub use dto::*;
pub use error::{AppError, DomainError, RegistryError, RepoError};
pub use ports::{ChargeOutcome, ChargeRequest, PaymentProvider, PaymentRepository, ProviderError};
