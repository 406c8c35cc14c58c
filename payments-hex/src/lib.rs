//! # Payments Hex
//!
//! Application service layer and HTTP adapter for the payments service.
//!
//! ## Architecture
//!
//! - `service` - Payment orchestrator (validate, route, charge, persist, publish)
//! - `registry` - Provider lookup by canonical name
//! - `events` / `listeners` - In-process event bus and the shipped listeners
//! - `reconcile` - Background sweep for dangling PENDING payments
//! - `inbound/` - HTTP adapter (Axum server)
//!
//! The service is generic over `R: PaymentRepository`, allowing
//! different repository implementations to be injected.

pub mod events;
pub mod inbound;
pub mod listeners;
pub mod openapi;
pub mod reconcile;
pub mod registry;
pub mod service;


pub use events::{EventBus, EventListener};
pub use listeners::{AuditLogListener, EmailNotificationListener, WebhookListener};
pub use reconcile::ReconcileWorker;
pub use registry::ProviderRegistry;
pub use service::PaymentService;
