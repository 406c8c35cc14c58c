//! Domain models for the payment service.

pub mod event;
pub mod money;
pub mod payment;

pub use event::{PaymentApproved, PaymentEvent, PaymentEventKind, PaymentFailed};
pub use money::{Currency, MAX_AMOUNT, Money};
pub use payment::{
    Payment, PaymentDraft, PaymentId, PaymentMethod, PaymentStatus, StatusUpdate,
};
