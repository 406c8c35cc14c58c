//! Built-in event listeners.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{info, instrument};

use payments_types::PaymentEvent;

use crate::events::EventListener;

// ─────────────────────────────────────────────────────────────────────────────
// Audit log
// ─────────────────────────────────────────────────────────────────────────────

/// Writes one structured line per event to the `audit` tracing target.
#[derive(Debug, Default)]
pub struct AuditLogListener;

#[async_trait]
impl EventListener for AuditLogListener {
    fn name(&self) -> &str {
        "audit-log"
    }

    async fn on_event(&self, event: &PaymentEvent) -> anyhow::Result<()> {
        match event {
            PaymentEvent::PaymentApproved(e) => info!(
                target: "audit",
                event = event.kind().as_str(),
                event_id = %e.event_id,
                payment_id = %e.payment_id,
                provider = %e.provider,
                provider_reference = e.provider_reference.as_deref().unwrap_or(""),
                occurred_at = %e.occurred_at
            ),
            PaymentEvent::PaymentFailed(e) => info!(
                target: "audit",
                event = event.kind().as_str(),
                event_id = %e.event_id,
                payment_id = %e.payment_id,
                provider = %e.provider,
                reason = e.reason.as_deref().unwrap_or(""),
                occurred_at = %e.occurred_at
            ),
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Email notification (simulated)
// ─────────────────────────────────────────────────────────────────────────────

/// Renders the customer notification and logs it in place of sending mail.
#[derive(Debug, Default)]
pub struct EmailNotificationListener;

impl EmailNotificationListener {
    /// Subject and body of the notification for `event`.
    pub fn render(event: &PaymentEvent) -> (String, String) {
        match event {
            PaymentEvent::PaymentApproved(e) => (
                format!("Payment {} approved", e.payment_id),
                format!(
                    "Good news! Your payment {} was approved by {}. Reference: {}.",
                    e.payment_id,
                    e.provider,
                    e.provider_reference.as_deref().unwrap_or("n/a"),
                ),
            ),
            PaymentEvent::PaymentFailed(e) => (
                format!("Payment {} failed", e.payment_id),
                format!(
                    "Unfortunately your payment {} could not be completed by {} ({}).",
                    e.payment_id,
                    e.provider,
                    e.reason.as_deref().unwrap_or("unknown reason"),
                ),
            ),
        }
    }
}

#[async_trait]
impl EventListener for EmailNotificationListener {
    fn name(&self) -> &str {
        "email-notification"
    }

    async fn on_event(&self, event: &PaymentEvent) -> anyhow::Result<()> {
        let (subject, body) = Self::render(event);
        info!(payment_id = %event.payment_id(), %subject, %body, "Email notification sent");
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Webhook
// ─────────────────────────────────────────────────────────────────────────────

/// POSTs each event as JSON to a fixed URL.
pub struct WebhookListener {
    client: reqwest::Client,
    target_url: String,
}

impl WebhookListener {
    pub fn new(target_url: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            target_url: target_url.into(),
        })
    }
}

#[async_trait]
impl EventListener for WebhookListener {
    fn name(&self) -> &str {
        "webhook"
    }

    #[instrument(skip(self, event), fields(event_id = %event.event_id(), url = %self.target_url))]
    async fn on_event(&self, event: &PaymentEvent) -> anyhow::Result<()> {
        let response = self
            .client
            .post(&self.target_url)
            .header("X-Payment-Event", event.kind().as_str())
            .json(event)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("webhook endpoint answered HTTP {}", status);
        }

        info!(%status, "Webhook delivered");
        Ok(())
    }
}
