//! In-process Event Bus
//!
//! Fans payment events out to subscribed listeners. Each listener runs on its
//! own tokio task, so a slow or failing listener never delays the publisher
//! or any other listener.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::{debug, error, warn};

use payments_types::{PaymentEvent, PaymentEventKind};

/// Reacts to payment events after the outcome is persisted.
#[async_trait]
pub trait EventListener: Send + Sync + 'static {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Handles one event. Errors are logged by the bus and go nowhere else.
    async fn on_event(&self, event: &PaymentEvent) -> anyhow::Result<()>;
}

/// Publish/subscribe hub shared by the service and the reconcile worker.
#[derive(Clone, Default)]
pub struct EventBus {
    listeners: Arc<DashMap<PaymentEventKind, Vec<Arc<dyn EventListener>>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a listener for one kind of event.
    pub fn subscribe(&self, kind: PaymentEventKind, listener: Arc<dyn EventListener>) {
        debug!(listener = listener.name(), %kind, "Listener subscribed");
        self.listeners.entry(kind).or_default().push(listener);
    }

    /// Registers a listener for every kind of event.
    pub fn subscribe_all(&self, listener: Arc<dyn EventListener>) {
        for kind in PaymentEventKind::ALL {
            self.subscribe(kind, listener.clone());
        }
    }

    /// Number of listeners subscribed to `kind`.
    pub fn listener_count(&self, kind: PaymentEventKind) -> usize {
        self.listeners.get(&kind).map(|l| l.len()).unwrap_or(0)
    }

    /// Schedules every listener subscribed to the event's kind and returns
    /// how many were scheduled. Does not wait for any of them to finish.
    ///
    /// Must be called from within a tokio runtime.
    pub fn publish(&self, event: PaymentEvent) -> usize {
        let kind = event.kind();
        // Clone out of the map so no shard lock is held while spawning.
        let targets: Vec<Arc<dyn EventListener>> = self
            .listeners
            .get(&kind)
            .map(|l| l.value().clone())
            .unwrap_or_default();

        if targets.is_empty() {
            debug!(%kind, payment_id = %event.payment_id(), "No listeners for event");
            return 0;
        }

        let event = Arc::new(event);
        let mut handles = Vec::with_capacity(targets.len());

        for listener in targets {
            let event = event.clone();
            let name = listener.name().to_string();
            let handle = tokio::spawn(async move {
                if let Err(e) = listener.on_event(&event).await {
                    warn!(
                        listener = %listener.name(),
                        event_id = %event.event_id(),
                        payment_id = %event.payment_id(),
                        error = %e,
                        "Listener failed"
                    );
                }
            });
            handles.push((name, handle));
        }

        let scheduled = handles.len();

        // A panicking listener only aborts its own task; report it here.
        let event_id = event.event_id();
        tokio::spawn(async move {
            for (name, handle) in handles {
                if let Err(e) = handle.await {
                    if e.is_panic() {
                        error!(listener = %name, %event_id, "Listener panicked");
                    }
                }
            }
        });

        debug!(%kind, %event_id, listeners = scheduled, "Event published");
        scheduled
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::sync::mpsc;

    use payments_types::{Currency, Money, Payment, PaymentDraft, PaymentMethod};
    use rust_decimal_macros::dec;

    /// Forwards every event it sees into a channel.
    pub struct ChannelListener {
        name: String,
        tx: mpsc::UnboundedSender<PaymentEvent>,
    }

    impl ChannelListener {
        pub fn new(name: &str) -> (Arc<Self>, mpsc::UnboundedReceiver<PaymentEvent>) {
            let (tx, rx) = mpsc::unbounded_channel();
            (
                Arc::new(Self {
                    name: name.to_string(),
                    tx,
                }),
                rx,
            )
        }
    }

    #[async_trait]
    impl EventListener for ChannelListener {
        fn name(&self) -> &str {
            &self.name
        }

        async fn on_event(&self, event: &PaymentEvent) -> anyhow::Result<()> {
            self.tx.send(event.clone())?;
            Ok(())
        }
    }

    /// Always errors.
    pub struct FailingListener;

    #[async_trait]
    impl EventListener for FailingListener {
        fn name(&self) -> &str {
            "failing"
        }

        async fn on_event(&self, _event: &PaymentEvent) -> anyhow::Result<()> {
            anyhow::bail!("downstream unavailable")
        }
    }

    /// Always panics.
    pub struct PanickingListener;

    #[async_trait]
    impl EventListener for PanickingListener {
        fn name(&self) -> &str {
            "panicking"
        }

        async fn on_event(&self, _event: &PaymentEvent) -> anyhow::Result<()> {
            panic!("listener bug")
        }
    }

    pub async fn recv(rx: &mut mpsc::UnboundedReceiver<PaymentEvent>) -> PaymentEvent {
        tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .expect("listener was not invoked in time")
            .expect("channel closed")
    }

    fn failed_event() -> PaymentEvent {
        let mut payment = Payment::pending(PaymentDraft {
            amount: Money::new(dec!(10), Currency::EUR).unwrap(),
            method: PaymentMethod::DebitCard,
            provider: "Paypal".into(),
        });
        payment.fail("INSTRUMENT_DECLINED").unwrap();
        PaymentEvent::from_resolved(&payment).unwrap()
    }

    #[tokio::test]
    async fn test_publish_reaches_subscriber() {
        let bus = EventBus::new();
        let (listener, mut rx) = ChannelListener::new("probe");
        bus.subscribe(PaymentEventKind::PaymentFailed, listener);

        let event = failed_event();
        let scheduled = bus.publish(event.clone());

        assert_eq!(scheduled, 1);
        assert_eq!(recv(&mut rx).await, event);
    }

    #[tokio::test]
    async fn test_publish_only_matching_kind() {
        let bus = EventBus::new();
        let (listener, mut rx) = ChannelListener::new("approved-only");
        bus.subscribe(PaymentEventKind::PaymentApproved, listener);

        let scheduled = bus.publish(failed_event());

        assert_eq!(scheduled, 0);
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_failing_and_panicking_listeners_are_isolated() {
        let bus = EventBus::new();
        let (listener, mut rx) = ChannelListener::new("healthy");
        bus.subscribe_all(Arc::new(FailingListener));
        bus.subscribe_all(Arc::new(PanickingListener));
        bus.subscribe_all(listener);

        let event = failed_event();
        let scheduled = bus.publish(event.clone());

        assert_eq!(scheduled, 3);
        assert_eq!(recv(&mut rx).await, event);
    }

    #[tokio::test]
    async fn test_subscribe_all_counts() {
        let bus = EventBus::new();
        let (listener, _rx) = ChannelListener::new("all");
        bus.subscribe_all(listener);

        assert_eq!(bus.listener_count(PaymentEventKind::PaymentApproved), 1);
        assert_eq!(bus.listener_count(PaymentEventKind::PaymentFailed), 1);
    }
}
