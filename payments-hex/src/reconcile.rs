//! Background sweep for dangling PENDING payments.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{MissedTickBehavior, interval};
use tracing::{error, info, instrument};

use payments_types::PaymentRepository;

use crate::PaymentService;

/// Shortest pause between sweeps.
pub const MIN_SWEEP_INTERVAL: Duration = Duration::from_secs(1);

/// Periodically expires payments stuck in PENDING past a grace period.
pub struct ReconcileWorker<R: PaymentRepository> {
    service: Arc<PaymentService<R>>,
    interval: Duration,
    grace: Duration,
}

impl<R: PaymentRepository> ReconcileWorker<R> {
    /// `interval` is raised to [`MIN_SWEEP_INTERVAL`] when shorter.
    pub fn new(service: Arc<PaymentService<R>>, interval: Duration, grace: Duration) -> Self {
        Self {
            service,
            interval: interval.max(MIN_SWEEP_INTERVAL),
            grace,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Runs one sweep and returns how many payments it resolved.
    pub async fn tick(&self) -> usize {
        match self.service.reconcile_stale_pending(self.grace).await {
            Ok(0) => 0,
            Ok(n) => {
                info!("Expired {} dangling PENDING payments", n);
                n
            }
            Err(e) => {
                error!("Reconciliation sweep failed: {}", e);
                0
            }
        }
    }

    /// Sweeps forever; spawn it and drop the handle on shutdown.
    #[instrument(skip_all)]
    pub async fn run(self) {
        info!(interval = ?self.interval, grace = ?self.grace, "Starting reconcile worker");
        let mut ticker = interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            self.tick().await;
        }
    }
}
