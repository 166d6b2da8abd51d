//! Periodic probing.
//!
//! # Responsibilities
//! - Probe the backend on a fixed interval
//! - Re-evaluate the mode after each probe so hour boundaries are caught
//!   even while the backend state is unchanged

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::{self, MissedTickBehavior};

use crate::connectivity::controller::ConnectivityModeController;

/// Drives one controller until shutdown.
pub struct ModePoller {
    controller: Arc<ConnectivityModeController>,
    interval: Duration,
}

impl ModePoller {
    pub fn new(controller: Arc<ConnectivityModeController>, interval: Duration) -> Self {
        Self {
            controller,
            interval,
        }
    }

    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(
            domain = %self.controller.domain(),
            interval_ms = self.interval.as_millis() as u64,
            "Mode poller starting"
        );

        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.controller.probe().await;
                    self.controller.evaluate_mode();
                }
                _ = shutdown.recv() => {
                    tracing::info!(
                        domain = %self.controller.domain(),
                        "Mode poller received shutdown signal, exiting loop"
                    );
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connectivity::clock::ManualClock;
    use crate::connectivity::mode::Mode;
    use crate::connectivity::policy::ModePolicy;
    use crate::connectivity::probe::{HealthProbe, ProbeError};
    use crate::lifecycle::Shutdown;
    use async_trait::async_trait;

    struct DownProbe;

    #[async_trait]
    impl HealthProbe for DownProbe {
        async fn check(&self) -> Result<(), ProbeError> {
            Err(ProbeError::Connect("connection refused".into()))
        }

        fn backend_url(&self) -> &str {
            "http://down.test"
        }
    }

    #[tokio::test]
    async fn test_poller_drives_fallback_and_stops() {
        let controller = Arc::new(
            ConnectivityModeController::new("proposals", Arc::new(DownProbe), ModePolicy::default())
                .with_clock(Arc::new(ManualClock::at(12, 0))),
        );
        let shutdown = Shutdown::new();
        let poller = ModePoller::new(controller.clone(), Duration::from_millis(10));
        let handle = tokio::spawn(poller.run(shutdown.subscribe()));

        let mut events = controller.subscribe();
        let change = time::timeout(Duration::from_secs(2), events.recv())
            .await
            .expect("poller should trip the threshold")
            .unwrap();
        assert_eq!(change.to, Mode::Mock);
        assert!(controller.connection_status().consecutive_failures >= 3);

        shutdown.trigger();
        time::timeout(Duration::from_secs(2), handle)
            .await
            .expect("poller should exit on shutdown")
            .unwrap();
    }
}
