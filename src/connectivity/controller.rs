//! Per-domain connectivity mode controller.
//!
//! # Responsibilities
//! - Own the real/mock decision for one data domain
//! - Apply probe results to the failure counter and availability flag
//! - Re-derive the mode on ticks and policy reloads
//! - Notify observers of actual mode flips
//!
//! # Design Decisions
//! - Probes are serialized by an async gate held from request to state
//!   update; a success and a failure are never applied out of order
//! - State sits behind a short synchronous lock that is never held across
//!   an await, so snapshots do not wait on network I/O
//! - Probe failures are absorbed into state, never returned to callers
//! - Policy lives in an `ArcSwap` so config reloads need no lock

use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::connectivity::clock::{Clock, SystemClock};
use crate::connectivity::mode::{
    ConnectionStatus, ConnectivityState, Mode, ModeChange, TransitionReason,
};
use crate::connectivity::policy::{reason_for, ModePolicy};
use crate::connectivity::probe::HealthProbe;
use crate::observability::metrics;

const EVENT_CAPACITY: usize = 16;

/// What started a probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeTrigger {
    /// Periodic tick.
    Scheduled,
    /// User-initiated retry.
    Manual,
}

/// Result of one probe after it was applied to state.
#[derive(Debug, Clone, Serialize)]
pub struct ProbeOutcome {
    pub probe_id: Uuid,
    pub trigger: ProbeTrigger,
    pub healthy: bool,
    pub error: Option<String>,
    pub mode: Mode,
    pub consecutive_failures: u32,
    pub transition: Option<ModeChange>,
}

/// Decides, for one data domain, whether data comes from the backend or
/// from the local mock dataset.
pub struct ConnectivityModeController {
    domain: String,
    probe: Arc<dyn HealthProbe>,
    clock: Arc<dyn Clock>,
    policy: ArcSwap<ModePolicy>,
    state: Mutex<ConnectivityState>,
    probe_gate: tokio::sync::Mutex<()>,
    events: broadcast::Sender<ModeChange>,
}

impl ConnectivityModeController {
    /// Create a controller in the optimistic initial state (real mode).
    pub fn new(domain: impl Into<String>, probe: Arc<dyn HealthProbe>, policy: ModePolicy) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let controller = Self {
            domain: domain.into(),
            probe,
            clock: Arc::new(SystemClock),
            policy: ArcSwap::from_pointee(policy),
            state: Mutex::new(ConnectivityState::default()),
            probe_gate: tokio::sync::Mutex::new(()),
            events,
        };
        metrics::record_mode(&controller.domain, Mode::Real);
        controller
    }

    /// Replace the wall-clock source.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn mode(&self) -> Mode {
        self.lock_state().mode
    }

    pub fn policy(&self) -> ModePolicy {
        **self.policy.load()
    }

    /// Subscribe to mode flips.
    pub fn subscribe(&self) -> broadcast::Receiver<ModeChange> {
        self.events.subscribe()
    }

    /// Whether the current local time falls inside the operational window.
    pub fn within_operational_hours(&self) -> bool {
        self.policy.load().window.contains(self.clock.now().time())
    }

    /// Scheduled health probe. Always completes; failures land in state.
    pub async fn probe(&self) -> ProbeOutcome {
        self.run_probe(ProbeTrigger::Scheduled).await
    }

    /// User-triggered probe with the same semantics as [`Self::probe`].
    pub async fn retry_connection(&self) -> ProbeOutcome {
        self.run_probe(ProbeTrigger::Manual).await
    }

    /// Re-derive the mode from known facts and the clock, without probing.
    pub fn evaluate_mode(&self) -> Option<ModeChange> {
        let within_hours = self.within_operational_hours();
        let policy = self.policy.load();
        let now = self.clock.now_utc();

        let change = {
            let mut state = self.lock_state();
            let next = policy.decide(
                state.mode,
                state.backend_available,
                state.consecutive_failures,
                within_hours,
            );
            self.transition(&mut state, next, reason_for(next, within_hours), now)
        };

        if let Some(change) = &change {
            self.publish(change);
        }
        change
    }

    /// Unconditionally set the mode, bypassing the policy until the next
    /// evaluation. Debug and test use only.
    pub fn force_mode(&self, mode: Mode) -> Option<ModeChange> {
        let now = self.clock.now_utc();
        let change = {
            let mut state = self.lock_state();
            self.transition(&mut state, mode, TransitionReason::Forced, now)
        };

        tracing::warn!(domain = %self.domain, mode = %mode, "Mode forced");
        if let Some(change) = &change {
            self.publish(change);
        }
        change
    }

    /// Swap in a new threshold/window and re-evaluate.
    pub fn update_policy(&self, policy: ModePolicy) -> Option<ModeChange> {
        let previous = self.policy.swap(Arc::new(policy));
        if *previous != policy {
            tracing::info!(
                domain = %self.domain,
                failure_threshold = policy.failure_threshold,
                window = %policy.window,
                "Connectivity policy updated"
            );
        }
        self.evaluate_mode()
    }

    /// Snapshot for display and debugging.
    pub fn connection_status(&self) -> ConnectionStatus {
        let within_hours = self.within_operational_hours();
        let state = self.lock_state();
        ConnectionStatus {
            domain: self.domain.clone(),
            mode: state.mode,
            backend_available: state.backend_available,
            consecutive_failures: state.consecutive_failures,
            backend_url: self.probe.backend_url().to_string(),
            last_checked_at: state.last_checked_at,
            within_operational_hours: within_hours,
        }
    }

    async fn run_probe(&self, trigger: ProbeTrigger) -> ProbeOutcome {
        let _gate = self.probe_gate.lock().await;

        let probe_id = Uuid::new_v4();
        let started = Instant::now();
        let result = self.probe.check().await;
        metrics::record_probe(&self.domain, result.as_ref().err().map(|e| e.kind()), started);

        let within_hours = self.within_operational_hours();
        let policy = self.policy.load();
        let now = self.clock.now_utc();

        let (change, mode, failures) = {
            let mut state = self.lock_state();
            state.last_checked_at = Some(now);
            match &result {
                Ok(()) => {
                    state.backend_available = true;
                    state.consecutive_failures = 0;
                }
                Err(_) => {
                    state.backend_available = false;
                    state.consecutive_failures = state.consecutive_failures.saturating_add(1);
                }
            }
            let next = policy.decide(
                state.mode,
                state.backend_available,
                state.consecutive_failures,
                within_hours,
            );
            let change = self.transition(&mut state, next, reason_for(next, within_hours), now);
            (change, state.mode, state.consecutive_failures)
        };
        metrics::record_failures(&self.domain, failures);

        match &result {
            Ok(()) => tracing::debug!(
                domain = %self.domain,
                probe_id = %probe_id,
                trigger = ?trigger,
                mode = %mode,
                "Health probe succeeded"
            ),
            Err(e) => tracing::warn!(
                domain = %self.domain,
                probe_id = %probe_id,
                trigger = ?trigger,
                error = %e,
                consecutive_failures = failures,
                mode = %mode,
                "Health probe failed"
            ),
        }

        if let Some(change) = &change {
            self.publish(change);
        }

        ProbeOutcome {
            probe_id,
            trigger,
            healthy: result.is_ok(),
            error: result.err().map(|e| e.to_string()),
            mode,
            consecutive_failures: failures,
            transition: change,
        }
    }

    fn transition(
        &self,
        state: &mut ConnectivityState,
        next: Mode,
        reason: TransitionReason,
        at: DateTime<Utc>,
    ) -> Option<ModeChange> {
        if state.mode == next {
            return None;
        }
        let change = ModeChange {
            domain: self.domain.clone(),
            from: state.mode,
            to: next,
            reason,
            at,
        };
        state.mode = next;
        Some(change)
    }

    fn publish(&self, change: &ModeChange) {
        tracing::info!(
            domain = %change.domain,
            from = %change.from,
            to = %change.to,
            reason = ?change.reason,
            "{}",
            change.message()
        );
        metrics::record_mode(&change.domain, change.to);
        metrics::record_transition(&change.domain, change.to);
        // No subscribers is fine.
        let _ = self.events.send(change.clone());
    }

    fn lock_state(&self) -> MutexGuard<'_, ConnectivityState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for ConnectivityModeController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectivityModeController")
            .field("domain", &self.domain)
            .field("backend_url", &self.probe.backend_url())
            .field("state", &*self.lock_state())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connectivity::clock::ManualClock;
    use crate::connectivity::hours::OperationalWindow;
    use crate::connectivity::probe::ProbeError;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Probe that replays a script, then keeps returning the last answer.
    struct ScriptedProbe {
        script: std::sync::Mutex<VecDeque<Result<(), ProbeError>>>,
        fallback: Result<(), ProbeError>,
    }

    impl ScriptedProbe {
        fn new(script: Vec<Result<(), ProbeError>>) -> Arc<Self> {
            let fallback = script.last().cloned().unwrap_or(Ok(()));
            Arc::new(Self {
                script: std::sync::Mutex::new(script.into()),
                fallback,
            })
        }
    }

    #[async_trait]
    impl HealthProbe for ScriptedProbe {
        async fn check(&self) -> Result<(), ProbeError> {
            let next = self.script.lock().unwrap().pop_front();
            next.unwrap_or_else(|| self.fallback.clone())
        }

        fn backend_url(&self) -> &str {
            "http://backend.test"
        }
    }

    fn timeout() -> Result<(), ProbeError> {
        Err(ProbeError::Timeout(Duration::from_secs(5)))
    }

    fn controller_at(
        hour: u32,
        script: Vec<Result<(), ProbeError>>,
    ) -> (ConnectivityModeController, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::at(hour, 0));
        let controller =
            ConnectivityModeController::new("proposals", ScriptedProbe::new(script), ModePolicy::default())
                .with_clock(clock.clone());
        (controller, clock)
    }

    #[tokio::test]
    async fn test_three_timeouts_switch_to_mock() {
        let (controller, _) = controller_at(10, vec![timeout(), timeout(), timeout()]);
        let mut events = controller.subscribe();

        let first = controller.probe().await;
        assert_eq!(first.mode, Mode::Real);
        assert_eq!(first.consecutive_failures, 1);
        assert!(first.transition.is_none());

        let second = controller.probe().await;
        assert_eq!(second.mode, Mode::Real);
        assert_eq!(second.consecutive_failures, 2);

        let third = controller.probe().await;
        assert_eq!(third.mode, Mode::Mock);
        assert_eq!(third.consecutive_failures, 3);

        let change = events.try_recv().unwrap();
        assert_eq!(change.from, Mode::Real);
        assert_eq!(change.to, Mode::Mock);
        assert_eq!(change.reason, TransitionReason::BackendUnavailable);
        assert!(events.try_recv().is_err());

        let status = controller.connection_status();
        assert_eq!(status.consecutive_failures, 3);
        assert!(!status.backend_available);
        assert!(status.last_checked_at.is_some());
    }

    #[tokio::test]
    async fn test_failures_keep_counting_in_mock_mode() {
        let (controller, _) = controller_at(10, vec![timeout()]);
        let mut events = controller.subscribe();
        for expected in 1..=6 {
            let outcome = controller.probe().await;
            assert_eq!(outcome.consecutive_failures, expected);
        }
        assert_eq!(controller.mode(), Mode::Mock);
        // Only the first crossing notifies.
        assert!(events.try_recv().is_ok());
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_success_resets_counter() {
        let (controller, _) = controller_at(10, vec![timeout(), Ok(())]);
        let mut events = controller.subscribe();

        controller.probe().await;
        assert_eq!(controller.connection_status().consecutive_failures, 1);

        let outcome = controller.probe().await;
        assert!(outcome.healthy);
        assert_eq!(outcome.consecutive_failures, 0);
        assert_eq!(outcome.mode, Mode::Real);
        assert!(events.try_recv().is_err(), "no flip happened");
    }

    #[tokio::test]
    async fn test_counter_tracks_failures_since_last_success() {
        let script = vec![
            timeout(),
            Err(ProbeError::Status(503)),
            Ok(()),
            Err(ProbeError::Connect("refused".into())),
            Ok(()),
            timeout(),
            timeout(),
        ];
        let (controller, _) = controller_at(12, script);
        let expected = [1, 2, 0, 1, 0, 1, 2];
        for want in expected {
            assert_eq!(controller.probe().await.consecutive_failures, want);
        }
    }

    #[tokio::test]
    async fn test_recovery_after_success() {
        let (controller, _) = controller_at(10, vec![timeout(), timeout(), timeout(), Ok(())]);
        let mut events = controller.subscribe();
        for _ in 0..3 {
            controller.probe().await;
        }
        assert_eq!(controller.mode(), Mode::Mock);

        let outcome = controller.retry_connection().await;
        assert_eq!(outcome.trigger, ProbeTrigger::Manual);
        assert_eq!(outcome.mode, Mode::Real);

        let _to_mock = events.try_recv().unwrap();
        let to_real = events.try_recv().unwrap();
        assert_eq!(to_real.to, Mode::Real);
        assert_eq!(to_real.message(), "Backend connected: switched to real mode");
    }

    #[tokio::test]
    async fn test_outside_hours_healthy_backend_is_mock() {
        let (controller, _) = controller_at(22, vec![Ok(())]);
        let outcome = controller.probe().await;
        assert!(outcome.healthy);
        assert_eq!(outcome.mode, Mode::Mock);
        let change = outcome.transition.unwrap();
        assert_eq!(change.reason, TransitionReason::OutsideOperationalHours);
        assert!(controller.connection_status().backend_available);
    }

    #[tokio::test]
    async fn test_inside_hours_after_success_is_real() {
        let (controller, _) = controller_at(6, vec![Ok(())]);
        controller.force_mode(Mode::Mock);
        let outcome = controller.probe().await;
        assert_eq!(outcome.mode, Mode::Real);
    }

    #[tokio::test]
    async fn test_manual_retry_outside_hours_stays_mock() {
        let (controller, _) = controller_at(23, vec![Ok(())]);
        controller.evaluate_mode();
        assert_eq!(controller.mode(), Mode::Mock);

        let outcome = controller.retry_connection().await;
        assert!(outcome.healthy);
        assert_eq!(outcome.mode, Mode::Mock);
        assert!(outcome.transition.is_none());
        assert!(controller.connection_status().backend_available);
    }

    #[tokio::test]
    async fn test_evaluate_follows_clock() {
        let (controller, clock) = controller_at(20, vec![Ok(())]);
        let mut events = controller.subscribe();
        controller.probe().await;
        assert_eq!(controller.mode(), Mode::Real);

        clock.set(21, 30, 0);
        let change = controller.evaluate_mode().unwrap();
        assert_eq!(change.to, Mode::Mock);
        assert_eq!(change.reason, TransitionReason::OutsideOperationalHours);

        // Hours resume with the backend still known-available.
        clock.set(5, 0, 0);
        let change = controller.evaluate_mode().unwrap();
        assert_eq!(change.to, Mode::Real);

        assert_eq!(events.try_recv().unwrap().to, Mode::Mock);
        assert_eq!(events.try_recv().unwrap().to, Mode::Real);
    }

    #[tokio::test]
    async fn test_evaluate_does_not_recover_unknown_backend() {
        let (controller, clock) = controller_at(3, vec![timeout()]);
        controller.evaluate_mode();
        assert_eq!(controller.mode(), Mode::Mock);

        clock.set(6, 0, 0);
        assert!(controller.evaluate_mode().is_none());
        assert_eq!(controller.mode(), Mode::Mock);
    }

    #[tokio::test]
    async fn test_evaluate_is_idempotent() {
        let (controller, _) = controller_at(22, vec![Ok(())]);
        let mut events = controller.subscribe();
        assert!(controller.evaluate_mode().is_some());
        let before = controller.connection_status();
        assert!(controller.evaluate_mode().is_none());
        assert_eq!(controller.connection_status(), before);
        assert!(events.try_recv().is_ok());
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_force_mode_notifies_only_on_flip() {
        let (controller, _) = controller_at(10, vec![Ok(())]);
        let mut events = controller.subscribe();
        assert!(controller.force_mode(Mode::Real).is_none());
        let change = controller.force_mode(Mode::Mock).unwrap();
        assert_eq!(change.reason, TransitionReason::Forced);
        assert_eq!(change.message(), "Mode forced to mock");
        assert_eq!(events.try_recv().unwrap().to, Mode::Mock);
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_policy_reload_applies_immediately() {
        let (controller, _) = controller_at(20, vec![timeout()]);
        controller.probe().await;
        controller.probe().await;
        assert_eq!(controller.mode(), Mode::Real);

        let narrowed = ModePolicy {
            failure_threshold: 2,
            window: OperationalWindow::default(),
        };
        let change = controller.update_policy(narrowed).unwrap();
        assert_eq!(change.reason, TransitionReason::BackendUnavailable);
        assert_eq!(controller.policy().failure_threshold, 2);
    }

    struct SlowProbe {
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    #[async_trait]
    impl HealthProbe for SlowProbe {
        async fn check(&self) -> Result<(), ProbeError> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(30)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Err(ProbeError::Status(502))
        }

        fn backend_url(&self) -> &str {
            "http://slow.test"
        }
    }

    #[tokio::test]
    async fn test_overlapping_probes_are_serialized() {
        let probe = Arc::new(SlowProbe {
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        });
        let controller = Arc::new(
            ConnectivityModeController::new("ai_learning", probe.clone(), ModePolicy::default())
                .with_clock(Arc::new(ManualClock::at(9, 0))),
        );

        let a = tokio::spawn({
            let c = controller.clone();
            async move { c.probe().await }
        });
        let b = tokio::spawn({
            let c = controller.clone();
            async move { c.retry_connection().await }
        });
        let (a, b) = (a.await.unwrap(), b.await.unwrap());

        assert_eq!(probe.max_in_flight.load(Ordering::SeqCst), 1);
        let mut counts = [a.consecutive_failures, b.consecutive_failures];
        counts.sort();
        assert_eq!(counts, [1, 2]);
        assert_eq!(controller.connection_status().consecutive_failures, 2);
    }
}
