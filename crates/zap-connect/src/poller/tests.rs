//! Poller tests against a scripted broker, on paused tokio time.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use zap_common::InstanceId;

use super::*;
use crate::broker::{BrokerError, Instance, PairingResponse, StatusResponse};
use crate::session::{FailureReason, SessionSnapshot, SessionStatus};

enum PairingScript {
    Artifact(&'static str),
    Missing,
    Fail,
}

enum StatusScript {
    Status(&'static str),
    Fail,
}

/// Broker that replays scripted answers; once a script runs out it hands
/// out an artifact and reports `disconnected`.
#[derive(Default)]
struct FakeBroker {
    pairing: Mutex<VecDeque<PairingScript>>,
    statuses: Mutex<VecDeque<StatusScript>>,
    status_delay: Duration,
    pairing_calls: AtomicUsize,
    status_calls: AtomicUsize,
}

impl FakeBroker {
    fn new() -> Self {
        Self::default()
    }

    fn with_pairing(self, script: Vec<PairingScript>) -> Self {
        *self.pairing.lock().unwrap() = script.into();
        self
    }

    fn with_statuses(self, script: Vec<StatusScript>) -> Self {
        *self.statuses.lock().unwrap() = script.into();
        self
    }

    fn with_status_delay(mut self, delay: Duration) -> Self {
        self.status_delay = delay;
        self
    }

    fn pairing_calls(&self) -> usize {
        self.pairing_calls.load(Ordering::SeqCst)
    }

    fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionBroker for FakeBroker {
    async fn request_pairing(&self, _instance: &InstanceId) -> Result<PairingResponse, BrokerError> {
        self.pairing_calls.fetch_add(1, Ordering::SeqCst);
        let next = self.pairing.lock().unwrap().pop_front();
        match next.unwrap_or(PairingScript::Artifact("payload")) {
            PairingScript::Artifact(a) => Ok(PairingResponse::with_artifact(a)),
            PairingScript::Missing => Ok(PairingResponse::default()),
            PairingScript::Fail => Err(BrokerError::Network("connection refused".into())),
        }
    }

    async fn fetch_status(&self, _instance: &InstanceId) -> Result<StatusResponse, BrokerError> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        let next = self.statuses.lock().unwrap().pop_front();
        if !self.status_delay.is_zero() {
            tokio::time::sleep(self.status_delay).await;
        }
        match next.unwrap_or(StatusScript::Status("disconnected")) {
            StatusScript::Status(s) => Ok(StatusResponse::new(s)),
            StatusScript::Fail => Err(BrokerError::Http {
                status: 500,
                body: "boom".into(),
            }),
        }
    }

    async fn list_instances(&self) -> Result<Vec<Instance>, BrokerError> {
        Ok(Vec::new())
    }
}

fn start(broker: &Arc<FakeBroker>, settings: PollerSettings) -> PollerHandle {
    let poller = ConnectionPoller::new(broker.clone(), settings);
    poller.start(InstanceId::from("inst_001"))
}

async fn next_event(handle: &mut PollerHandle) -> PollerEvent {
    tokio::time::timeout(Duration::from_secs(3600), handle.next_event())
        .await
        .expect("timed out waiting for poller event")
        .expect("poller event channel closed")
}

async fn wait_for_status(handle: &mut PollerHandle, status: SessionStatus) -> SessionSnapshot {
    loop {
        if let PollerEvent::StateChanged(snap) = next_event(handle).await {
            if snap.status == status {
                return snap;
            }
        }
    }
}

async fn wait_for_failure(handle: &mut PollerHandle) -> FailureReason {
    loop {
        if let PollerEvent::Failed { reason, .. } = next_event(handle).await {
            return reason;
        }
    }
}

#[tokio::test(start_paused = true)]
async fn artifact_starts_countdown_at_initial_value() {
    let broker = Arc::new(FakeBroker::new().with_pairing(vec![PairingScript::Artifact(
        "data:image/png;base64,iVBORw0KGgo=",
    )]));
    let mut handle = start(&broker, PollerSettings::default());

    let loading = wait_for_status(&mut handle, SessionStatus::Loading).await;
    assert_eq!(loading.countdown, 120);

    let ready = wait_for_status(&mut handle, SessionStatus::QrReady).await;
    assert_eq!(ready.countdown, 120);
    assert_eq!(ready.artifact.as_deref(), Some("data:image/png;base64,iVBORw0KGgo="));
    assert_eq!(ready.attempt, 1);

    handle.close().await;
}

#[tokio::test(start_paused = true)]
async fn missing_artifact_fails_without_timers() {
    let broker = Arc::new(FakeBroker::new().with_pairing(vec![PairingScript::Missing]));
    let mut handle = start(&broker, PollerSettings::default());

    assert_eq!(wait_for_failure(&mut handle).await, FailureReason::MissingArtifact);
    assert_eq!(handle.snapshot().status, SessionStatus::Error);

    tokio::time::sleep(Duration::from_secs(300)).await;

    let snap = handle.snapshot();
    assert_eq!(snap.status, SessionStatus::Error);
    assert_eq!(snap.countdown, 120);
    assert_eq!(broker.status_calls(), 0);

    handle.close().await;
}

#[tokio::test(start_paused = true)]
async fn pairing_transport_failure_is_error() {
    let broker = Arc::new(FakeBroker::new().with_pairing(vec![PairingScript::Fail]));
    let mut handle = start(&broker, PollerSettings::default());

    let reason = wait_for_failure(&mut handle).await;
    assert!(matches!(reason, FailureReason::Transport(ref e) if e.contains("connection refused")));
    assert_eq!(broker.pairing_calls(), 1);

    handle.close().await;
}

#[tokio::test(start_paused = true)]
async fn connected_before_expiry_stops_both_timers() {
    let broker = Arc::new(FakeBroker::new().with_statuses(vec![
        StatusScript::Status("disconnected"),
        StatusScript::Status("disconnected"),
        StatusScript::Status("connected"),
    ]));
    let mut handle = start(&broker, PollerSettings::default());

    let connected = wait_for_status(&mut handle, SessionStatus::Connected).await;
    assert!(connected.countdown > 100 && connected.countdown < 120);
    assert_eq!(broker.status_calls(), 3);

    loop {
        match next_event(&mut handle).await {
            PollerEvent::Completed { instance_id } => {
                assert_eq!(instance_id.as_str(), "inst_001");
                break;
            }
            PollerEvent::StateChanged(snap) => panic!("state changed after connect: {snap:?}"),
            PollerEvent::Failed { reason, .. } => panic!("failed after connect: {reason}"),
        }
    }

    tokio::time::sleep(Duration::from_secs(300)).await;
    assert_eq!(broker.status_calls(), 3);
    assert_eq!(handle.snapshot(), connected);
    assert!(handle.is_finished());
    assert!(handle.next_event().await.is_none());
}

#[tokio::test(start_paused = true)]
async fn success_delay_precedes_completion() {
    let broker = Arc::new(FakeBroker::new().with_statuses(vec![StatusScript::Status("connected")]));
    let mut handle = start(&broker, PollerSettings::default());

    wait_for_status(&mut handle, SessionStatus::Connected).await;
    let connected_at = tokio::time::Instant::now();

    loop {
        if let PollerEvent::Completed { .. } = next_event(&mut handle).await {
            break;
        }
    }
    assert!(connected_at.elapsed() >= Duration::from_millis(2000));
}

#[tokio::test(start_paused = true)]
async fn countdown_exhaustion_is_error_and_stops_polling() {
    let settings = PollerSettings {
        countdown_secs: 10,
        ..PollerSettings::default()
    };
    let broker = Arc::new(FakeBroker::new());
    let mut handle = start(&broker, settings);

    assert_eq!(wait_for_failure(&mut handle).await, FailureReason::Expired);
    let snap = handle.snapshot();
    assert_eq!(snap.status, SessionStatus::Error);
    assert_eq!(snap.countdown, 0);

    let calls = broker.status_calls();
    assert!(calls >= 3);
    tokio::time::sleep(Duration::from_secs(300)).await;
    assert_eq!(broker.status_calls(), calls);

    handle.close().await;
}

#[tokio::test(start_paused = true)]
async fn polling_ceiling_is_error_even_with_countdown_left() {
    let settings = PollerSettings {
        countdown_secs: 600,
        poll_ceiling: Duration::from_secs(30),
        ..PollerSettings::default()
    };
    let broker = Arc::new(FakeBroker::new());
    let mut handle = start(&broker, settings);

    assert_eq!(wait_for_failure(&mut handle).await, FailureReason::CeilingReached);
    let snap = handle.snapshot();
    assert_eq!(snap.status, SessionStatus::Error);
    assert!(snap.countdown >= 569 && snap.countdown <= 571);

    handle.close().await;
}

#[tokio::test(start_paused = true)]
async fn in_flight_connected_after_expiry_is_ignored() {
    let settings = PollerSettings {
        countdown_secs: 4,
        ..PollerSettings::default()
    };
    let broker = Arc::new(
        FakeBroker::new()
            .with_statuses(vec![StatusScript::Status("connected")])
            .with_status_delay(Duration::from_secs(5)),
    );
    let mut handle = start(&broker, settings);

    assert_eq!(wait_for_failure(&mut handle).await, FailureReason::Expired);
    assert_eq!(broker.status_calls(), 1);

    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(handle.snapshot().status, SessionStatus::Error);

    handle.close().await;
}

#[tokio::test(start_paused = true)]
async fn status_errors_do_not_stop_polling() {
    let broker = Arc::new(FakeBroker::new().with_statuses(vec![
        StatusScript::Fail,
        StatusScript::Fail,
        StatusScript::Status("connected"),
    ]));
    let mut handle = start(&broker, PollerSettings::default());

    wait_for_status(&mut handle, SessionStatus::Connected).await;
    assert_eq!(broker.status_calls(), 3);
}

#[tokio::test(start_paused = true)]
async fn connecting_is_reported_and_can_complete() {
    let broker = Arc::new(FakeBroker::new().with_statuses(vec![
        StatusScript::Status("connecting"),
        StatusScript::Status("connected"),
    ]));
    let mut handle = start(&broker, PollerSettings::default());

    let connecting = wait_for_status(&mut handle, SessionStatus::Connecting).await;
    assert!(connecting.countdown < 120);
    wait_for_status(&mut handle, SessionStatus::Connected).await;
}

#[tokio::test(start_paused = true)]
async fn retry_after_error_resets_countdown_and_requests_again() {
    let settings = PollerSettings {
        countdown_secs: 10,
        ..PollerSettings::default()
    };
    let broker = Arc::new(FakeBroker::new());
    let mut handle = start(&broker, settings);

    assert_eq!(wait_for_failure(&mut handle).await, FailureReason::Expired);
    assert_eq!(handle.snapshot().countdown, 0);

    handle.retry().await.unwrap();

    let loading = wait_for_status(&mut handle, SessionStatus::Loading).await;
    assert_eq!(loading.countdown, 10);
    assert!(loading.artifact.is_none());
    assert_eq!(loading.attempt, 2);

    let ready = wait_for_status(&mut handle, SessionStatus::QrReady).await;
    assert_eq!(ready.countdown, 10);
    assert_eq!(broker.pairing_calls(), 2);

    handle.close().await;
}

#[tokio::test(start_paused = true)]
async fn retry_ignored_while_awaiting_scan() {
    let broker = Arc::new(FakeBroker::new());
    let mut handle = start(&broker, PollerSettings::default());

    wait_for_status(&mut handle, SessionStatus::QrReady).await;
    handle.retry().await.unwrap();
    tokio::time::sleep(Duration::from_secs(5)).await;

    assert_eq!(broker.pairing_calls(), 1);
    assert_eq!(handle.snapshot().attempt, 1);

    handle.close().await;
}

#[tokio::test(start_paused = true)]
async fn close_while_qr_ready_stops_all_mutation() {
    let broker = Arc::new(FakeBroker::new());
    let mut handle = start(&broker, PollerSettings::default());

    wait_for_status(&mut handle, SessionStatus::QrReady).await;
    tokio::time::sleep(Duration::from_millis(7500)).await;

    let state_rx = handle.subscribe();
    let before = handle.snapshot();
    assert_eq!(before.status, SessionStatus::QrReady);
    assert!(before.countdown < 120);
    let calls = broker.status_calls();

    handle.close().await;
    tokio::time::sleep(Duration::from_secs(300)).await;

    assert_eq!(*state_rx.borrow(), before);
    assert_eq!(broker.status_calls(), calls);
}

#[tokio::test(start_paused = true)]
async fn dropping_handle_stops_polling() {
    let broker = Arc::new(FakeBroker::new());
    let mut handle = start(&broker, PollerSettings::default());

    wait_for_status(&mut handle, SessionStatus::QrReady).await;
    tokio::time::sleep(Duration::from_millis(6500)).await;
    drop(handle);

    tokio::time::sleep(Duration::from_millis(10)).await;
    let calls = broker.status_calls();
    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(broker.status_calls(), calls);
}

#[tokio::test(start_paused = true)]
async fn retry_after_task_end_reports_stopped() {
    let broker = Arc::new(FakeBroker::new().with_statuses(vec![StatusScript::Status("connected")]));
    let mut handle = start(&broker, PollerSettings::default());

    loop {
        if let PollerEvent::Completed { .. } = next_event(&mut handle).await {
            break;
        }
    }
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(matches!(handle.retry().await, Err(PollerError::Stopped)));
}

#[test]
fn settings_from_pairing_config() {
    let config = zap_config::schema::PairingConfig {
        countdown_secs: 90,
        poll_interval_secs: 5,
        poll_ceiling_secs: 60,
        success_delay_ms: 500,
    };
    let settings = PollerSettings::from(&config);
    assert_eq!(settings.countdown_secs, 90);
    assert_eq!(settings.poll_interval, Duration::from_secs(5));
    assert_eq!(settings.poll_ceiling, Duration::from_secs(60));
    assert_eq!(settings.success_delay, Duration::from_millis(500));
    assert_eq!(settings.tick, Duration::from_secs(1));
}

#[tokio::test(start_paused = true)]
async fn zero_periods_are_clamped_instead_of_panicking() {
    let broker = Arc::new(FakeBroker::new());
    let settings = PollerSettings {
        countdown_secs: 3,
        tick: Duration::ZERO,
        poll_interval: Duration::ZERO,
        poll_ceiling: Duration::from_secs(3600),
        success_delay: Duration::ZERO,
    };
    let poller = ConnectionPoller::new(broker.clone(), settings);
    assert_eq!(poller.settings().tick, Duration::from_millis(1));
    assert_eq!(poller.settings().poll_interval, Duration::from_millis(1));

    let mut handle = poller.start(InstanceId::from("inst_001"));
    loop {
        if let PollerEvent::Failed { reason, .. } = next_event(&mut handle).await {
            assert_eq!(reason, FailureReason::Expired);
            break;
        }
    }
    assert!(broker.status_calls() >= 1);
    handle.close().await;
}
