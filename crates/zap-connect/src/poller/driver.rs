//! The poller task: one event loop per session.

use std::sync::Arc;

use futures_util::future::BoxFuture;
use tokio::sync::{mpsc, watch};
use tokio::time::{interval_at, sleep, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};
use zap_common::new_correlation_id;

use crate::broker::{BrokerError, SessionBroker, StatusResponse};
use crate::session::{FailureReason, PairingSession, SessionSnapshot, Transition};

use super::handle::{PollerCommand, PollerEvent};
use super::PollerSettings;

type StatusFuture = BoxFuture<'static, Result<StatusResponse, BrokerError>>;

enum AttemptEnd {
    Connected,
    Failed,
    Closed,
}

pub(super) struct PollerTask {
    pub(super) broker: Arc<dyn SessionBroker>,
    pub(super) settings: PollerSettings,
    pub(super) session: PairingSession,
    pub(super) state_tx: watch::Sender<SessionSnapshot>,
    pub(super) event_tx: mpsc::UnboundedSender<PollerEvent>,
    pub(super) commands: mpsc::Receiver<PollerCommand>,
    pub(super) shutdown: CancellationToken,
}

impl PollerTask {
    pub(super) async fn run(mut self) {
        loop {
            match self.run_attempt().await {
                AttemptEnd::Closed => break,
                AttemptEnd::Connected => {
                    self.finish_connected().await;
                    break;
                }
                AttemptEnd::Failed => {
                    if !self.wait_for_retry().await {
                        break;
                    }
                }
            }
        }
        debug!(instance = %self.session.instance_id(), "poller task exiting");
    }

    /// Request a pairing artifact, then wait for `connected` under the
    /// countdown and the polling ceiling.
    async fn run_attempt(&mut self) -> AttemptEnd {
        let attempt = self.shutdown.child_token();
        let _stop_timers = attempt.clone().drop_guard();
        let tag = new_correlation_id();

        self.session.begin_attempt();
        self.publish();

        let instance = self.session.instance_id().clone();
        info!(instance = %instance, attempt = %tag, "requesting pairing artifact");

        let broker = Arc::clone(&self.broker);
        let pairing = broker.request_pairing(&instance);
        tokio::pin!(pairing);

        let result = loop {
            tokio::select! {
                biased;
                _ = attempt.cancelled() => return AttemptEnd::Closed,
                Some(_) = self.commands.recv() => {
                    debug!(instance = %instance, "retry ignored while loading");
                }
                result = &mut pairing => break result,
            }
        };

        if let Transition::Failed(reason) = self.session.apply_pairing(result) {
            self.publish();
            self.report_failure(reason, &tag);
            return AttemptEnd::Failed;
        }
        self.publish();
        info!(instance = %instance, attempt = %tag, "pairing artifact ready");

        self.await_connection(&attempt, &tag).await
    }

    async fn await_connection(&mut self, attempt: &CancellationToken, tag: &str) -> AttemptEnd {
        let start = Instant::now();
        let mut countdown = interval_at(start + self.settings.tick, self.settings.tick);
        countdown.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut polling = interval_at(
            start + self.settings.poll_interval,
            self.settings.poll_interval,
        );
        polling.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let ceiling = sleep(self.settings.poll_ceiling);
        tokio::pin!(ceiling);

        let mut in_flight: Option<StatusFuture> = None;

        loop {
            let transition = tokio::select! {
                biased;
                _ = attempt.cancelled() => return AttemptEnd::Closed,
                Some(_) = self.commands.recv() => {
                    debug!(instance = %self.session.instance_id(), "retry ignored while awaiting scan");
                    continue;
                }
                result = next_status(&mut in_flight) => {
                    in_flight = None;
                    match result {
                        Ok(response) => self.session.apply_status(&response.remote_status()),
                        Err(e) => {
                            warn!(instance = %self.session.instance_id(), error = %e, "status poll failed");
                            Transition::Ignored
                        }
                    }
                }
                _ = countdown.tick() => self.session.tick(),
                _ = polling.tick() => {
                    if in_flight.is_none() {
                        in_flight = Some(self.status_request());
                    } else {
                        trace!(instance = %self.session.instance_id(), "status request still in flight");
                    }
                    Transition::Ignored
                }
                _ = &mut ceiling => self.session.ceiling_reached(),
            };

            if transition.changed() {
                self.publish();
            }

            match transition {
                Transition::Connected => {
                    attempt.cancel();
                    info!(instance = %self.session.instance_id(), attempt = %tag, "instance connected");
                    return AttemptEnd::Connected;
                }
                Transition::Failed(reason) => {
                    attempt.cancel();
                    self.report_failure(reason, tag);
                    return AttemptEnd::Failed;
                }
                Transition::Updated | Transition::Ignored => {}
            }
        }
    }

    /// Hold `connected` for the success delay, then signal completion.
    async fn finish_connected(&mut self) {
        tokio::select! {
            biased;
            _ = self.shutdown.cancelled() => return,
            _ = sleep(self.settings.success_delay) => {}
        }
        let _ = self.event_tx.send(PollerEvent::Completed {
            instance_id: self.session.instance_id().clone(),
        });
    }

    /// Block in `error` until a retry arrives. `false` means stop.
    async fn wait_for_retry(&mut self) -> bool {
        tokio::select! {
            biased;
            _ = self.shutdown.cancelled() => false,
            command = self.commands.recv() => match command {
                Some(PollerCommand::Retry) => {
                    info!(instance = %self.session.instance_id(), "retrying pairing");
                    true
                }
                None => false,
            },
        }
    }

    fn status_request(&self) -> StatusFuture {
        let broker = Arc::clone(&self.broker);
        let instance = self.session.instance_id().clone();
        Box::pin(async move { broker.fetch_status(&instance).await })
    }

    fn publish(&self) {
        let snapshot = self.session.snapshot();
        self.state_tx.send_replace(snapshot.clone());
        let _ = self.event_tx.send(PollerEvent::StateChanged(snapshot));
    }

    fn report_failure(&self, reason: FailureReason, tag: &str) {
        warn!(
            instance = %self.session.instance_id(),
            attempt = %tag,
            reason = %reason,
            "pairing attempt failed"
        );
        let _ = self.event_tx.send(PollerEvent::Failed {
            instance_id: self.session.instance_id().clone(),
            reason,
        });
    }
}

/// Resolve the in-flight status request, or never when there is none.
async fn next_status(slot: &mut Option<StatusFuture>) -> Result<StatusResponse, BrokerError> {
    match slot {
        Some(request) => request.await,
        None => std::future::pending().await,
    }
}
