//! Caller-side handle of a running poller.

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use zap_common::InstanceId;

use crate::session::{FailureReason, SessionSnapshot};

/// Commands sent from the handle to the poller task.
#[derive(Debug)]
pub(super) enum PollerCommand {
    /// Start a fresh attempt. Only honoured in `error`.
    Retry,
}

/// Events emitted by the poller task.
#[derive(Debug, Clone)]
pub enum PollerEvent {
    /// The session changed; carries the new snapshot.
    StateChanged(SessionSnapshot),
    /// The attempt ended in `error`. A retry may follow.
    Failed {
        instance_id: InstanceId,
        reason: FailureReason,
    },
    /// `connected` was shown for the success delay. The task has ended.
    Completed { instance_id: InstanceId },
}

#[derive(Debug, thiserror::Error)]
pub enum PollerError {
    #[error("poller task has stopped")]
    Stopped,
}

/// Handle to a running pairing session.
///
/// Dropping the handle cancels the session.
pub struct PollerHandle {
    instance_id: InstanceId,
    commands: mpsc::Sender<PollerCommand>,
    state_rx: watch::Receiver<SessionSnapshot>,
    events: mpsc::UnboundedReceiver<PollerEvent>,
    shutdown: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl PollerHandle {
    pub(super) fn new(
        instance_id: InstanceId,
        commands: mpsc::Sender<PollerCommand>,
        state_rx: watch::Receiver<SessionSnapshot>,
        events: mpsc::UnboundedReceiver<PollerEvent>,
        shutdown: CancellationToken,
        task: JoinHandle<()>,
    ) -> Self {
        Self {
            instance_id,
            commands,
            state_rx,
            events,
            shutdown,
            task: Some(task),
        }
    }

    pub fn instance_id(&self) -> &InstanceId {
        &self.instance_id
    }

    /// Latest published snapshot.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.state_rx.borrow().clone()
    }

    /// A receiver that observes every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.state_rx.clone()
    }

    /// Next event, or `None` once the task has ended and all events are drained.
    pub async fn next_event(&mut self) -> Option<PollerEvent> {
        self.events.recv().await
    }

    /// Ask for a fresh attempt. Ignored unless the session is in `error`.
    pub async fn retry(&self) -> Result<(), PollerError> {
        self.commands
            .send(PollerCommand::Retry)
            .await
            .map_err(|_| PollerError::Stopped)
    }

    pub fn is_finished(&self) -> bool {
        self.task.as_ref().map_or(true, |t| t.is_finished())
    }

    /// Cancel both timers and wait for the task to exit.
    ///
    /// The token is cancelled before awaiting, so no snapshot is published
    /// after this returns.
    pub async fn close(mut self) {
        self.shutdown.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::warn!(instance = %self.instance_id, error = %e, "poller task ended abnormally");
            }
        }
        tracing::debug!(instance = %self.instance_id, "poller closed");
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
