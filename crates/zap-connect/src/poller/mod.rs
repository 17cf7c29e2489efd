//! Connection poller: pairing artifact + status polling under a deadline.
//!
//! One spawned task owns the `PairingSession` and multiplexes every timer
//! with `tokio::select!`, so all state changes happen in one place. Each
//! attempt gets a child `CancellationToken`; the countdown, the polling
//! interval, the ceiling and any in-flight status request all stop when it
//! is cancelled (success, expiry, ceiling, close or handle drop).

mod driver;
mod handle;

#[cfg(test)]
mod tests;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use zap_common::InstanceId;
use zap_config::schema::PairingConfig;

use crate::broker::SessionBroker;
use crate::session::PairingSession;

use driver::PollerTask;
pub use handle::{PollerError, PollerEvent, PollerHandle};

const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Timing of one pairing attempt.
#[derive(Debug, Clone)]
pub struct PollerSettings {
    /// Initial countdown value in ticks.
    pub countdown_secs: u32,
    /// Length of one countdown tick.
    pub tick: Duration,
    pub poll_interval: Duration,
    pub poll_ceiling: Duration,
    /// Delay between reaching `connected` and emitting `Completed`.
    pub success_delay: Duration,
}

impl Default for PollerSettings {
    fn default() -> Self {
        Self {
            countdown_secs: 120,
            tick: Duration::from_secs(1),
            poll_interval: Duration::from_secs(3),
            poll_ceiling: Duration::from_secs(120),
            success_delay: Duration::from_millis(2000),
        }
    }
}

impl From<&PairingConfig> for PollerSettings {
    fn from(config: &PairingConfig) -> Self {
        Self {
            countdown_secs: config.countdown_secs,
            tick: Duration::from_secs(1),
            poll_interval: Duration::from_secs(config.poll_interval_secs.into()),
            poll_ceiling: Duration::from_secs(config.poll_ceiling_secs.into()),
            success_delay: Duration::from_millis(config.success_delay_ms.into()),
        }
    }
}

/// Starts pairing sessions against a broker.
#[derive(Clone)]
pub struct ConnectionPoller {
    broker: Arc<dyn SessionBroker>,
    settings: PollerSettings,
}

impl ConnectionPoller {
    /// Zero `tick` or `poll_interval` periods are raised to 1 ms; tokio
    /// intervals reject a zero period.
    pub fn new(broker: Arc<dyn SessionBroker>, mut settings: PollerSettings) -> Self {
        settings.tick = settings.tick.max(MIN_PERIOD);
        settings.poll_interval = settings.poll_interval.max(MIN_PERIOD);
        Self { broker, settings }
    }

    pub fn settings(&self) -> &PollerSettings {
        &self.settings
    }

    /// Spawn a session for `instance_id` and issue the first pairing request.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&self, instance_id: InstanceId) -> PollerHandle {
        let session = PairingSession::new(instance_id.clone(), self.settings.countdown_secs);
        let (state_tx, state_rx) = watch::channel(session.snapshot());
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (command_tx, command_rx) = mpsc::channel(8);
        let shutdown = CancellationToken::new();

        let task = PollerTask {
            broker: Arc::clone(&self.broker),
            settings: self.settings.clone(),
            session,
            state_tx,
            event_tx,
            commands: command_rx,
            shutdown: shutdown.clone(),
        };

        tracing::info!(instance = %instance_id, "starting connection poller");
        let join = tokio::spawn(task.run());

        PollerHandle::new(instance_id, command_tx, state_rx, event_rx, shutdown, join)
    }
}
