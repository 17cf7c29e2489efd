use std::future::Future;
use std::sync::Arc;

use tracing::{info, warn};
use zap_common::{InstanceId, Notification, NotificationCenter, ZapError};
use zap_config::schema::ZapConfig;
use zap_connect::{
    ConnectionPoller, InstanceDirectory, PollerEvent, PollerHandle, PollerSettings, SessionBroker,
};

use super::view::{default_cache_dir, PairingView};

enum Step {
    Continue,
    Done(Result<(), ZapError>),
}

pub(super) async fn run(
    broker: Arc<dyn SessionBroker>,
    mut directory: InstanceDirectory,
    config: &ZapConfig,
    instance: Option<String>,
    retries: u32,
) -> Result<(), ZapError> {
    let (instance_id, instance_name) = resolve_instance(&mut directory, instance).await?;

    let poller = ConnectionPoller::new(broker, PollerSettings::from(&config.pairing));
    let mut handle = poller.start(instance_id);
    let mut session = ConnectSession {
        view: PairingView::new(default_cache_dir()?),
        notifications: NotificationCenter::default(),
        instance_name,
        retries_left: retries,
    };

    let result = session.pump(&mut handle, tokio::signal::ctrl_c()).await;
    handle.close().await;
    session.print_unread();
    result
}

/// The instance to pair: the one given, else the directory's selection.
async fn resolve_instance(
    directory: &mut InstanceDirectory,
    instance: Option<String>,
) -> Result<(InstanceId, Option<String>), ZapError> {
    if let Some(id) = instance {
        return Ok((InstanceId::from(id), None));
    }
    directory.refresh().await?;
    let selected = directory
        .selected()
        .ok_or_else(|| ZapError::Other("no instances on this account".into()))?;
    info!(instance = %selected.id, "using selected instance");
    let name = (!selected.name.is_empty()).then(|| selected.name.clone());
    Ok((selected.id.clone(), name))
}

struct ConnectSession {
    view: PairingView,
    notifications: NotificationCenter,
    instance_name: Option<String>,
    retries_left: u32,
}

impl ConnectSession {
    /// Feed poller events to the view until the session ends or `shutdown`
    /// resolves. `shutdown` is pinned once so a signal between iterations is
    /// not lost.
    async fn pump<F: Future>(
        &mut self,
        handle: &mut PollerHandle,
        shutdown: F,
    ) -> Result<(), ZapError> {
        tokio::pin!(shutdown);
        loop {
            let step = tokio::select! {
                _ = &mut shutdown => {
                    println!("\n  Closed.");
                    Step::Done(Ok(()))
                }
                event = handle.next_event() => self.on_event(event, handle).await,
            };
            if let Step::Done(result) = step {
                return result;
            }
        }
    }

    async fn on_event(&mut self, event: Option<PollerEvent>, handle: &PollerHandle) -> Step {
        let Some(event) = event else {
            return Step::Done(Err(ZapError::Pairing("poller stopped unexpectedly".into())));
        };

        match event {
            PollerEvent::StateChanged(snapshot) => {
                let mut stdout = std::io::stdout();
                match self.view.render(&snapshot, &mut stdout) {
                    Ok(()) => Step::Continue,
                    Err(e) => Step::Done(Err(e)),
                }
            }
            PollerEvent::Failed {
                instance_id,
                reason,
            } => {
                self.notifications.push(Notification::reconnection_expired(
                    instance_id.as_str(),
                    self.instance_name.clone(),
                ));
                if self.retries_left == 0 {
                    return Step::Done(Err(ZapError::Pairing(reason.to_string())));
                }
                self.retries_left -= 1;
                warn!(instance = %instance_id, reason = %reason, remaining = self.retries_left, "retrying");
                match handle.retry().await {
                    Ok(()) => Step::Continue,
                    Err(e) => Step::Done(Err(ZapError::Pairing(e.to_string()))),
                }
            }
            PollerEvent::Completed { instance_id } => {
                info!(instance = %instance_id, "pairing complete");
                self.notifications.mark_all_as_read();
                Step::Done(Ok(()))
            }
        }
    }

    fn print_unread(&mut self) {
        if self.notifications.unread_count() == 0 {
            return;
        }
        for notification in self.notifications.iter().filter(|n| !n.is_read) {
            eprintln!("  [{}] {}", notification.title, notification.message);
        }
        self.notifications.mark_all_as_read();
    }
}
