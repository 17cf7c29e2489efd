use std::sync::Arc;

use tracing::{debug, info, warn};
use zap_common::{InstanceId, PlatformError, ZapError};

use crate::broker::{BrokerError, Instance, InstanceStatus, SessionBroker};

use super::store::SelectionStore;

#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error(transparent)]
    Broker(#[from] BrokerError),
    #[error("unknown instance: {0}")]
    UnknownInstance(String),
    #[error(transparent)]
    Store(#[from] PlatformError),
}

impl From<DirectoryError> for ZapError {
    fn from(err: DirectoryError) -> Self {
        match err {
            DirectoryError::Broker(e) => e.into(),
            DirectoryError::Store(e) => ZapError::Platform(e),
            DirectoryError::UnknownInstance(id) => ZapError::Other(format!("unknown instance: {id}")),
        }
    }
}

/// Instances on the account plus the one currently selected.
pub struct InstanceDirectory {
    broker: Arc<dyn SessionBroker>,
    store: Arc<dyn SelectionStore>,
    instances: Vec<Instance>,
    selected: Option<InstanceId>,
}

impl InstanceDirectory {
    pub fn new(broker: Arc<dyn SessionBroker>, store: Arc<dyn SelectionStore>) -> Self {
        Self {
            broker,
            store,
            instances: Vec::new(),
            selected: None,
        }
    }

    pub fn instances(&self) -> &[Instance] {
        &self.instances
    }

    /// The selected instance, if it is still listed.
    pub fn selected(&self) -> Option<&Instance> {
        let id = self.selected.as_ref()?;
        self.find(id)
    }

    pub fn find(&self, id: &InstanceId) -> Option<&Instance> {
        self.instances.iter().find(|i| &i.id == id)
    }

    /// Reload the list, restore the remembered selection (or fall back to
    /// the first instance) and check its status.
    pub async fn refresh(&mut self) -> Result<&[Instance], DirectoryError> {
        self.instances = self.broker.list_instances().await?;
        debug!(count = self.instances.len(), "instances loaded");

        let remembered = self
            .store
            .last_selected()
            .filter(|id| self.find(id).is_some());
        self.selected = remembered.or_else(|| self.instances.first().map(|i| i.id.clone()));

        if let Some(id) = self.selected.clone() {
            self.check_status(&id).await;
        }
        Ok(&self.instances)
    }

    /// Select `id`, persist it and check its status.
    pub async fn select(&mut self, id: &InstanceId) -> Result<(), DirectoryError> {
        if self.find(id).is_none() {
            return Err(DirectoryError::UnknownInstance(id.to_string()));
        }
        self.selected = Some(id.clone());
        self.store.remember(id)?;
        info!(instance = %id, "instance selected");
        self.check_status(id).await;
        Ok(())
    }

    /// Query the broker for `id` and update the matching entry.
    ///
    /// Failures are logged and leave the entry untouched.
    pub async fn check_status(&mut self, id: &InstanceId) -> Option<InstanceStatus> {
        let response = match self.broker.fetch_status(id).await {
            Ok(response) => response,
            Err(e) => {
                warn!(instance = %id, error = %e, "status check failed");
                return None;
            }
        };

        let status = InstanceStatus::from_remote(&response.status);
        if let Some(entry) = self.instances.iter_mut().find(|i| &i.id == id) {
            entry.status = status;
        }
        debug!(instance = %id, status = status.as_str(), "status checked");
        Some(status)
    }
}
