//! Subcommand implementations.

mod connect;
mod instances;
mod view;

use std::sync::Arc;

use zap_common::ZapError;
use zap_config::schema::ZapConfig;
use zap_connect::{
    FileSelectionStore, InstanceDirectory, SelectionStore, SessionBroker, WebhookBroker,
};

use crate::cli::Command;

pub async fn run(command: Command, config: &ZapConfig) -> Result<(), ZapError> {
    let broker: Arc<dyn SessionBroker> = Arc::new(WebhookBroker::new(&config.broker)?);
    let store: Arc<dyn SelectionStore> =
        Arc::new(FileSelectionStore::from_config(&config.storage)?);
    let directory = InstanceDirectory::new(Arc::clone(&broker), store);

    match command {
        Command::Connect { instance, retries } => {
            connect::run(broker, directory, config, instance, retries).await
        }
        Command::Instances => instances::list(directory).await,
        Command::Select { id } => instances::select(directory, id.into()).await,
        Command::Status { id } => instances::status(broker.as_ref(), &id.into()).await,
    }
}
