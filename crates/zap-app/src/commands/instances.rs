use zap_common::{InstanceId, ZapError};
use zap_connect::{Instance, InstanceDirectory, InstanceStatus, SessionBroker};

pub(super) async fn list(mut directory: InstanceDirectory) -> Result<(), ZapError> {
    directory.refresh().await?;
    if directory.instances().is_empty() {
        println!("No instances on this account.");
        return Ok(());
    }

    let selected = directory.selected().map(|i| i.id.clone());
    for instance in directory.instances() {
        println!("{}", format_row(instance, selected.as_ref() == Some(&instance.id)));
    }
    Ok(())
}

pub(super) async fn select(mut directory: InstanceDirectory, id: InstanceId) -> Result<(), ZapError> {
    directory.refresh().await?;
    directory.select(&id).await?;
    match directory.selected() {
        Some(instance) => println!("Selected {} ({})", id, instance.status.as_str()),
        None => println!("Selected {id}"),
    }
    Ok(())
}

pub(super) async fn status(broker: &dyn SessionBroker, id: &InstanceId) -> Result<(), ZapError> {
    let response = broker.fetch_status(id).await?;
    let status = InstanceStatus::from_remote(&response.status);
    println!("{id}: {}", status.as_str());
    Ok(())
}

fn format_row(instance: &Instance, selected: bool) -> String {
    let marker = if selected { '*' } else { ' ' };
    let name = if instance.name.is_empty() {
        "-"
    } else {
        instance.name.as_str()
    };
    let phone = if instance.phone.is_empty() {
        "-"
    } else {
        instance.phone.as_str()
    };
    format!(
        "{marker} {:<20} {:<24} {:<16} {}",
        instance.id.as_str(),
        name,
        phone,
        instance.status.as_str()
    )
}
