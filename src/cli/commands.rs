//! One execute function per subcommand.

use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use super::output;
use super::{Cli, CreateArgs, DatasetIdArgs, QueryArgs, SampleArgs};
use crate::config::ClientConfig;
use crate::explorer::ExplorerController;
use crate::gateway::{DatasetGateway, HttpDatasetGateway};
use crate::models::Dataset;
use crate::stream::WsEventStreamClient;

fn config(cli: &Cli) -> anyhow::Result<ClientConfig> {
    ClientConfig::from_env_with_overrides(cli.url.as_deref(), cli.stream_url.as_deref())
        .context("failed to load configuration")
}

fn gateway(cli: &Cli) -> anyhow::Result<Arc<HttpDatasetGateway>> {
    let config = config(cli)?;
    Ok(Arc::new(HttpDatasetGateway::new(&config)?))
}

/// Build a controller wired to the real service, sharing one gateway with
/// the caller.
fn session(cli: &Cli) -> anyhow::Result<(ExplorerController, Arc<HttpDatasetGateway>)> {
    let config = config(cli)?;
    let gateway = Arc::new(HttpDatasetGateway::new(&config)?);
    let stream_client = Arc::new(WsEventStreamClient::new(config.stream_url.clone()));
    let explorer = ExplorerController::new(gateway.clone(), stream_client);
    Ok((explorer, gateway))
}

pub async fn datasets(cli: &Cli) -> anyhow::Result<()> {
    let (mut explorer, _) = session(cli)?;
    explorer.refresh_datasets().await?;
    output::print_dataset_table(explorer.datasets());
    Ok(())
}

pub async fn show(cli: &Cli, args: &DatasetIdArgs) -> anyhow::Result<()> {
    let gateway = gateway(cli)?;
    let dataset = gateway.get_dataset(&args.id).await?;
    output::print_dataset(&dataset)
}

pub async fn create(cli: &Cli, args: &CreateArgs) -> anyhow::Result<()> {
    let gateway = gateway(cli)?;
    let dataset = gateway
        .create_dataset(&Dataset {
            id: String::new(),
            name: args.name.clone(),
            owner: args.owner.clone(),
            source: args.source.clone(),
            subscription_control_field: args.control_field.clone(),
            subscription_control_field_pattern: args.control_pattern.clone(),
        })
        .await?;
    output::print_dataset(&dataset)
}

pub async fn delete(cli: &Cli, args: &DatasetIdArgs) -> anyhow::Result<()> {
    let gateway = gateway(cli)?;
    gateway.delete_dataset(&args.id).await?;
    println!("deleted {}", args.id);
    Ok(())
}

pub async fn health(cli: &Cli) -> anyhow::Result<()> {
    let gateway = gateway(cli)?;
    let health = gateway.health().await?;
    output::print_health(&health);
    Ok(())
}

pub async fn sample(cli: &Cli, args: &SampleArgs) -> anyhow::Result<()> {
    let (mut explorer, gateway) = session(cli)?;
    let dataset = gateway.get_dataset(&args.id).await?;
    explorer.start_sampling(dataset).await?;
    if let Some(results) = explorer.results() {
        output::print_rows(&results.rows, args.compact)?;
    }
    Ok(())
}

pub async fn query(cli: &Cli, args: &QueryArgs) -> anyhow::Result<()> {
    let (mut explorer, gateway) = session(cli)?;
    let dataset = gateway.get_dataset(&args.id).await?;
    explorer.start_sampling(dataset).await?;
    explorer.set_clauses(&args.select, &args.where_clause, &args.order_by)?;
    explorer.fetch_contents().await?;
    if let Some(results) = explorer.results() {
        output::print_rows(&results.rows, args.compact)?;
    }
    Ok(())
}

/// Subscribe to a dataset and print rows as they arrive, until interrupted.
pub async fn watch(cli: &Cli, args: &QueryArgs) -> anyhow::Result<()> {
    let (mut explorer, gateway) = session(cli)?;
    let dataset = gateway.get_dataset(&args.id).await?;
    explorer.start_sampling(dataset).await?;
    explorer.set_clauses(&args.select, &args.where_clause, &args.order_by)?;
    explorer.toggle_subscription().await?;

    if let Some(results) = explorer.results() {
        output::print_rows(&results.rows, args.compact)?;
    }
    info!("watching {}; press ctrl-c to stop", args.id);

    loop {
        tokio::select! {
            maybe_event = explorer.next_stream_event() => match maybe_event {
                Some(event) => {
                    let before = explorer.results().map(|r| r.len()).unwrap_or(0);
                    explorer.apply_stream_event(event);
                    if let Some(results) = explorer.results() {
                        if results.len() > before {
                            if let Some(row) = results.rows.last() {
                                output::print_row(row, args.compact)?;
                            }
                        }
                    }
                }
                None => {
                    info!("event stream ended");
                    break;
                }
            },
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    if explorer.is_subscribed() {
        explorer.toggle_subscription().await?;
    }
    Ok(())
}
