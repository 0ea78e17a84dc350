use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use datalens::cli::{commands, Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins; otherwise the -v count picks the default level
    let default_directive = match cli.verbose {
        0 => "datalens=warn",
        1 => "datalens=info",
        2 => "datalens=debug",
        _ => "trace",
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_directive.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match &cli.command {
        Command::Datasets => commands::datasets(&cli).await,
        Command::Show(args) => commands::show(&cli, args).await,
        Command::Create(args) => commands::create(&cli, args).await,
        Command::Delete(args) => commands::delete(&cli, args).await,
        Command::Sample(args) => commands::sample(&cli, args).await,
        Command::Query(args) => commands::query(&cli, args).await,
        Command::Watch(args) => commands::watch(&cli, args).await,
        Command::Health => commands::health(&cli).await,
    }
}
