//! Command-line interface.

pub mod commands;
pub mod output;

use clap::{Args, Parser, Subcommand};

/// Browse, query and live-tail datasets exposed by a remote dataset service.
#[derive(Parser)]
#[command(name = "datalens", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Service base URL (overrides DATALENS_SERVICE_URL)
    #[arg(long, global = true)]
    pub url: Option<String>,

    /// Event stream URL (overrides DATALENS_STREAM_URL)
    #[arg(long, global = true)]
    pub stream_url: Option<String>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Command {
    /// List the datasets the service exposes
    Datasets,
    /// Show one dataset's metadata
    Show(DatasetIdArgs),
    /// Register a new dataset
    Create(CreateArgs),
    /// Delete a dataset
    Delete(DatasetIdArgs),
    /// Print a representative sample of a dataset's rows
    Sample(SampleArgs),
    /// Run a select/where/orderBy query against a dataset
    Query(QueryArgs),
    /// Query a dataset and keep the result live until interrupted
    Watch(QueryArgs),
    /// Check service health
    Health,
}

#[derive(Args)]
pub struct DatasetIdArgs {
    /// Dataset id
    pub id: String,
}

#[derive(Args)]
pub struct CreateArgs {
    #[arg(long)]
    pub name: String,

    #[arg(long)]
    pub owner: String,

    /// Source descriptor, e.g. a database address or an HTTP location
    #[arg(long)]
    pub source: String,

    /// Field the service uses to window live subscription updates
    #[arg(long, default_value = "")]
    pub control_field: String,

    /// Pattern applied to the subscription control field
    #[arg(long, default_value = "")]
    pub control_pattern: String,
}

#[derive(Args)]
pub struct SampleArgs {
    /// Dataset id
    pub id: String,

    /// Emit rows as compact JSON lines instead of pretty JSON
    #[arg(long)]
    pub compact: bool,
}

#[derive(Args)]
pub struct QueryArgs {
    /// Dataset id
    pub id: String,

    /// Projection clause, e.g. "name, price"
    #[arg(long, default_value = "")]
    pub select: String,

    /// Filter clause, e.g. "price > 10"
    #[arg(long = "where", default_value = "")]
    pub where_clause: String,

    /// Ordering clause, e.g. "price desc"
    #[arg(long, default_value = "")]
    pub order_by: String,

    /// Emit rows as compact JSON lines instead of pretty JSON
    #[arg(long)]
    pub compact: bool,
}
