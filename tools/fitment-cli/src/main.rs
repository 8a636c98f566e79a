//! Fitment CLI - pick a vehicle and see which parts fit it.
//!
//! Commands:
//! - `fitment match` - Select a vehicle by name and filter the catalog
//! - `fitment browse` - Walk Brand, Model, Year and Engine interactively
//! - `fitment options` - List the options at one level
//! - `fitment config` - Manage configuration

mod commands;
mod config;
mod context;
mod output;
mod session;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{BrowseArgs, ConfigArgs, MatchArgs, OptionsArgs};

/// Fitment CLI - vehicle selection and parts compatibility
#[derive(Parser)]
#[command(name = "fitment")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use JSON output format
    #[arg(long, global = true)]
    json: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Select a vehicle and list compatible parts
    Match(MatchArgs),

    /// Select a vehicle interactively
    Browse(BrowseArgs),

    /// List vehicle options at a level
    Options(OptionsArgs),

    /// Manage configuration
    Config(ConfigArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let output = output::Output::new(cli.verbose, cli.json);

    let config_path = cli.config.as_deref();
    let ctx = context::Context::load(config_path, output)?;
    ctx.init_tracing();

    let result = match cli.command {
        Commands::Match(args) => commands::matching::run(args, &ctx).await,
        Commands::Browse(args) => commands::browse::run(args, &ctx).await,
        Commands::Options(args) => commands::options::run(args, &ctx).await,
        Commands::Config(args) => commands::config::run(args, &ctx).await,
    };

    if let Err(e) = result {
        ctx.output.error(&format!("{:#}", e));
        std::process::exit(1);
    }

    Ok(())
}
