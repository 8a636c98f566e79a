//! CLI command implementations.

pub mod browse;
pub mod config;
pub mod matching;
pub mod options;

use clap::{Args, Subcommand};

/// Arguments for the match command.
#[derive(Args)]
pub struct MatchArgs {
    /// Vehicle make.
    #[arg(short, long)]
    pub brand: Option<String>,

    /// Model name.
    #[arg(short, long, requires = "brand")]
    pub model: Option<String>,

    /// Model year.
    #[arg(short, long, requires = "model")]
    pub year: Option<String>,

    /// Engine variant.
    #[arg(short, long, requires = "year")]
    pub engine: Option<String>,

    /// Show only parts that fit (overrides [filter] mode).
    #[arg(long)]
    pub strict: bool,

    /// Match names as given instead of resolving them through the vehicle tree.
    #[arg(long)]
    pub ad_hoc: bool,

    /// Vehicle tree file (overrides [data] vehicles).
    #[arg(long)]
    pub vehicles: Option<String>,

    /// Catalog file (overrides [data] catalog).
    #[arg(long)]
    pub catalog: Option<String>,
}

impl MatchArgs {
    /// Names given on the command line, Brand first.
    pub fn names(&self) -> Vec<&str> {
        [&self.brand, &self.model, &self.year, &self.engine]
            .into_iter()
            .map_while(|n| n.as_deref())
            .collect()
    }
}

/// Arguments for the browse command.
#[derive(Args)]
pub struct BrowseArgs {
    /// Show only parts that fit (overrides [filter] mode).
    #[arg(long)]
    pub strict: bool,

    /// Vehicle tree file (overrides [data] vehicles).
    #[arg(long)]
    pub vehicles: Option<String>,

    /// Catalog file (overrides [data] catalog).
    #[arg(long)]
    pub catalog: Option<String>,
}

/// Arguments for the options command.
#[derive(Args)]
pub struct OptionsArgs {
    /// Level to list: brand, model, year or engine.
    pub level: String,

    /// Parent option id (required below brand).
    #[arg(short, long)]
    pub parent: Option<String>,

    /// Vehicle tree file (overrides [data] vehicles).
    #[arg(long)]
    pub vehicles: Option<String>,
}

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration.
    Show,
    /// Initialize a config file.
    Init {
        /// Overwrite existing config.
        #[arg(short, long)]
        force: bool,
    },
    /// Validate configuration and the data files it points to.
    Validate,
}
