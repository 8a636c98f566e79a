//! CLI execution context.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context as _, Result};
use fitment_core::catalog::CatalogItem;
use fitment_core::SessionId;
use fitment_data::{read_catalog, PolicyProvider, StaticOptionsProvider, VehicleTree};
use fitment_observability::{LogLevel, StructuredLogger};

use crate::config::{FitmentConfig, CONFIG_NAMES};
use crate::output::Output;

/// Execution context for CLI commands.
pub struct Context {
    pub config: FitmentConfig,
    /// File the config came from, if any.
    pub config_path: Option<PathBuf>,
    pub output: Output,
    /// Working directory.
    pub cwd: PathBuf,
}

impl Context {
    /// Load context from config file.
    pub fn load(config_path: Option<&str>, output: Output) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;

        let (config, config_path) = match config_path {
            Some(path) => (FitmentConfig::load(path)?, Some(cwd.join(path))),
            // Try to find config in current directory or parent directories
            None => match Self::find_config(&cwd) {
                Some((config, path)) => (config, Some(path)),
                None => (FitmentConfig::default(), None),
            },
        };

        Ok(Self {
            config,
            config_path,
            output,
            cwd,
        })
    }

    /// Find config file in directory tree.
    fn find_config(start: &Path) -> Option<(FitmentConfig, PathBuf)> {
        let mut current = start.to_path_buf();
        loop {
            for name in &CONFIG_NAMES {
                let config_path = current.join(name);
                if config_path.exists() {
                    if let Ok(config) = FitmentConfig::load(config_path.to_str()?) {
                        return Some((config, config_path));
                    }
                }
            }

            if !current.pop() {
                break;
            }
        }

        None
    }

    /// Directory that relative data paths resolve against.
    pub fn base_dir(&self) -> PathBuf {
        self.config_path
            .as_deref()
            .and_then(Path::parent)
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.cwd.clone())
    }

    /// Resolve a configured path relative to the config file.
    pub fn resolve_path(&self, path: &str) -> PathBuf {
        if Path::new(path).is_absolute() {
            PathBuf::from(path)
        } else {
            self.base_dir().join(path)
        }
    }

    /// Vehicle tree path: the flag wins over `[data] vehicles`.
    pub fn vehicles_path(&self, flag: Option<&str>) -> Option<PathBuf> {
        match flag {
            Some(path) => Some(self.cwd.join(path)),
            None => self.config.data.vehicles.as_deref().map(|p| self.resolve_path(p)),
        }
    }

    /// Catalog path: the flag wins over `[data] catalog`.
    pub fn catalog_path(&self, flag: Option<&str>) -> Option<PathBuf> {
        match flag {
            Some(path) => Some(self.cwd.join(path)),
            None => self.config.data.catalog.as_deref().map(|p| self.resolve_path(p)),
        }
    }

    pub fn load_tree(&self, flag: Option<&str>) -> Result<VehicleTree> {
        let Some(path) = self.vehicles_path(flag) else {
            bail!("No vehicle tree configured. Set [data] vehicles or pass --vehicles.");
        };
        self.output.debug(&format!("Loading vehicles from {}", path.display()));
        VehicleTree::from_path(&path)
            .with_context(|| format!("Failed to load vehicle tree: {}", path.display()))
    }

    pub fn load_catalog(&self, flag: Option<&str>) -> Result<Vec<CatalogItem>> {
        let Some(path) = self.catalog_path(flag) else {
            bail!("No catalog configured. Set [data] catalog or pass --catalog.");
        };
        self.output.debug(&format!("Loading catalog from {}", path.display()));
        read_catalog(&path).with_context(|| format!("Failed to load catalog: {}", path.display()))
    }

    /// Options provider over `tree` with the configured latency and fetch policies.
    pub fn provider(&self, tree: VehicleTree) -> Result<PolicyProvider<StaticOptionsProvider>> {
        let policies = self.config.fetch.policies()?;
        let inner = StaticOptionsProvider::new(tree)
            .with_latency(Duration::from_millis(self.config.data.latency_ms));
        Ok(PolicyProvider::new(inner).with_policies(policies))
    }

    /// `[log] level`, lowered to debug in verbose mode.
    fn log_level(&self) -> LogLevel {
        if self.output.is_verbose() {
            self.config.log.level.min(LogLevel::Debug)
        } else {
            self.config.log.level
        }
    }

    /// Filter directive for `tracing` events from the engine crates.
    pub fn tracing_filter(&self) -> String {
        let level = self.log_level().to_string().to_lowercase();
        format!("fitment_core={level},fitment_data={level}")
    }

    /// Install the stderr `tracing` subscriber; `RUST_LOG` wins when set.
    pub fn init_tracing(&self) {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(self.tracing_filter()));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    }

    /// Session logger; verbose mode lowers the level to debug.
    pub fn logger(&self, session_id: SessionId) -> StructuredLogger {
        let log = &self.config.log;
        let level = self.log_level();
        StructuredLogger::new(session_id)
            .with_channel(log.channel.clone())
            .with_min_level(level)
            .with_format(log.format)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(verbose: bool, level: LogLevel) -> Context {
        let mut config = FitmentConfig::default();
        config.log.level = level;
        Context {
            config,
            config_path: None,
            output: Output::new(verbose, false),
            cwd: PathBuf::from("/tmp"),
        }
    }

    #[test]
    fn test_tracing_filter_follows_log_level() {
        assert_eq!(
            context(false, LogLevel::Warn).tracing_filter(),
            "fitment_core=warn,fitment_data=warn"
        );
        assert_eq!(
            context(false, LogLevel::Trace).tracing_filter(),
            "fitment_core=trace,fitment_data=trace"
        );
    }

    #[test]
    fn test_verbose_lowers_tracing_to_debug() {
        assert_eq!(
            context(true, LogLevel::Warn).tracing_filter(),
            "fitment_core=debug,fitment_data=debug"
        );
        // Already below debug: verbose keeps it.
        assert_eq!(
            context(true, LogLevel::Trace).tracing_filter(),
            "fitment_core=trace,fitment_data=trace"
        );
    }

    #[test]
    fn test_relative_paths_resolve_against_config_dir() {
        let mut ctx = context(false, LogLevel::Warn);
        ctx.config_path = Some(PathBuf::from("/srv/shop/fitment.toml"));
        assert_eq!(ctx.resolve_path("vehicles.json"), PathBuf::from("/srv/shop/vehicles.json"));
        assert_eq!(ctx.vehicles_path(Some("v.json")), Some(PathBuf::from("/tmp/v.json")));
    }
}
