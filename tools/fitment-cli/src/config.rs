//! CLI configuration.

use std::collections::BTreeMap;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use fitment_core::catalog::FilterMode;
use fitment_core::vehicle::Level;
use fitment_data::{BackoffStrategy, FetchPolicy, LevelPolicies};
use fitment_observability::{LogFormat, LogLevel};
use serde::{Deserialize, Serialize};

/// Config file names, in lookup order.
pub const CONFIG_NAMES: [&str; 3] = ["fitment.toml", ".fitment.toml", "fitment.json"];

/// CLI configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FitmentConfig {
    /// Data files.
    #[serde(default)]
    pub data: DataConfig,

    /// Options fetch timeouts and retries.
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Catalog filtering.
    #[serde(default)]
    pub filter: FilterConfig,

    /// Session logging.
    #[serde(default)]
    pub log: LogConfig,
}

impl FitmentConfig {
    /// Load config from a file.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        if path.ends_with(".json") {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path))
        } else {
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse TOML config: {}", path))
        }
    }
}

/// Where vehicle and catalog data live. Relative paths resolve against the
/// config file's directory.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DataConfig {
    /// Vehicle tree JSON.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vehicles: Option<String>,

    /// Parts catalog JSON.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog: Option<String>,

    /// Artificial latency per options fetch (milliseconds).
    #[serde(default)]
    pub latency_ms: u64,
}

/// Fetch settings applied on top of the per-level defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchOverrides {
    /// Total time for a fetch, retries included.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,

    /// Time for a single attempt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attempt_timeout_ms: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_retries: Option<u32>,

    /// First backoff delay; 0 disables backoff.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backoff_ms: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backoff_max_ms: Option<u64>,
}

impl FetchOverrides {
    fn apply(&self, policy: &mut FetchPolicy) {
        if let Some(ms) = self.timeout_ms {
            policy.timeout.total = Duration::from_millis(ms);
            policy.timeout.attempt = policy.timeout.attempt.min(policy.timeout.total);
        }
        if let Some(ms) = self.attempt_timeout_ms {
            policy.timeout.attempt = Duration::from_millis(ms);
        }
        if let Some(n) = self.max_retries {
            policy.retry.max_attempts = n;
        }
        match (self.backoff_ms, self.backoff_max_ms) {
            (Some(0), _) => policy.retry.backoff = BackoffStrategy::None,
            (Some(base), max) => {
                policy.retry.backoff = BackoffStrategy::Exponential {
                    base: Duration::from_millis(base),
                    max: Duration::from_millis(max.unwrap_or(base * 8)),
                };
            }
            (None, Some(max)) => {
                if let BackoffStrategy::Exponential { max: current, .. } = &mut policy.retry.backoff {
                    *current = Duration::from_millis(max);
                }
            }
            (None, None) => {}
        }
    }
}

/// `[fetch]` section: global overrides plus `[fetch.levels.<level>]`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FetchConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attempt_timeout_ms: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_retries: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backoff_ms: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backoff_max_ms: Option<u64>,

    /// Per-level overrides keyed by level name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub levels: BTreeMap<String, FetchOverrides>,
}

impl FetchConfig {
    fn global(&self) -> FetchOverrides {
        FetchOverrides {
            timeout_ms: self.timeout_ms,
            attempt_timeout_ms: self.attempt_timeout_ms,
            max_retries: self.max_retries,
            backoff_ms: self.backoff_ms,
            backoff_max_ms: self.backoff_max_ms,
        }
    }

    /// Level policies: level defaults, then `[fetch]`, then `[fetch.levels.*]`.
    pub fn policies(&self) -> Result<LevelPolicies> {
        let mut level_overrides: BTreeMap<Level, &FetchOverrides> = BTreeMap::new();
        for (name, overrides) in &self.levels {
            let level: Level = name
                .parse()
                .map_err(|e| anyhow::anyhow!("fetch.levels.{}: {}", name, e))?;
            level_overrides.insert(level, overrides);
        }

        let global = self.global();
        let mut policies = LevelPolicies::default();
        for level in Level::ALL {
            let mut policy = FetchPolicy::for_level(level);
            global.apply(&mut policy);
            if let Some(overrides) = level_overrides.get(&level) {
                overrides.apply(&mut policy);
            }
            if policy.timeout.attempt.is_zero() || policy.timeout.total.is_zero() {
                bail!("fetch: {} timeout must be greater than zero", level);
            }
            policies = policies.with(level, policy);
        }
        Ok(policies)
    }
}

/// `[filter]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterConfig {
    /// `all` (badges) or `strict` (compatible only).
    #[serde(default)]
    pub mode: FilterMode,
}

/// `[log]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_log_level")]
    pub level: LogLevel,

    #[serde(default = "default_log_format")]
    pub format: LogFormat,

    /// Channel name attached to every entry.
    #[serde(default = "default_channel")]
    pub channel: String,
}

fn default_log_level() -> LogLevel {
    LogLevel::Warn
}

fn default_log_format() -> LogFormat {
    LogFormat::Human
}

fn default_channel() -> String {
    "cli".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            channel: default_channel(),
        }
    }
}

/// Generate a default fitment.toml config file.
pub fn generate_default_config() -> String {
    r#"# Fitment configuration

[data]
vehicles = "vehicles.json"
catalog = "catalog.json"
# latency_ms = 150

[fetch]
# timeout_ms = 1500
# attempt_timeout_ms = 500
# max_retries = 1
# backoff_ms = 50

[fetch.levels.brand]
max_retries = 2

[filter]
mode = "all"

[log]
level = "warn"
format = "human"
channel = "cli"
"#
    .to_string()
}
