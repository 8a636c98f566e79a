//! Configuration management commands.

use std::fs;

use anyhow::{bail, Result};
use fitment_core::catalog::Fitment;
use fitment_core::compat::FitmentData;
use fitment_core::vehicle::Level;

use super::{ConfigArgs, ConfigCommand};
use crate::config::generate_default_config;
use crate::context::Context;

/// Run the config command.
pub async fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => show_config(ctx),
        ConfigCommand::Init { force } => init_config(force, ctx),
        ConfigCommand::Validate => validate_config(ctx),
    }
}

fn show_config(ctx: &Context) -> Result<()> {
    if ctx.output.is_json() {
        ctx.output.json(&ctx.config);
        return Ok(());
    }

    ctx.output.header("Current Configuration");
    match &ctx.config_path {
        Some(path) => ctx.output.kv("file", &path.display().to_string()),
        None => ctx.output.kv("file", "(none, using defaults)"),
    }

    let data = &ctx.config.data;
    ctx.output.info("");
    ctx.output.info("[data]");
    ctx.output.kv("vehicles", data.vehicles.as_deref().unwrap_or("-"));
    ctx.output.kv("catalog", data.catalog.as_deref().unwrap_or("-"));
    ctx.output.kv("latency_ms", &data.latency_ms.to_string());

    ctx.output.info("");
    ctx.output.info("[fetch]");
    match ctx.config.fetch.policies() {
        Ok(policies) => {
            for level in Level::ALL {
                let policy = policies.get(level);
                ctx.output.kv(
                    level.as_str(),
                    &format!(
                        "attempt {:?}, total {:?}, {} retries",
                        policy.timeout.attempt, policy.timeout.total, policy.retry.max_attempts
                    ),
                );
            }
        }
        Err(e) => ctx.output.warn(&format!("{:#}", e)),
    }

    ctx.output.info("");
    ctx.output.info("[filter]");
    ctx.output.kv("mode", ctx.config.filter.mode.as_str());

    let log = &ctx.config.log;
    ctx.output.info("");
    ctx.output.info("[log]");
    ctx.output.kv("level", &log.level.to_string().to_lowercase());
    ctx.output.kv("format", &format!("{:?}", log.format).to_lowercase());
    ctx.output.kv("channel", &log.channel);

    Ok(())
}

fn init_config(force: bool, ctx: &Context) -> Result<()> {
    let config_path = ctx.cwd.join("fitment.toml");

    if config_path.exists() && !force {
        bail!(
            "Config file already exists: {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    fs::write(&config_path, generate_default_config())?;
    ctx.output.success(&format!("Created: {}", config_path.display()));

    Ok(())
}

fn validate_config(ctx: &Context) -> Result<()> {
    ctx.output.header("Validating configuration");

    let mut errors: Vec<String> = Vec::new();
    let mut warnings: Vec<String> = Vec::new();

    if let Err(e) = ctx.config.fetch.policies() {
        errors.push(format!("{:#}", e));
    }

    // Vehicle tree
    match ctx.vehicles_path(None) {
        None => warnings.push("data.vehicles is not set".to_string()),
        Some(_) => match ctx.load_tree(None) {
            Ok(tree) => ctx
                .output
                .debug(&format!("{} vehicle options, {} brands", tree.len(), tree.brands().len())),
            Err(e) => errors.push(format!("{:#}", e)),
        },
    }

    // Catalog and its compatibility data
    match ctx.catalog_path(None) {
        None => warnings.push("data.catalog is not set".to_string()),
        Some(_) => match ctx.load_catalog(None) {
            Ok(items) => {
                let mut missing = 0;
                for item in &items {
                    match item.fitment() {
                        FitmentData::Descriptor(descriptor) => {
                            for problem in descriptor.validate() {
                                warnings.push(format!("catalog item {}: {}", item.id, problem));
                            }
                        }
                        FitmentData::Unreadable(problem) => {
                            warnings.push(format!("catalog item {}: unreadable compatibility: {}", item.id, problem));
                        }
                        FitmentData::Missing => missing += 1,
                    }
                }
                if missing > 0 {
                    ctx.output.debug(&format!(
                        "{} of {} items have no compatibility data (universal fit)",
                        missing,
                        items.len()
                    ));
                }
            }
            Err(e) => errors.push(format!("{:#}", e)),
        },
    }

    // Print results
    if errors.is_empty() && warnings.is_empty() {
        ctx.output.success("Configuration is valid");
        return Ok(());
    }

    for error in &errors {
        ctx.output.error(&format!("Error: {}", error));
    }

    for warning in &warnings {
        ctx.output.warn(&format!("Warning: {}", warning));
    }

    if !errors.is_empty() {
        bail!("Configuration has {} error(s)", errors.len());
    }

    ctx.output.success("Configuration is valid (with warnings)");

    Ok(())
}
