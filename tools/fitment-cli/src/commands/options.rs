//! List the options at one level.

use anyhow::{Context as _, Result};
use fitment_core::selector::OptionsProvider;
use fitment_core::vehicle::Level;
use fitment_core::OptionId;

use super::OptionsArgs;
use crate::context::Context;

/// Run the options command.
pub async fn run(args: OptionsArgs, ctx: &Context) -> Result<()> {
    let level: Level = args.level.parse().map_err(anyhow::Error::msg)?;
    let parent = args.parent.map(OptionId::new);

    let provider = ctx.provider(ctx.load_tree(args.vehicles.as_deref())?)?;
    let spinner = ctx
        .output
        .spinner(&format!("Loading {} options...", level.display_name()));
    let result = provider.fetch_options(level, parent.as_ref()).await;
    spinner.finish_and_clear();
    let options = result.with_context(|| match &parent {
        Some(p) => format!("Failed to list {} options under {}", level, p),
        None => format!("Failed to list {} options", level),
    })?;

    if ctx.output.is_json() {
        ctx.output.json(&options);
        return Ok(());
    }

    ctx.output.header(&format!("{} options", level.display_name()));
    if options.is_empty() {
        ctx.output.warn("None listed");
        return Ok(());
    }
    let width = options.iter().map(|o| o.id.as_str().len()).max().unwrap_or(0);
    for option in &options {
        ctx.output
            .table_row(&[option.id.as_str(), &option.display_label], &[width, 0]);
    }
    Ok(())
}
