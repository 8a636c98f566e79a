//! Interactive vehicle selection.

use anyhow::{bail, Result};
use dialoguer::{Confirm, Select};
use fitment_core::catalog::filter;
use fitment_core::selector::LevelStatus;
use fitment_core::vehicle::{Level, VehicleOption};
use fitment_core::OptionId;

use super::matching::{filter_mode, render_metrics, render_results};
use super::BrowseArgs;
use crate::context::Context;
use crate::session::Session;

enum Action {
    Choose(OptionId),
    ShowParts,
    Back(Level),
    StartOver,
    Quit,
}

/// Run the browse command.
pub async fn run(args: BrowseArgs, ctx: &Context) -> Result<()> {
    if ctx.output.is_json() {
        bail!("browse is interactive; use `fitment match --json` instead");
    }

    let items = ctx.load_catalog(args.catalog.as_deref())?;
    let mode = filter_mode(ctx, args.strict);
    let mut session = Session::open(ctx, args.vehicles.as_deref()).await?;

    // `None` once the engine is chosen.
    let mut focus = Some(Level::Brand);
    loop {
        let Some(level) = focus else {
            let selection = session.selector.selection();
            render_results(ctx, selection, &filter(&items, selection, mode));
            let choice = Select::new()
                .with_prompt("Next")
                .items(&["Change engine", "Start over", "Quit"])
                .default(2)
                .interact()?;
            match choice {
                0 => focus = Some(Level::Engine),
                1 => {
                    start_over(&mut session).await?;
                    focus = Some(Level::Brand);
                }
                _ => break,
            }
            continue;
        };

        let options: Vec<VehicleOption> = match session.selector.status_for(level) {
            LevelStatus::Loaded(options) => options.clone(),
            LevelStatus::Error(reason) => {
                ctx.output.warn(&format!(
                    "Could not load {} options: {}",
                    level.display_name(),
                    reason
                ));
                let retry = Confirm::new()
                    .with_prompt("Retry?")
                    .default(true)
                    .interact()?;
                if !retry {
                    break;
                }
                let pending = session.selector.reload(level)?;
                session.wait(pending).await;
                continue;
            }
            LevelStatus::Idle | LevelStatus::Loading => {
                let pending = session.selector.reload(level)?;
                session.wait(pending).await;
                continue;
            }
        };

        if options.is_empty() {
            ctx.output.warn(&format!("No {} options listed", level.display_name()));
        }

        let current = session.selector.selection().get(level).map(|o| o.id.clone());
        let mut actions: Vec<(String, Action)> = options
            .iter()
            .map(|o| (o.display_label.clone(), Action::Choose(o.id.clone())))
            .collect();
        actions.push(("Show parts for current selection".to_string(), Action::ShowParts));
        if let Some(parent) = level.parent() {
            actions.push((format!("Back to {}", parent.display_name()), Action::Back(parent)));
        }
        actions.push(("Start over".to_string(), Action::StartOver));
        actions.push(("Quit".to_string(), Action::Quit));

        let default = current
            .and_then(|id| options.iter().position(|o| o.id == id))
            .unwrap_or(0);
        let labels: Vec<&str> = actions.iter().map(|(label, _)| label.as_str()).collect();
        let choice = Select::new()
            .with_prompt(format!(
                "{} ({})",
                level.display_name(),
                session.selector.selection().describe()
            ))
            .items(&labels)
            .default(default)
            .interact()?;

        match actions.swap_remove(choice).1 {
            Action::Choose(option_id) => {
                if let Some(pending) = session.selector.select(level, option_id)? {
                    session.wait(pending).await;
                }
                focus = level.next();
            }
            Action::ShowParts => {
                let selection = session.selector.selection();
                render_results(ctx, selection, &filter(&items, selection, mode));
            }
            Action::Back(parent) => focus = Some(parent),
            Action::StartOver => {
                start_over(&mut session).await?;
                focus = Some(Level::Brand);
            }
            Action::Quit => break,
        }
    }

    if ctx.output.is_verbose() {
        render_metrics(ctx, &session.metrics());
    }
    Ok(())
}

async fn start_over(session: &mut Session) -> Result<()> {
    session.selector.clear();
    let pending = session.selector.start()?;
    session.wait(pending).await;
    Ok(())
}
