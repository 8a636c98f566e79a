//! Match one vehicle against the catalog.

use anyhow::Result;
use fitment_core::catalog::{filter, CatalogItem, FilterMode, FilterResults, FilterSummary};
use fitment_core::compat::MatchVerdict;
use fitment_core::vehicle::VehicleSelection;
use fitment_observability::SelectorMetrics;
use serde::Serialize;

use super::MatchArgs;
use crate::context::Context;
use crate::output::{format_micros, pad, verdict_badge};
use crate::session::Session;

/// Run the match command.
pub async fn run(args: MatchArgs, ctx: &Context) -> Result<()> {
    let names = args.names();
    let (selection, metrics) = if args.ad_hoc {
        (VehicleSelection::from_names(&names)?, None)
    } else {
        let mut session = Session::open(ctx, args.vehicles.as_deref()).await?;
        let selection = session.choose_path(&names).await?;
        (selection, Some(session.metrics()))
    };

    let items = ctx.load_catalog(args.catalog.as_deref())?;
    let mode = filter_mode(ctx, args.strict);
    let results = filter(&items, &selection, mode);
    render_results(ctx, &selection, &results);

    if let Some(metrics) = metrics.filter(|_| ctx.output.is_verbose()) {
        render_metrics(ctx, &metrics);
    }
    Ok(())
}

/// `--strict` wins over `[filter] mode`.
pub fn filter_mode(ctx: &Context, strict: bool) -> FilterMode {
    if strict {
        FilterMode::StrictCompatibleOnly
    } else {
        ctx.config.filter.mode
    }
}

#[derive(Serialize)]
struct ResultRow<'a> {
    id: &'a str,
    sku: &'a str,
    name: &'a str,
    #[serde(flatten)]
    verdict: &'a MatchVerdict,
}

#[derive(Serialize)]
struct ResultsReport<'a> {
    vehicle: &'a VehicleSelection,
    mode: FilterMode,
    summary: FilterSummary,
    items: Vec<ResultRow<'a>>,
}

/// Print filtered items with their badges.
pub fn render_results(
    ctx: &Context,
    selection: &VehicleSelection,
    results: &FilterResults<'_, CatalogItem>,
) {
    if ctx.output.is_json() {
        ctx.output.json(&ResultsReport {
            vehicle: selection,
            mode: results.mode,
            summary: results.summary,
            items: results
                .items
                .iter()
                .map(|entry| ResultRow {
                    id: entry.item.id.as_str(),
                    sku: &entry.item.sku,
                    name: &entry.item.name,
                    verdict: &entry.verdict,
                })
                .collect(),
        });
        return;
    }

    ctx.output.header(&format!("Parts for {}", selection.describe()));
    let summary = results.summary;
    ctx.output.info(&format!(
        "{} fit, {} to check, {} do not fit ({} parts)",
        summary.compatible, summary.partial_unknown, summary.incompatible, summary.total
    ));
    if results.is_empty() {
        ctx.output.warn("No parts to show");
        return;
    }

    let sku_width = results
        .items
        .iter()
        .map(|e| e.item.sku.len())
        .max()
        .unwrap_or(0)
        .max(3);
    println!();
    for entry in &results.items {
        let badge = pad(&verdict_badge(entry.verdict.compatibility), 18);
        ctx.output.table_row(
            &[&badge, &entry.item.sku, &entry.item.name],
            &[18, sku_width, 0],
        );
        ctx.output.debug(&format!("    {}", entry.verdict.reason));
    }
}

/// Print fetch counters per level.
pub fn render_metrics(ctx: &Context, metrics: &SelectorMetrics) {
    ctx.output.header("Options fetches");
    for (level, m) in &metrics.levels {
        ctx.output.kv(
            level,
            &format!(
                "{} issued, {} applied, {} failed, {} stale, avg {}",
                m.issued,
                m.applied,
                m.failed,
                m.stale,
                m.avg_fetch_us().map_or_else(|| "-".to_string(), format_micros)
            ),
        );
    }
}
