//! Batch summary command

use anyhow::{Context, Result, bail};
use colored::*;
use log::{info, warn};
use serde_json::{Map, Value, json};
use std::fs;
use std::path::Path;

use crate::api::CrmGateway;
use crate::cli::{OutputFormat, SummaryArgs, build_gateway, load_context};
use crate::services::summary::TOTAL;
use crate::services::{Enricher, EntryLoader, ReviewCounts, StatusSummary, summarize};

pub async fn handle_summary_command(config_path: &Path, args: SummaryArgs) -> Result<()> {
    let ctx = load_context(config_path)?;
    let gateway = build_gateway(&ctx)?;

    let loader = EntryLoader::fetch(&gateway, ctx.deals_list(), ctx.config.api.page_size).await;
    if loader.total() == 0 {
        for error in gateway.take_errors() {
            eprintln!("{}", error.red());
        }
        bail!("Failed to fetch list entries or no entries found");
    }

    let enricher = Enricher::new(&gateway, &ctx.field_map, ctx.tracking_list());
    let deals = loader.load_all(&enricher).await;
    let errors = gateway.take_errors();
    if !errors.is_empty() {
        warn!("{} requests failed while loading; counts may be incomplete", errors.len());
    }
    info!("Summarizing {} deals", deals.len());

    let summary = summarize(&deals, &ctx.roles, &ctx.config.profiles, &ctx.config.categories);
    let rendered = match args.format {
        OutputFormat::Table => render_table(&summary),
        OutputFormat::Csv => render_csv(&summary)?,
        OutputFormat::Json => render_json(&summary)?,
    };

    match args.output {
        Some(path) => {
            fs::write(&path, rendered)
                .with_context(|| format!("Failed to write summary to {}", path.display()))?;
            println!("Summary written to {}", path.display().to_string().cyan());
        }
        None => println!("{}", rendered),
    }
    Ok(())
}

fn counts_text(counts: ReviewCounts) -> String {
    format!("{}/{}", counts.reviewed, counts.unreviewed)
}

/// Aligned grid with reviewed/unreviewed pairs in each cell
pub fn render_table(summary: &StatusSummary) -> String {
    let rows = summary.rows();
    let profile_width = rows
        .iter()
        .map(|r| r.profile.len())
        .max()
        .unwrap_or(0)
        .max("Profile".len());
    let mut widths: Vec<usize> = summary
        .categories()
        .iter()
        .enumerate()
        .map(|(i, category)| {
            rows.iter()
                .map(|r| counts_text(r.cells[i].1).len())
                .max()
                .unwrap_or(0)
                .max(category.len())
        })
        .collect();
    widths.push(
        rows.iter()
            .map(|r| counts_text(r.total).len())
            .max()
            .unwrap_or(0)
            .max(TOTAL.len()),
    );

    let mut out = String::new();
    let mut header = format!("{:<width$}", "Profile", width = profile_width);
    for (name, width) in summary
        .categories()
        .iter()
        .map(String::as_str)
        .chain(std::iter::once(TOTAL))
        .zip(&widths)
    {
        header.push_str(&format!("  {:>width$}", name, width = width));
    }
    out.push_str(&header.bold().to_string());
    out.push('\n');

    for row in &rows {
        let mut line = format!("{:<width$}", row.profile, width = profile_width);
        let cells = row.cells.iter().map(|(_, c)| *c).chain(std::iter::once(row.total));
        for (counts, width) in cells.zip(&widths) {
            line.push_str(&format!("  {:>width$}", counts_text(counts), width = width));
        }
        if row.profile == TOTAL {
            out.push_str(&line.bold().to_string());
        } else {
            out.push_str(&line);
        }
        out.push('\n');
    }
    out.push_str(&"reviewed/not reviewed".dimmed().to_string());
    out
}

/// Long format: one record per profile and category, totals included
pub fn render_csv(summary: &StatusSummary) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["profile", "category", "reviewed", "unreviewed", "total"])?;
    for row in summary.rows() {
        let cells = row
            .cells
            .iter()
            .map(|(category, counts)| (category.as_str(), *counts))
            .chain(std::iter::once((TOTAL, row.total)));
        for (category, counts) in cells {
            writer.write_record([
                row.profile.clone(),
                category.to_string(),
                counts.reviewed.to_string(),
                counts.unreviewed.to_string(),
                counts.total().to_string(),
            ])?;
        }
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to flush CSV output: {}", e.error()))?;
    String::from_utf8(bytes).context("CSV output was not valid UTF-8")
}

pub fn render_json(summary: &StatusSummary) -> Result<String> {
    let rows: Vec<Value> = summary
        .rows()
        .into_iter()
        .map(|row| {
            let categories: Map<String, Value> = row
                .cells
                .into_iter()
                .map(|(category, counts)| (category, json!(counts)))
                .collect();
            json!({
                "profile": row.profile,
                "categories": categories,
                "total": row.total,
            })
        })
        .collect();
    serde_json::to_string_pretty(&rows).context("Failed to format JSON output")
}
