//! Interactive queue command

use anyhow::Result;
use log::info;
use std::path::Path;

use crate::cli::{build_gateway, load_context};

pub async fn handle_queue_command(config_path: &Path) -> Result<()> {
    let ctx = load_context(config_path)?;
    let gateway = build_gateway(&ctx)?;
    info!("Starting review queue for list {}", ctx.deals_list());

    crate::tui::run(&ctx, &gateway).await?;

    let stats = gateway.stats().await;
    info!(
        "Session ended: {} cache hits, {} misses",
        stats.hits, stats.misses
    );
    Ok(())
}
