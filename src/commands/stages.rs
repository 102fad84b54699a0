//! `dealboard stages`: print the stage catalog in board order.

use anyhow::{Context, Result};
use colored::Colorize;

use crate::config::Config;
use crate::models::StageCatalog;

use super::common::{open_store, outcome_marker};

pub fn execute(config: &Config, demo: bool) -> Result<()> {
    let store = open_store(config, demo)?;
    let catalog = StageCatalog::new(store.fetch_stages().context("Failed to fetch stages")?);

    if catalog.is_empty() {
        println!("(no stages defined)");
        return Ok(());
    }

    println!("{}", "Pipeline stages".bold());
    let key_width = catalog.iter().map(|s| s.key.len()).max().unwrap_or(0);
    for (position, stage) in catalog.iter().enumerate() {
        let key = format!("{:width$}", stage.key, width = key_width);
        let marker = match outcome_marker(stage) {
            "won" => " [won]".green(),
            "lost" => " [lost]".red(),
            _ => "".normal(),
        };
        println!(
            "  {:>2}. {}  {}{}  {}",
            position + 1,
            key.bold(),
            stage.label,
            marker,
            stage.id.dimmed()
        );
    }
    Ok(())
}
