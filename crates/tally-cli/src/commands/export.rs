use anyhow::{Context, Result};
use chrono::Local;
use colored::Colorize;
use std::fs;
use std::path::PathBuf;

use tally_application::{CsvOptions, UiEvents};
use tally_core::inventory::InventoryError;

use crate::context::AppContext;

pub fn run(context: &AppContext, output: Option<PathBuf>) -> Result<()> {
    let store = context.open_store(UiEvents::detached())?;
    let options = CsvOptions::from(&context.config.export);

    let export = match store.export_csv(&options, Local::now().date_naive()) {
        Ok(export) => export,
        Err(InventoryError::EmptyExport) => {
            println!("{}", "Nothing to export".yellow());
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    let dir = output.unwrap_or_else(|| PathBuf::from("."));
    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create {}", dir.display()))?;
    let path = dir.join(&export.filename);
    fs::write(&path, export.content)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    tracing::info!(path = %path.display(), records = store.len(), "Inventory exported");
    println!("{} {}", "Exported".green(), path.display());
    Ok(())
}
