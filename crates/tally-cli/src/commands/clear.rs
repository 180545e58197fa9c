use anyhow::{Context, Result};
use colored::Colorize;
use std::io::{self, BufRead, Write};

use tally_application::UiEvents;

use crate::context::AppContext;

pub fn run(context: &AppContext, yes: bool) -> Result<()> {
    let store = context.open_store(UiEvents::detached())?;

    if store.is_empty() {
        println!("{}", "Inventory is already empty.".dimmed());
        return Ok(());
    }
    if !yes && !confirm(&format!("Delete all {} record(s)?", store.len()))? {
        println!("Aborted.");
        return Ok(());
    }

    store.clear();
    println!("{}", "Inventory cleared.".green());
    Ok(())
}

fn confirm(question: &str) -> Result<bool> {
    print!("{} [y/N] ", question);
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin()
        .lock()
        .read_line(&mut answer)
        .context("Failed to read confirmation")?;

    Ok(matches!(answer.trim(), "y" | "Y" | "yes" | "YES"))
}
