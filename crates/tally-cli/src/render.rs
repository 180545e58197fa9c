//! Terminal rendering of inventory data and UI events.

use chrono::Local;
use colored::Colorize;
use std::io::Write;

use tally_core::inventory::ScanRecord;
use tally_core::session::{SessionState, Severity, UiEvent};

pub fn print_event(event: &UiEvent) {
    match event {
        UiEvent::Notification {
            message,
            severity: Severity::Info,
            ..
        } => println!("{} {}", "+".green(), message),
        UiEvent::Notification {
            message,
            severity: Severity::Error,
            ..
        } => eprintln!("{}", message.red()),
        UiEvent::SessionStateChanged { state } => match state {
            SessionState::Starting => println!("{}", "Starting scanner...".dimmed()),
            SessionState::Active => {
                println!("{}", "Scanner ready. Scan barcodes, Ctrl-C to stop.".cyan())
            }
            SessionState::Stopping => {}
            SessionState::Idle => println!("{}", "Scanner stopped.".dimmed()),
        },
        UiEvent::Haptic { .. } => {
            // Terminal bell stands in for a vibration.
            print!("\x07");
            let _ = std::io::stdout().flush();
        }
        UiEvent::InventoryChanged { .. } | UiEvent::PreviewVisibility { .. } => {}
    }
}

pub fn print_records(records: &[ScanRecord]) {
    if records.is_empty() {
        println!("{}", "Inventory is empty.".dimmed());
        return;
    }

    let width = records
        .iter()
        .map(|r| r.code.chars().count())
        .max()
        .unwrap_or(0);
    for record in records {
        let observed = record.observed_at.with_timezone(&Local);
        println!(
            "{:>13}  {:<width$}  {:<10}  {}",
            record.id.to_string().yellow(),
            record.code,
            record.format,
            observed.format("%Y-%m-%d %H:%M:%S"),
            width = width,
        );
    }
    println!("{}", format!("{} record(s)", records.len()).dimmed());
}
