use anyhow::Result;
use colored::Colorize;
use std::process::ExitCode;
use std::sync::Arc;

use tally_application::{SessionController, SessionSettings, StartOutcome, UiEvents};
use tally_infrastructure::engine::CLOSE_COMMAND;
use tally_infrastructure::LineEngineFactory;

use crate::context::AppContext;
use crate::render;

/// Runs one scan session fed by standard input.
///
/// Ctrl-C stops the session. End of input is the engine closing on its own.
pub async fn run(context: &AppContext) -> Result<ExitCode> {
    let (events, mut receiver) = UiEvents::channel();
    let store = context.open_store(events.clone())?;
    let controller = SessionController::new(
        Arc::new(LineEngineFactory::stdin()),
        store.clone(),
        events,
        SessionSettings::from_config(&context.config),
    );

    let printer = tokio::spawn(async move {
        while let Some(event) = receiver.recv().await {
            render::print_event(&event);
        }
    });

    if context.config.scanner.show_close_button {
        println!("{}", format!("Type {} to finish.", CLOSE_COMMAND).dimmed());
    }

    let mut session = tokio::spawn({
        let controller = controller.clone();
        async move { controller.start().await }
    });
    let outcome = tokio::select! {
        outcome = &mut session => outcome?,
        _ = tokio::signal::ctrl_c() => {
            tracing::debug!("Interrupted, stopping scan session");
            controller.stop().await;
            session.await?
        }
    };

    if outcome == StartOutcome::Launched {
        println!("{}", "Input closed. Press Ctrl-C to end the session.".dimmed());
        tokio::signal::ctrl_c().await?;
        controller.stop().await;
    }

    let total = store.len();
    drop(controller);
    drop(store);
    let _ = printer.await;

    match summary(&outcome, total) {
        Some(line) => {
            println!("{}", line);
            Ok(ExitCode::SUCCESS)
        }
        None => Ok(ExitCode::FAILURE),
    }
}

/// Closing line for a finished session. `None` for failures, which the session
/// already reported as an error notification.
fn summary(outcome: &StartOutcome, total: usize) -> Option<String> {
    match outcome {
        StartOutcome::Failed(_) => None,
        StartOutcome::Cancelled => Some("Scan cancelled.".to_string()),
        StartOutcome::AlreadyRunning | StartOutcome::CoolingDown => {
            Some("Scanner is busy, try again.".to_string())
        }
        StartOutcome::Launched | StartOutcome::Ended | StartOutcome::Stopped => {
            Some(format!("{} record(s) in inventory.", total))
        }
    }
}
