use anyhow::Result;
use colored::Colorize;

use tally_application::UiEvents;
use tally_core::inventory::RecordId;

use crate::context::AppContext;

pub fn run(context: &AppContext, id: RecordId) -> Result<()> {
    let store = context.open_store(UiEvents::detached())?;

    if store.delete_by_id(id) {
        println!("{} {}", "Deleted".green(), id);
    } else {
        println!("{}", format!("No record with id {}", id).yellow());
    }

    Ok(())
}
