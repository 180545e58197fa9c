use anyhow::Result;

use tally_application::UiEvents;

use crate::context::AppContext;
use crate::render;

pub fn run(context: &AppContext) -> Result<()> {
    let store = context.open_store(UiEvents::detached())?;
    render::print_records(&store.records());
    Ok(())
}
