//! `eventboard render`: build the page once without publishing it.

use std::path::Path;

use eventboard_core::{ColorTable, render};
use eventboard_server::RunnerConfig;
use tracing::info;

use crate::error::ClientResult;

pub async fn run(config: &RunnerConfig, output: Option<&Path>) -> ClientResult<()> {
    let session = super::open_session(config).await?;
    let events = session.upcoming(&config.calendar_id).collect_all().await?;
    let page = render(&events, &ColorTable::new());

    match output {
        Some(path) => {
            std::fs::write(path, page.as_bytes())?;
            info!(path = %path.display(), events = events.len(), bytes = page.len(), "page written");
        }
        None => print!("{}", page),
    }
    Ok(())
}
