//! `eventboard events`: print upcoming events as JSON.

use eventboard_core::{ColorTable, EventSummary};
use eventboard_server::RunnerConfig;

use crate::error::{ClientError, ClientResult};

pub async fn run(config: &RunnerConfig) -> ClientResult<()> {
    let session = super::open_session(config).await?;
    let events = session.upcoming(&config.calendar_id).collect_all().await?;

    let colors = ColorTable::new();
    let summaries: Vec<EventSummary> = events
        .iter()
        .map(|event| EventSummary::from_event(event, &colors))
        .collect();

    let json = serde_json::to_string_pretty(&summaries)
        .map_err(|e| ClientError::Output(format!("failed to serialize events: {}", e)))?;
    println!("{}", json);
    Ok(())
}
