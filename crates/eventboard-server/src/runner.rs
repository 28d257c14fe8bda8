//! The poll, render and publish loop.

use std::time::Duration;

use chrono::Utc;
use eventboard_core::{CalendarEvent, ColorTable, RenderedPage, render};
use eventboard_providers::{EventPager, EventSource, ProviderResult};
use tracing::{debug, error, info};

use crate::config::RunnerConfig;
use crate::error::ServerResult;
use crate::publisher::Publisher;
use crate::signals::ShutdownSignal;

/// What a single cycle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleReport {
    /// Events fetched and rendered.
    pub events: usize,
    /// Size of the rendered page.
    pub bytes: usize,
    /// Whether the publisher accepted the page.
    pub published: bool,
}

/// Drives fetch, render and publish on a fixed interval.
pub struct Runner<S, P> {
    source: S,
    publisher: P,
    colors: ColorTable,
    calendar_id: String,
    poll_interval: Duration,
}

impl<S, P> Runner<S, P>
where
    S: EventSource,
    P: Publisher,
{
    pub fn new(source: S, publisher: P, config: &RunnerConfig) -> Self {
        Self {
            source,
            publisher,
            colors: ColorTable::new(),
            calendar_id: config.calendar_id.clone(),
            poll_interval: config.poll_interval,
        }
    }

    /// Fetches every upcoming event, starting from now.
    pub async fn fetch(&self) -> ProviderResult<Vec<CalendarEvent>> {
        EventPager::new(&self.source, self.calendar_id.as_str(), Utc::now())
            .collect_all()
            .await
    }

    /// Renders the page for `events`.
    pub fn render(&self, events: &[CalendarEvent]) -> RenderedPage {
        render(events, &self.colors)
    }

    /// Runs one fetch, render and publish.
    ///
    /// A fetch failure is returned. A publish failure is logged and reported
    /// through [`CycleReport::published`]; the next cycle retries.
    pub async fn run_cycle(&self) -> ServerResult<CycleReport> {
        let events = self.fetch().await?;
        let page = self.render(&events);
        debug!(events = events.len(), bytes = page.len(), "page rendered");

        let published = match self.publisher.publish(&page).await {
            Ok(()) => true,
            Err(e) => {
                error!(error = %e, "publish failed");
                false
            }
        };

        Ok(CycleReport {
            events: events.len(),
            bytes: page.len(),
            published,
        })
    }

    /// Runs cycles until `shutdown` fires or a cycle fails.
    ///
    /// The interval is measured from the end of one cycle to the start of the
    /// next. Shutdown interrupts both the sleep and an in-flight cycle.
    pub async fn run(&self, shutdown: ShutdownSignal) -> ServerResult<()> {
        info!(
            source = self.source.name(),
            calendar = %self.calendar_id,
            interval_secs = self.poll_interval.as_secs(),
            "publish loop started"
        );

        let shutdown = shutdown.wait();
        tokio::pin!(shutdown);
        let mut cycles: u64 = 0;

        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    info!("shutdown requested");
                    break;
                }
                result = self.run_cycle() => {
                    let report = result.inspect_err(|e| error!(error = %e, "cycle failed, stopping"))?;
                    cycles += 1;
                    info!(
                        cycle = cycles,
                        events = report.events,
                        bytes = report.bytes,
                        published = report.published,
                        "cycle complete"
                    );
                }
            }

            tokio::select! {
                biased;
                _ = &mut shutdown => break,
                _ = tokio::time::sleep(self.poll_interval) => {}
            }
        }

        info!(cycles, "publish loop stopped");
        Ok(())
    }
}
