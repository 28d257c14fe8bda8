//! Lazy pagination over an [`EventSource`].

use chrono::{DateTime, Utc};
use eventboard_core::CalendarEvent;
use tracing::debug;

use crate::error::ProviderResult;
use crate::provider::{EventSource, PageRequest};

#[derive(Debug)]
enum Cursor {
    Start,
    Next(String),
    Done,
}

/// One sweep through the upcoming events of a calendar.
///
/// Pages are requested only when asked for. The pager is one-shot: once the
/// last page has been returned, or a fetch has failed, it yields nothing more.
/// Create a new pager for every sweep.
pub struct EventPager<'a> {
    source: &'a dyn EventSource,
    calendar_id: String,
    time_min: DateTime<Utc>,
    cursor: Cursor,
    pages: usize,
}

impl<'a> EventPager<'a> {
    pub fn new(
        source: &'a dyn EventSource,
        calendar_id: impl Into<String>,
        time_min: DateTime<Utc>,
    ) -> Self {
        Self {
            source,
            calendar_id: calendar_id.into(),
            time_min,
            cursor: Cursor::Start,
            pages: 0,
        }
    }

    /// Returns true once no further page will be requested.
    pub fn is_exhausted(&self) -> bool {
        matches!(self.cursor, Cursor::Done)
    }

    /// Fetches the next page, or returns `None` when the sweep is over.
    ///
    /// # Errors
    ///
    /// Propagates the source's error. The pager is exhausted afterwards.
    pub async fn next_page(&mut self) -> ProviderResult<Option<Vec<CalendarEvent>>> {
        let page_token = match std::mem::replace(&mut self.cursor, Cursor::Done) {
            Cursor::Done => return Ok(None),
            Cursor::Start => None,
            Cursor::Next(token) => Some(token),
        };

        let request = PageRequest {
            calendar_id: self.calendar_id.clone(),
            time_min: self.time_min,
            page_token,
        };
        let page = self.source.fetch_page(request).await?;
        self.pages += 1;

        debug!(
            source = self.source.name(),
            page = self.pages,
            events = page.items.len(),
            more = page.next_page_token.is_some(),
            "fetched event page"
        );

        if let Some(token) = page.next_page_token {
            self.cursor = Cursor::Next(token);
        }
        Ok(Some(page.items))
    }

    /// Drains every remaining page into one list, preserving order.
    ///
    /// # Errors
    ///
    /// Fails with the first page error; events from earlier pages are dropped.
    pub async fn collect_all(mut self) -> ProviderResult<Vec<CalendarEvent>> {
        let mut events = Vec::new();
        while let Some(items) = self.next_page().await? {
            events.extend(items);
        }
        Ok(events)
    }
}
