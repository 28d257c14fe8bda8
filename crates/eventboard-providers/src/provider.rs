//! EventSource trait definition.
//!
//! An [`EventSource`] answers one page of an upcoming-events query at a time.
//! Paging itself is driven by [`EventPager`](crate::pager::EventPager), so a
//! source never loops and never buffers more than the page it was asked for.

use std::future::Future;
use std::pin::Pin;

use chrono::{DateTime, Utc};
use eventboard_core::CalendarEvent;

use crate::error::ProviderResult;

/// A boxed future for async trait methods.
///
/// Keeps the traits in this crate object-safe so the runner can hold a
/// `dyn EventSource` and tests can swap in scripted sources.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// One request in a paginated upcoming-events query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// Calendar to read, e.g. "primary" or a calendar email address.
    pub calendar_id: String,
    /// Only events ending after this instant are returned.
    pub time_min: DateTime<Utc>,
    /// Continuation token from the previous page; `None` for the first page.
    pub page_token: Option<String>,
}

impl PageRequest {
    /// Creates the request for the first page.
    pub fn first(calendar_id: impl Into<String>, time_min: DateTime<Utc>) -> Self {
        Self {
            calendar_id: calendar_id.into(),
            time_min,
            page_token: None,
        }
    }

    /// Returns the request for the page after this one.
    pub fn next(&self, page_token: impl Into<String>) -> Self {
        Self {
            calendar_id: self.calendar_id.clone(),
            time_min: self.time_min,
            page_token: Some(page_token.into()),
        }
    }
}

/// A single page of events, in provider order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventPage {
    pub items: Vec<CalendarEvent>,
    /// Present while more pages remain.
    pub next_page_token: Option<String>,
}

impl EventPage {
    /// Creates a final page.
    pub fn last(items: Vec<CalendarEvent>) -> Self {
        Self {
            items,
            next_page_token: None,
        }
    }

    /// Builder method to mark that another page follows.
    pub fn with_next_page_token(mut self, token: impl Into<String>) -> Self {
        self.next_page_token = Some(token.into());
        self
    }
}

/// A backend that serves upcoming events page by page.
///
/// # Example Implementation
///
/// ```ignore
/// impl EventSource for FixedSource {
///     fn name(&self) -> &str { "fixed" }
///
///     fn fetch_page(&self, _request: PageRequest) -> BoxFuture<'_, ProviderResult<EventPage>> {
///         let page = EventPage::last(self.events.clone());
///         Box::pin(async move { Ok(page) })
///     }
/// }
/// ```
pub trait EventSource: Send + Sync {
    /// Returns the name of this source, used in logs and error messages.
    fn name(&self) -> &str;

    /// Fetches one page.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError` on network errors, authentication failures,
    /// unexpected statuses or malformed responses.
    fn fetch_page(&self, request: PageRequest) -> BoxFuture<'_, ProviderResult<EventPage>>;
}

impl<S: EventSource + ?Sized> EventSource for std::sync::Arc<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn fetch_page(&self, request: PageRequest) -> BoxFuture<'_, ProviderResult<EventPage>> {
        (**self).fetch_page(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn next_request_keeps_query() {
        let time_min = Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap();
        let first = PageRequest::first("primary", time_min);
        assert!(first.page_token.is_none());

        let second = first.next("tok-2");
        assert_eq!(second.calendar_id, "primary");
        assert_eq!(second.time_min, time_min);
        assert_eq!(second.page_token.as_deref(), Some("tok-2"));
    }

    #[test]
    fn page_builder() {
        let page = EventPage::last(vec![]).with_next_page_token("more");
        assert!(page.items.is_empty());
        assert_eq!(page.next_page_token.as_deref(), Some("more"));
        assert!(EventPage::default().next_page_token.is_none());
    }
}
