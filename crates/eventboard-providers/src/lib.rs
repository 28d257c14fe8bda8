//! Calendar access for eventboard.
//!
//! - [`EventSource`] - one page of upcoming events per call
//! - [`EventPager`] - lazy, one-shot sweep over all pages of a source
//! - [`google`] - OAuth, token storage and the Calendar API client
//! - [`ProviderError`] - error type shared by all of the above
//!
//! ```text
//! token.json ──► Authenticator ──► CalendarSession ──► EventPager ──► Vec<CalendarEvent>
//!                    │                   │
//!                AuthFlow           GoogleCalendarClient
//!            (consent/refresh)       (events.list)
//! ```

pub mod error;
#[cfg(feature = "google")]
pub mod google;
pub mod pager;
pub mod provider;

pub use error::{ProviderError, ProviderErrorCode, ProviderResult};
pub use pager::EventPager;
pub use provider::{BoxFuture, EventPage, EventSource, PageRequest};
