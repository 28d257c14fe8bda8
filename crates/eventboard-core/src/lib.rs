//! Core types: event times, events, colors, description links, page rendering

pub mod color;
pub mod event;
pub mod links;
pub mod render;
pub mod time;
pub mod tracing;

pub use color::{ColorId, ColorTable, relative_luminance, text_color_for};
pub use event::{Attachment, CalendarEvent, EventSummary, SummaryUrls};
pub use links::{DescriptionLinks, map_search_url, short_location};
pub use render::{Icon, RenderedPage, html_escape, js_string_escape, render};
pub use time::{EventTime, date_range_label};
pub use self::tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};
