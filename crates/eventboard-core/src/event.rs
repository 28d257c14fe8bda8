//! Event types for calendar events.
//!
//! - [`CalendarEvent`]: one upcoming event as read from the provider
//! - [`Attachment`]: a file attached to an event
//! - [`EventSummary`]: the display-ready projection used for JSON output

use serde::{Deserialize, Serialize};

use crate::color::{ColorId, ColorTable, text_color_for};
use crate::links::{DescriptionLinks, short_location};
use crate::time::EventTime;

/// Title shown when an event has no summary.
pub const NO_TITLE: &str = "No Title";

/// A file attached to a calendar event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// The attachment title (usually the file name).
    pub title: String,
    /// Link to the file, if the provider exposed one.
    pub file_url: Option<String>,
}

impl Attachment {
    /// Creates a new attachment.
    pub fn new(title: impl Into<String>, file_url: Option<String>) -> Self {
        Self {
            title: title.into(),
            file_url,
        }
    }

    /// Returns true if the title marks this as a lane pattern sheet.
    pub fn is_pattern(&self) -> bool {
        self.title.to_lowercase().contains("pattern")
    }
}

/// An upcoming calendar event.
///
/// Every field besides the identifier may be missing; rendering falls back to
/// defaults instead of rejecting the event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    /// Provider identifier.
    pub id: String,
    /// Event title.
    pub title: Option<String>,
    /// Start time.
    pub start: Option<EventTime>,
    /// End time.
    pub end: Option<EventTime>,
    /// Free-text location.
    pub location: Option<String>,
    /// HTML description, possibly containing anchors.
    pub description: Option<String>,
    /// Canonical page for the event on the provider's site.
    pub html_link: Option<String>,
    /// Display color tag.
    pub color_id: Option<ColorId>,
    /// Attached files.
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

impl CalendarEvent {
    /// Creates an event with only an identifier and a start time.
    pub fn new(id: impl Into<String>, start: EventTime) -> Self {
        Self {
            id: id.into(),
            title: None,
            start: Some(start),
            end: None,
            location: None,
            description: None,
            html_link: None,
            color_id: None,
            attachments: Vec::new(),
        }
    }

    /// Builder method to set the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Builder method to set the end time.
    pub fn with_end(mut self, end: EventTime) -> Self {
        self.end = Some(end);
        self
    }

    /// Builder method to set the location.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Builder method to set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Builder method to set the event page link.
    pub fn with_html_link(mut self, link: impl Into<String>) -> Self {
        self.html_link = Some(link.into());
        self
    }

    /// Builder method to set the color id.
    pub fn with_color(mut self, color_id: ColorId) -> Self {
        self.color_id = Some(color_id);
        self
    }

    /// Builder method to add an attachment.
    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    /// Returns the title, or [`NO_TITLE`].
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(NO_TITLE)
    }
}

/// Display-ready projection of an event.
///
/// Carries the same derived fields the HTML page shows, for consumers that
/// want the listing as data instead of markup.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSummary {
    pub id: String,
    pub summary: String,
    pub start: Option<EventTime>,
    pub end: Option<EventTime>,
    pub location: String,
    pub location_short: String,
    pub html_link: Option<String>,
    pub background_color: String,
    pub text_color: String,
    pub urls: SummaryUrls,
    pub attachments: Vec<Attachment>,
}

/// Links pulled out of an event description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryUrls {
    pub tenpin_results: Option<String>,
    pub other: Option<String>,
}

impl EventSummary {
    /// Builds the summary for an event using the given color table.
    pub fn from_event(event: &CalendarEvent, colors: &ColorTable) -> Self {
        let background = colors.color_for(event.color_id.as_ref());
        let links = DescriptionLinks::extract(event.description.as_deref().unwrap_or_default());

        Self {
            id: event.id.clone(),
            summary: event.display_title().to_string(),
            start: event.start.clone(),
            end: event.end.clone(),
            location: event.location.clone().unwrap_or_default(),
            location_short: short_location(event.location.as_deref()).to_string(),
            html_link: event.html_link.clone(),
            background_color: background.to_string(),
            text_color: text_color_for(background).to_string(),
            urls: SummaryUrls {
                tenpin_results: links.register,
                other: links.other,
            },
            attachments: event.attachments.clone(),
        }
    }
}
