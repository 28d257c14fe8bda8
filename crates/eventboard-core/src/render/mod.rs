//! HTML rendering of the event listing.
//!
//! [`render`] turns an ordered slice of events into one static page:
//!
//! - a fixed preamble (stylesheet, inline CSS, the redirect banner script)
//! - a month separator whenever the month-year of the start date changes
//! - one block per event with its date range, title, location and icons
//!
//! External links never open directly. Clicking one shows the event's
//! redirect banner for five seconds and then opens the link in a new tab.
//!
//! Rendering is a pure function of its inputs, so the same events always
//! produce byte-identical pages.

use std::fmt;

use crate::color::{ColorTable, text_color_for};
use crate::event::CalendarEvent;
use crate::links::{DescriptionLinks, NO_LOCATION, map_search_url, short_location};
use crate::time::date_range_label;

/// Label shown when an event has no start time.
pub const NO_DATE: &str = "TBA";

/// Document head, inline styles, the click handler and the opening list tag.
pub const PREAMBLE: &str = r#"<html>
<head>
<link rel="stylesheet" type="text/css" href="/events-calendar/css/calendar_style.css">
<style>
.event-container { position: relative; }
.redirect-banner { display: none; background-color: red; color: white; text-align: center; padding: 10px; width: 100%; position: absolute; top: 0; left: 0; z-index: 1001; animation: blinker 1s linear infinite; }
@keyframes blinker { 50% { opacity: 0; } }
ul { list-style-type: none; padding: 0; margin: 0; }
.event { background-color: #ffffff; margin-bottom: 10px; padding: 10px; white-space: nowrap; overflow: hidden; text-overflow: ellipsis; }
.event div { display: flex; align-items: center; justify-content: center; }
.icon-container { display: flex; gap: 5px; }
.month-separator { text-align: center; margin: 20px 0; font-weight: bold; font-size: 1.5em; color: #333; }
@media (min-width: 601px) { .event { display: grid; grid-template-columns: auto auto auto auto; } }
@media (max-width: 600px) { .event { display: flex; flex-direction: column; } }
</style>
<script>
function handleClick(url, eventContainerId, event) {
    event.preventDefault();
    var redirectBanner = document.getElementById('redirectBanner-' + eventContainerId);
    redirectBanner.style.display = 'block';
    setTimeout(function() {
        window.open(url, '_blank');
        redirectBanner.style.display = 'none';
    }, 5000);
}
</script>
</head>
<body>
<ul>
"#;

/// Closing tags after the last event.
pub const POSTAMBLE: &str = "</ul>\n</body>\n</html>\n";

/// Text of the per-event redirect banner.
const BANNER_TEXT: &str = "Redirecting, please ensure popups are enabled...";

/// A rendered HTML document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPage(String);

impl RenderedPage {
    /// Returns the HTML.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the HTML as bytes, for upload.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Size of the document in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if the document is empty. Rendered pages never are.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consumes the page, returning the HTML.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for RenderedPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Icon shown next to an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Icon {
    /// Tournament registration.
    Register,
    /// Generic external link.
    Link,
    /// Lane pattern sheet attachment.
    Pattern,
    /// Any other attachment, usually an entry form.
    Entry,
}

impl Icon {
    /// Image path, relative to the published page.
    pub fn image(&self) -> &'static str {
        match self {
            Self::Register => "register.png",
            Self::Link => "link.png",
            Self::Pattern => "pattern.png",
            Self::Entry => "entry.png",
        }
    }

    /// Alt text for the image.
    pub fn alt(&self) -> &'static str {
        match self {
            Self::Register => "Register",
            Self::Link => "Link",
            Self::Pattern => "Pattern",
            Self::Entry => "Attachment",
        }
    }
}

/// Renders the full page for an ordered slice of events.
pub fn render(events: &[CalendarEvent], colors: &ColorTable) -> RenderedPage {
    let mut html = String::with_capacity(PREAMBLE.len() + events.len() * 1024);
    html.push_str(PREAMBLE);

    let mut last_month: Option<String> = None;
    for (index, event) in events.iter().enumerate() {
        if let Some(month) = event.start.as_ref().map(|s| s.month_label())
            && last_month.as_deref() != Some(month.as_str())
        {
            html.push_str(&month_separator(&month));
            last_month = Some(month);
        }
        html.push_str(&event_block(index, event, colors));
    }

    html.push_str(POSTAMBLE);
    RenderedPage(html)
}

/// Section header for a month-year label.
fn month_separator(label: &str) -> String {
    format!(
        "<div class=\"month-separator\"><h2>{}</h2></div>\n",
        html_escape(label)
    )
}

/// Renders one event block. `index` makes the container id unique on the page.
pub(crate) fn event_block(index: usize, event: &CalendarEvent, colors: &ColorTable) -> String {
    let container = format!("event-container-{index}");

    let date_range = date_range_label(event.start.as_ref(), event.end.as_ref())
        .unwrap_or_else(|| NO_DATE.to_string());

    let title = html_escape(event.display_title());
    let title_html = match event.html_link.as_deref() {
        Some(link) => format!(
            "<a href=\"{}\" style=\"text-decoration: none; color: inherit;\" onclick=\"{}\">{}</a>",
            html_escape(link),
            click_handler(link, &container),
            title
        ),
        None => title,
    };

    let location = short_location(event.location.as_deref());
    let location_html = if location == NO_LOCATION {
        NO_LOCATION.to_string()
    } else {
        let url = map_search_url(location);
        format!(
            "<a href=\"{}\" onclick=\"{}\">{}</a>",
            html_escape(&url),
            click_handler(&url, &container),
            html_escape(location)
        )
    };

    let icons: String = event_icons(event)
        .iter()
        .map(|(icon, url)| icon_link(*icon, url, &container))
        .collect();
    let icons_html = if icons.is_empty() {
        String::new()
    } else {
        format!("<div class=\"icon-container\">{icons}</div>\n")
    };

    let background = colors.color_for(event.color_id.as_ref());
    let foreground = text_color_for(background);

    format!(
        "<div id=\"{container}\" class=\"event-container\">\n\
         <div id=\"redirectBanner-{container}\" class=\"redirect-banner\">{BANNER_TEXT}</div>\n\
         <li class=\"event\" style=\"background-color: {background}; color: {foreground};\">\n\
         <div>{date_range}</div>\n\
         <div>{title_html}</div>\n\
         <div>{location_html}</div>\n\
         {icons_html}\
         </li>\n\
         </div>\n"
    )
}

/// Icons for an event in display order: register, link, then attachments.
pub fn event_icons(event: &CalendarEvent) -> Vec<(Icon, String)> {
    let links = DescriptionLinks::extract(event.description.as_deref().unwrap_or_default());
    let mut icons = Vec::new();

    if let Some(url) = links.register {
        icons.push((Icon::Register, url));
    }
    if let Some(url) = links.other {
        icons.push((Icon::Link, url));
    }
    for attachment in &event.attachments {
        if let Some(url) = &attachment.file_url {
            let icon = if attachment.is_pattern() {
                Icon::Pattern
            } else {
                Icon::Entry
            };
            icons.push((icon, url.clone()));
        }
    }

    icons
}

fn icon_link(icon: Icon, url: &str, container: &str) -> String {
    format!(
        "<a href=\"{}\" target=\"_blank\" onclick=\"{}\"><img src=\"{}\" alt=\"{}\" style=\"border:0;\"></a>",
        html_escape(url),
        click_handler(url, container),
        icon.image(),
        icon.alt()
    )
}

/// Inline `onclick` value that routes a link through the redirect banner.
fn click_handler(url: &str, container: &str) -> String {
    format!(
        "handleClick('{}', '{}', event);",
        html_escape(&js_string_escape(url)),
        container
    )
}

/// Escapes text for HTML display.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Escapes text for use inside a single-quoted JavaScript string.
pub fn js_string_escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('\'', "\\'")
}


#[cfg(test)]
mod golden_tests;
