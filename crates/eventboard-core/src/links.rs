//! Link and location extraction from event fields.
//!
//! Descriptions are HTML fragments written by whoever maintains the calendar.
//! Anchors pointing at the results site become the "register" icon; any other
//! anchor becomes the generic "link" icon.
//!
//! ```
//! use eventboard_core::links::DescriptionLinks;
//!
//! let links = DescriptionLinks::extract(r#"<a href="https://tenpinresults.example/t/1">Enter</a>"#);
//! assert_eq!(links.register.as_deref(), Some("https://tenpinresults.example/t/1"));
//! assert!(links.other.is_none());
//! ```

use std::sync::LazyLock;

use regex::Regex;

/// Substring identifying a tournament registration link.
pub const REGISTER_MARKER: &str = "tenpinresults";

/// Location shown when an event has none.
pub const NO_LOCATION: &str = "No Location";

/// Base URL for map search links.
const MAP_SEARCH_BASE: &str = "http://maps.google.com/?q=";

/// Regex for anchor `href` values with an http(s) URL.
static HREF_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"href="(https?://[^"\s]+)""#).expect("Invalid href regex")
});

/// Links found in an event description.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DescriptionLinks {
    /// Registration link on the results site.
    pub register: Option<String>,
    /// Any other link. When several are present the last one wins.
    pub other: Option<String>,
}

impl DescriptionLinks {
    /// Scans the description's anchors in document order.
    pub fn extract(description: &str) -> Self {
        let mut links = Self::default();
        for capture in HREF_REGEX.captures_iter(description) {
            let url = capture[1].to_string();
            if url.contains(REGISTER_MARKER) {
                links.register = Some(url);
            } else {
                links.other = Some(url);
            }
        }
        links
    }

    /// Returns true if neither slot was filled.
    pub fn is_empty(&self) -> bool {
        self.register.is_none() && self.other.is_none()
    }
}

/// Shortens a location to the text before its first comma.
///
/// Empty or absent locations yield [`NO_LOCATION`].
pub fn short_location(location: Option<&str>) -> &str {
    match location {
        Some(loc) if !loc.is_empty() => loc.split(',').next().unwrap_or(loc).trim(),
        _ => NO_LOCATION,
    }
}

/// Builds a map search URL for a location name.
pub fn map_search_url(location: &str) -> String {
    format!("{}{}", MAP_SEARCH_BASE, urlencoding::encode(location))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_and_other_links() {
        let description = r#"Entries open. <a href="https://tenpinresults.example/x">Register</a>
            More info <a href="https://other.example/y">here</a>."#;
        let links = DescriptionLinks::extract(description);
        assert_eq!(links.register.as_deref(), Some("https://tenpinresults.example/x"));
        assert_eq!(links.other.as_deref(), Some("https://other.example/y"));
    }

    #[test]
    fn last_other_link_wins() {
        let description = r#"<a href="https://first.example/a">a</a> <a href="https://second.example/b">b</a>"#;
        let links = DescriptionLinks::extract(description);
        assert_eq!(links.other.as_deref(), Some("https://second.example/b"));
        assert!(links.register.is_none());
    }

    #[test]
    fn ignores_bare_urls_and_other_schemes() {
        let description = r#"See https://plain.example/x or <a href="mailto:desk@example.com">mail</a>"#;
        let links = DescriptionLinks::extract(description);
        assert!(links.is_empty());
    }

    #[test]
    fn empty_description() {
        assert!(DescriptionLinks::extract("").is_empty());
    }

    #[test]
    fn location_before_first_comma() {
        assert_eq!(short_location(Some("Pins Bowl, 123 Main St")), "Pins Bowl");
        assert_eq!(short_location(Some("  Strike Centre  ")), "Strike Centre");
        assert_eq!(short_location(Some("Lanes, Level 2, Mall")), "Lanes");
    }

    #[test]
    fn missing_location() {
        assert_eq!(short_location(Some("")), NO_LOCATION);
        assert_eq!(short_location(None), NO_LOCATION);
    }

    #[test]
    fn map_url_encodes_query() {
        assert_eq!(
            map_search_url("Pins Bowl"),
            "http://maps.google.com/?q=Pins%20Bowl"
        );
    }
}
