//! Event colors and readable text colors.
//!
//! The calendar tags events with one of eleven color ids; untagged events use
//! the calendar default. [`ColorTable`] maps those ids to hex backgrounds and
//! [`text_color_for`] picks black or white text using WCAG relative luminance.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Text color used on light backgrounds.
pub const DARK_TEXT: &str = "#000000";

/// Text color used on dark backgrounds.
pub const LIGHT_TEXT: &str = "#FFFFFF";

/// Backgrounds with a relative luminance above this get dark text.
pub const LUMINANCE_THRESHOLD: f64 = 0.5;

/// A calendar event color id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ColorId {
    /// No color set, or an id this table does not know.
    Undefined,
    Lavender,
    Sage,
    Grape,
    Flamingo,
    Banana,
    Tangerine,
    Peacock,
    Graphite,
    Blueberry,
    Basil,
    Tomato,
}

impl ColorId {
    /// Every id, in table order.
    pub const ALL: [ColorId; 12] = [
        Self::Undefined,
        Self::Lavender,
        Self::Sage,
        Self::Grape,
        Self::Flamingo,
        Self::Banana,
        Self::Tangerine,
        Self::Peacock,
        Self::Graphite,
        Self::Blueberry,
        Self::Basil,
        Self::Tomato,
    ];

    /// Parses the provider's id string; unknown ids map to `Undefined`.
    pub fn parse(id: &str) -> Self {
        match id.trim() {
            "1" => Self::Lavender,
            "2" => Self::Sage,
            "3" => Self::Grape,
            "4" => Self::Flamingo,
            "5" => Self::Banana,
            "6" => Self::Tangerine,
            "7" => Self::Peacock,
            "8" => Self::Graphite,
            "9" => Self::Blueberry,
            "10" => Self::Basil,
            "11" => Self::Tomato,
            _ => Self::Undefined,
        }
    }

    /// Returns the provider's id string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Undefined => "undefined",
            Self::Lavender => "1",
            Self::Sage => "2",
            Self::Grape => "3",
            Self::Flamingo => "4",
            Self::Banana => "5",
            Self::Tangerine => "6",
            Self::Peacock => "7",
            Self::Graphite => "8",
            Self::Blueberry => "9",
            Self::Basil => "10",
            Self::Tomato => "11",
        }
    }

    fn index(self) -> usize {
        match self {
            Self::Undefined => 0,
            Self::Lavender => 1,
            Self::Sage => 2,
            Self::Grape => 3,
            Self::Flamingo => 4,
            Self::Banana => 5,
            Self::Tangerine => 6,
            Self::Peacock => 7,
            Self::Graphite => 8,
            Self::Blueberry => 9,
            Self::Basil => 10,
            Self::Tomato => 11,
        }
    }
}

impl fmt::Display for ColorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for ColorId {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<ColorId> for String {
    fn from(value: ColorId) -> Self {
        value.as_str().to_string()
    }
}

/// Static mapping from color id to hex background.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorTable {
    colors: [&'static str; 12],
}

impl Default for ColorTable {
    fn default() -> Self {
        Self::new()
    }
}

impl ColorTable {
    /// Builds the standard table.
    pub fn new() -> Self {
        Self {
            colors: [
                "#039be5", // undefined
                "#7986cb", "#33b679", "#8e24aa", "#e67c73", "#f6c026", "#f5511d", "#039be5",
                "#616161", "#3f51b5", "#0b8043", "#d60000",
            ],
        }
    }

    /// Returns the background for an event's color id.
    ///
    /// Absent ids use the `Undefined` entry.
    pub fn color_for(&self, id: Option<&ColorId>) -> &'static str {
        let id = id.copied().unwrap_or(ColorId::Undefined);
        self.colors[id.index()]
    }

    /// Iterates over `(id, hex)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (ColorId, &'static str)> + '_ {
        ColorId::ALL.into_iter().map(|id| (id, self.colors[id.index()]))
    }
}

/// Computes the sRGB relative luminance of a hex color.
///
/// Accepts `#rrggbb`, `rrggbb` and `#rgb`. Anything unparseable counts as
/// black.
pub fn relative_luminance(hex: &str) -> f64 {
    let Some((r, g, b)) = parse_hex(hex) else {
        return 0.0;
    };

    0.2126 * linearize(r) + 0.7152 * linearize(g) + 0.0722 * linearize(b)
}

/// Picks black or white text for the given background.
pub fn text_color_for(background: &str) -> &'static str {
    if relative_luminance(background) > LUMINANCE_THRESHOLD {
        DARK_TEXT
    } else {
        LIGHT_TEXT
    }
}

fn linearize(channel: u8) -> f64 {
    let c = f64::from(channel) / 255.0;
    if c <= 0.03928 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

fn parse_hex(hex: &str) -> Option<(u8, u8, u8)> {
    let hex = hex.trim().trim_start_matches('#');
    if !hex.is_ascii() {
        return None;
    }
    match hex.len() {
        6 => Some((
            u8::from_str_radix(&hex[0..2], 16).ok()?,
            u8::from_str_radix(&hex[2..4], 16).ok()?,
            u8::from_str_radix(&hex[4..6], 16).ok()?,
        )),
        3 => {
            let expand = |i: usize| u8::from_str_radix(&hex[i..=i], 16).ok().map(|v| v * 17);
            Some((expand(0)?, expand(1)?, expand(2)?))
        }
        _ => None,
    }
}
