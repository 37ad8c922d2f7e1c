//! Named colour palettes for paginated output.

use std::fmt;

/// Opaque RGB colour (8 bits per channel).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#RRGGBB` (the `#` is optional).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
    }

    /// Channels scaled to `0.0..=1.0`, as PDF colour operators expect.
    pub fn components(self) -> [f32; 3] {
        [
            f32::from(self.r) / 255.0,
            f32::from(self.g) / 255.0,
            f32::from(self.b) / 255.0,
        ]
    }

    /// Perceived brightness, `0.299r + 0.587g + 0.114b` on a 0..1 scale.
    pub fn luminance(self) -> f64 {
        let [r, g, b] = self.components().map(f64::from);
        0.299 * r + 0.587 * g + 0.114 * b
    }

    /// Black or white, whichever reads better on `self`.
    pub fn contrasting_text(self) -> Color {
        if self.luminance() < 0.45 {
            Color::WHITE
        } else {
            Color::BLACK
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

/// Luminance of a `#RRGGBB` string; anything malformed counts as mid-grey
/// (0.5).
pub fn luminance(hex: &str) -> f64 {
    Color::from_hex(hex).map_or(0.5, Color::luminance)
}

/// Link text colour.
pub const LINK: Color = Color::rgb(0x25, 0x63, 0xEB);
/// Code block background.
pub const CODE_BACKGROUND: Color = Color::rgb(0xEB, 0xEB, 0xEB);
/// Code block left bar.
pub const CODE_BORDER: Color = Color::rgb(0x9E, 0x9E, 0x9E);
/// Every other table body row.
pub const TABLE_ROW_ALT: Color = Color::rgb(0xEB, 0xEB, 0xEB);
pub const TABLE_GRID: Color = Color::rgb(0x80, 0x80, 0x80);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    pub name: &'static str,
    pub title: Color,
    pub heading: Color,
    pub table_header_background: Color,
    pub callout_background: Color,
    pub callout_border: Color,
    pub page_background: Color,
}

const fn hex(value: u32) -> Color {
    Color::rgb((value >> 16) as u8, (value >> 8) as u8, value as u8)
}

const THEMES: &[Theme] = &[
    Theme {
        name: "ocean",
        title: hex(0x1F4E79),
        heading: hex(0x2E75B6),
        table_header_background: hex(0x4A8FCA),
        callout_background: hex(0xE8F4FC),
        callout_border: hex(0x2E75B6),
        page_background: Color::WHITE,
    },
    Theme {
        name: "forest",
        title: hex(0x1B4332),
        heading: hex(0x2D6A4F),
        table_header_background: hex(0x2D6A4F),
        callout_background: hex(0xE8F5E9),
        callout_border: hex(0x2D6A4F),
        page_background: Color::WHITE,
    },
    Theme {
        name: "slate",
        title: hex(0x334155),
        heading: hex(0x64748B),
        table_header_background: hex(0x475569),
        callout_background: hex(0xF1F5F9),
        callout_border: hex(0x64748B),
        page_background: Color::WHITE,
    },
    Theme {
        name: "crimson",
        title: hex(0x7F1D1D),
        heading: hex(0xB91C1C),
        table_header_background: hex(0xB91C1C),
        callout_background: hex(0xFEE2E2),
        callout_border: hex(0xB91C1C),
        page_background: Color::WHITE,
    },
    Theme {
        name: "paper",
        title: hex(0x3E2723),
        heading: hex(0x6D4C41),
        table_header_background: hex(0xD7CCC8),
        callout_background: hex(0xFFF3E0),
        callout_border: hex(0xA1887F),
        page_background: hex(0xFBF6EC),
    },
];

impl Theme {
    pub const DEFAULT: &'static str = "ocean";

    /// Every built-in theme name, `default` excluded.
    pub fn names() -> impl Iterator<Item = &'static str> {
        THEMES.iter().map(|t| t.name)
    }

    /// Look a theme up by name (case-insensitive, `default` = ocean).
    pub fn find(name: &str) -> Option<Theme> {
        let name = name.trim().to_ascii_lowercase();
        let name = match name.as_str() {
            "" | "default" => Self::DEFAULT,
            other => other,
        };
        THEMES.iter().find(|t| t.name == name).cloned()
    }

    /// Like [`Theme::find`], but an unknown name falls back to the default
    /// theme with a warning.
    pub fn named(name: &str) -> Theme {
        Self::find(name).unwrap_or_else(|| {
            log::warn!("unknown theme {name:?}, using {}", Self::DEFAULT);
            Self::ocean()
        })
    }

    pub fn ocean() -> Theme {
        THEMES[0].clone()
    }

    /// Text colour on the table header background.
    pub fn table_header_text(&self) -> Color {
        self.table_header_background.contrasting_text()
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::ocean()
    }
}
