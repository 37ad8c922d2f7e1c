//! The four standard Type 1 fonts the renderer uses, with their advance
//! widths and WinAnsi text encoding.

use encoding_rs::WINDOWS_1252;
use lopdf::{Dictionary, dictionary};

use crate::layout::SpanStyle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Font {
    Regular,
    Bold,
    Italic,
    Mono,
}

/// Helvetica advance widths for 0x20..=0x7E, in 1/1000 em.
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // '0'..'?'
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // '@'..'O'
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 'P'..'_'
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // '`'..'o'
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 'p'..'~'
];

/// Helvetica-Bold advance widths for 0x20..=0x7E, in 1/1000 em.
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611, // '0'..'?'
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778, // '@'..'O'
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556, // 'P'..'_'
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611, // '`'..'o'
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584, // 'p'..'~'
];

impl Font {
    pub const ALL: [Font; 4] = [Font::Regular, Font::Bold, Font::Italic, Font::Mono];

    pub fn for_style(style: SpanStyle) -> Font {
        if style.monospace {
            Font::Mono
        } else if style.bold {
            Font::Bold
        } else if style.italic {
            Font::Italic
        } else {
            Font::Regular
        }
    }

    pub fn base_font(self) -> &'static str {
        match self {
            Font::Regular => "Helvetica",
            Font::Bold => "Helvetica-Bold",
            Font::Italic => "Helvetica-Oblique",
            Font::Mono => "Courier",
        }
    }

    /// Name of the font in the page resource dictionary.
    pub fn resource_name(self) -> &'static str {
        match self {
            Font::Regular => "F1",
            Font::Bold => "F2",
            Font::Italic => "F3",
            Font::Mono => "F4",
        }
    }

    pub fn dictionary(self) -> Dictionary {
        dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => self.base_font(),
            "Encoding" => "WinAnsiEncoding",
        }
    }

    fn glyph_width(self, byte: u8) -> u16 {
        let table = match self {
            Font::Mono => return 600,
            Font::Bold => &HELVETICA_BOLD,
            Font::Regular | Font::Italic => &HELVETICA,
        };
        match byte {
            0x20..=0x7E => table[usize::from(byte - 0x20)],
            // Latin-1 letters are close to their unaccented forms.
            _ => 556,
        }
    }

    /// Advance width of `text` at `size` points.
    pub fn width(self, text: &str, size: f32) -> f32 {
        let units: u32 = win_ansi(text)
            .into_iter()
            .map(|b| u32::from(self.glyph_width(b)))
            .sum();
        units as f32 * size / 1000.0
    }
}

/// Encode `text` for a WinAnsiEncoding font. Characters outside the code
/// page become `?`.
pub fn win_ansi(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    let mut buf = [0u8; 4];
    for c in text.chars() {
        if c.is_ascii() {
            out.push(c as u8);
            continue;
        }
        let c = match c {
            '\u{a0}' => ' ',
            '\u{2212}' => '-',
            other => other,
        };
        let (bytes, _, unmappable) = WINDOWS_1252.encode(c.encode_utf8(&mut buf));
        match bytes.first() {
            Some(&b) if !unmappable && bytes.len() == 1 => out.push(b),
            _ => out.push(b'?'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_widths() {
        assert!((Font::Regular.width("Hello", 10.0) - 22.78).abs() < 0.01);
        assert!((Font::Mono.width("abc", 10.0) - 18.0).abs() < 0.01);
        assert!(Font::Bold.width("Hello", 10.0) > Font::Regular.width("Hello", 10.0));
    }

    #[test]
    fn test_win_ansi() {
        assert_eq!(win_ansi("Caf\u{e9}"), b"Caf\xe9".to_vec());
        assert_eq!(win_ansi("\u{201c}q\u{201d}"), vec![0x93, b'q', 0x94]);
        assert_eq!(win_ansi("\u{2014}"), vec![0x97]);
        assert_eq!(win_ansi("\u{4e2d}"), b"?".to_vec());
    }

    #[test]
    fn test_font_for_style() {
        assert_eq!(Font::for_style(SpanStyle::BOLD), Font::Bold);
        assert_eq!(Font::for_style(SpanStyle::ITALIC), Font::Italic);
        let code = SpanStyle {
            monospace: true,
            ..SpanStyle::BOLD
        };
        assert_eq!(Font::for_style(code), Font::Mono);
    }
}
