//! Greedy line breaking of styled text by font advance widths.

use super::font::Font;
use crate::layout::{Color, LINK, RichText};

/// A run of text drawn in one font and colour.
#[derive(Debug, Clone, PartialEq)]
pub struct Run {
    pub text: String,
    pub font: Font,
    pub color: Option<Color>,
    pub link: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Line {
    pub runs: Vec<Run>,
    pub width: f32,
}

impl Line {
    fn push(&mut self, text: &str, font: Font, color: Option<Color>, link: Option<&str>, size: f32) {
        if text.is_empty() {
            return;
        }
        self.width += font.width(text, size);
        match self.runs.last_mut() {
            Some(last) if last.font == font && last.color == color && last.link.as_deref() == link => {
                last.text.push_str(text)
            }
            _ => self.runs.push(Run {
                text: text.to_string(),
                font,
                color,
                link: link.map(str::to_string),
            }),
        }
    }

    fn is_blank(&self) -> bool {
        self.runs.iter().all(|r| r.text.trim().is_empty())
    }

    fn trim_end(&mut self, size: f32) {
        while let Some(last) = self.runs.last_mut() {
            let trimmed_len = last.text.trim_end().len();
            if trimmed_len == last.text.len() {
                break;
            }
            last.text.truncate(trimmed_len);
            if last.text.is_empty() {
                self.runs.pop();
            }
        }
        self.width = self.runs.iter().map(|r| r.font.width(&r.text, size)).sum();
    }

    #[cfg(test)]
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }
}

/// Break `rich` into lines no wider than `max_width` at `size` points.
/// `\n` forces a break; a word wider than the line is split by characters.
/// Links take the link colour, other runs keep `color`.
pub fn break_lines(rich: &RichText, size: f32, max_width: f32, color: Option<Color>) -> Vec<Line> {
    let mut lines = Vec::new();
    let mut current = Line::default();

    for span in &rich.spans {
        let font = Font::for_style(span.style);
        let link = span.link.as_deref();
        let color = if link.is_some() { Some(LINK) } else { color };

        for (i, part) in span.text.split('\n').enumerate() {
            if i > 0 {
                current.trim_end(size);
                lines.push(std::mem::take(&mut current));
            }
            for token in tokens(part) {
                if token.starts_with(char::is_whitespace) {
                    if !current.runs.is_empty() {
                        current.push(" ", font, color, link, size);
                    }
                    continue;
                }
                let width = font.width(token, size);
                if current.width + width > max_width && !current.is_blank() {
                    current.trim_end(size);
                    lines.push(std::mem::take(&mut current));
                }
                if width <= max_width {
                    current.push(token, font, color, link, size);
                    continue;
                }
                for c in token.chars() {
                    let mut buf = [0u8; 4];
                    let piece: &str = c.encode_utf8(&mut buf);
                    if current.width + font.width(piece, size) > max_width && !current.runs.is_empty() {
                        lines.push(std::mem::take(&mut current));
                    }
                    current.push(piece, font, color, link, size);
                }
            }
        }
    }

    current.trim_end(size);
    if !current.runs.is_empty() {
        lines.push(current);
    }
    while lines.last().is_some_and(|l| l.runs.is_empty()) {
        lines.pop();
    }
    lines
}

/// Words and whitespace runs, in order.
fn tokens(text: &str) -> impl Iterator<Item = &str> {
    let mut rest = text;
    std::iter::from_fn(move || {
        let first = rest.chars().next()?;
        let space = first.is_whitespace();
        let end = rest
            .char_indices()
            .find(|&(_, c)| c.is_whitespace() != space)
            .map_or(rest.len(), |(i, _)| i);
        let (token, tail) = rest.split_at(end);
        rest = tail;
        Some(token)
    })
}
