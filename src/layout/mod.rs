//! Layout primitives for paginated output.
//!
//! Blocks describe themselves as a flat sequence of [`Flowable`]s; the PDF
//! backend owns geometry, line breaking and pagination. Rich text is kept as
//! styled spans so the backend can pick fonts and link annotations per span.

mod code;
mod html;
mod theme;

pub use code::{CodeLine, CodeToken, TokenKind, highlight, line_text, wrap_code_lines};
pub use html::html_to_flowables;
pub use theme::{
    CODE_BACKGROUND, CODE_BORDER, Color, LINK, TABLE_GRID, TABLE_ROW_ALT, Theme, luminance,
};

use std::path::{Path, PathBuf};

/// Measure of tables, callouts, code boxes and images, in points.
pub const MAX_CONTENT_WIDTH: f32 = 430.0;

/// Code lines wrap at this many characters unless configured otherwise.
pub const DEFAULT_CODE_WRAP: usize = 85;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct SpanStyle {
    pub bold: bool,
    pub italic: bool,
    pub monospace: bool,
}

impl SpanStyle {
    pub const PLAIN: SpanStyle = SpanStyle {
        bold: false,
        italic: false,
        monospace: false,
    };
    pub const BOLD: SpanStyle = SpanStyle {
        bold: true,
        italic: false,
        monospace: false,
    };
    pub const ITALIC: SpanStyle = SpanStyle {
        bold: false,
        italic: true,
        monospace: false,
    };
}

/// A run of text sharing one style. `\n` inside `text` is a hard line break.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub text: String,
    pub style: SpanStyle,
    pub link: Option<String>,
}

/// Styled inline text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RichText {
    pub spans: Vec<Span>,
}

impl RichText {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self::styled(text, SpanStyle::PLAIN)
    }

    pub fn bold(text: impl Into<String>) -> Self {
        Self::styled(text, SpanStyle::BOLD)
    }

    pub fn styled(text: impl Into<String>, style: SpanStyle) -> Self {
        let mut rich = Self::new();
        rich.push(text, style, None);
        rich
    }

    /// A single link span.
    pub fn link(label: impl Into<String>, href: impl Into<String>) -> Self {
        let mut rich = Self::new();
        rich.push(label, SpanStyle::PLAIN, Some(href.into()));
        rich
    }

    /// Append text, merging it into the last span when style and link match.
    pub fn push(&mut self, text: impl Into<String>, style: SpanStyle, link: Option<String>) {
        let text = text.into();
        if text.is_empty() {
            return;
        }
        match self.spans.last_mut() {
            Some(last) if last.style == style && last.link == link => last.text.push_str(&text),
            _ => self.spans.push(Span { text, style, link }),
        }
    }

    pub fn append(&mut self, other: RichText) {
        for span in other.spans {
            self.push(span.text, span.style, span.link);
        }
    }

    pub fn is_blank(&self) -> bool {
        self.spans.iter().all(|s| s.text.trim().is_empty())
    }

    pub fn to_plain(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }

    /// Strip leading whitespace from the first span and trailing whitespace
    /// from the last, dropping spans that become empty.
    pub fn trimmed(mut self) -> Self {
        while let Some(first) = self.spans.first_mut() {
            let trimmed = first.text.trim_start().to_string();
            if trimmed.is_empty() {
                self.spans.remove(0);
            } else {
                first.text = trimmed;
                break;
            }
        }
        while let Some(last) = self.spans.last_mut() {
            let trimmed = last.text.trim_end().to_string();
            if trimmed.is_empty() {
                self.spans.pop();
            } else {
                last.text = trimmed;
                break;
            }
        }
        self
    }
}

/// One entry of a bullet or numbered list. `marker` overrides the
/// sequential number of numbered lists.
#[derive(Debug, Clone, PartialEq)]
pub struct ListItem {
    pub marker: Option<String>,
    pub content: Vec<Flowable>,
}

impl ListItem {
    pub fn new(content: Vec<Flowable>) -> Self {
        Self {
            marker: None,
            content,
        }
    }

    pub fn numbered(marker: impl Into<String>, content: Vec<Flowable>) -> Self {
        Self {
            marker: Some(marker.into()),
            content,
        }
    }

    /// A bold title line followed by `body`.
    pub fn titled(title: &str, body: Vec<Flowable>) -> Self {
        let mut content = Vec::with_capacity(body.len() + 2);
        if !title.is_empty() {
            content.push(Flowable::Paragraph(RichText::bold(title)));
        }
        if !body.is_empty() {
            content.push(Flowable::Spacer(1.5));
            content.extend(body);
        }
        Self::new(content)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Flowable {
    Title(String),
    Heading(String),
    Subheading(String),
    Paragraph(RichText),
    BulletList(Vec<ListItem>),
    NumberedList(Vec<ListItem>),
    /// First row is the header.
    Table(Vec<Vec<RichText>>),
    /// A raster image on disk with its natural size in pixels.
    Image {
        path: PathBuf,
        width: u32,
        height: u32,
    },
    CodeBlock(Vec<CodeLine>),
    Callout(Vec<Flowable>),
    Spacer(f32),
    PageBreak,
}

impl Flowable {
    /// An image flowable, if `path` holds an image whose size can be read.
    pub fn image(path: &Path) -> Option<Flowable> {
        match image::image_dimensions(path) {
            Ok((width, height)) if width > 0 && height > 0 => Some(Flowable::Image {
                path: path.to_path_buf(),
                width,
                height,
            }),
            Ok(_) => None,
            Err(e) => {
                log::warn!("cannot place image {}: {e}", path.display());
                None
            }
        }
    }

    /// A wrapped, highlighted code block; `None` for blank code.
    pub fn code(code: &str, lang: Option<&str>, wrap_width: usize) -> Option<Flowable> {
        let code = code.trim_matches('\n');
        if code.trim().is_empty() {
            return None;
        }
        let wrapped = wrap_code_lines(code, wrap_width);
        Some(Flowable::CodeBlock(highlight(&wrapped, lang)))
    }

    /// A boxed callout of `body` with an optional trailing link line.
    pub fn callout(mut body: Vec<Flowable>, href: Option<&str>, link_text: &str) -> Option<Flowable> {
        if let Some(href) = href.map(str::trim).filter(|h| !h.is_empty()) {
            if !body.is_empty() {
                body.push(Flowable::Spacer(6.0));
            }
            body.push(Flowable::Paragraph(RichText::link(link_text, href)));
        }
        (!body.is_empty()).then_some(Flowable::Callout(body))
    }
}

/// Settings the layout conversion needs from the export configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutOptions {
    pub code_wrap_width: usize,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            code_wrap_width: DEFAULT_CODE_WRAP,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rich_text_merges_spans() {
        let mut rich = RichText::plain("Hello ");
        rich.push("world", SpanStyle::PLAIN, None);
        rich.push("!", SpanStyle::BOLD, None);
        assert_eq!(rich.spans.len(), 2);
        assert_eq!(rich.to_plain(), "Hello world!");
    }

    #[test]
    fn test_rich_text_trimmed() {
        let mut rich = RichText::plain("  ");
        rich.push(" a ", SpanStyle::BOLD, None);
        rich.push("  ", SpanStyle::ITALIC, None);
        let trimmed = rich.trimmed();
        assert_eq!(trimmed.spans.len(), 1);
        assert_eq!(trimmed.to_plain(), "a");
        assert!(RichText::plain(" \n ").is_blank());
    }

    #[test]
    fn test_callout_link_line() {
        let callout = Flowable::callout(
            vec![Flowable::Paragraph(RichText::plain("Body"))],
            Some("https://x.io"),
            "View link",
        )
        .unwrap();
        let Flowable::Callout(body) = callout else {
            panic!("expected callout");
        };
        assert_eq!(body.len(), 3);
        assert_eq!(body[2], Flowable::Paragraph(RichText::link("View link", "https://x.io")));
        assert!(Flowable::callout(Vec::new(), None, "View link").is_none());
    }

    #[test]
    fn test_code_flowable() {
        assert!(Flowable::code("\n \n", None, 85).is_none());
        let Some(Flowable::CodeBlock(lines)) = Flowable::code("a\nb", None, 85) else {
            panic!("expected code block");
        };
        assert_eq!(lines.len(), 2);
    }
}
