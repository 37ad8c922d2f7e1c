//! Text extraction and HTML serialization for arena subtrees.

use super::arena::{NodeArena, NodeId, NodeKind};

/// Elements whose content never renders as text.
const HIDDEN: &[&str] = &[
    "script", "style", "template", "noscript", "head", "title", "meta", "link",
];

const VOID: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

const RAW_TEXT: &[&str] = &["script", "style"];

/// Number of line breaks an element forces around itself in rendered text.
fn required_breaks(tag: &str) -> usize {
    match tag {
        "p" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => 2,
        "div" | "section" | "article" | "header" | "footer" | "nav" | "aside" | "main"
        | "li" | "ul" | "ol" | "dl" | "dt" | "dd" | "tr" | "table" | "pre" | "blockquote"
        | "figure" | "figcaption" | "form" | "fieldset" | "details" | "summary" | "hr" => 1,
        _ => 0,
    }
}

/// Concatenation of every text node below `id`, unprocessed.
pub fn text_content(arena: &NodeArena, id: NodeId) -> String {
    if let Some(text) = arena.text(id) {
        return text.to_string();
    }
    arena
        .descendants(id)
        .filter_map(|d| arena.text(d))
        .collect()
}

/// Approximates the browser's `innerText`: whitespace collapses inside
/// flowing text, block elements start new lines, paragraphs and headings are
/// separated by a blank line, `<br>` breaks the line and `<pre>` content is
/// kept verbatim.
pub fn inner_text(arena: &NodeArena, id: NodeId) -> String {
    let mut out = TextCollector::default();
    let preformatted = in_preformatted(arena, id);
    if let Some(text) = arena.text(id) {
        out.push_text(text, preformatted);
    } else {
        for child in arena.children(id) {
            collect(arena, child, preformatted, &mut out);
        }
    }
    out.finish()
}

/// Whether `id` is, or sits inside, a `<pre>`/`<textarea>`.
fn in_preformatted(arena: &NodeArena, id: NodeId) -> bool {
    let mut cursor = id;
    while cursor.is_some() {
        if arena.is_tag(cursor, "pre") || arena.is_tag(cursor, "textarea") {
            return true;
        }
        cursor = arena.parent(cursor);
    }
    false
}

#[derive(Default)]
struct TextCollector {
    buf: String,
    pending_breaks: usize,
}

impl TextCollector {
    fn request_breaks(&mut self, n: usize) {
        self.pending_breaks = self.pending_breaks.max(n);
    }

    fn flush_breaks(&mut self) {
        if self.pending_breaks > 0 && !self.buf.is_empty() {
            while self.buf.ends_with(' ') {
                self.buf.pop();
            }
            let existing = self.buf.len() - self.buf.trim_end_matches('\n').len();
            for _ in existing..self.pending_breaks {
                self.buf.push('\n');
            }
        }
        self.pending_breaks = 0;
    }

    fn push_text(&mut self, text: &str, preformatted: bool) {
        if preformatted {
            if text.is_empty() {
                return;
            }
            self.flush_breaks();
            self.buf.push_str(text);
            return;
        }

        let starts_ws = text.starts_with(char::is_whitespace);
        let ends_ws = text.ends_with(char::is_whitespace);
        let words: Vec<&str> = text.split_whitespace().collect();
        if words.is_empty() {
            if !text.is_empty() && !self.buf.is_empty() && self.pending_breaks == 0 {
                self.space();
            }
            return;
        }
        if starts_ws && self.pending_breaks == 0 {
            self.space();
        }
        self.flush_breaks();
        self.buf.push_str(&words.join(" "));
        if ends_ws {
            self.buf.push(' ');
        }
    }

    fn space(&mut self) {
        if !self.buf.is_empty() && !self.buf.ends_with([' ', '\n']) {
            self.buf.push(' ');
        }
    }

    fn line_break(&mut self) {
        self.flush_breaks();
        while self.buf.ends_with(' ') {
            self.buf.pop();
        }
        self.buf.push('\n');
    }

    fn finish(self) -> String {
        let lines: Vec<&str> = self.buf.lines().map(str::trim_end).collect();
        lines.join("\n").trim_matches('\n').to_string()
    }
}

fn collect(arena: &NodeArena, id: NodeId, preformatted: bool, out: &mut TextCollector) {
    let Some(node) = arena.get(id) else {
        return;
    };
    match &node.kind {
        NodeKind::Text(text) => out.push_text(text, preformatted),
        NodeKind::Element(el) => {
            let tag = el.name.local.as_ref();
            if HIDDEN.contains(&tag) {
                return;
            }
            if tag == "br" {
                out.line_break();
                return;
            }
            let breaks = required_breaks(tag);
            out.request_breaks(breaks);
            let pre = preformatted || tag == "pre" || tag == "textarea";
            let mut first_cell = true;
            for child in arena.children(id) {
                if matches!(arena.tag(child), "td" | "th") {
                    if !first_cell {
                        out.push_text("\t", true);
                    }
                    first_cell = false;
                }
                collect(arena, child, pre, out);
            }
            out.request_breaks(breaks);
        }
        NodeKind::Document | NodeKind::Other => {
            for child in arena.children(id) {
                collect(arena, child, preformatted, out);
            }
        }
    }
}

/// Serialize the children of `id` back to HTML.
pub fn inner_html(arena: &NodeArena, id: NodeId) -> String {
    let mut out = String::new();
    for child in arena.children(id) {
        serialize(arena, child, false, &mut out);
    }
    out
}

/// Serialize `id` itself, including its own tag.
pub fn outer_html(arena: &NodeArena, id: NodeId) -> String {
    let mut out = String::new();
    serialize(arena, id, false, &mut out);
    out
}

fn serialize(arena: &NodeArena, id: NodeId, raw: bool, out: &mut String) {
    let Some(node) = arena.get(id) else {
        return;
    };
    match &node.kind {
        NodeKind::Text(text) => {
            if raw {
                out.push_str(text);
            } else {
                escape_into(text, false, out);
            }
        }
        NodeKind::Element(el) => {
            let tag = el.name.local.as_ref();
            out.push('<');
            out.push_str(tag);
            for attr in &el.attrs {
                out.push(' ');
                out.push_str(&attr.name.local);
                out.push_str("=\"");
                escape_into(&attr.value, true, out);
                out.push('"');
            }
            out.push('>');
            if VOID.contains(&tag) {
                return;
            }
            let raw = RAW_TEXT.contains(&tag);
            for child in arena.children(id) {
                serialize(arena, child, raw, out);
            }
            out.push_str("</");
            out.push_str(tag);
            out.push('>');
        }
        NodeKind::Document => {
            for child in arena.children(id) {
                serialize(arena, child, false, out);
            }
        }
        NodeKind::Other => {}
    }
}

fn escape_into(text: &str, attribute: bool, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            '"' if attribute => out.push_str("&quot;"),
            '<' if !attribute => out.push_str("&lt;"),
            '>' if !attribute => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}

/// Collapse every whitespace run to one space and trim.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
