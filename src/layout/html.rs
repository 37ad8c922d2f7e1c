//! HTML fragment to layout primitives.
//!
//! Runs parallel to the Markdown converter but keeps styling as spans:
//! paragraphs, headings, flat and nested lists, tables, preformatted code
//! and images already present in the assets directory.

use crate::asset::{AssetStore, safe_basename_from_url};
use crate::dom::{NodeArena, NodeId, NodeKind, collapse_whitespace, inner_text, parse_html};

use super::{Flowable, LayoutOptions, ListItem, RichText, SpanStyle};

/// Deeper element nesting is flattened to plain text.
const MAX_DEPTH: usize = 100;

/// Convert an HTML fragment into flowables. Total: anything unparsable or
/// empty yields an empty list.
pub fn html_to_flowables(html: &str, assets: &AssetStore<'_>, options: LayoutOptions) -> Vec<Flowable> {
    if html.trim().is_empty() {
        return Vec::new();
    }
    let arena = parse_html(html);
    let Some(body) = arena.find_tag(arena.document(), "body") else {
        return Vec::new();
    };
    let converter = Converter {
        arena: &arena,
        assets,
        options,
    };
    let mut out = Vec::new();
    for child in arena.children(body) {
        converter.block(child, 0, &mut out);
    }
    out
}

struct Converter<'a> {
    arena: &'a NodeArena,
    assets: &'a AssetStore<'a>,
    options: LayoutOptions,
}

impl Converter<'_> {
    fn block(&self, id: NodeId, depth: usize, out: &mut Vec<Flowable>) {
        let Some(node) = self.arena.get(id) else {
            return;
        };
        if depth >= MAX_DEPTH {
            let text = self.flattened(id);
            if !text.is_empty() {
                out.push(Flowable::Paragraph(RichText::plain(text)));
            }
            return;
        }
        let tag = match &node.kind {
            NodeKind::Text(text) => {
                let text = collapse(text);
                if !text.trim().is_empty() {
                    out.push(Flowable::Paragraph(RichText::plain(text.trim())));
                }
                return;
            }
            NodeKind::Element(el) => el.name.local.as_ref(),
            NodeKind::Document | NodeKind::Other => return,
        };

        match tag {
            "script" | "style" | "template" => {}
            "table" => {
                if let Some(table) = self.table(id, depth) {
                    out.push(table);
                }
            }
            "ul" | "ol" => {
                if let Some(list) = self.list(id, depth) {
                    out.push(list);
                }
            }
            "img" => {
                if let Some(image) = self.image(id) {
                    out.push(image);
                }
            }
            "pre" => {
                let mut code = String::new();
                preformatted_text(self.arena, id, &mut code);
                let code = code.trim_end_matches('\n');
                if let Some(block) = Flowable::code(code, None, self.options.code_wrap_width) {
                    out.push(block);
                }
            }
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                let text = self.inline(id, depth).trimmed().to_plain();
                if !text.is_empty() {
                    if matches!(tag, "h1" | "h2") {
                        out.push(Flowable::Heading(text));
                    } else {
                        out.push(Flowable::Subheading(text));
                    }
                }
            }
            "p" | "span" => {
                let rich = self.inline(id, depth).trimmed();
                if !rich.is_blank() {
                    out.push(Flowable::Paragraph(rich));
                }
            }
            _ => {
                for child in self.arena.children(id) {
                    self.block(child, depth + 1, out);
                }
            }
        }
    }

    fn table(&self, id: NodeId, depth: usize) -> Option<Flowable> {
        let arena = self.arena;
        let rows: Vec<Vec<RichText>> = arena
            .descendants(id)
            .filter(|&d| arena.is_tag(d, "tr"))
            .map(|tr| {
                arena
                    .descendants(tr)
                    .filter(|&c| arena.is_tag(c, "th") || arena.is_tag(c, "td"))
                    .map(|cell| self.inline(cell, depth + 1).trimmed())
                    .collect()
            })
            .collect();
        let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
        if columns == 0 {
            return None;
        }
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize_with(columns, RichText::new);
                row
            })
            .collect();
        Some(Flowable::Table(rows))
    }

    fn list(&self, id: NodeId, depth: usize) -> Option<Flowable> {
        if depth >= MAX_DEPTH {
            let text = self.flattened(id);
            return (!text.is_empty()).then(|| Flowable::Paragraph(RichText::plain(text)));
        }
        let ordered = self.arena.is_tag(id, "ol");
        let items: Vec<ListItem> = self
            .arena
            .child_elements(id)
            .filter(|&li| self.arena.is_tag(li, "li"))
            .filter_map(|li| {
                let mut content = Vec::new();
                let text = self.inline_excluding_lists(li, depth + 1).trimmed();
                if !text.is_blank() {
                    content.push(Flowable::Paragraph(text));
                }
                for nested in self
                    .arena
                    .child_elements(li)
                    .filter(|&c| self.arena.is_tag(c, "ul") || self.arena.is_tag(c, "ol"))
                {
                    content.extend(self.list(nested, depth + 2));
                }
                (!content.is_empty()).then(|| ListItem::new(content))
            })
            .collect();
        if items.is_empty() {
            None
        } else if ordered {
            Some(Flowable::NumberedList(items))
        } else {
            Some(Flowable::BulletList(items))
        }
    }

    fn image(&self, id: NodeId) -> Option<Flowable> {
        let src = self.arena.attr(id, "src")?.trim();
        let name = safe_basename_from_url(src)?;
        let path = self.assets.find(&name)?;
        Flowable::image(&path)
    }

    fn flattened(&self, id: NodeId) -> String {
        collapse_whitespace(&inner_text(self.arena, id))
    }

    fn inline(&self, id: NodeId, depth: usize) -> RichText {
        let mut rich = RichText::new();
        for child in self.arena.children(id) {
            self.inline_into(child, SpanStyle::PLAIN, None, false, depth + 1, &mut rich);
        }
        rich
    }

    fn inline_excluding_lists(&self, id: NodeId, depth: usize) -> RichText {
        let mut rich = RichText::new();
        for child in self.arena.children(id) {
            self.inline_into(child, SpanStyle::PLAIN, None, true, depth + 1, &mut rich);
        }
        rich
    }

    fn inline_into(
        &self,
        id: NodeId,
        style: SpanStyle,
        link: Option<&str>,
        skip_lists: bool,
        depth: usize,
        out: &mut RichText,
    ) {
        let Some(node) = self.arena.get(id) else {
            return;
        };
        if depth >= MAX_DEPTH {
            out.push(self.flattened(id), style, link.map(str::to_string));
            return;
        }
        let tag = match &node.kind {
            NodeKind::Text(text) => {
                out.push(collapse(text), style, link.map(str::to_string));
                return;
            }
            NodeKind::Element(el) => el.name.local.as_ref(),
            NodeKind::Document | NodeKind::Other => return,
        };

        let children = |style: SpanStyle, link: Option<&str>, out: &mut RichText| {
            for child in self.arena.children(id) {
                self.inline_into(child, style, link, skip_lists, depth + 1, out);
            }
        };

        match tag {
            "br" => out.push("\n", style, link.map(str::to_string)),
            "script" | "style" | "template" => {}
            "ul" | "ol" if skip_lists => {}
            "b" | "strong" => {
                if !self.is_blank(id) {
                    children(SpanStyle { bold: true, ..style }, link, out);
                }
            }
            "i" | "em" => {
                if !self.is_blank(id) {
                    children(SpanStyle { italic: true, ..style }, link, out);
                }
            }
            "code" => children(
                SpanStyle {
                    monospace: true,
                    ..style
                },
                link,
                out,
            ),
            "a" => match self.arena.attr(id, "href").map(str::trim) {
                Some(href) if !href.is_empty() => {
                    let mut label = RichText::new();
                    children(style, Some(href), &mut label);
                    if label.is_blank() {
                        out.push(href, style, Some(href.to_string()));
                    } else {
                        out.append(label);
                    }
                }
                _ => children(style, link, out),
            },
            _ => children(style, link, out),
        }
    }

    fn is_blank(&self, id: NodeId) -> bool {
        self.arena
            .descendants(id)
            .filter_map(|d| self.arena.text(d))
            .all(|t| t.trim().is_empty())
    }
}

/// HTML whitespace collapsing for flowing text; edges keep one space so
/// adjacent inline pieces stay separated.
fn collapse(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for c in text.chars() {
        if c.is_whitespace() && c != '\u{a0}' {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out
}

fn preformatted_text(arena: &NodeArena, id: NodeId, out: &mut String) {
    for node in arena.descendants(id) {
        if let Some(text) = arena.text(node) {
            out.push_str(text);
        } else if arena.is_tag(node, "br") {
            out.push('\n');
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::NoFetcher;
    use crate::layout::TokenKind;

    fn convert(html: &str) -> Vec<Flowable> {
        let store = AssetStore::disabled(&NoFetcher);
        html_to_flowables(html, &store, LayoutOptions::default())
    }

    #[test]
    fn test_paragraph_spans() {
        let flows = convert("<p>Read <b>this</b> and <a href=\"https://d.io\">docs</a></p>");
        assert_eq!(flows.len(), 1);
        let Flowable::Paragraph(rich) = &flows[0] else {
            panic!("expected paragraph");
        };
        assert_eq!(rich.to_plain(), "Read this and docs");
        assert!(rich.spans[1].style.bold);
        assert_eq!(rich.spans[3].link.as_deref(), Some("https://d.io"));
    }

    #[test]
    fn test_empty_emphasis_dropped() {
        let flows = convert("<p>a<b> </b>b</p>");
        let Flowable::Paragraph(rich) = &flows[0] else {
            panic!("expected paragraph");
        };
        assert_eq!(rich.spans.len(), 1);
        assert_eq!(rich.to_plain(), "ab");
    }

    #[test]
    fn test_headings() {
        let flows = convert("<h2>Big</h2><h4>Small</h4><h3> </h3>");
        assert_eq!(
            flows,
            vec![Flowable::Heading("Big".into()), Flowable::Subheading("Small".into())]
        );
    }

    #[test]
    fn test_nested_list() {
        let flows = convert("<ol><li>One</li><li>Two<ul><li>Inner</li></ul></li><li> </li></ol>");
        let [Flowable::NumberedList(items)] = flows.as_slice() else {
            panic!("expected one numbered list, got {flows:?}");
        };
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].content.len(), 2);
        assert!(matches!(&items[1].content[1], Flowable::BulletList(inner) if inner.len() == 1));
    }

    #[test]
    fn test_table_rows_padded() {
        let flows = convert("<table><tr><th>A</th><th>B</th></tr><tr><td>1</td></tr></table>");
        let [Flowable::Table(rows)] = flows.as_slice() else {
            panic!("expected table");
        };
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].len(), 2);
        assert!(rows[1][1].is_blank());
        assert!(convert("<table></table>").is_empty());
    }

    #[test]
    fn test_pre_becomes_code_block() {
        let flows = convert("<pre>if x:\n    y()</pre>");
        let [Flowable::CodeBlock(lines)] = flows.as_slice() else {
            panic!("expected code block");
        };
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1][0].kind, TokenKind::Plain);
        assert_eq!(lines[1][0].text, "    y()");
    }

    #[test]
    fn test_image_requires_asset_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let store = AssetStore::new(dir.path(), &NoFetcher);
        let html = r#"<div><img src="assets/missing.png"></div>"#;
        assert!(html_to_flowables(html, &store, LayoutOptions::default()).is_empty());
    }

    #[test]
    fn test_containers_are_transparent() {
        let flows = convert("<div><section><p>A</p></section>loose text</div>");
        assert_eq!(flows.len(), 2);
        assert_eq!(flows[1], Flowable::Paragraph(RichText::plain("loose text")));
    }

    #[test]
    fn test_deeply_nested_containers() {
        let html = format!("{}x{}", "<div>".repeat(5000), "</div>".repeat(5000));
        assert_eq!(convert(&html), vec![Flowable::Paragraph(RichText::plain("x"))]);
    }

    #[test]
    fn test_deeply_nested_inline_and_lists() {
        let bold = format!("<p>{}deep{}</p>", "<b>".repeat(5000), "</b>".repeat(5000));
        let flows = convert(&bold);
        let [Flowable::Paragraph(rich)] = flows.as_slice() else {
            panic!("expected paragraph");
        };
        assert_eq!(rich.to_plain(), "deep");

        let lists = format!("{}item{}", "<ul><li>".repeat(3000), "</li></ul>".repeat(3000));
        assert_eq!(convert(&lists).len(), 1);
    }
}
