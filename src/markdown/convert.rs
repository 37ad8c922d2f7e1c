//! HTML fragment to Markdown conversion.
//!
//! Covers the fragment shapes the course player emits inside its rich-text
//! containers. Top-level nodes become blocks (paragraphs, lists, tables,
//! fenced code); everything else is rendered inline and kept as a one-line
//! block. Blocks are separated by exactly one blank line.

use crate::dom::{NodeArena, NodeId, NodeKind, collapse_whitespace, inner_text, parse_html};

use super::compose;
use super::escape::escape_inline_code;

/// Element nesting handled structurally. Deeper subtrees are flattened to
/// their text.
const MAX_DEPTH: usize = 100;

/// Convert an HTML fragment to Markdown.
///
/// Total: malformed or empty input yields an empty string.
///
/// # Examples
///
/// ```
/// use coursedown::markdown::html_to_markdown;
///
/// assert_eq!(html_to_markdown("<p>One</p><p><b>Two</b></p>"), "One\n\n**Two**");
/// assert_eq!(html_to_markdown(""), "");
/// ```
pub fn html_to_markdown(html: &str) -> String {
    if html.trim().is_empty() {
        return String::new();
    }
    let arena = parse_html(html);
    let Some(body) = arena.find_tag(arena.document(), "body") else {
        return String::new();
    };
    let mut blocks = Vec::new();
    for child in arena.children(body) {
        render_blocks(&arena, child, 0, &mut blocks);
    }
    join_blocks(&blocks)
}

fn join_blocks(blocks: &[String]) -> String {
    blocks
        .iter()
        .map(|b| b.trim())
        .filter(|b| !b.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn render_blocks(arena: &NodeArena, id: NodeId, depth: usize, out: &mut Vec<String>) {
    let Some(node) = arena.get(id) else {
        return;
    };
    if depth >= MAX_DEPTH {
        push_nonempty(out, &flattened_text(arena, id));
        return;
    }
    let tag = match &node.kind {
        NodeKind::Text(text) => {
            let text = text.trim();
            if !text.is_empty() {
                out.push(text.to_string());
            }
            return;
        }
        NodeKind::Element(el) => el.name.local.as_ref(),
        NodeKind::Document | NodeKind::Other => return,
    };

    match tag {
        "script" | "style" | "template" => {}
        "p" => push_nonempty(out, render_inline(arena, id, depth).trim()),
        "ul" | "ol" => {
            let mut lines = Vec::new();
            render_list(arena, id, depth, 0, &mut lines);
            if !lines.is_empty() {
                out.push(lines.join("\n"));
            }
        }
        "table" => push_nonempty(out, &render_table(arena, id)),
        "pre" => {
            let mut code = String::new();
            preformatted_text(arena, id, &mut code);
            let code = code.trim_end_matches('\n');
            if !code.trim().is_empty() {
                out.push(compose::code_block(code, None));
            }
        }
        "div" | "section" | "article" | "span" => {
            for child in arena.children(id) {
                render_blocks(arena, child, depth + 1, out);
            }
        }
        _ => push_nonempty(out, render_inline(arena, id, depth).trim()),
    }
}

fn push_nonempty(out: &mut Vec<String>, text: &str) {
    if !text.is_empty() {
        out.push(text.to_string());
    }
}

fn flattened_text(arena: &NodeArena, id: NodeId) -> String {
    collapse_whitespace(&inner_text(arena, id))
}

/// Render a node as inline Markdown.
fn render_inline(arena: &NodeArena, id: NodeId, depth: usize) -> String {
    let Some(node) = arena.get(id) else {
        return String::new();
    };
    if depth >= MAX_DEPTH {
        return flattened_text(arena, id);
    }
    let tag = match &node.kind {
        NodeKind::Text(text) => return text.clone(),
        NodeKind::Element(el) => el.name.local.as_ref(),
        NodeKind::Document | NodeKind::Other => return String::new(),
    };

    match tag {
        "br" => "\n".to_string(),
        "script" | "style" | "template" => String::new(),
        "strong" | "b" => wrap_nonempty(render_inline_children(arena, id, depth).trim(), "**"),
        "em" | "i" => wrap_nonempty(render_inline_children(arena, id, depth).trim(), "*"),
        "code" => {
            let inner = escape_inline_code(render_inline_children(arena, id, depth).trim());
            wrap_nonempty(&inner, "`")
        }
        "a" => {
            let rendered = render_inline_children(arena, id, depth);
            let label = match rendered.trim() {
                "" => spaced_text(arena, id),
                label => label.to_string(),
            };
            match arena.attr(id, "href").map(str::trim) {
                Some(href) if !href.is_empty() => format!("[{label}]({href})"),
                _ => label,
            }
        }
        _ => render_inline_children(arena, id, depth),
    }
}

fn wrap_nonempty(inner: &str, marker: &str) -> String {
    if inner.is_empty() {
        String::new()
    } else {
        format!("{marker}{inner}{marker}")
    }
}

/// Concatenate inline children. A closing `**` directly followed by an
/// alphanumeric character gets a separating space, otherwise the emphasis
/// would not close.
fn render_inline_children(arena: &NodeArena, id: NodeId, depth: usize) -> String {
    let mut out = String::new();
    for child in arena.children(id) {
        let piece = render_inline(arena, child, depth + 1);
        let Some(first) = piece.chars().next() else {
            continue;
        };
        if out.ends_with("**") && first.is_alphanumeric() {
            out.push(' ');
        }
        out.push_str(&piece);
    }
    out
}

/// `depth` counts element nesting, `indent` counts list levels.
fn render_list(arena: &NodeArena, list: NodeId, depth: usize, indent: usize, lines: &mut Vec<String>) {
    if depth >= MAX_DEPTH {
        let text = flattened_text(arena, list);
        if !text.is_empty() {
            lines.push(format!("{}{text}", "  ".repeat(indent)));
        }
        return;
    }
    let ordered = arena.is_tag(list, "ol");
    let items = arena.child_elements(list).filter(|&c| arena.is_tag(c, "li"));
    for (i, li) in items.enumerate() {
        let bullet = if ordered {
            format!("{}.", i + 1)
        } else {
            "-".to_string()
        };

        let inline: String = arena
            .children(li)
            .filter(|&c| !is_list(arena, c))
            .map(|c| render_inline(arena, c, depth + 2))
            .collect();
        let line = collapse_whitespace(&inline);
        if !line.is_empty() {
            lines.push(format!("{}{bullet} {line}", "  ".repeat(indent)));
        }

        for nested in arena.child_elements(li).filter(|&c| is_list(arena, c)) {
            render_list(arena, nested, depth + 2, indent + 1, lines);
        }
    }
}

fn is_list(arena: &NodeArena, id: NodeId) -> bool {
    arena.is_tag(id, "ul") || arena.is_tag(id, "ol")
}

fn render_table(arena: &NodeArena, table: NodeId) -> String {
    let rows: Vec<Vec<String>> = arena
        .descendants(table)
        .filter(|&d| arena.is_tag(d, "tr"))
        .map(|tr| {
            let direct: Vec<NodeId> = arena
                .child_elements(tr)
                .filter(|&c| is_cell(arena, c))
                .collect();
            let cells = if direct.is_empty() {
                arena.descendants(tr).filter(|&d| is_cell(arena, d)).collect()
            } else {
                direct
            };
            cells.into_iter().map(|c| spaced_text(arena, c)).collect()
        })
        .collect();

    let Some((header, body)) = rows.split_first() else {
        return String::new();
    };
    compose::table(header, body)
}

fn is_cell(arena: &NodeArena, id: NodeId) -> bool {
    arena.is_tag(id, "td") || arena.is_tag(id, "th")
}

/// Text nodes trimmed individually and joined by single spaces.
fn spaced_text(arena: &NodeArena, id: NodeId) -> String {
    arena
        .descendants(id)
        .filter_map(|d| arena.text(d))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
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
