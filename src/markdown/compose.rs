//! Markdown building blocks shared by every block renderer.

use super::escape::{escape_table_cell, fence_length};

/// A `#` heading, level clamped into 1..=6.
pub fn heading(level: u8, text: &str) -> String {
    let level = usize::from(level.clamp(1, 6));
    format!("{} {}", "#".repeat(level), text).trim().to_string()
}

/// A numbered item with a hanging indent: the first body line follows the
/// marker, later lines are indented to align under it.
///
/// ```
/// use coursedown::markdown::numbered_item;
///
/// assert_eq!(numbered_item("10", "first\nsecond"), "10. first\n    second");
/// ```
pub fn numbered_item(number: &str, body: &str) -> String {
    let prefix = format!("{number}. ");
    let mut lines = body.lines();
    let first = lines.next().unwrap_or("").trim();
    let indent = " ".repeat(prefix.len());

    let mut out = vec![format!("{prefix}{first}")];
    for line in lines {
        if line.trim().is_empty() {
            out.push(String::new());
        } else {
            out.push(format!("{indent}{line}"));
        }
    }
    out.join("\n").trim_end().to_string()
}

/// A bullet with a bold title and a two-space indented body. The title line
/// ends in a hard break so the body stays inside the list item.
pub fn bullet_item(title: &str, body: &str) -> String {
    let mut out = vec![format!("- **{title}**  ")];
    for line in body.lines() {
        if line.trim().is_empty() {
            out.push(String::new());
        } else {
            out.push(format!("  {line}"));
        }
    }
    out.join("\n").trim_end().to_string()
}

/// A blockquote callout, with the link on its own quoted line.
pub fn link_callout(body: &str, href: Option<&str>) -> String {
    let mut lines: Vec<String> = body
        .trim()
        .lines()
        .map(|line| format!("> {line}").trim_end().to_string())
        .collect();
    if let Some(href) = href.map(str::trim).filter(|h| !h.is_empty()) {
        if !lines.is_empty() {
            lines.push(">".to_string());
        }
        lines.push(format!("> [Link]({href})"));
    }
    lines.join("\n").trim().to_string()
}

pub fn image(alt: &str, path: &str) -> String {
    let alt = if alt.is_empty() { "image" } else { alt };
    format!("![{alt}]({path})")
}

/// A fenced code block, the fence growing past any backtick run in `code`.
pub fn code_block(code: &str, lang: Option<&str>) -> String {
    let fence = "`".repeat(fence_length(code));
    format!("{fence}{}\n{code}\n{fence}", lang.unwrap_or(""))
}

/// A pipe table. Short rows are padded with empty cells.
pub fn table(header: &[String], rows: &[Vec<String>]) -> String {
    let columns = rows
        .iter()
        .map(Vec::len)
        .chain(std::iter::once(header.len()))
        .max()
        .unwrap_or(0);
    if columns == 0 {
        return String::new();
    }

    let format_row = |row: &[String]| {
        let cells: Vec<String> = (0..columns)
            .map(|i| row.get(i).map_or_else(String::new, |c| escape_table_cell(c)))
            .collect();
        format!("| {} |", cells.join(" | "))
    };

    let mut lines = vec![format_row(header), format!("| {} |", vec!["---"; columns].join(" | "))];
    lines.extend(rows.iter().map(|r| format_row(r)));
    lines.join("\n")
}
