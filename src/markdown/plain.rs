//! Markdown to plain text: the same layout with the markup removed.

use std::sync::LazyLock;

use regex_lite::Regex;

/// `![alt](path)`
static IMAGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!\[([^\]]*)\]\(([^)\s]*)\)").unwrap());

/// `[label](href)`
static LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]*)\]\(([^)\s]*)\)").unwrap());

/// `<video ... src="assets/name" ...></video>`
static VIDEO_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<video\b[^>]*\bsrc="(?:[^"]*/)?([^"/]*)"[^>]*>\s*(?:</video>)?"#).unwrap()
});

static BOLD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*\*(\S(?:.*?\S)?)\*\*").unwrap());

static ITALIC_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*(\S(?:[^*]*?\S)?)\*").unwrap());

static CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"`((?:\\`|[^`])+)`").unwrap());

static HEADING_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^#{1,6}(?:\s+|$)").unwrap());

static FENCE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*`{3,}[\w+#-]*\s*$").unwrap());

/// Strip Markdown markup while keeping list markers, indentation and line
/// structure. Fenced code keeps its content but loses the fence lines.
///
/// ```
/// use coursedown::markdown::markdown_to_plain;
///
/// assert_eq!(markdown_to_plain("#### **Bold** [Docs](https://d.io)"), "Bold Docs (https://d.io)");
/// ```
pub fn markdown_to_plain(markdown: &str) -> String {
    let mut out = Vec::new();
    let mut in_fence = false;

    for line in markdown.lines() {
        if FENCE_RE.is_match(line) {
            in_fence = !in_fence;
            continue;
        }
        if in_fence {
            out.push(line.to_string());
            continue;
        }
        out.push(strip_line(line));
    }

    out.join("\n").trim().to_string()
}

fn strip_line(line: &str) -> String {
    let indent_len = line.len() - line.trim_start().len();
    let (indent, mut rest) = line.split_at(indent_len);

    if let Some(quoted) = rest.strip_prefix('>') {
        rest = quoted.strip_prefix(' ').unwrap_or(quoted);
    }
    let rest = HEADING_RE.replace(rest, "");
    let rest = VIDEO_RE.replace_all(&rest, "[video: $1]");
    let rest = IMAGE_RE.replace_all(&rest, "[image: $1]");
    let rest = LINK_RE.replace_all(&rest, |caps: &regex_lite::Captures<'_>| {
        let label = &caps[1];
        let href = &caps[2];
        if label.is_empty() || label == href {
            href.to_string()
        } else {
            format!("{label} ({href})")
        }
    });
    let rest = CODE_RE.replace_all(&rest, |caps: &regex_lite::Captures<'_>| caps[1].replace("\\`", "`"));
    let rest = BOLD_RE.replace_all(&rest, "$1");
    let rest = ITALIC_RE.replace_all(&rest, "$1");
    let rest = rest.replace("\\|", "|");

    format!("{indent}{}", rest.trim_end())
}
