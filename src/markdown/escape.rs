//! Markdown escaping helpers.
//!
//! Only the characters that would break the constructs this crate emits are
//! escaped: pipes inside table cells, backticks inside inline code, and fence
//! runs inside fenced code blocks.

/// Escape `|` so cell text cannot split a pipe-table cell.
///
/// # Examples
///
/// ```
/// use coursedown::markdown::escape_table_cell;
///
/// assert_eq!(escape_table_cell("a | b"), "a \\| b");
/// ```
pub fn escape_table_cell(text: &str) -> String {
    text.replace('|', "\\|")
}

/// Escape backticks inside single-tick inline code.
pub fn escape_inline_code(text: &str) -> String {
    text.replace('`', "\\`")
}

/// Calculate the minimum fence length needed for a code block.
///
/// Returns the smallest number of fence characters (at least 3) that
/// doesn't appear as a run in the content.
///
/// # Examples
///
/// ```
/// use coursedown::markdown::fence_length;
///
/// assert_eq!(fence_length("let x = 1;"), 3);
/// assert_eq!(fence_length("```rust\ncode\n```"), 4);
/// ```
pub fn fence_length(content: &str) -> usize {
    let mut max_run = 0;
    let mut current_run = 0;

    for c in content.chars() {
        if c == '`' {
            current_run += 1;
            max_run = max_run.max(current_run);
        } else {
            current_run = 0;
        }
    }

    max_run.max(2) + 1
}
