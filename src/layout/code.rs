//! Code block preparation: line wrapping and token colouring.

use super::theme::Color;

/// Wrap every line longer than `max_chars` characters.
///
/// A line breaks at its last space when that space lies past half the
/// width, otherwise it is split hard at the width. Continuation lines repeat
/// the original line's indentation.
///
/// ```
/// use coursedown::layout::wrap_code_lines;
///
/// assert_eq!(
///     wrap_code_lines("    call(alpha, beta, gamma)", 20),
///     "    call(alpha,\n    beta, gamma)"
/// );
/// ```
pub fn wrap_code_lines(text: &str, max_chars: usize) -> String {
    let max_chars = max_chars.max(2);
    let mut out: Vec<String> = Vec::new();

    for line in text.split('\n') {
        if line.chars().count() <= max_chars {
            out.push(line.to_string());
            continue;
        }

        let indent: String = line.chars().take_while(|c| c.is_whitespace()).collect();
        // An indent eating most of the width would never make progress.
        let indent = if indent.chars().count() >= max_chars / 2 {
            String::new()
        } else {
            indent
        };

        let mut rest: Vec<char> = line.chars().collect();
        while rest.len() > max_chars {
            let chunk = &rest[..max_chars];
            let break_at = chunk.iter().rposition(|&c| c == ' ');
            let (head, tail) = match break_at {
                Some(at) if at > max_chars / 2 => (&rest[..=at], &rest[at + 1..]),
                _ => (&rest[..max_chars], &rest[max_chars..]),
            };
            out.push(head.iter().collect::<String>().trim_end().to_string());
            let tail: String = tail.iter().collect();
            rest = format!("{indent}{}", tail.trim_start()).chars().collect();
        }
        out.push(rest.into_iter().collect());
    }

    out.join("\n")
}

/// Lexical class of a code token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Plain,
    Keyword,
    String,
    Comment,
    Number,
}

impl TokenKind {
    /// Foreground colour; `None` draws in the default text colour.
    pub fn color(self) -> Option<Color> {
        match self {
            TokenKind::Plain => None,
            TokenKind::Keyword => Some(Color::rgb(0x00, 0x80, 0x00)),
            TokenKind::String => Some(Color::rgb(0xBA, 0x21, 0x21)),
            TokenKind::Comment => Some(Color::rgb(0x3D, 0x7B, 0x7B)),
            TokenKind::Number => Some(Color::rgb(0x66, 0x66, 0x66)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeToken {
    pub text: String,
    pub kind: TokenKind,
}

pub type CodeLine = Vec<CodeToken>;

struct Grammar {
    keywords: &'static [&'static str],
    line_comments: &'static [&'static str],
    case_insensitive: bool,
}

const C_LIKE: &[&str] = &[
    "if", "else", "for", "while", "do", "return", "break", "continue", "switch", "case",
    "default", "struct", "enum", "class", "new", "const", "static", "void", "int", "char",
    "float", "double", "long", "bool", "true", "false", "null", "public", "private",
    "protected", "import", "package", "try", "catch", "throw", "this", "namespace", "using",
    "template", "typedef", "sizeof", "interface", "extends", "implements", "final", "var",
];

fn grammar(lang: &str) -> Option<Grammar> {
    let (keywords, line_comments, case_insensitive): (&'static [&'static str], &'static [&'static str], bool) =
        match lang {
            "python" => (
                &[
                    "def", "class", "return", "if", "elif", "else", "for", "while", "in", "not",
                    "and", "or", "is", "import", "from", "as", "with", "try", "except",
                    "finally", "raise", "pass", "break", "continue", "lambda", "yield", "None",
                    "True", "False", "global", "async", "await",
                ],
                &["#"],
                false,
            ),
            "rust" => (
                &[
                    "fn", "let", "mut", "pub", "struct", "enum", "impl", "trait", "use", "mod",
                    "match", "if", "else", "for", "while", "loop", "return", "self", "Self",
                    "crate", "where", "async", "await", "move", "ref", "const", "static",
                    "true", "false", "dyn", "as", "in", "type", "unsafe",
                ],
                &["//"],
                false,
            ),
            "javascript" | "typescript" => (
                &[
                    "function", "const", "let", "var", "return", "if", "else", "for", "while",
                    "class", "new", "import", "export", "from", "default", "async", "await",
                    "try", "catch", "throw", "true", "false", "null", "undefined", "this",
                    "typeof", "interface", "type", "extends", "of", "in",
                ],
                &["//"],
                false,
            ),
            "go" => (
                &[
                    "func", "package", "import", "var", "const", "type", "struct", "interface",
                    "return", "if", "else", "for", "range", "go", "defer", "chan", "map",
                    "switch", "case", "default", "nil", "true", "false",
                ],
                &["//"],
                false,
            ),
            "java" | "c" | "cpp" | "csharp" | "kotlin" | "swift" | "php" => {
                (C_LIKE, &["//"], false)
            }
            "bash" | "powershell" | "dockerfile" | "yaml" => (
                &[
                    "if", "then", "else", "elif", "fi", "for", "in", "do", "done", "while",
                    "case", "esac", "function", "return", "export", "local", "echo", "FROM",
                    "RUN", "COPY", "WORKDIR", "CMD", "ENTRYPOINT", "ENV", "EXPOSE", "true",
                    "false",
                ],
                &["#"],
                false,
            ),
            "ruby" => (
                &[
                    "def", "end", "class", "module", "if", "elsif", "else", "unless", "do",
                    "return", "nil", "true", "false", "self", "require", "puts", "each",
                ],
                &["#"],
                false,
            ),
            "sql" => (
                &[
                    "select", "from", "where", "insert", "into", "values", "update", "set",
                    "delete", "create", "table", "join", "left", "right", "inner", "on",
                    "group", "by", "order", "having", "and", "or", "not", "null", "as",
                    "limit", "distinct",
                ],
                &["--"],
                true,
            ),
            "bat" => (
                &["echo", "set", "if", "goto", "call", "rem", "for", "in", "do", "exit"],
                &["::", "rem "],
                true,
            ),
            "css" | "json" | "html" => (&[], &[], false),
            _ => return None,
        };
    Some(Grammar {
        keywords,
        line_comments,
        case_insensitive,
    })
}

/// Split `code` into coloured tokens, one entry per line. Unknown languages
/// come back as single plain tokens.
pub fn highlight(code: &str, lang: Option<&str>) -> Vec<CodeLine> {
    let rules = lang.map(str::to_ascii_lowercase).and_then(|l| grammar(&l));
    code.split('\n')
        .map(|line| match &rules {
            Some(g) => tokenize_line(line, g),
            None => vec![CodeToken {
                text: line.to_string(),
                kind: TokenKind::Plain,
            }],
        })
        .collect()
}

fn tokenize_line(line: &str, grammar: &Grammar) -> CodeLine {
    let chars: Vec<char> = line.chars().collect();
    let mut tokens: CodeLine = Vec::new();
    let mut push = |text: String, kind: TokenKind| {
        if text.is_empty() {
            return;
        }
        match tokens.last_mut() {
            Some(last) if last.kind == kind => last.text.push_str(&text),
            _ => tokens.push(CodeToken { text, kind }),
        }
    };

    let mut i = 0;
    while i < chars.len() {
        let rest: String = chars[i..].iter().collect();
        let starts_comment = grammar.line_comments.iter().any(|marker| {
            if grammar.case_insensitive {
                rest.to_ascii_lowercase().starts_with(marker)
            } else {
                rest.starts_with(marker)
            }
        });
        if starts_comment {
            push(rest, TokenKind::Comment);
            break;
        }

        let c = chars[i];
        if c == '"' || c == '\'' || c == '`' {
            let mut j = i + 1;
            while j < chars.len() && chars[j] != c {
                if chars[j] == '\\' {
                    j += 1;
                }
                j += 1;
            }
            let end = (j + 1).min(chars.len());
            push(chars[i..end].iter().collect(), TokenKind::String);
            i = end;
        } else if c.is_ascii_digit() {
            let mut j = i;
            while j < chars.len() && (chars[j].is_ascii_alphanumeric() || chars[j] == '.' || chars[j] == '_') {
                j += 1;
            }
            push(chars[i..j].iter().collect(), TokenKind::Number);
            i = j;
        } else if c.is_alphabetic() || c == '_' {
            let mut j = i;
            while j < chars.len() && (chars[j].is_alphanumeric() || chars[j] == '_') {
                j += 1;
            }
            let word: String = chars[i..j].iter().collect();
            let is_keyword = grammar.keywords.iter().any(|k| {
                if grammar.case_insensitive {
                    k.eq_ignore_ascii_case(&word)
                } else {
                    *k == word
                }
            });
            let kind = if is_keyword {
                TokenKind::Keyword
            } else {
                TokenKind::Plain
            };
            push(word, kind);
            i = j;
        } else {
            push(c.to_string(), TokenKind::Plain);
            i += 1;
        }
    }
    tokens
}

/// Plain text of a highlighted line.
pub fn line_text(line: &[CodeToken]) -> String {
    line.iter().map(|t| t.text.as_str()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_wrap_keeps_short_lines() {
        assert_eq!(wrap_code_lines("a\n  b", 10), "a\n  b");
    }

    #[test]
    fn test_wrap_hard_splits_without_spaces() {
        assert_eq!(wrap_code_lines("abcdefghij", 4), "abcd\nefgh\nij");
    }

    #[test]
    fn test_wrap_at_space_past_half() {
        assert_eq!(
            wrap_code_lines("  value = compute(first, second)", 26),
            "  value = compute(first,\n  second)"
        );
    }

    #[test]
    fn test_highlight_python() {
        let lines = highlight("def f(x):  # doc\n    return 'a' + 1", Some("python"));
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0][0], CodeToken { text: "def".into(), kind: TokenKind::Keyword });
        assert_eq!(lines[0].last().unwrap().kind, TokenKind::Comment);
        assert_eq!(lines[0].last().unwrap().text, "# doc");
        assert!(lines[1].iter().any(|t| t.kind == TokenKind::String && t.text == "'a'"));
        assert!(lines[1].iter().any(|t| t.kind == TokenKind::Number && t.text == "1"));
        assert_eq!(line_text(&lines[1]), "    return 'a' + 1");
    }

    #[test]
    fn test_highlight_sql_case_insensitive() {
        let lines = highlight("SELECT id -- key", Some("sql"));
        assert_eq!(lines[0][0].kind, TokenKind::Keyword);
        assert_eq!(lines[0].last().unwrap().text, "-- key");
    }

    #[test]
    fn test_unknown_language_is_plain() {
        let lines = highlight("if x then y", None);
        assert_eq!(lines, vec![vec![CodeToken { text: "if x then y".into(), kind: TokenKind::Plain }]]);
        assert_eq!(highlight("x", Some("cobol"))[0][0].kind, TokenKind::Plain);
    }

    proptest! {
        #[test]
        fn test_wrapped_lines_fit(text in "[ a-z(),]{0,300}", width in 10usize..90) {
            let wrapped = wrap_code_lines(&text, width);
            for line in wrapped.lines() {
                prop_assert!(line.chars().count() <= width);
            }
        }

        #[test]
        fn test_highlight_preserves_text(text in "[ -~]{0,120}") {
            let lines = highlight(&text, Some("python"));
            prop_assert_eq!(line_text(&lines[0]), text);
        }
    }
}
