//! Source-language guessing for code blocks.
//!
//! Each language carries a handful of weighted patterns; the best score wins
//! when it clears [`MIN_SCORE`] and beats the runner-up. Short or ambiguous
//! snippets get no tag at all, which only costs the fence its highlighting.

use std::sync::LazyLock;

use regex_lite::Regex;

/// Lowest score that counts as a detection.
const MIN_SCORE: u32 = 3;

struct Language {
    name: &'static str,
    rules: Vec<(Regex, u32)>,
}

fn language(name: &'static str, rules: &[(&str, u32)]) -> Language {
    Language {
        name,
        rules: rules
            .iter()
            .map(|&(pattern, weight)| (Regex::new(pattern).unwrap(), weight))
            .collect(),
    }
}

static LANGUAGES: LazyLock<Vec<Language>> = LazyLock::new(|| {
    vec![
        language(
            "Python",
            &[
                (r"(?m)^\s*def \w+\(.*\)\s*(->\s*[\w\[\], .]+)?:\s*$", 3),
                (r"(?m)^\s*(from [\w.]+ )?import \w+", 2),
                (r"(?m)^\s*(if|elif|for|while|with|class)\b[^{;]*:\s*$", 2),
                (r"\bprint\(", 1),
                (r"\b(self|None|True|False)\b", 1),
                (r"(?m)^\s*#[^!\[]", 1),
            ],
        ),
        language(
            "Rust",
            &[
                (r"\bfn \w+(<[^>]*>)?\(", 2),
                (r"\blet (mut )?\w+", 1),
                (r"\b(impl|pub|struct|enum|trait|mod)\b", 1),
                (r"\w+!\(", 1),
                (r"&(mut |'\w+ )?\w+", 1),
                (r"::\w+", 1),
                (r"\b(Some|None|Ok|Err)\(", 1),
            ],
        ),
        language(
            "JavaScript",
            &[
                (r"\b(const|let|var) \w+ = ", 1),
                (r"\bfunction\s*\w*\s*\(", 2),
                (r"=>\s*[{(\w]", 1),
                (r"\bconsole\.\w+\(", 3),
                (r"\b(document|window)\.\w+", 2),
                (r"\brequire\(['\x22]", 2),
            ],
        ),
        language(
            "TypeScript",
            &[
                (r"\b(interface|type) \w+\s*(=|\{)", 2),
                (r"\w+\s*:\s*(string|number|boolean|any|void)\b", 3),
                (r"\b(const|let) \w+:\s*\w+", 2),
                (r"\bexport (default )?(class|function|const|interface)\b", 1),
            ],
        ),
        language(
            "Java",
            &[
                (r"\bpublic (static )?(class|void|final|interface)\b", 3),
                (r"\bSystem\.out\.print", 3),
                (r"\b(private|protected) \w+", 1),
                (r"\bString\[\]", 2),
                (r"(?m)^\s*import java\.", 3),
                (r"@Override\b", 2),
            ],
        ),
        language(
            "C",
            &[
                (r"(?m)^#include\s*<\w+\.h>", 3),
                (r"\bprintf\(", 2),
                (r"\bint main\(", 2),
                (r"\b(malloc|free|sizeof)\(", 2),
                (r"\bchar\s*\*", 1),
            ],
        ),
        language(
            "C++",
            &[
                (r"(?m)^#include\s*<\w+>", 3),
                (r"\bstd::", 3),
                (r"\b(cout|cin)\s*(<<|>>)", 2),
                (r"\btemplate\s*<", 2),
                (r"\bnamespace \w+", 1),
            ],
        ),
        language(
            "C#",
            &[
                (r"(?m)^\s*using System", 3),
                (r"\bConsole\.Write", 3),
                (r"\bnamespace \w+", 1),
                (r"\b(public|private) (async )?\w+ \w+ \{ get;", 3),
                (r"\bvar \w+ = new ", 2),
            ],
        ),
        language(
            "Go",
            &[
                (r"(?m)^package \w+", 3),
                (r"\bfunc (\(\w+ \*?\w+\) )?\w+\(", 3),
                (r"\bfmt\.\w+\(", 3),
                (r":= ", 1),
            ],
        ),
        language(
            "Shell",
            &[
                (r"(?m)^#!/bin/(ba|z)?sh", 4),
                (r"(?m)^\s*(sudo|apt(-get)?|cd|ls|echo|export|chmod|mkdir|curl|pip|npm|git) ", 2),
                (r"\$\{?\w+\}?", 1),
                (r"(?m)^\s*(if|then|fi|do|done|esac)\b", 1),
                (r" \| (grep|awk|sed|xargs)\b", 2),
            ],
        ),
        language(
            "PowerShell",
            &[
                (r"\b(Get|Set|New|Remove|Write|Invoke)-\w+", 3),
                (r"\$\w+ = ", 1),
                (r" -(eq|ne|lt|gt|like)\b", 2),
            ],
        ),
        language(
            "SQL",
            &[
                (r"(?i)\bselect\b[\s\S]+\bfrom\b", 3),
                (r"(?i)\b(insert into|update \w+ set|delete from)\b", 3),
                (r"(?i)\bcreate (table|index|view)\b", 3),
                (r"(?i)\b(where|join|group by|order by)\b", 1),
            ],
        ),
        language(
            "HTML",
            &[
                (r"(?i)<!doctype html", 4),
                (r"(?i)</?(html|head|body|div|span|p|a|ul|li)\b[^>]*>", 2),
                (r"</\w+>", 1),
            ],
        ),
        language(
            "CSS",
            &[
                (r"(?m)^\s*[.#]?[\w-]+(\s*[,>]?\s*[.#]?[\w-]+)*\s*\{", 1),
                (r"(?m)^\s*[\w-]+\s*:\s*[^;]+;\s*$", 2),
                (r"@media\b", 2),
            ],
        ),
        language(
            "JSON",
            &[
                (r#"^\s*[\[{]"#, 1),
                (r#""[\w-]+"\s*:"#, 2),
                (r#"[}\]]\s*$"#, 1),
            ],
        ),
        language(
            "YAML",
            &[
                (r"(?m)^[\w-]+:\s*$", 2),
                (r"(?m)^\s+[\w-]+: \S", 1),
                (r"(?m)^\s*- [\w-]+", 1),
                (r"(?m)^---\s*$", 2),
            ],
        ),
        language(
            "Dockerfile",
            &[
                // An image reference alone also reads as `FROM table`.
                (r"(?m)^FROM [\w./-]+(:[\w.-]+)?(@sha256:[0-9a-f]+)?( [Aa][Ss] \w+)?\s*$", 2),
                (r"(?m)^(RUN|COPY|ADD|WORKDIR|ENTRYPOINT|CMD|EXPOSE|ENV|ARG) ", 2),
            ],
        ),
        language(
            "Batchfile",
            &[
                (r"(?im)^@echo off", 4),
                (r"(?im)^\s*(set|goto|rem) ", 2),
                (r"%\w+%", 2),
            ],
        ),
        language(
            "Ruby",
            &[
                (r"(?m)^\s*def \w+[?!]?(\(.*\))?\s*$", 2),
                (r"(?m)^\s*end\s*$", 2),
                (r"\bputs ", 2),
                (r"(?m)^\s*require '", 2),
                (r"\.each do \|", 3),
            ],
        ),
        language(
            "PHP",
            &[
                (r"<\?php", 5),
                (r"\$\w+->\w+", 2),
                (r"\becho \$", 2),
            ],
        ),
        language(
            "Kotlin",
            &[
                (r"\bfun \w+\(", 3),
                (r"\bval \w+", 1),
                (r"\bprintln\(", 1),
                (r"\bdata class\b", 3),
            ],
        ),
        language(
            "Swift",
            &[
                (r"(?m)^\s*import (UIKit|Foundation|SwiftUI)", 4),
                (r"\bfunc \w+\(.*\)\s*(->\s*\w+\s*)?\{", 2),
                (r"\bguard let\b", 3),
                (r"\bvar \w+: \w+", 1),
            ],
        ),
    ]
});

/// Guess the language of `code`, e.g. `"Python"` or `"C++"`.
pub fn detect_language(code: &str) -> Option<&'static str> {
    if code.trim().is_empty() {
        return None;
    }

    let mut scores: Vec<(&'static str, u32)> = LANGUAGES
        .iter()
        .map(|lang| {
            let score = lang
                .rules
                .iter()
                .filter(|(re, _)| re.is_match(code))
                .map(|(_, weight)| weight)
                .sum();
            (lang.name, score)
        })
        .collect();
    // Stable sort keeps table order among equal scores.
    scores.sort_by(|a, b| b.1.cmp(&a.1));

    match scores.as_slice() {
        [(name, best), rest @ ..] if *best >= MIN_SCORE => {
            let runner_up = rest.first().map_or(0, |(_, s)| *s);
            (*best > runner_up).then_some(*name)
        }
        _ => None,
    }
}

/// Fence tag for a language name: a fixed table for names with punctuation
/// or an established short form, else lower-case without spaces.
///
/// ```
/// use coursedown::block::language_tag;
///
/// assert_eq!(language_tag("C++").as_deref(), Some("cpp"));
/// assert_eq!(language_tag("Shell").as_deref(), Some("bash"));
/// assert_eq!(language_tag("Common Lisp").as_deref(), Some("commonlisp"));
/// ```
pub fn language_tag(name: &str) -> Option<String> {
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    let tag = match name {
        "Batchfile" => "bat",
        "C#" => "csharp",
        "C++" => "cpp",
        "CoffeeScript" => "coffeescript",
        "Dockerfile" => "dockerfile",
        "F#" => "fsharp",
        "JavaScript" => "javascript",
        "Objective-C" => "objectivec",
        "PowerShell" => "powershell",
        "Shell" => "bash",
        "TypeScript" => "typescript",
        "Visual Basic" => "vb",
        other => return Some(other.to_lowercase().replace(' ', "")),
    };
    Some(tag.to_string())
}
