//! Slug generation for Markdown heading anchors.

use std::collections::HashMap;

/// Generate a GitHub-style slug from text.
///
/// Converts text to lowercase, keeps letters and digits from any script,
/// replaces spaces and hyphen/underscore runs with a single hyphen, and drops
/// every other character.
///
/// # Examples
///
/// ```
/// use coursedown::markdown::slugify;
///
/// assert_eq!(slugify("1. Getting Started"), "1-getting-started");
/// assert_eq!(slugify("1.2 What's next?"), "12-whats-next");
/// assert_eq!(slugify("  Multiple   Spaces  "), "multiple-spaces");
/// assert_eq!(slugify("Introducción"), "introducción");
/// ```
pub fn slugify(text: &str) -> String {
    text.chars()
        .flat_map(|c| {
            let mapped = if c.is_alphanumeric() {
                Some(c)
            } else if c.is_whitespace() || c == '-' || c == '_' {
                Some('-')
            } else {
                None
            };
            mapped.into_iter().flat_map(char::to_lowercase)
        })
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// Hands out unique slugs for one document.
///
/// The first occurrence of a slug is returned as-is; later ones get `-1`,
/// `-2`, ... appended, skipping any candidate that is already taken.
#[derive(Debug, Default)]
pub struct SlugRegistry {
    seen: HashMap<String, usize>,
}

impl SlugRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unique(&mut self, text: &str) -> String {
        let mut base = slugify(text);
        if base.is_empty() {
            base = "section".to_string();
        }
        if !self.seen.contains_key(&base) {
            self.seen.insert(base.clone(), 0);
            return base;
        }
        loop {
            let n = {
                let counter = self.seen.entry(base.clone()).or_insert(0);
                *counter += 1;
                *counter
            };
            let candidate = format!("{base}-{n}");
            if !self.seen.contains_key(&candidate) {
                self.seen.insert(candidate.clone(), 0);
                return candidate;
            }
        }
    }
}
