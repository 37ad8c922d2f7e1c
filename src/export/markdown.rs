//! Markdown Exporter - the flat course document.
//!
//! Layout:
//! - `# {course}`
//! - optional `## Index` with links to every section and lesson heading
//! - `## {n}. {section}` and `### {n}.{m} {lesson}`, each followed by the
//!   rendered blocks
//!
//! Parts are separated by one blank line and the document ends with exactly
//! one newline.

use std::io::{Seek, Write};

use super::{Exporter, lesson_heading, section_heading};
use crate::asset::AssetStore;
use crate::block::{RenderFormat, render};
use crate::course::CourseScheme;
use crate::error::Result;
use crate::markdown::{SlugRegistry, heading};

/// Configuration for Markdown export.
#[derive(Debug, Clone)]
pub struct MarkdownConfig {
    /// Emit the linked index after the title.
    pub include_index: bool,
}

impl Default for MarkdownConfig {
    fn default() -> Self {
        Self {
            include_index: true,
        }
    }
}

/// Exporter for Markdown output.
#[derive(Debug, Clone, Default)]
pub struct MarkdownExporter {
    config: MarkdownConfig,
}

impl MarkdownExporter {
    /// Create a new MarkdownExporter with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a MarkdownExporter with the specified configuration.
    pub fn with_config(config: MarkdownConfig) -> Self {
        Self { config }
    }

    /// The whole document as a string.
    pub fn render(&self, course: &CourseScheme, assets: &mut AssetStore<'_>) -> String {
        let mut parts = vec![heading(1, &course.title)];
        if self.config.include_index && course.lesson_count() > 0 {
            parts.push(index(course));
        }

        for (n, section) in course.sections.iter().enumerate() {
            let n = n + 1;
            parts.push(heading(2, &section_heading(n, &section.title)));
            for (m, lesson) in section.lessons.iter().enumerate() {
                parts.push(heading(3, &lesson_heading(n, m + 1, &lesson.title)));
                parts.extend(
                    lesson
                        .blocks
                        .iter()
                        .map(|block| render(block, RenderFormat::Markdown, assets))
                        .filter(|body| !body.trim().is_empty()),
                );
            }
        }

        let mut doc = parts.join("\n\n").trim_end().to_string();
        doc.push('\n');
        doc
    }
}

impl Exporter for MarkdownExporter {
    fn export<W: Write + Seek>(&self, course: &CourseScheme, assets: &mut AssetStore<'_>, writer: &mut W) -> Result<()> {
        writer.write_all(self.render(course, assets).as_bytes())?;
        Ok(())
    }
}

/// `## Index` with a nested list linking every section and lesson heading.
///
/// Anchors are registered in document order, title and index heading
/// included, so duplicates get the same `-1`, `-2` suffixes a Markdown
/// renderer assigns.
fn index(course: &CourseScheme) -> String {
    let mut slugs = SlugRegistry::new();
    slugs.unique(&course.title);
    slugs.unique("Index");

    let mut lines = vec![heading(2, "Index"), String::new()];
    for (n, section) in course.sections.iter().enumerate() {
        let n = n + 1;
        let text = section_heading(n, &section.title);
        lines.push(format!("- [{text}](#{})", slugs.unique(&text)));
        for (m, lesson) in section.lessons.iter().enumerate() {
            let text = lesson_heading(n, m + 1, &lesson.title);
            lines.push(format!("  - [{text}](#{})", slugs.unique(&text)));
        }
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::NoFetcher;
    use crate::block::{Block, LessonBlock};
    use crate::course::{LessonRef, Section};

    fn text_block(html: &str) -> Block {
        Block {
            id: Some("b".to_string()),
            raw_text: String::new(),
            content: LessonBlock::Text {
                html: html.to_string(),
                plain_text: String::new(),
            },
        }
    }

    fn course() -> CourseScheme {
        let mut intro = LessonRef::new(0, "Welcome", None);
        intro.blocks = vec![
            text_block("<p>Hello <strong>there</strong></p>"),
            text_block(""),
            Block {
                id: None,
                raw_text: String::new(),
                content: LessonBlock::Title {
                    level: Some(2),
                    text: "Goals".to_string(),
                },
            },
        ];
        CourseScheme::new(
            "Rust Basics",
            vec![
                Section {
                    title: "Start".to_string(),
                    lessons: vec![intro, LessonRef::new(1, "Welcome", None)],
                },
                Section {
                    title: "Start".to_string(),
                    lessons: vec![LessonRef::new(2, "Next", None)],
                },
            ],
        )
    }

    fn render(config: MarkdownConfig) -> String {
        let mut assets = AssetStore::disabled(&NoFetcher);
        MarkdownExporter::with_config(config).render(&course(), &mut assets)
    }

    #[test]
    fn test_document_layout() {
        let doc = render(MarkdownConfig {
            include_index: false,
        });
        assert_eq!(
            doc,
            "# Rust Basics\n\n\
             ## 1. Start\n\n\
             ### 1.1 Welcome\n\n\
             Hello **there**\n\n\
             #### Goals\n\n\
             ### 1.2 Welcome\n\n\
             ## 2. Start\n\n\
             ### 2.1 Next\n"
        );
    }

    #[test]
    fn test_index_links() {
        let doc = render(MarkdownConfig::default());
        let index = "## Index\n\n\
                     - [1. Start](#1-start)\n  \
                     - [1.1 Welcome](#11-welcome)\n  \
                     - [1.2 Welcome](#12-welcome)\n\
                     - [2. Start](#2-start)\n  \
                     - [2.1 Next](#21-next)";
        assert!(doc.starts_with(&format!("# Rust Basics\n\n{index}\n\n## 1. Start")), "{doc}");
    }

    #[test]
    fn test_duplicate_headings_get_suffixes() {
        let course = CourseScheme::new(
            "Dup",
            vec![Section {
                title: "A".to_string(),
                lessons: vec![LessonRef::new(0, "x", None)],
            }],
        );
        let mut slugs = SlugRegistry::new();
        slugs.unique("Dup");
        slugs.unique("Index");
        assert_eq!(slugs.unique("1. A"), "1-a");
        assert!(index(&course).contains("[1. A](#1-a)"));

        let mut twice = SlugRegistry::new();
        assert_eq!(twice.unique("Index"), "index");
        assert_eq!(twice.unique("Index"), "index-1");
    }

    #[test]
    fn test_index_links_accented_titles() {
        let course = CourseScheme::new(
            "Curso",
            vec![Section {
                title: "Introducción a la programación".to_string(),
                lessons: vec![
                    LessonRef::new(0, "Café", None),
                    LessonRef::new(1, "Cafe", None),
                ],
            }],
        );
        let index = index(&course);
        assert!(
            index.contains("- [1. Introducción a la programación](#1-introducción-a-la-programación)"),
            "{index}"
        );
        assert!(index.contains("  - [1.1 Café](#11-café)"));
        assert!(index.contains("  - [1.2 Cafe](#12-cafe)"));
    }

    #[test]
    fn test_empty_course_has_no_index() {
        let mut assets = AssetStore::disabled(&NoFetcher);
        let doc = MarkdownExporter::new().render(&CourseScheme::new("Empty", Vec::new()), &mut assets);
        assert_eq!(doc, "# Empty\n");
    }
}
