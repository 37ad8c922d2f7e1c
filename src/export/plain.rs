//! Plain-text exporter: the Markdown document layout without markup.

use std::io::{Seek, Write};

use super::{Exporter, lesson_heading, section_heading};
use crate::asset::AssetStore;
use crate::block::{RenderFormat, render};
use crate::course::CourseScheme;
use crate::error::Result;

/// Exporter for plain-text output. The title is underlined with `=`;
/// sections and lessons keep their numbers; there is no index.
#[derive(Debug, Clone, Default)]
pub struct PlainTextExporter;

impl PlainTextExporter {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, course: &CourseScheme, assets: &mut AssetStore<'_>) -> String {
        let underline = "=".repeat(course.title.chars().count().max(1));
        let mut parts = vec![format!("{}\n{underline}", course.title)];

        for (n, section) in course.sections.iter().enumerate() {
            let n = n + 1;
            parts.push(section_heading(n, &section.title));
            for (m, lesson) in section.lessons.iter().enumerate() {
                parts.push(lesson_heading(n, m + 1, &lesson.title));
                parts.extend(
                    lesson
                        .blocks
                        .iter()
                        .map(|block| render(block, RenderFormat::PlainText, assets))
                        .filter(|body| !body.trim().is_empty()),
                );
            }
        }

        let mut doc = parts.join("\n\n").trim_end().to_string();
        doc.push('\n');
        doc
    }
}

impl Exporter for PlainTextExporter {
    fn export<W: Write + Seek>(&self, course: &CourseScheme, assets: &mut AssetStore<'_>, writer: &mut W) -> Result<()> {
        writer.write_all(self.render(course, assets).as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::NoFetcher;
    use crate::block::{Block, Flashcard, LessonBlock};
    use crate::course::{LessonRef, Section};
    use std::io::Cursor;

    #[test]
    fn test_plain_document() {
        let mut lesson = LessonRef::new(0, "Cards", None);
        lesson.blocks = vec![
            Block {
                id: None,
                raw_text: String::new(),
                content: LessonBlock::Text {
                    html: r#"<p>See <a href="https://x.io">docs</a> and <em>more</em></p>"#.to_string(),
                    plain_text: String::new(),
                },
            },
            Block {
                id: None,
                raw_text: String::new(),
                content: LessonBlock::Flashcards {
                    cards: vec![Flashcard {
                        front: "Front".to_string(),
                        back_html: "<p>Back</p>".to_string(),
                    }],
                },
            },
        ];
        let course = CourseScheme::new(
            "Intro",
            vec![Section {
                title: "One".to_string(),
                lessons: vec![lesson],
            }],
        );

        let mut assets = AssetStore::disabled(&NoFetcher);
        let mut out = Cursor::new(Vec::new());
        PlainTextExporter::new().export(&course, &mut assets, &mut out).unwrap();
        let doc = String::from_utf8(out.into_inner()).unwrap();
        assert_eq!(
            doc,
            "Intro\n=====\n\n1. One\n\n1.1 Cards\n\nSee docs (https://x.io) and more\n\nFront\nBack\n"
        );
    }
}
