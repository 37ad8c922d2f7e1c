//! Property tests over whole documents and lessons.

use std::collections::HashSet;

use proptest::prelude::*;

use coursedown::asset::{AssetStore, NoFetcher};
use coursedown::block::scrape_lesson;
use coursedown::dom::HtmlFragment;
use coursedown::export::{MarkdownExporter, PlainTextExporter, output_filename};
use coursedown::{CourseScheme, LessonRef, OutputFormat, Section};

fn course_strategy() -> impl Strategy<Value = CourseScheme> {
    let title = "[A-Za-z0-9 .!-]{1,16}";
    let section = (title, prop::collection::vec(title, 1..4));
    (title, prop::collection::vec(section, 0..4)).prop_map(|(title, sections)| {
        let mut index = 0;
        let sections = sections
            .into_iter()
            .map(|(title, lessons)| Section {
                title,
                lessons: lessons
                    .into_iter()
                    .map(|lesson| {
                        index += 1;
                        LessonRef::new(index - 1, lesson, None)
                    })
                    .collect(),
            })
            .collect();
        CourseScheme::new(title, sections)
    })
}

proptest! {
    #[test]
    fn test_index_anchors_are_unique(course in course_strategy()) {
        let mut assets = AssetStore::disabled(&NoFetcher);
        let doc = MarkdownExporter::new().render(&course, &mut assets);

        let anchors: Vec<&str> = doc
            .lines()
            .filter_map(|line| line.trim_start().strip_prefix("- ["))
            .filter_map(|rest| rest.rsplit_once("](#"))
            .map(|(_, anchor)| anchor.trim_end_matches(')'))
            .collect();
        prop_assert_eq!(anchors.len(), course.sections.len() + course.lesson_count());
        let distinct: HashSet<&str> = anchors.iter().copied().collect();
        prop_assert_eq!(distinct.len(), anchors.len());
    }

    #[test]
    fn test_documents_end_with_one_newline(course in course_strategy()) {
        let mut assets = AssetStore::disabled(&NoFetcher);
        let md = MarkdownExporter::new().render(&course, &mut assets);
        let txt = PlainTextExporter::new().render(&course, &mut assets);
        for doc in [md, txt] {
            prop_assert!(doc.ends_with('\n'));
            prop_assert!(!doc.ends_with("\n\n"));
        }
    }

    #[test]
    fn test_output_filename_is_safe(title in ".*") {
        for format in OutputFormat::ALL {
            let name = output_filename(&title, format);
            let suffix = format!(".{}", format.extension());
            prop_assert!(name.ends_with(&suffix));
            prop_assert!(name.len() > suffix.len());
            prop_assert!(name.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_')));
        }
    }

    #[test]
    fn test_every_wrapper_becomes_a_block(bodies in prop::collection::vec("[ -;=?-~]{0,60}", 0..6)) {
        let wrappers: String = bodies
            .iter()
            .enumerate()
            .map(|(i, body)| format!(r#"<div class="noOutline" data-block-id="b{i}"><div class="fr-view"><p>{body}</p></div></div>"#))
            .collect();
        let page = HtmlFragment::parse(&format!(r#"<div data-lesson-id="l"><section class="blocks-lesson">{wrappers}</section></div>"#));

        let blocks = scrape_lesson(&page);
        prop_assert_eq!(blocks.len(), bodies.len());
        for (i, block) in blocks.iter().enumerate() {
            prop_assert_eq!(block.id.clone(), Some(format!("b{i}")));
        }
    }
}
