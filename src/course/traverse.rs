//! Sections → lessons → blocks, in sidebar order.

use super::session::{LESSON_ROOT, PageSession, SIDEBAR};
use super::{CourseScheme, parse_sidebar};
use crate::block::scrape_lesson;
use crate::error::{Error, Result};

/// Build the course outline from the sidebar and scrape every lesson.
///
/// The title is the player's course title, else `fallback_title`. A missing
/// sidebar or a lesson whose root cannot be found stops the run.
pub fn scrape_course<S: PageSession>(session: &mut S, fallback_title: &str) -> Result<CourseScheme> {
    let sidebar = session
        .sidebar()
        .ok_or_else(|| Error::MissingElement(format!("course sidebar {SIDEBAR}")))?;
    let title = session
        .course_title()
        .unwrap_or_else(|| fallback_title.to_string());
    let mut course = CourseScheme::new(title, parse_sidebar(&sidebar));

    let total = course.lesson_count();
    if total == 0 {
        log::warn!("no lessons found in the sidebar");
    }

    for section in &mut course.sections {
        for lesson in &mut section.lessons {
            let root = session.open_lesson(lesson).ok_or_else(|| Error::Navigation {
                section: section.title.clone(),
                lesson: lesson.title.clone(),
                reason: format!("lesson root {LESSON_ROOT} not found"),
            })?;
            lesson.blocks = scrape_lesson(&root);
            log::info!("Scraped {}/{total}: {}", lesson.global_index + 1, lesson.title);
        }
    }
    Ok(course)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::BlockKind;
    use crate::course::LessonRef;
    use crate::dom::{Fragment, HtmlFragment};

    /// Serves lessons from memory, keyed by global index.
    struct InMemory {
        index: HtmlFragment,
        lessons: Vec<&'static str>,
        opened: Vec<usize>,
    }

    impl PageSession for InMemory {
        type Fragment = HtmlFragment;

        fn sidebar(&self) -> Option<HtmlFragment> {
            self.index.first(SIDEBAR)
        }

        fn course_title(&self) -> Option<String> {
            None
        }

        fn open_lesson(&mut self, lesson: &LessonRef) -> Option<HtmlFragment> {
            self.opened.push(lesson.global_index);
            let html = self.lessons.get(lesson.global_index)?;
            HtmlFragment::parse(html).first(LESSON_ROOT)
        }
    }

    const SIDEBAR_HTML: &str = r##"<nav id="nav-content-sidebar">
        <div class="nav-sidebar__outline-section">
          <span class="nav-sidebar__outline-section-toggle-text">Start</span>
          <a class="nav-sidebar__outline-section-item__link" href="#/lessons/l1">First</a>
          <a class="nav-sidebar__outline-section-item__link" href="#/lessons/l2">Second</a>
        </div>
      </nav>"##;

    const LESSON: &str = r#"<div data-lesson-id="l"><section class="blocks-lesson">
        <div class="noOutline" data-block-id="b1"><div class="fr-view"><p>Hello</p></div></div>
      </section></div>"#;

    fn session(lessons: Vec<&'static str>) -> InMemory {
        InMemory {
            index: HtmlFragment::parse(SIDEBAR_HTML),
            lessons,
            opened: Vec::new(),
        }
    }

    #[test]
    fn test_scrapes_lessons_in_order() {
        let mut session = session(vec![LESSON, LESSON]);
        let course = scrape_course(&mut session, "Fallback").unwrap();
        assert_eq!(course.title, "Fallback");
        assert_eq!(session.opened, vec![0, 1]);
        assert_eq!(course.block_count(), 2);
        let first = course.lessons().next().unwrap();
        assert_eq!(first.blocks[0].kind(), BlockKind::Text);
    }

    #[test]
    fn test_missing_lesson_root_is_fatal() {
        let mut session = session(vec![LESSON, "<p>logged out</p>"]);
        let err = scrape_course(&mut session, "C").unwrap_err();
        match err {
            Error::Navigation { section, lesson, .. } => {
                assert_eq!(section, "Start");
                assert_eq!(lesson, "Second");
            }
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn test_missing_sidebar() {
        let mut session = session(vec![]);
        session.index = HtmlFragment::parse("<p>no sidebar</p>");
        assert!(matches!(
            scrape_course(&mut session, "C"),
            Err(Error::MissingElement(_))
        ));
    }
}
