//! Course structure and traversal.
//!
//! A run reads the navigation sidebar once to build a [`CourseScheme`], then
//! visits every lesson in sidebar order through a [`PageSession`] and fills
//! in its blocks. Once traversal returns, the scheme is read-only input for
//! the exporters.

mod session;
mod sidebar;
mod traverse;

pub use session::{LESSON_ROOT, PageSession, SIDEBAR, SnapshotSession};
pub use sidebar::{lesson_id_from_href, parse_sidebar};
pub use traverse::scrape_course;

use crate::block::Block;

/// A course: its title and the sections of its sidebar.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CourseScheme {
    pub title: String,
    pub sections: Vec<Section>,
}

impl CourseScheme {
    pub fn new(title: impl Into<String>, sections: Vec<Section>) -> Self {
        Self {
            title: title.into(),
            sections,
        }
    }

    /// Every lesson, sections flattened in order.
    pub fn lessons(&self) -> impl Iterator<Item = &LessonRef> {
        self.sections.iter().flat_map(|s| s.lessons.iter())
    }

    pub fn lesson_count(&self) -> usize {
        self.sections.iter().map(|s| s.lessons.len()).sum()
    }

    pub fn block_count(&self) -> usize {
        self.lessons().map(|l| l.blocks.len()).sum()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Section {
    pub title: String,
    pub lessons: Vec<LessonRef>,
}

/// One sidebar lesson entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LessonRef {
    /// 0-based position in the flattened lesson sequence.
    pub global_index: usize,
    pub title: String,
    pub href: Option<String>,
    /// Rise lesson id, the part of `href` after `#/lessons/`.
    pub lesson_id: Option<String>,
    /// Filled in when the lesson is visited.
    pub blocks: Vec<Block>,
}

impl LessonRef {
    pub fn new(global_index: usize, title: impl Into<String>, href: Option<String>) -> Self {
        let lesson_id = href.as_deref().and_then(lesson_id_from_href);
        Self {
            global_index,
            title: title.into(),
            href,
            lesson_id,
            blocks: Vec::new(),
        }
    }
}
