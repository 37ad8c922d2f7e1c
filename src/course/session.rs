//! Page session capability and the saved-snapshot implementation.

use std::fs;
use std::path::{Path, PathBuf};

use url::Url;

use super::LessonRef;
use crate::dom::{Fragment, HtmlFragment};
use crate::error::{Error, Result};
use crate::util::decode_html;

/// The navigation sidebar of the course player.
pub const SIDEBAR: &str = "#nav-content-sidebar";

/// Root element of a rendered lesson.
pub const LESSON_ROOT: &str = "[data-lesson-id]";

const HEADER_TITLE: &str = ".nav-sidebar-header__title";

/// Access to the pages of one course.
///
/// A session backed by a live browser must bound every wait with a short
/// timeout and report expiry as `None`. Sessions are used from one thread,
/// one lesson at a time.
pub trait PageSession {
    type Fragment: Fragment + PartialEq;

    /// The sidebar element.
    fn sidebar(&self) -> Option<Self::Fragment>;

    /// The course title shown by the player, if any.
    fn course_title(&self) -> Option<String>;

    /// Navigate to `lesson` and return its lesson root.
    fn open_lesson(&mut self, lesson: &LessonRef) -> Option<Self::Fragment>;
}

/// A course saved to disk.
///
/// The directory holds `index.html` with the sidebar and one file per lesson
/// under `lessons/`, named by lesson id (`lessons/{id}.html`) or by position
/// (`lessons/{global_index}.html`). Relative URLs resolve against each page's
/// `<base href>`, else the configured base URL, else stay relative to the
/// snapshot directory.
pub struct SnapshotSession {
    root: PathBuf,
    base: Option<Url>,
    index: HtmlFragment,
}

impl SnapshotSession {
    pub fn open(root: impl Into<PathBuf>, base_url: Option<&str>) -> Result<Self> {
        let root = root.into();
        let base = base_url
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .map(|u| Url::parse(u).map_err(|e| Error::InvalidConfig(format!("invalid base URL {u:?}: {e}"))))
            .transpose()?;

        let index_path = root.join("index.html");
        let bytes = fs::read(&index_path).map_err(|e| {
            Error::Io(std::io::Error::new(
                e.kind(),
                format!("{}: {e}", index_path.display()),
            ))
        })?;
        let index = HtmlFragment::parse_with_base(&decode_html(&bytes), base.as_ref());
        log::debug!("opened snapshot {}", root.display());
        Ok(Self { root, base, index })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn load(&self, path: &Path) -> Option<HtmlFragment> {
        let bytes = fs::read(path).ok()?;
        log::debug!("loading {}", path.display());
        Some(HtmlFragment::parse_with_base(&decode_html(&bytes), self.base.as_ref()))
    }

    fn lesson_paths(&self, lesson: &LessonRef) -> Vec<PathBuf> {
        let dir = self.root.join("lessons");
        let mut paths = Vec::with_capacity(2);
        if let Some(id) = &lesson.lesson_id {
            paths.push(dir.join(format!("{id}.html")));
        }
        paths.push(dir.join(format!("{}.html", lesson.global_index)));
        paths
    }
}

impl PageSession for SnapshotSession {
    type Fragment = HtmlFragment;

    fn sidebar(&self) -> Option<HtmlFragment> {
        self.index.first(SIDEBAR)
    }

    fn course_title(&self) -> Option<String> {
        let from_header = self.index.first(HEADER_TITLE).map(|t| t.inner_text());
        let from_head = || self.index.first("title").map(|t| t.text_content());
        [from_header, from_head()]
            .into_iter()
            .flatten()
            .map(|t| t.split_whitespace().collect::<Vec<_>>().join(" "))
            .find(|t| !t.is_empty())
    }

    fn open_lesson(&mut self, lesson: &LessonRef) -> Option<HtmlFragment> {
        self.lesson_paths(lesson)
            .iter()
            .find_map(|path| self.load(path))?
            .first(LESSON_ROOT)
    }
}
