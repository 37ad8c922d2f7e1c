//! Course outline from the Rise navigation sidebar.

use super::{LessonRef, Section};
use crate::dom::Fragment;

const SECTION: &str = ".nav-sidebar__outline-section";
const SECTION_TITLE: &str = ".nav-sidebar__outline-section-toggle-text";
const LESSON_LINK: &str = "a.nav-sidebar__outline-section-item__link";

/// Title of the section that collects links outside any outline section.
const LOOSE_SECTION_TITLE: &str = "Lessons";

/// The lesson id in a Rise hash route such as `#/lessons/abc123`.
pub fn lesson_id_from_href(href: &str) -> Option<String> {
    let (_, rest) = href.split_once("#/lessons/")?;
    let id = rest.split(['/', '?', '#']).next().unwrap_or("").trim();
    (!id.is_empty()).then(|| id.to_string())
}

/// Sections and lessons of the sidebar, in document order.
///
/// Links with an empty label are skipped. Links outside any outline section
/// are grouped under a section titled `Lessons`. Sections without lessons
/// are dropped. `global_index` is assigned after filtering, so the flattened
/// sequence is 0-based and gap-free.
pub fn parse_sidebar<F: Fragment + PartialEq>(sidebar: &F) -> Vec<Section> {
    let outline: Vec<(String, Vec<F>)> = sidebar
        .locate(SECTION)
        .into_iter()
        .map(|section| {
            let title = section
                .first(SECTION_TITLE)
                .map(|t| t.inner_text().trim().to_string())
                .unwrap_or_default();
            (title, section.locate(LESSON_LINK))
        })
        .collect();

    // Group links by owning section, sections ordered by first appearance.
    let mut groups: Vec<(Option<usize>, Section)> = Vec::new();
    for link in sidebar.locate(LESSON_LINK) {
        let label = link.inner_text().trim().to_string();
        if label.is_empty() {
            continue;
        }
        let owner = outline.iter().position(|(_, links)| links.contains(&link));
        let group = match groups.iter().position(|(key, _)| *key == owner) {
            Some(i) => i,
            None => {
                let title = match owner {
                    Some(i) => outline[i].0.clone(),
                    None => LOOSE_SECTION_TITLE.to_string(),
                };
                groups.push((
                    owner,
                    Section {
                        title,
                        lessons: Vec::new(),
                    },
                ));
                groups.len() - 1
            }
        };
        let href = link.attribute("href").filter(|h| !h.trim().is_empty());
        groups[group].1.lessons.push(LessonRef::new(0, label, href));
    }

    let mut sections: Vec<Section> = groups.into_iter().map(|(_, s)| s).collect();
    for (index, lesson) in sections.iter_mut().flat_map(|s| s.lessons.iter_mut()).enumerate() {
        lesson.global_index = index;
    }
    for (i, section) in sections.iter_mut().enumerate() {
        if section.title.is_empty() {
            section.title = format!("Section {}", i + 1);
        }
    }
    sections
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::HtmlFragment;

    fn parse(html: &str) -> Vec<Section> {
        let doc = HtmlFragment::parse(html);
        let sidebar = doc.first("#nav-content-sidebar").unwrap();
        parse_sidebar(&sidebar)
    }

    fn link(id: &str, label: &str) -> String {
        format!(r##"<a class="nav-sidebar__outline-section-item__link" href="#/lessons/{id}">{label}</a>"##)
    }

    fn section(title: &str, links: &[String]) -> String {
        format!(
            r#"<div class="nav-sidebar__outline-section">
                 <button><span class="nav-sidebar__outline-section-toggle-text">{title}</span></button>
                 <ul>{}</ul>
               </div>"#,
            links.iter().map(|l| format!("<li>{l}</li>")).collect::<String>()
        )
    }

    #[test]
    fn test_sections_and_lessons() {
        let html = format!(
            r#"<nav id="nav-content-sidebar">{}{}</nav>"#,
            section("Basics", &[link("a1", "Welcome"), link("a2", " Setup ")]),
            section("Advanced", &[link("b1", "Traits")]),
        );
        let sections = parse(&html);
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].title, "Basics");
        assert_eq!(sections[0].lessons[1].title, "Setup");
        assert_eq!(sections[0].lessons[1].lesson_id.as_deref(), Some("a2"));
        assert_eq!(sections[1].lessons[0].global_index, 2);
    }

    #[test]
    fn test_empty_labels_do_not_leave_gaps() {
        let html = format!(
            r#"<nav id="nav-content-sidebar">{}</nav>"#,
            section("Only", &[link("a", "One"), link("b", "  "), link("c", "Three")]),
        );
        let sections = parse(&html);
        let indices: Vec<_> = sections[0].lessons.iter().map(|l| l.global_index).collect();
        assert_eq!(indices, vec![0, 1]);
        assert_eq!(sections[0].lessons[1].title, "Three");
    }

    #[test]
    fn test_loose_links_get_their_own_section() {
        let html = format!(
            r#"<nav id="nav-content-sidebar">{}{}</nav>"#,
            link("x", "Overview"),
            section("Main", &[link("y", "Body")]),
        );
        let sections = parse(&html);
        assert_eq!(sections[0].title, "Lessons");
        assert_eq!(sections[0].lessons[0].title, "Overview");
        assert_eq!(sections[1].title, "Main");
        assert_eq!(sections[1].lessons[0].global_index, 1);
    }

    #[test]
    fn test_untitled_sections_are_numbered() {
        let html = format!(
            r#"<nav id="nav-content-sidebar">{}</nav>"#,
            section("", &[link("a", "One")]),
        );
        assert_eq!(parse(&html)[0].title, "Section 1");
    }

    #[test]
    fn test_lesson_id_from_href() {
        assert_eq!(lesson_id_from_href("#/lessons/abc").as_deref(), Some("abc"));
        assert_eq!(
            lesson_id_from_href("index.html#/lessons/abc/blocks/1").as_deref(),
            Some("abc")
        );
        assert_eq!(lesson_id_from_href("#/lessons/"), None);
        assert_eq!(lesson_id_from_href("#/quiz/abc"), None);
    }
}
