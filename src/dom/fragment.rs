//! The DOM query capability consumed by the block pipeline.

use std::fmt;
use std::rc::Rc;

use url::Url;

use super::arena::{NodeArena, NodeId};
use super::select::compile;
use super::text;
use super::tree_sink::parse_html;

/// A queryable DOM subtree.
///
/// Every read is best-effort: a missing element, attribute or source yields an
/// empty string or `None`, never an error. Implementations backed by a live
/// page must bound each wait with a short timeout and report expiry as
/// absence.
pub trait Fragment: Sized + Clone {
    /// All descendants matching `selector`, in document order.
    fn locate(&self, selector: &str) -> Vec<Self>;

    fn first(&self, selector: &str) -> Option<Self> {
        self.locate(selector).into_iter().next()
    }

    fn count(&self, selector: &str) -> usize {
        self.locate(selector).len()
    }

    fn exists(&self, selector: &str) -> bool {
        self.first(selector).is_some()
    }

    /// Rendered text (line structure kept, whitespace collapsed).
    fn inner_text(&self) -> String;

    /// Raw concatenated text nodes.
    fn text_content(&self) -> String;

    fn inner_html(&self) -> String;

    fn attribute(&self, name: &str) -> Option<String>;

    /// A non-blank attribute holding a URL, resolved against the document
    /// base.
    fn url_attribute(&self, name: &str) -> Option<String>;

    /// The source an `<img>`/`<video>` currently displays, as an absolute URL
    /// when a base is known. Equivalent to `el.currentSrc || el.src`.
    fn current_source(&self) -> Option<String>;

    fn has_class(&self, class: &str) -> bool {
        self.attribute("class")
            .is_some_and(|c| c.split_whitespace().any(|c| c == class))
    }
}

/// A parsed page plus the URL relative references resolve against.
pub struct Snapshot {
    arena: NodeArena,
    base: Option<Url>,
}

impl Snapshot {
    pub fn arena(&self) -> &NodeArena {
        &self.arena
    }

    pub fn base(&self) -> Option<&Url> {
        self.base.as_ref()
    }

    /// Resolve `raw` against the document base. Absolute and `data:` URLs
    /// pass through unchanged.
    pub fn resolve(&self, raw: &str) -> String {
        let raw = raw.trim();
        if raw.starts_with("data:") {
            return raw.to_string();
        }
        match &self.base {
            Some(base) => base
                .join(raw)
                .map_or_else(|_| raw.to_string(), |u| u.to_string()),
            None => raw.to_string(),
        }
    }
}

/// A [`Fragment`] over a parsed HTML snapshot.
#[derive(Clone)]
pub struct HtmlFragment {
    doc: Rc<Snapshot>,
    node: NodeId,
}

impl fmt::Debug for HtmlFragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HtmlFragment")
            .field("tag", &self.doc.arena.tag(self.node))
            .field("node", &self.node.0)
            .finish()
    }
}

/// Two fragments are equal when they point at the same node of the same
/// parsed snapshot.
impl PartialEq for HtmlFragment {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.doc, &other.doc) && self.node == other.node
    }
}

impl HtmlFragment {
    /// Parse `html`; the fragment is the document node.
    pub fn parse(html: &str) -> Self {
        Self::parse_with_base(html, None)
    }

    /// Parse `html`, resolving relative URLs against its `<base href>` (itself
    /// resolved against `base`) or else against `base`.
    pub fn parse_with_base(html: &str, base: Option<&Url>) -> Self {
        let arena = parse_html(html);
        let declared = arena
            .find_tag(arena.document(), "base")
            .and_then(|b| arena.attr(b, "href"))
            .and_then(|href| match base {
                Some(outer) => outer.join(href).ok(),
                None => Url::parse(href).ok(),
            });
        let base = declared.or_else(|| base.cloned());
        let node = arena.document();
        Self {
            doc: Rc::new(Snapshot { arena, base }),
            node,
        }
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.doc
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    fn at(&self, node: NodeId) -> Self {
        Self {
            doc: Rc::clone(&self.doc),
            node,
        }
    }

    pub fn tag(&self) -> &str {
        self.doc.arena.tag(self.node)
    }

    /// Serialized HTML of this node including its own tag.
    pub fn outer_html(&self) -> String {
        text::outer_html(&self.doc.arena, self.node)
    }

    fn attr_source(&self, name: &str) -> Option<String> {
        self.doc
            .arena
            .attr(self.node, name)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| self.doc.resolve(s))
    }
}

impl Fragment for HtmlFragment {
    fn locate(&self, selector: &str) -> Vec<Self> {
        let Some(compiled) = compile(selector) else {
            return Vec::new();
        };
        compiled
            .select(&self.doc.arena, self.node)
            .map(|id| self.at(id))
            .collect()
    }

    fn first(&self, selector: &str) -> Option<Self> {
        let compiled = compile(selector)?;
        let found = compiled.select(&self.doc.arena, self.node).next();
        found.map(|id| self.at(id))
    }

    fn count(&self, selector: &str) -> usize {
        compile(selector).map_or(0, |c| c.select(&self.doc.arena, self.node).count())
    }

    fn inner_text(&self) -> String {
        text::inner_text(&self.doc.arena, self.node)
    }

    fn text_content(&self) -> String {
        text::text_content(&self.doc.arena, self.node)
    }

    fn inner_html(&self) -> String {
        text::inner_html(&self.doc.arena, self.node)
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.doc.arena.attr(self.node, name).map(str::to_string)
    }

    fn url_attribute(&self, name: &str) -> Option<String> {
        self.attr_source(name)
    }

    fn current_source(&self) -> Option<String> {
        if self.tag() == "img"
            && let Some(best) = self
                .doc
                .arena
                .attr(self.node, "srcset")
                .and_then(best_srcset_candidate)
        {
            return Some(self.doc.resolve(best));
        }
        self.attr_source("src")
            .or_else(|| self.attr_source("data-src"))
            .or_else(|| {
                if self.tag() != "video" {
                    return None;
                }
                self.doc
                    .arena
                    .children(self.node)
                    .find(|&c| self.doc.arena.tag(c) == "source")
                    .and_then(|c| self.at(c).attr_source("src"))
            })
    }

    fn has_class(&self, class: &str) -> bool {
        self.doc.arena.has_class(self.node, class)
    }
}

/// Pick the candidate a browser on a large screen would load: the widest
/// `w` descriptor, else the highest `x` density, else the first entry.
fn best_srcset_candidate(srcset: &str) -> Option<&str> {
    let mut best: Option<(&str, f64)> = None;
    for candidate in srcset.split(',') {
        let mut parts = candidate.split_whitespace();
        let Some(url) = parts.next() else {
            continue;
        };
        let weight = parts
            .next()
            .and_then(|d| {
                let (num, unit) = d.split_at(d.len().saturating_sub(1));
                let value: f64 = num.parse().ok()?;
                match unit {
                    // Width descriptors outrank any density descriptor.
                    "w" => Some(value * 1000.0),
                    "x" => Some(value),
                    _ => None,
                }
            })
            .unwrap_or(1.0);
        if best.is_none_or(|(_, w)| weight > w) {
            best = Some((url, weight));
        }
    }
    best.map(|(url, _)| url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locate_and_read() {
        let frag = HtmlFragment::parse(
            r#"<div class="blocks-accordion__item"><div class="fr-view"><p>One</p></div></div>
               <div class="blocks-accordion__item"><div class="fr-view"><p>Two</p></div></div>"#,
        );
        let items = frag.locate(".blocks-accordion__item");
        assert_eq!(items.len(), 2);
        assert_eq!(frag.count(".fr-view"), 2);
        let body = items[1].first(".fr-view").unwrap();
        assert_eq!(body.inner_html(), "<p>Two</p>");
        assert_eq!(body.inner_text(), "Two");
    }

    #[test]
    fn test_missing_reads_are_empty() {
        let frag = HtmlFragment::parse("<div></div>");
        assert!(frag.first(".nothing").is_none());
        assert_eq!(frag.count(".nothing"), 0);
        assert!(frag.attribute("href").is_none());
        assert_eq!(frag.inner_text(), "");
        assert!(frag.locate("[[[").is_empty());
    }

    #[test]
    fn test_current_source_prefers_largest_srcset() {
        let frag = HtmlFragment::parse_with_base(
            r#"<img src="small.jpg" srcset="small.jpg 480w, large.jpg 1200w, mid.jpg 800w">"#,
            Url::parse("https://cdn.example.com/course/index.html").ok().as_ref(),
        );
        let img = frag.first("img").unwrap();
        assert_eq!(
            img.current_source().as_deref(),
            Some("https://cdn.example.com/course/large.jpg")
        );
    }

    #[test]
    fn test_current_source_falls_back_to_src_and_data_src() {
        let frag = HtmlFragment::parse(r#"<img src="a.png"><img data-src="b.png"><img>"#);
        let imgs = frag.locate("img");
        assert_eq!(imgs[0].current_source().as_deref(), Some("a.png"));
        assert_eq!(imgs[1].current_source().as_deref(), Some("b.png"));
        assert_eq!(imgs[2].current_source(), None);
    }

    #[test]
    fn test_video_source_child() {
        let frag = HtmlFragment::parse(
            r#"<video poster="p.jpg"><source src="clip.webm"><source src="clip.mp4"></video>"#,
        );
        let video = frag.first("video").unwrap();
        assert_eq!(video.current_source().as_deref(), Some("clip.webm"));
    }

    #[test]
    fn test_base_element_wins() {
        let frag = HtmlFragment::parse_with_base(
            r#"<html><head><base href="assets/"></head><body><img src="x.png"></body></html>"#,
            Url::parse("https://lms.example.com/scorm/index.html").ok().as_ref(),
        );
        let img = frag.first("img").unwrap();
        assert_eq!(
            img.current_source().as_deref(),
            Some("https://lms.example.com/scorm/assets/x.png")
        );
    }

    #[test]
    fn test_has_class() {
        let frag = HtmlFragment::parse(r#"<div class="process-card process-card--intro"></div>"#);
        let card = frag.first(".process-card").unwrap();
        assert!(card.has_class("process-card--intro"));
        assert!(!card.has_class("process-card--outro"));
    }

    #[test]
    fn test_srcset_density() {
        assert_eq!(best_srcset_candidate("a.jpg 1x, b.jpg 2x"), Some("b.jpg"));
        assert_eq!(best_srcset_candidate("only.jpg"), Some("only.jpg"));
        assert_eq!(best_srcset_candidate(""), None);
    }
}
