//! First-match block classification.

use super::BlockKind;
use crate::dom::Fragment;

/// Structural predicates in priority order. A kind wins when its selector
/// matches at least one descendant of the wrapper; earlier rows shadow later
/// ones because several widgets embed the markup of simpler ones (every code
/// block also carries a `.fr-view`).
pub const CLASSIFIER_TABLE: &[(BlockKind, &str)] = &[
    (BlockKind::Code, "pre.block-text__code, .block-text--code"),
    (BlockKind::Title, ".block-text__heading"),
    (BlockKind::Accordion, ".blocks-accordion"),
    (BlockKind::ButtonStack, ".blocks-buttonstack"),
    (BlockKind::Button, ".blocks-button"),
    (BlockKind::LabeledImage, ".block-labeled-graphic"),
    (BlockKind::GalleryCarousel, ".block-gallery-carousel"),
    (BlockKind::Image, ".block-image"),
    (BlockKind::Flashcards, ".block-flashcards"),
    (BlockKind::NumberedList, ".block-list.block-list--numbered"),
    (BlockKind::Slideshow, ".block-process"),
    (BlockKind::Tabs, ".blocks-tabs"),
    (BlockKind::Video, ".block-video"),
    (BlockKind::Text, ".fr-view"),
];

/// Kind of the block wrapper `fragment`; [`BlockKind::Unknown`] when no
/// predicate matches.
pub fn classify<F: Fragment>(fragment: &F) -> BlockKind {
    CLASSIFIER_TABLE
        .iter()
        .find(|(_, selector)| fragment.exists(selector))
        .map_or(BlockKind::Unknown, |&(kind, _)| kind)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::HtmlFragment;

    fn kind_of(html: &str) -> BlockKind {
        classify(&HtmlFragment::parse(html))
    }

    #[test]
    fn test_code_beats_text() {
        let html = r#"<div class="block-text block-text--code">
            <div class="fr-view"><pre class="block-text__code">x = 1</pre></div></div>"#;
        assert_eq!(kind_of(html), BlockKind::Code);
        assert_eq!(kind_of(html), BlockKind::Code);
    }

    #[test]
    fn test_title_beats_text() {
        let html = r#"<div class="block-text__heading"><div class="fr-view"><h2>Hi</h2></div></div>"#;
        assert_eq!(kind_of(html), BlockKind::Title);
    }

    #[test]
    fn test_button_stack_beats_button() {
        let html = r#"<div class="blocks-buttonstack"><div class="blocks-button__container">
            <div class="blocks-button"></div></div></div>"#;
        assert_eq!(kind_of(html), BlockKind::ButtonStack);
        assert_eq!(kind_of(r#"<div class="blocks-button"></div>"#), BlockKind::Button);
    }

    #[test]
    fn test_gallery_beats_image() {
        let html = r#"<div class="block-gallery-carousel"><div class="block-image"><img src="a.png"></div></div>"#;
        assert_eq!(kind_of(html), BlockKind::GalleryCarousel);
        assert_eq!(kind_of(r#"<div class="block-image"><img></div>"#), BlockKind::Image);
    }

    #[test]
    fn test_numbered_list_needs_both_classes() {
        assert_eq!(
            kind_of(r#"<div class="block-list block-list--numbered"></div>"#),
            BlockKind::NumberedList
        );
        assert_eq!(kind_of(r#"<div class="block-list"></div>"#), BlockKind::Unknown);
    }

    #[test]
    fn test_each_widget() {
        let cases = [
            (r#"<div class="blocks-accordion"></div>"#, BlockKind::Accordion),
            (r#"<div class="block-labeled-graphic"></div>"#, BlockKind::LabeledImage),
            (r#"<div class="block-flashcards"></div>"#, BlockKind::Flashcards),
            (r#"<div class="block-process"></div>"#, BlockKind::Slideshow),
            (r#"<div class="blocks-tabs"></div>"#, BlockKind::Tabs),
            (r#"<div class="block-video"></div>"#, BlockKind::Video),
            (r#"<div class="fr-view"><p>Plain</p></div>"#, BlockKind::Text),
        ];
        for (html, expected) in cases {
            assert_eq!(kind_of(html), expected, "{html}");
        }
    }

    #[test]
    fn test_unknown_fallback() {
        assert_eq!(kind_of("<div><p>Something else</p></div>"), BlockKind::Unknown);
        assert_eq!(kind_of(""), BlockKind::Unknown);
    }
}
