//! Per-widget extraction. Everything here is total: a missing sub-element
//! shrinks the payload, it never fails.

use super::{
    Block, BlockKind, ButtonEntry, Flashcard, ImageRef, LessonBlock, NumberedItem, SlideStep, Tab,
    TitledBody, VideoSource, classify, detect_language, language_tag,
};
use crate::asset::{asset_filename, asset_prefix};
use crate::dom::{Fragment, collapse_whitespace};

const BLOCK_WRAPPERS: &str = "section.blocks-lesson > div.noOutline[data-block-id]";
const BLOCK_WRAPPERS_NESTED: &str = "section.blocks-lesson div.noOutline[data-block-id]";

const NUMBERED_ITEMS: &str = "ol.block-list__list > li.block-list__item--numbered";
const NUMBERED_ITEMS_LOOSE: &str = ".block-list--numbered li.block-list__item--numbered";

/// Block wrappers of a lesson root, in document order. Direct children of the
/// lesson section are preferred; some player versions nest them deeper.
pub fn block_wrappers<F: Fragment>(lesson: &F) -> Vec<F> {
    let direct = lesson.locate(BLOCK_WRAPPERS);
    if direct.is_empty() {
        lesson.locate(BLOCK_WRAPPERS_NESTED)
    } else {
        direct
    }
}

/// Classify and scrape every block of a lesson.
pub fn scrape_lesson<F: Fragment>(lesson: &F) -> Vec<Block> {
    block_wrappers(lesson).iter().map(scrape).collect()
}

/// Classify one block wrapper and copy its content out.
pub fn scrape<F: Fragment>(wrapper: &F) -> Block {
    let id = wrapper
        .attribute("data-block-id")
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty());
    let kind = classify(wrapper);
    log::debug!("block {} classified as {kind}", id.as_deref().unwrap_or("?"));

    let prefix = asset_prefix(id.as_deref());
    let raw_text = wrapper.inner_text().trim().to_string();
    let content = match kind {
        BlockKind::Title => scrape_title(wrapper),
        BlockKind::Text => scrape_text(wrapper),
        BlockKind::Code => scrape_code(wrapper),
        BlockKind::Accordion => scrape_accordion(wrapper),
        BlockKind::Tabs => scrape_tabs(wrapper, &prefix),
        BlockKind::Flashcards => scrape_flashcards(wrapper),
        BlockKind::NumberedList => scrape_numbered_list(wrapper),
        BlockKind::Slideshow => scrape_slideshow(wrapper, &prefix),
        BlockKind::Button => scrape_button(wrapper),
        BlockKind::ButtonStack => scrape_button_stack(wrapper),
        BlockKind::Image => LessonBlock::Image(
            wrapper
                .first(".block-image img")
                .and_then(|img| image_ref(&img, &prefix, None, "image")),
        ),
        BlockKind::LabeledImage => scrape_labeled_image(wrapper, &prefix),
        BlockKind::GalleryCarousel => scrape_gallery(wrapper, &prefix),
        BlockKind::Video => scrape_video(wrapper, &prefix),
        BlockKind::Unknown => LessonBlock::Unknown {
            raw_text: raw_text.clone(),
        },
    };

    Block {
        id,
        raw_text,
        content,
    }
}

fn text_of<F: Fragment>(scope: &F, selector: &str) -> String {
    scope
        .first(selector)
        .map(|el| el.inner_text().trim().to_string())
        .unwrap_or_default()
}

/// Whitespace-collapsed raw text, for one-line titles.
fn compact_text_of<F: Fragment>(scope: &F, selector: &str) -> String {
    scope
        .first(selector)
        .map(|el| collapse_whitespace(&el.text_content()))
        .unwrap_or_default()
}

fn html_of<F: Fragment>(scope: &F, selector: &str) -> String {
    scope
        .first(selector)
        .map(|el| el.inner_html().trim().to_string())
        .unwrap_or_default()
}

/// An image with a resolvable source. `fallback` names the file when the
/// URL has no usable path segment.
fn image_ref<F: Fragment>(
    img: &F,
    prefix: &str,
    qualifier: Option<&str>,
    fallback: &str,
) -> Option<ImageRef> {
    let url = img.current_source()?;
    Some(ImageRef {
        filename: asset_filename(prefix, qualifier, &url, fallback),
        alt: img
            .attribute("alt")
            .map(|a| a.trim().to_string())
            .unwrap_or_default(),
        url,
    })
}

fn scrape_title<F: Fragment>(wrapper: &F) -> LessonBlock {
    let heading = wrapper.first(".block-text__heading");
    let level = heading
        .as_ref()
        .and_then(|h| (1..=6u8).find(|i| h.exists(&format!("h{i}"))));
    let text = match &heading {
        Some(h) => h.inner_text(),
        None => wrapper.inner_text(),
    };
    LessonBlock::Title {
        level,
        text: text.trim().to_string(),
    }
}

fn scrape_text<F: Fragment>(wrapper: &F) -> LessonBlock {
    let body = wrapper.first(".fr-view").unwrap_or_else(|| wrapper.clone());
    LessonBlock::Text {
        html: body.inner_html().trim().to_string(),
        plain_text: body.inner_text().trim().to_string(),
    }
}

fn scrape_code<F: Fragment>(wrapper: &F) -> LessonBlock {
    let code = match wrapper.first("pre.block-text__code") {
        Some(pre) => pre.inner_text(),
        None => wrapper.inner_text(),
    };
    let code = code.trim_end_matches('\n').to_string();
    let language = detect_language(&code).and_then(language_tag);
    LessonBlock::Code { code, language }
}

fn scrape_accordion<F: Fragment>(wrapper: &F) -> LessonBlock {
    let items = wrapper
        .locate(".blocks-accordion__item")
        .iter()
        .filter_map(|item| {
            let title = compact_text_of(item, ".blocks-accordion__title .fr-view");
            (!title.is_empty()).then(|| TitledBody {
                title,
                body_html: html_of(item, ".blocks-accordion__description .fr-view"),
            })
        })
        .collect();
    LessonBlock::Accordion { items }
}

fn scrape_tabs<F: Fragment>(wrapper: &F, prefix: &str) -> LessonBlock {
    let headers = wrapper.locate(".blocks-tabs__header-item");
    let contents = wrapper.locate(".blocks-tabs__content-item");

    let tabs = headers
        .iter()
        .zip(&contents)
        .enumerate()
        .map(|(i, (header, content))| {
            let title = match header.first(".fr-view") {
                Some(fr) => fr.inner_text(),
                None => header.inner_text(),
            };
            let images = content
                .locate("img")
                .iter()
                .enumerate()
                .filter_map(|(j, img)| {
                    let qualifier = format!("tab{}-img{}", i + 1, j + 1);
                    image_ref(img, prefix, Some(&qualifier), &format!("image{}", j + 1))
                })
                .collect();
            Tab {
                title: collapse_whitespace(&title),
                body_html: html_of(content, ".blocks-tabs__description .fr-view"),
                plain_text: text_of(content, ".blocks-tabs__description .fr-view"),
                images,
            }
        })
        .collect();
    LessonBlock::Tabs { tabs }
}

fn scrape_flashcards<F: Fragment>(wrapper: &F) -> LessonBlock {
    let cards = wrapper
        .locate("li.flashcard")
        .iter()
        .filter_map(|card| {
            let front = compact_text_of(card, ".flashcard-side--front .fr-view");
            (!front.is_empty()).then(|| Flashcard {
                front,
                back_html: html_of(card, ".flashcard-side--back .fr-view"),
            })
        })
        .collect();
    LessonBlock::Flashcards { cards }
}

fn scrape_numbered_list<F: Fragment>(wrapper: &F) -> LessonBlock {
    let mut found = wrapper.locate(NUMBERED_ITEMS);
    if found.is_empty() {
        found = wrapper.locate(NUMBERED_ITEMS_LOOSE);
    }
    let items = found
        .iter()
        .map(|item| NumberedItem {
            number: text_of(item, ".block-list__number"),
            body_html: html_of(item, ".block-list__content .fr-view"),
        })
        .collect();
    LessonBlock::NumberedList { items }
}

fn scrape_slideshow<F: Fragment>(wrapper: &F, prefix: &str) -> LessonBlock {
    let intro = wrapper
        .first(".process-card--intro")
        .map(|card| TitledBody {
            title: compact_text_of(&card, ".process-card__title .fr-view"),
            body_html: html_of(&card, ".process-card__description .fr-view"),
        })
        .filter(|intro| !intro.title.is_empty() || !intro.body_html.is_empty());

    let mut steps: Vec<SlideStep> = Vec::new();
    for card in wrapper.locate(".process-card[data-slide]") {
        if card.has_class("process-card--intro") {
            continue;
        }
        let digits: String = text_of(&card, ".process-card__number p")
            .chars()
            .filter(char::is_ascii_digit)
            .collect();
        let number = if digits.is_empty() {
            (steps.len() + 1).to_string()
        } else {
            digits
        };
        let image = card.first(".process-card__media img").and_then(|img| {
            image_ref(&img, prefix, Some(&format!("step{number}")), "image")
        });
        steps.push(SlideStep {
            body_html: html_of(&card, ".process-card__description .fr-view"),
            number,
            image,
        });
    }

    LessonBlock::Slideshow { intro, steps }
}

fn button_entry<F: Fragment>(scope: &F) -> ButtonEntry {
    ButtonEntry {
        description_html: html_of(scope, ".blocks-button__description .fr-view"),
        description_text: text_of(scope, ".blocks-button__description .fr-view"),
        href: scope
            .first("a.blocks-button__button[href]")
            .and_then(|a| a.url_attribute("href")),
    }
}

fn scrape_button<F: Fragment>(wrapper: &F) -> LessonBlock {
    let mut entry = button_entry(wrapper);
    if entry.description_text.is_empty() {
        entry.description_text = wrapper.inner_text().trim().to_string();
    }
    LessonBlock::Button(entry)
}

fn scrape_button_stack<F: Fragment>(wrapper: &F) -> LessonBlock {
    let entries = wrapper
        .locate(".blocks-buttonstack .blocks-button__container")
        .iter()
        .map(button_entry)
        .filter(|e| !e.description_text.is_empty() || !e.description_html.is_empty() || e.href.is_some())
        .collect();
    LessonBlock::ButtonStack { entries }
}

fn scrape_labeled_image<F: Fragment>(wrapper: &F, prefix: &str) -> LessonBlock {
    let image = wrapper
        .first("img.labeled-graphic-canvas__image")
        .and_then(|img| image_ref(&img, prefix, None, "image"));
    let items = wrapper
        .locate("li.map-item")
        .iter()
        .filter_map(|marker| {
            let title = compact_text_of(marker, "h2.bubble__title");
            (!title.is_empty()).then(|| TitledBody {
                title,
                body_html: html_of(marker, ".bubble__description .fr-view"),
            })
        })
        .collect();
    LessonBlock::LabeledImage { image, items }
}

fn scrape_gallery<F: Fragment>(wrapper: &F, prefix: &str) -> LessonBlock {
    let images = wrapper
        .locate(".block-gallery-carousel img")
        .iter()
        .enumerate()
        .filter_map(|(i, img)| {
            let qualifier = format!("carousel{}", i + 1);
            image_ref(img, prefix, Some(&qualifier), &format!("image{}", i + 1))
        })
        .collect();
    LessonBlock::GalleryCarousel { images }
}

fn scrape_video<F: Fragment>(wrapper: &F, prefix: &str) -> LessonBlock {
    let video = wrapper.first(".block-video video");
    let url = video
        .as_ref()
        .and_then(Fragment::current_source)
        .or_else(|| {
            wrapper
                .first(".block-video video source[src]")
                .and_then(|s| s.url_attribute("src"))
        });
    let poster_url = video
        .as_ref()
        .and_then(|v| v.url_attribute("poster"))
        .or_else(|| {
            wrapper
                .first(".block-video img")
                .and_then(|img| img.current_source())
        });

    LessonBlock::Video(VideoSource {
        filename: url
            .as_deref()
            .map(|u| asset_filename(prefix, None, u, "video.mp4")),
        poster_filename: poster_url
            .as_deref()
            .map(|u| asset_filename(prefix, None, u, "poster.jpg")),
        url,
        poster_url,
    })
}
