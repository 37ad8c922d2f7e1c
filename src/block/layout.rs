//! Layout rendering of scraped blocks for paginated output.

use super::render::{VIDEO_UNAVAILABLE, repaired_number};
use super::{Block, ButtonEntry, ImageRef, LessonBlock, TitledBody};
use crate::asset::AssetStore;
use crate::layout::{
    Flowable, LayoutOptions, ListItem, RichText, SpanStyle, html_to_flowables,
};

/// Turn one block into layout primitives. Images are materialized into
/// `assets` before they are placed.
pub fn render_layout(block: &Block, assets: &mut AssetStore<'_>, options: LayoutOptions) -> Vec<Flowable> {
    let flows = match &block.content {
        LessonBlock::Title { text, .. } => {
            if text.is_empty() {
                return Vec::new();
            }
            vec![Flowable::Subheading(text.clone())]
        }
        LessonBlock::Text { html, plain_text } => {
            let flows = html_to_flowables(html, assets, options);
            if flows.is_empty() {
                paragraph(plain_text)
            } else {
                flows
            }
        }
        LessonBlock::Code { code, language } => {
            return Flowable::code(code, language.as_deref(), options.code_wrap_width)
                .into_iter()
                .collect();
        }
        LessonBlock::Accordion { items } => titled_list(items, assets, options),
        LessonBlock::Tabs { tabs } => {
            let items: Vec<ListItem> = tabs
                .iter()
                .enumerate()
                .map(|(i, tab)| {
                    let title = if tab.title.is_empty() {
                        format!("Tab {}", i + 1)
                    } else {
                        tab.title.clone()
                    };
                    let mut body = html_to_flowables(&tab.body_html, assets, options);
                    if body.is_empty() {
                        body = paragraph(&tab.plain_text);
                    }
                    body.extend(tab.images.iter().map(|img| image(img, assets)));
                    ListItem::titled(&title, body)
                })
                .collect();
            list(items, false)
        }
        LessonBlock::Flashcards { cards } => {
            let items = cards
                .iter()
                .map(|card| ListItem::titled(&card.front, html_to_flowables(&card.back_html, assets, options)))
                .collect();
            list(items, false)
        }
        LessonBlock::NumberedList { items } => {
            let items = items
                .iter()
                .filter_map(|item| {
                    let body = html_to_flowables(&item.body_html, assets, options);
                    (!body.is_empty()).then_some((item, body))
                })
                .enumerate()
                .map(|(i, (item, body))| ListItem::numbered(repaired_number(&item.number, i), body))
                .collect();
            list(items, true)
        }
        LessonBlock::Slideshow { intro, steps } => {
            let mut flows = Vec::new();
            if let Some(intro) = intro {
                if !intro.title.is_empty() {
                    flows.push(Flowable::Paragraph(RichText::bold(&intro.title)));
                }
                flows.extend(html_to_flowables(&intro.body_html, assets, options));
            }
            let items = steps
                .iter()
                .filter_map(|step| {
                    let mut content: Vec<Flowable> =
                        step.image.iter().map(|img| image(img, assets)).collect();
                    content.extend(html_to_flowables(&step.body_html, assets, options));
                    (!content.is_empty()).then(|| ListItem::numbered(&step.number, content))
                })
                .collect();
            flows.extend(list(items, true));
            flows
        }
        LessonBlock::Button(entry) => button(entry, assets, options).into_iter().collect(),
        LessonBlock::ButtonStack { entries } => entries
            .iter()
            .filter_map(|entry| button(entry, assets, options))
            .collect(),
        LessonBlock::Image(img) => img.iter().map(|img| image(img, assets)).collect(),
        LessonBlock::LabeledImage { image: img, items } => {
            let mut flows: Vec<Flowable> = img.iter().map(|img| image(img, assets)).collect();
            flows.extend(titled_list(items, assets, options));
            flows
        }
        LessonBlock::GalleryCarousel { images } => {
            images.iter().map(|img| image(img, assets)).collect()
        }
        LessonBlock::Video(video) => {
            let message = vec![Flowable::Paragraph(RichText::plain(VIDEO_UNAVAILABLE))];
            Flowable::callout(message, video.url.as_deref(), "View source")
                .into_iter()
                .collect()
        }
        LessonBlock::Unknown { raw_text } => paragraph(raw_text),
    };

    if flows.is_empty() {
        paragraph(&block.raw_text)
    } else {
        flows
    }
}

fn paragraph(text: &str) -> Vec<Flowable> {
    let text = text.trim();
    if text.is_empty() {
        Vec::new()
    } else {
        vec![Flowable::Paragraph(RichText::plain(text))]
    }
}

fn list(items: Vec<ListItem>, numbered: bool) -> Vec<Flowable> {
    if items.is_empty() {
        Vec::new()
    } else if numbered {
        vec![Flowable::NumberedList(items)]
    } else {
        vec![Flowable::BulletList(items)]
    }
}

fn titled_list(items: &[TitledBody], assets: &AssetStore<'_>, options: LayoutOptions) -> Vec<Flowable> {
    let items = items
        .iter()
        .map(|item| ListItem::titled(&item.title, html_to_flowables(&item.body_html, assets, options)))
        .collect();
    list(items, false)
}

fn button(entry: &ButtonEntry, assets: &AssetStore<'_>, options: LayoutOptions) -> Option<Flowable> {
    let mut body = html_to_flowables(&entry.description_html, assets, options);
    if body.is_empty() {
        body = paragraph(&entry.description_text);
    }
    Flowable::callout(body, entry.href.as_deref(), "View link")
}

/// The placed image, or an italic note naming it when it cannot be shown.
fn image(img: &ImageRef, assets: &mut AssetStore<'_>) -> Flowable {
    let placed = if assets.ensure(&img.url, &img.filename) {
        assets.path_of(&img.filename).and_then(|path| Flowable::image(&path))
    } else {
        None
    };
    placed.unwrap_or_else(|| {
        let alt = if img.alt.is_empty() { "image" } else { &img.alt };
        Flowable::Paragraph(RichText::styled(format!("Image unavailable: {alt}"), SpanStyle::ITALIC))
    })
}
