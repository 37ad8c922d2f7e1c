//! Markdown and plain-text rendering of scraped blocks.

use super::{Block, ImageRef, LessonBlock, VideoSource};
use crate::asset::AssetStore;
use crate::markdown::{
    bullet_item, code_block, heading, html_to_markdown, image, link_callout, markdown_to_plain,
    numbered_item,
};

/// String output formats of a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderFormat {
    Markdown,
    PlainText,
}

/// Render one block. Assets the output references are materialized into
/// `assets` on the way; a failed download degrades to a textual fallback.
pub fn render(block: &Block, format: RenderFormat, assets: &mut AssetStore<'_>) -> String {
    match format {
        RenderFormat::Markdown => render_markdown(block, assets),
        RenderFormat::PlainText => render_plain(block, assets),
    }
}

/// Title level in the output document: the source level shifted one step
/// down and kept below the course/section/lesson headings.
pub(super) fn title_level(source: Option<u8>) -> u8 {
    (source.unwrap_or(3) + 1).clamp(4, 6)
}

/// The widget's displayed number when it is a plain number, else the
/// 1-based position.
pub(super) fn repaired_number(number: &str, index: usize) -> String {
    let number = number.trim().trim_end_matches('.');
    if !number.is_empty() && number.bytes().all(|b| b.is_ascii_digit()) {
        number.to_string()
    } else {
        (index + 1).to_string()
    }
}

fn or_raw(rendered: String, block: &Block) -> String {
    if rendered.trim().is_empty() {
        block.raw_text.clone()
    } else {
        rendered
    }
}

fn render_markdown(block: &Block, assets: &mut AssetStore<'_>) -> String {
    match &block.content {
        LessonBlock::Title { level, text } => {
            if text.is_empty() {
                String::new()
            } else {
                heading(title_level(*level), text)
            }
        }
        LessonBlock::Text { html, plain_text } => {
            let md = html_to_markdown(html);
            if md.is_empty() {
                or_raw(plain_text.clone(), block)
            } else {
                md
            }
        }
        LessonBlock::Code { code, language } => {
            if code.trim().is_empty() {
                String::new()
            } else {
                code_block(code, language.as_deref())
            }
        }
        LessonBlock::Accordion { items } => {
            let md = items
                .iter()
                .map(|item| bullet_item(&item.title, &html_to_markdown(&item.body_html)))
                .collect::<Vec<_>>()
                .join("\n");
            or_raw(md, block)
        }
        LessonBlock::Tabs { tabs } => {
            let mut parts = Vec::new();
            for (i, tab) in tabs.iter().enumerate() {
                let title = if tab.title.is_empty() {
                    format!("Tab {}", i + 1)
                } else {
                    tab.title.clone()
                };
                let mut body = html_to_markdown(&tab.body_html);
                if body.is_empty() {
                    body = tab.plain_text.clone();
                }
                let mut item = bullet_item(&title, &body);
                for img in &tab.images {
                    item.push_str("\n  ");
                    item.push_str(&image_markup(img, assets));
                }
                parts.push(item);
            }
            or_raw(parts.join("\n"), block)
        }
        LessonBlock::Flashcards { cards } => {
            let md = cards
                .iter()
                .map(|card| bullet_item(&card.front, &html_to_markdown(&card.back_html)))
                .collect::<Vec<_>>()
                .join("\n");
            or_raw(md, block)
        }
        LessonBlock::NumberedList { items } => {
            let md = items
                .iter()
                .filter_map(|item| {
                    let body = html_to_markdown(&item.body_html);
                    (!body.is_empty()).then_some((item, body))
                })
                .enumerate()
                .map(|(i, (item, body))| numbered_item(&repaired_number(&item.number, i), &body))
                .collect::<Vec<_>>()
                .join("\n");
            or_raw(md, block)
        }
        LessonBlock::Slideshow { intro, steps } => {
            let mut lines = Vec::new();
            if let Some(intro) = intro {
                if !intro.title.is_empty() {
                    lines.push(heading(4, &intro.title));
                }
                let body = html_to_markdown(&intro.body_html);
                if !body.is_empty() {
                    lines.push(body);
                }
                lines.push(String::new());
            }
            for step in steps {
                let mut text = step
                    .image
                    .as_ref()
                    .map(|img| image_markup(img, assets))
                    .unwrap_or_default();
                let body = html_to_markdown(&step.body_html);
                if !body.is_empty() {
                    if !text.is_empty() {
                        text.push('\n');
                    }
                    text.push_str(&body);
                }
                if !text.is_empty() {
                    lines.push(numbered_item(&step.number, &text));
                }
            }
            or_raw(lines.join("\n").trim().to_string(), block)
        }
        LessonBlock::Button(entry) => {
            let mut body = html_to_markdown(&entry.description_html);
            if body.is_empty() {
                body = entry.description_text.clone();
            }
            or_raw(link_callout(&body, entry.href.as_deref()), block)
        }
        LessonBlock::ButtonStack { entries } => {
            let md = entries
                .iter()
                .map(|entry| {
                    let mut body = html_to_markdown(&entry.description_html);
                    if body.is_empty() {
                        body = entry.description_text.clone();
                    }
                    link_callout(&body, entry.href.as_deref())
                })
                .filter(|callout| !callout.is_empty())
                .collect::<Vec<_>>()
                .join("\n\n");
            or_raw(md, block)
        }
        LessonBlock::Image(img) => match img {
            Some(img) => image_markup(img, assets),
            None => block.raw_text.clone(),
        },
        LessonBlock::LabeledImage { image: img, items } => {
            let mut lines = Vec::new();
            if let Some(img) = img {
                lines.push(image_markup(img, assets));
            }
            if !items.is_empty() {
                if !lines.is_empty() {
                    lines.push(String::new());
                }
                lines.extend(
                    items
                        .iter()
                        .map(|item| bullet_item(&item.title, &html_to_markdown(&item.body_html))),
                );
            }
            or_raw(lines.join("\n"), block)
        }
        LessonBlock::GalleryCarousel { images } => {
            let md = images
                .iter()
                .map(|img| image_markup(img, assets))
                .collect::<Vec<_>>()
                .join("\n\n");
            or_raw(md, block)
        }
        LessonBlock::Video(video) => video_markup(video, assets),
        LessonBlock::Unknown { raw_text } => raw_text.clone(),
    }
}

fn render_plain(block: &Block, assets: &mut AssetStore<'_>) -> String {
    match &block.content {
        LessonBlock::Code { code, .. } => code.clone(),
        LessonBlock::Flashcards { cards } if !cards.is_empty() => cards
            .iter()
            .map(|card| {
                let back = markdown_to_plain(&html_to_markdown(&card.back_html));
                format!("{}\n{back}", card.front).trim_end().to_string()
            })
            .collect::<Vec<_>>()
            .join("\n\n"),
        LessonBlock::LabeledImage { image: img, items } => {
            let mut chunks = Vec::new();
            if let Some(img) = img {
                let label = [img.alt.as_str(), img.url.as_str()]
                    .into_iter()
                    .filter(|s| !s.is_empty())
                    .collect::<Vec<_>>()
                    .join("\n");
                chunks.push(label);
            }
            for item in items {
                let body = markdown_to_plain(&html_to_markdown(&item.body_html));
                chunks.push(format!("{}\n{body}", item.title).trim_end().to_string());
            }
            or_raw(chunks.join("\n\n"), block)
        }
        LessonBlock::GalleryCarousel { images } if !images.is_empty() => images
            .iter()
            .map(|img| img.url.as_str())
            .collect::<Vec<_>>()
            .join("\n"),
        _ => markdown_to_plain(&render_markdown(block, assets)),
    }
}

fn is_remote(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

/// Image reference to the materialized asset, the remote URL when the
/// download did not happen, or a visible placeholder.
fn image_markup(img: &ImageRef, assets: &mut AssetStore<'_>) -> String {
    if assets.ensure(&img.url, &img.filename) {
        image(&img.alt, &format!("assets/{}", img.filename))
    } else if is_remote(&img.url) {
        image(&img.alt, &img.url)
    } else {
        let alt = if img.alt.is_empty() { "image" } else { &img.alt };
        format!("*[image unavailable: {alt}]*")
    }
}

pub(super) const VIDEO_UNAVAILABLE: &str = "Video is not available in this output.";

fn video_markup(video: &VideoSource, assets: &mut AssetStore<'_>) -> String {
    let file = match (&video.url, &video.filename) {
        (Some(url), Some(file)) if assets.ensure(url, file) => file,
        _ => {
            return match &video.url {
                Some(url) => format!("> {VIDEO_UNAVAILABLE} Source: {url}"),
                None => format!("> {VIDEO_UNAVAILABLE}"),
            };
        }
    };
    let poster = match (&video.poster_url, &video.poster_filename) {
        (Some(url), Some(poster)) if assets.ensure(url, poster) => {
            format!(" poster=\"assets/{poster}\"")
        }
        _ => String::new(),
    };
    format!("<video controls preload=\"metadata\" src=\"assets/{file}\"{poster}></video>")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::{AssetFetcher, NoFetcher};
    use crate::block::{
        ButtonEntry, Flashcard, NumberedItem, SlideStep, TitledBody, block_wrappers, scrape,
    };
    use crate::dom::HtmlFragment;

    struct Bytes;

    impl AssetFetcher for Bytes {
        fn fetch(&self, _url: &str) -> Option<Vec<u8>> {
            Some(b"data".to_vec())
        }
    }

    fn block(content: LessonBlock) -> Block {
        Block {
            id: Some("b1".to_string()),
            raw_text: "raw text".to_string(),
            content,
        }
    }

    fn markdown(content: LessonBlock) -> String {
        let mut store = AssetStore::disabled(&NoFetcher);
        render(&block(content), RenderFormat::Markdown, &mut store)
    }

    fn scrape_one(inner: &str) -> Block {
        let html = format!(
            r#"<div data-lesson-id="l1"><section class="blocks-lesson">
               <div class="noOutline" data-block-id="b1">{inner}</div></section></div>"#
        );
        let doc = HtmlFragment::parse(&html);
        let wrapper = block_wrappers(&doc).into_iter().next().unwrap();
        scrape(&wrapper)
    }

    fn image_ref(url: &str) -> ImageRef {
        ImageRef {
            filename: "b1-chart.png".to_string(),
            alt: "Chart".to_string(),
            url: url.to_string(),
        }
    }

    #[test]
    fn test_title_round_trip() {
        let block = scrape_one(r#"<div class="block-text__heading"><h2> Getting started </h2></div>"#);
        let mut store = AssetStore::disabled(&NoFetcher);
        assert_eq!(
            render(&block, RenderFormat::Markdown, &mut store),
            "#### Getting started"
        );
    }

    #[test]
    fn test_title_levels() {
        assert_eq!(title_level(None), 4);
        assert_eq!(title_level(Some(1)), 4);
        assert_eq!(title_level(Some(2)), 4);
        assert_eq!(title_level(Some(4)), 5);
        assert_eq!(title_level(Some(5)), 6);
        assert_eq!(title_level(Some(6)), 6);
        assert_eq!(
            markdown(LessonBlock::Title {
                level: None,
                text: String::new()
            }),
            ""
        );
    }

    #[test]
    fn test_numbered_list_repair() {
        let items = ["1", "2", "iii"]
            .iter()
            .map(|n| NumberedItem {
                number: n.to_string(),
                body_html: format!("<p>Item {n}</p>"),
            })
            .collect();
        assert_eq!(
            markdown(LessonBlock::NumberedList { items }),
            "1. Item 1\n2. Item 2\n3. Item iii"
        );
    }

    #[test]
    fn test_numbered_list_skips_empty_items_before_numbering() {
        let items = [("a", ""), ("b", "<p>First</p>"), ("c", "<p> </p>"), ("d", "<p>Second</p>")]
            .iter()
            .map(|(n, body)| NumberedItem {
                number: n.to_string(),
                body_html: body.to_string(),
            })
            .collect();
        assert_eq!(
            markdown(LessonBlock::NumberedList { items }),
            "1. First\n2. Second"
        );
    }

    #[test]
    fn test_accordion_items() {
        let items = vec![TitledBody {
            title: "Scope".to_string(),
            body_html: "<p>First</p><p>Second</p>".to_string(),
        }];
        assert_eq!(
            markdown(LessonBlock::Accordion { items }),
            "- **Scope**  \n  First\n\n  Second"
        );
        assert_eq!(markdown(LessonBlock::Accordion { items: Vec::new() }), "raw text");
    }

    #[test]
    fn test_button_callout() {
        let entry = ButtonEntry {
            description_html: "<p>Read the guide</p>".to_string(),
            description_text: "Read the guide".to_string(),
            href: Some("https://docs.example.com".to_string()),
        };
        assert_eq!(
            markdown(LessonBlock::Button(entry)),
            "> Read the guide\n>\n> [Link](https://docs.example.com)"
        );
    }

    #[test]
    fn test_button_stack_separates_callouts() {
        let entries = vec![
            ButtonEntry {
                description_text: "One".to_string(),
                ..ButtonEntry::default()
            },
            ButtonEntry {
                href: Some("https://x.io".to_string()),
                ..ButtonEntry::default()
            },
        ];
        assert_eq!(
            markdown(LessonBlock::ButtonStack { entries }),
            "> One\n\n> [Link](https://x.io)"
        );
    }

    #[test]
    fn test_image_materialized() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = AssetStore::new(dir.path(), &Bytes);
        let block = block(LessonBlock::Image(Some(image_ref("https://cdn.x.io/chart.png"))));
        assert_eq!(
            render(&block, RenderFormat::Markdown, &mut store),
            "![Chart](assets/b1-chart.png)"
        );
        assert!(dir.path().join("b1-chart.png").is_file());
        assert_eq!(
            render(&block, RenderFormat::PlainText, &mut store),
            "[image: Chart]"
        );
        assert_eq!(store.fetch_count(), 1);
    }

    #[test]
    fn test_image_fallbacks() {
        let remote = LessonBlock::Image(Some(image_ref("https://cdn.x.io/chart.png")));
        assert_eq!(markdown(remote), "![Chart](https://cdn.x.io/chart.png)");
        let local = LessonBlock::Image(Some(image_ref("assets/chart.png")));
        assert_eq!(markdown(local), "*[image unavailable: Chart]*");
        assert_eq!(markdown(LessonBlock::Image(None)), "raw text");
    }

    #[test]
    fn test_video_unavailable() {
        let video = VideoSource {
            url: Some("https://cdn.x.io/intro.mp4".to_string()),
            filename: Some("b1-intro.mp4".to_string()),
            ..VideoSource::default()
        };
        assert_eq!(
            markdown(LessonBlock::Video(video)),
            "> Video is not available in this output. Source: https://cdn.x.io/intro.mp4"
        );
        assert_eq!(
            markdown(LessonBlock::Video(VideoSource::default())),
            "> Video is not available in this output."
        );
    }

    #[test]
    fn test_video_element() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = AssetStore::new(dir.path(), &Bytes);
        let video = VideoSource {
            url: Some("https://cdn.x.io/intro.mp4".to_string()),
            filename: Some("b1-intro.mp4".to_string()),
            poster_url: Some("https://cdn.x.io/poster.jpg".to_string()),
            poster_filename: Some("b1-poster.jpg".to_string()),
        };
        let block = block(LessonBlock::Video(video));
        assert_eq!(
            render(&block, RenderFormat::Markdown, &mut store),
            r#"<video controls preload="metadata" src="assets/b1-intro.mp4" poster="assets/b1-poster.jpg"></video>"#
        );
        assert_eq!(
            render(&block, RenderFormat::PlainText, &mut store),
            "[video: b1-intro.mp4]"
        );
    }

    #[test]
    fn test_slideshow_image_before_body() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = AssetStore::new(dir.path(), &Bytes);
        let block = block(LessonBlock::Slideshow {
            intro: Some(TitledBody {
                title: "Process".to_string(),
                body_html: "<p>Overview</p>".to_string(),
            }),
            steps: vec![SlideStep {
                number: "1".to_string(),
                body_html: "<p>Collect</p>".to_string(),
                image: Some(image_ref("https://cdn.x.io/chart.png")),
            }],
        });
        assert_eq!(
            render(&block, RenderFormat::Markdown, &mut store),
            "#### Process\nOverview\n\n1. ![Chart](assets/b1-chart.png)\n   Collect"
        );
    }

    #[test]
    fn test_flashcards_plain_pairs() {
        let cards = vec![
            Flashcard {
                front: "Term".to_string(),
                back_html: "<p><b>Meaning</b></p>".to_string(),
            },
            Flashcard {
                front: "Other".to_string(),
                back_html: String::new(),
            },
        ];
        let mut store = AssetStore::disabled(&NoFetcher);
        let block = block(LessonBlock::Flashcards { cards });
        assert_eq!(
            render(&block, RenderFormat::PlainText, &mut store),
            "Term\nMeaning\n\nOther"
        );
    }

    #[test]
    fn test_code_plain_is_raw() {
        let mut store = AssetStore::disabled(&NoFetcher);
        let block = block(LessonBlock::Code {
            code: "print('hi')".to_string(),
            language: Some("python".to_string()),
        });
        assert_eq!(
            render(&block, RenderFormat::Markdown, &mut store),
            "```python\nprint('hi')\n```"
        );
        assert_eq!(render(&block, RenderFormat::PlainText, &mut store), "print('hi')");
    }

    #[test]
    fn test_gallery_plain_lists_urls() {
        let images = vec![image_ref("https://cdn.x.io/a.png"), image_ref("https://cdn.x.io/b.png")];
        let mut store = AssetStore::disabled(&NoFetcher);
        let block = block(LessonBlock::GalleryCarousel { images });
        assert_eq!(
            render(&block, RenderFormat::PlainText, &mut store),
            "https://cdn.x.io/a.png\nhttps://cdn.x.io/b.png"
        );
    }

    #[test]
    fn test_text_falls_back_to_plain() {
        let content = LessonBlock::Text {
            html: String::new(),
            plain_text: "Just words".to_string(),
        };
        assert_eq!(markdown(content), "Just words");
    }
}
