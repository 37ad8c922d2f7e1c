//! Lesson blocks: the closed set of Rise widgets a lesson is made of.
//!
//! A block wrapper goes through three steps:
//!
//! 1. [`classify`] picks a [`BlockKind`] from an ordered selector table
//! 2. [`scrape`] copies the widget's content out of the DOM into a
//!    [`LessonBlock`] payload
//! 3. [`render`] / [`render_layout`] turn the payload into Markdown, plain
//!    text or layout primitives
//!
//! Scraping never fails. A widget whose markup does not look as expected
//! still produces a payload, and every renderer falls back to the wrapper's
//! visible text when the structured content comes out empty.

mod classify;
mod language;
mod layout;
mod render;
mod scrape;

pub use classify::{CLASSIFIER_TABLE, classify};
pub use language::{detect_language, language_tag};
pub use layout::render_layout;
pub use render::{RenderFormat, render};
pub use scrape::{block_wrappers, scrape, scrape_lesson};

use std::fmt;

/// Widget kinds, in no particular order. Classification priority lives in
/// [`CLASSIFIER_TABLE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    Title,
    Text,
    Code,
    Accordion,
    Tabs,
    Flashcards,
    NumberedList,
    Slideshow,
    Button,
    ButtonStack,
    Image,
    LabeledImage,
    GalleryCarousel,
    Video,
    Unknown,
}

impl BlockKind {
    pub fn name(self) -> &'static str {
        match self {
            BlockKind::Title => "title",
            BlockKind::Text => "text",
            BlockKind::Code => "code",
            BlockKind::Accordion => "accordion",
            BlockKind::Tabs => "tabs",
            BlockKind::Flashcards => "flashcards",
            BlockKind::NumberedList => "numbered-list",
            BlockKind::Slideshow => "slideshow",
            BlockKind::Button => "button",
            BlockKind::ButtonStack => "button-stack",
            BlockKind::Image => "image",
            BlockKind::LabeledImage => "labeled-image",
            BlockKind::GalleryCarousel => "gallery-carousel",
            BlockKind::Video => "video",
            BlockKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An image a block references, with the local name it is saved under.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageRef {
    pub filename: String,
    pub alt: String,
    pub url: String,
}

/// Title and HTML body of an accordion panel, a labeled-image marker or a
/// slideshow intro.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TitledBody {
    pub title: String,
    pub body_html: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tab {
    pub title: String,
    pub body_html: String,
    pub plain_text: String,
    pub images: Vec<ImageRef>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Flashcard {
    pub front: String,
    pub back_html: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NumberedItem {
    /// Number as displayed by the widget; may be anything.
    pub number: String,
    pub body_html: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlideStep {
    /// Digits of the card's number, or its position when it has none.
    pub number: String,
    pub body_html: String,
    pub image: Option<ImageRef>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ButtonEntry {
    pub description_html: String,
    pub description_text: String,
    pub href: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VideoSource {
    pub url: Option<String>,
    pub filename: Option<String>,
    pub poster_url: Option<String>,
    pub poster_filename: Option<String>,
}

/// Extracted content of one block, by widget kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LessonBlock {
    Title { level: Option<u8>, text: String },
    Text { html: String, plain_text: String },
    Code { code: String, language: Option<String> },
    Accordion { items: Vec<TitledBody> },
    Tabs { tabs: Vec<Tab> },
    Flashcards { cards: Vec<Flashcard> },
    NumberedList { items: Vec<NumberedItem> },
    Slideshow { intro: Option<TitledBody>, steps: Vec<SlideStep> },
    Button(ButtonEntry),
    ButtonStack { entries: Vec<ButtonEntry> },
    Image(Option<ImageRef>),
    LabeledImage { image: Option<ImageRef>, items: Vec<TitledBody> },
    GalleryCarousel { images: Vec<ImageRef> },
    Video(VideoSource),
    Unknown { raw_text: String },
}

impl LessonBlock {
    pub fn kind(&self) -> BlockKind {
        match self {
            LessonBlock::Title { .. } => BlockKind::Title,
            LessonBlock::Text { .. } => BlockKind::Text,
            LessonBlock::Code { .. } => BlockKind::Code,
            LessonBlock::Accordion { .. } => BlockKind::Accordion,
            LessonBlock::Tabs { .. } => BlockKind::Tabs,
            LessonBlock::Flashcards { .. } => BlockKind::Flashcards,
            LessonBlock::NumberedList { .. } => BlockKind::NumberedList,
            LessonBlock::Slideshow { .. } => BlockKind::Slideshow,
            LessonBlock::Button(_) => BlockKind::Button,
            LessonBlock::ButtonStack { .. } => BlockKind::ButtonStack,
            LessonBlock::Image(_) => BlockKind::Image,
            LessonBlock::LabeledImage { .. } => BlockKind::LabeledImage,
            LessonBlock::GalleryCarousel { .. } => BlockKind::GalleryCarousel,
            LessonBlock::Video(_) => BlockKind::Video,
            LessonBlock::Unknown { .. } => BlockKind::Unknown,
        }
    }
}

/// A scraped block wrapper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    /// `data-block-id` of the wrapper; also the prefix of its asset names.
    pub id: Option<String>,
    /// Visible text of the whole wrapper, used when structured extraction
    /// yields nothing.
    pub raw_text: String,
    pub content: LessonBlock,
}

impl Block {
    pub fn kind(&self) -> BlockKind {
        self.content.kind()
    }
}
