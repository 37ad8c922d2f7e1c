//! # coursedown
//!
//! Export the lessons of a Rise (SCORM) course to Markdown, plain text and
//! PDF.
//!
//! ## Features
//!
//! - Reads the course outline from the player's navigation sidebar
//! - Classifies every lesson block into one of the Rise widget kinds (text,
//!   title, code, accordion, tabs, flashcards, lists, slideshows, buttons,
//!   images, galleries, video)
//! - Renders blocks to Markdown, plain text or paginated layout primitives
//! - Downloads referenced images and videos once into an `assets/` directory
//! - Writes themed A4 PDFs with standard fonts, tables, highlighted code and
//!   link annotations
//!
//! ## Quick Start
//!
//! ```no_run
//! use coursedown::{ExportConfig, OutputFormat, SnapshotSession, export_course, scrape_course};
//! use coursedown::asset::LocalFetcher;
//!
//! let mut session = SnapshotSession::open("saved-course", None)?;
//! let course = scrape_course(&mut session, "My Course")?;
//!
//! let config = ExportConfig {
//!     formats: vec![OutputFormat::Markdown, OutputFormat::Pdf],
//!     ..ExportConfig::default()
//! };
//! let fetcher = LocalFetcher::new("saved-course");
//! for path in export_course(&course, &config, &fetcher)? {
//!     println!("{}", path.display());
//! }
//! # Ok::<(), coursedown::Error>(())
//! ```
//!
//! ## Working with Blocks
//!
//! Each block wrapper is classified, scraped into a [`block::LessonBlock`]
//! and rendered:
//!
//! ```
//! use coursedown::asset::{AssetStore, NoFetcher};
//! use coursedown::block::{BlockKind, RenderFormat, render, scrape};
//! use coursedown::dom::{Fragment, HtmlFragment};
//!
//! let page = HtmlFragment::parse(
//!     r#"<div class="noOutline" data-block-id="b1">
//!          <div class="block-text__heading"><h2>Overview</h2></div>
//!        </div>"#,
//! );
//! let wrapper = page.first("[data-block-id]").unwrap();
//! let block = scrape(&wrapper);
//! assert_eq!(block.kind(), BlockKind::Title);
//!
//! let mut assets = AssetStore::disabled(&NoFetcher);
//! assert_eq!(render(&block, RenderFormat::Markdown, &mut assets), "#### Overview");
//! ```

pub mod asset;
pub mod block;
pub mod config;
pub mod course;
pub mod dom;
pub mod error;
pub mod export;
pub mod layout;
pub mod markdown;
pub mod pdf;
pub(crate) mod util;

pub use config::{ExportConfig, OutputFormat};
pub use course::{CourseScheme, LessonRef, PageSession, Section, SnapshotSession, scrape_course};
pub use error::{Error, Result};
pub use export::{Exporter, export_course};
