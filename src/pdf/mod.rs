//! Paginated PDF output.
//!
//! The [`DocumentBuilder`] trait is the seam between the flowable layout
//! model and a concrete page renderer. [`PdfRenderer`] implements it on top
//! of lopdf with the standard Type 1 fonts, so no font files are embedded.
//!
//! ```no_run
//! use coursedown::layout::{Flowable, Theme};
//! use coursedown::pdf::{DocumentBuilder, PdfRenderer};
//!
//! let renderer = PdfRenderer::init(Theme::named("forest"));
//! let mut out = std::fs::File::create("course.pdf")?;
//! renderer.build("Course", &[Flowable::Title("Course".into())], &mut out)?;
//! # Ok::<(), coursedown::Error>(())
//! ```

use std::io::Write;

use crate::error::Result;
use crate::layout::Flowable;

mod canvas;
mod font;
mod render;
mod text;

pub use canvas::{MARGIN, PAGE_HEIGHT, PAGE_WIDTH};
pub use render::{FRAME_WIDTH, PdfRenderer};

/// Lays a sequence of flowables out into a finished document.
pub trait DocumentBuilder {
    fn build<W: Write>(&self, title: &str, flowables: &[Flowable], writer: &mut W) -> Result<()>;
}
