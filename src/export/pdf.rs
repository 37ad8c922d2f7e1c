//! PDF exporter: the course as a paginated, themed document.

use std::io::{Seek, Write};

use super::{Exporter, lesson_heading, section_heading};
use crate::asset::AssetStore;
use crate::block::render_layout;
use crate::course::CourseScheme;
use crate::error::Result;
use crate::layout::{Flowable, LayoutOptions, Theme};
use crate::pdf::{DocumentBuilder, PdfRenderer};

const INCH: f32 = 72.0;

/// Configuration for PDF export.
#[derive(Debug, Clone, Default)]
pub struct PdfConfig {
    pub theme: Theme,
    pub layout: LayoutOptions,
}

/// Exporter for PDF output.
#[derive(Debug, Clone)]
pub struct PdfExporter {
    layout: LayoutOptions,
    renderer: PdfRenderer,
}

impl Default for PdfExporter {
    fn default() -> Self {
        Self::with_config(PdfConfig::default())
    }
}

impl PdfExporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: PdfConfig) -> Self {
        Self {
            layout: config.layout,
            renderer: PdfRenderer::init(config.theme),
        }
    }

    /// Title, then per section a heading (a new page from the second section
    /// on) and per lesson a subheading followed by its blocks.
    pub fn flowables(&self, course: &CourseScheme, assets: &mut AssetStore<'_>) -> Vec<Flowable> {
        let mut flows = vec![Flowable::Title(course.title.clone()), Flowable::Spacer(0.1 * INCH)];
        for (n, section) in course.sections.iter().enumerate() {
            let n = n + 1;
            if n > 1 {
                flows.push(Flowable::PageBreak);
            }
            flows.push(Flowable::Heading(section_heading(n, &section.title)));
            flows.push(Flowable::Spacer(0.06 * INCH));
            for (m, lesson) in section.lessons.iter().enumerate() {
                flows.push(Flowable::Subheading(lesson_heading(n, m + 1, &lesson.title)));
                for block in &lesson.blocks {
                    flows.extend(render_layout(block, assets, self.layout));
                }
            }
            flows.push(Flowable::Spacer(0.08 * INCH));
        }
        flows
    }
}

impl Exporter for PdfExporter {
    fn export<W: Write + Seek>(&self, course: &CourseScheme, assets: &mut AssetStore<'_>, writer: &mut W) -> Result<()> {
        let flows = self.flowables(course, assets);
        self.renderer.build(&course.title, &flows, writer)
    }
}
