//! Export of a scraped course to document formats.
//!
//! Provides the `Exporter` trait and one implementation per
//! [`OutputFormat`].
//!
//! # Architecture
//!
//! The `Exporter` trait uses a builder pattern:
//! - `new()` creates an exporter with default configuration
//! - `with_config()` allows customization
//! - `export()` writes to any `Write + Seek` destination
//!
//! Assets referenced by the document are materialized through the
//! [`AssetStore`] handed to `export`. Documents reference them as
//! `assets/{filename}`, so the store's directory should be the `assets`
//! sibling of the document.
//!
//! # Example
//!
//! ```no_run
//! use coursedown::asset::{AssetStore, NoFetcher};
//! use coursedown::course::CourseScheme;
//! use coursedown::export::{Exporter, MarkdownExporter};
//! use std::fs::File;
//!
//! let course = CourseScheme::new("Empty course", Vec::new());
//! let mut assets = AssetStore::new("out/assets", &NoFetcher);
//! let mut file = File::create("out/Empty_course.md")?;
//! MarkdownExporter::new().export(&course, &mut assets, &mut file)?;
//! # Ok::<(), coursedown::Error>(())
//! ```

use std::fs::{self, File};
use std::io::{BufWriter, Seek, Write};
use std::path::PathBuf;

use crate::asset::{AssetFetcher, AssetStore, safe_filename};
use crate::config::{ExportConfig, OutputFormat};
use crate::course::CourseScheme;
use crate::error::Result;

mod markdown;
mod pdf;
mod plain;

pub use markdown::{MarkdownConfig, MarkdownExporter};
pub use pdf::{PdfConfig, PdfExporter};
pub use plain::PlainTextExporter;

/// Trait for exporting courses to specific formats.
///
/// Exporters use a builder pattern where configuration is held in the struct,
/// and the `export` method writes to any `Write + Seek` destination.
pub trait Exporter {
    /// Export the course to the provided writer, materializing referenced
    /// assets into `assets`.
    fn export<W: Write + Seek>(
        &self,
        course: &CourseScheme,
        assets: &mut AssetStore<'_>,
        writer: &mut W,
    ) -> Result<()>;
}

/// `{title}.{ext}` restricted to filesystem-safe characters.
pub fn output_filename(title: &str, format: OutputFormat) -> String {
    let stem = if title.chars().any(|c| c.is_ascii_alphanumeric()) {
        safe_filename(title)
    } else {
        "course".to_string()
    };
    format!("{stem}.{}", format.extension())
}

/// Write `course` in every configured format into the output directory.
/// Returns the written document paths in format order.
///
/// The configuration is validated before anything is written. Each document
/// gets its own [`AssetStore`] over the shared `assets/` directory, so an
/// asset downloaded for one format is reused by the next.
pub fn export_course(course: &CourseScheme, config: &ExportConfig, fetcher: &dyn AssetFetcher) -> Result<Vec<PathBuf>> {
    config.validate()?;
    let out_dir = config.output_dir();
    fs::create_dir_all(&out_dir)?;
    let assets_dir = out_dir.join("assets");

    let mut written = Vec::with_capacity(config.formats.len());
    let mut done: Vec<OutputFormat> = Vec::new();
    for &format in &config.formats {
        if done.contains(&format) {
            continue;
        }
        done.push(format);
        let mut assets = if config.download_assets {
            AssetStore::new(&assets_dir, fetcher)
        } else {
            AssetStore::disabled(fetcher)
        };

        let path = out_dir.join(output_filename(&course.title, format));
        let mut file = BufWriter::new(File::create(&path)?);
        match format {
            OutputFormat::Markdown => MarkdownExporter::with_config(MarkdownConfig {
                include_index: config.include_index,
            })
            .export(course, &mut assets, &mut file)?,
            OutputFormat::PlainText => PlainTextExporter::new().export(course, &mut assets, &mut file)?,
            OutputFormat::Pdf => PdfExporter::with_config(PdfConfig {
                theme: config.theme(),
                layout: config.layout_options(),
            })
            .export(course, &mut assets, &mut file)?,
        }
        file.flush()?;

        log::info!(
            "wrote {} ({} assets referenced)",
            path.display(),
            assets.record().len()
        );
        written.push(path);
    }
    Ok(written)
}

/// `{n}. {section}` and `{n}.{m} {lesson}` headings, shared by every format.
fn section_heading(n: usize, title: &str) -> String {
    format!("{n}. {title}")
}

fn lesson_heading(n: usize, m: usize, title: &str) -> String {
    format!("{n}.{m} {title}")
}
