//! Integration tests: scrape the saved fixture course and export it.

use std::cell::RefCell;
use std::fs;
use std::path::Path;

use coursedown::asset::{AssetFetcher, LocalFetcher, NoFetcher};
use coursedown::block::{BlockKind, LessonBlock};
use coursedown::{CourseScheme, Error, ExportConfig, OutputFormat, SnapshotSession, export_course, scrape_course};

const FIXTURES_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures");

fn fixture_path(name: &str) -> String {
    format!("{}/{}", FIXTURES_DIR, name)
}

fn fixture_course() -> CourseScheme {
    let mut session = SnapshotSession::open(fixture_path("course"), None).expect("Failed to open snapshot");
    scrape_course(&mut session, "Fallback").expect("Failed to scrape course")
}

fn config(out: &Path, formats: Vec<OutputFormat>) -> ExportConfig {
    ExportConfig {
        output_dir: Some(out.to_path_buf()),
        formats,
        ..ExportConfig::default()
    }
}

/// Records every URL it is asked for before delegating.
struct CountingFetcher {
    inner: LocalFetcher,
    urls: RefCell<Vec<String>>,
}

impl CountingFetcher {
    fn new(root: impl AsRef<Path>) -> Self {
        Self {
            inner: LocalFetcher::new(root.as_ref()),
            urls: RefCell::new(Vec::new()),
        }
    }

    fn count(&self, url: &str) -> usize {
        self.urls.borrow().iter().filter(|u| *u == url).count()
    }
}

impl AssetFetcher for CountingFetcher {
    fn fetch(&self, url: &str) -> Option<Vec<u8>> {
        self.urls.borrow_mut().push(url.to_string());
        self.inner.fetch(url)
    }
}

// ============================================================================
// Scraping
// ============================================================================

#[test]
fn test_scrape_outline() {
    let course = fixture_course();

    assert_eq!(course.title, "Intro to Rust");
    let sections: Vec<&str> = course.sections.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(sections, ["Getting Started", "Language Basics"]);

    // The link with a blank label is skipped before numbering.
    let lessons: Vec<(usize, &str)> = course
        .lessons()
        .map(|l| (l.global_index, l.title.as_str()))
        .collect();
    assert_eq!(lessons, [(0, "Welcome"), (1, "Installing Rust"), (2, "Variables")]);
    assert_eq!(course.lesson_count(), 3);
}

#[test]
fn test_scrape_block_kinds() {
    let course = fixture_course();
    let kinds: Vec<Vec<BlockKind>> = course
        .lessons()
        .map(|l| l.blocks.iter().map(|b| b.kind()).collect())
        .collect();

    assert_eq!(
        kinds[0],
        [BlockKind::Title, BlockKind::Text, BlockKind::Image, BlockKind::Button]
    );
    // Loaded from lessons/1.html, the positional fallback.
    assert_eq!(
        kinds[1],
        [BlockKind::Code, BlockKind::NumberedList, BlockKind::Accordion, BlockKind::Video]
    );
    assert_eq!(kinds[2], [BlockKind::Flashcards, BlockKind::Unknown]);
    assert_eq!(course.block_count(), 10);
}

#[test]
fn test_scrape_image_payload() {
    let course = fixture_course();
    let welcome = course.lessons().next().unwrap();
    let image = welcome
        .blocks
        .iter()
        .find_map(|b| match &b.content {
            LessonBlock::Image(Some(image)) => Some(image.clone()),
            _ => None,
        })
        .expect("image block");

    assert_eq!(image.url, "media/ferris.png");
    assert_eq!(image.filename, "img1-ferris.png");
    assert_eq!(image.alt, "Ferris");
}

#[test]
fn test_missing_snapshot_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = SnapshotSession::open(dir.path().join("nowhere"), None);
    assert!(matches!(result, Err(Error::Io(_))));
}

// ============================================================================
// Export
// ============================================================================

#[test]
fn test_export_markdown() {
    let out = tempfile::tempdir().unwrap();
    let course = fixture_course();
    let fetcher = LocalFetcher::new(fixture_path("course"));

    let paths = export_course(&course, &config(out.path(), vec![OutputFormat::Markdown]), &fetcher).unwrap();
    assert_eq!(paths, [out.path().join("Intro_to_Rust.md")]);

    let doc = fs::read_to_string(&paths[0]).unwrap();
    assert!(doc.starts_with("# Intro to Rust\n\n## Index\n\n"), "{doc}");
    assert!(doc.contains("- [1. Getting Started](#1-getting-started)"));
    assert!(doc.contains("  - [1.2 Installing Rust](#12-installing-rust)"));
    assert!(doc.contains("## 2. Language Basics"));
    assert!(doc.contains("### 2.1 Variables"));

    assert!(doc.contains("\n\n#### Why Rust\n"));
    assert!(doc.contains("**fast**"));
    assert!(doc.contains("[the book](https://www.rust-lang.org/learn)"));
    assert!(doc.contains("| cargo | Build system |"));
    assert!(doc.contains("![Ferris](assets/img1-ferris.png)"));
    assert!(doc.contains("> Try it in the browser.\n>\n> [Link](https://play.rust-lang.org/)"));
    assert!(doc.contains("println!(\"Hello, world!\");"));
    assert!(doc.contains("1. Install rustup"));
    assert!(doc.contains("- **Which platforms?**"));
    assert!(doc.contains("> Video is not available in this output. Source: media/install.mp4"));
    assert!(doc.contains("- **let**  \n  Binds an immutable value"));
    assert!(doc.contains("Knowledge check coming soon"));
    assert!(doc.ends_with('\n') && !doc.ends_with("\n\n"));

    let asset = fs::read(out.path().join("assets/img1-ferris.png")).unwrap();
    assert_eq!(asset, fs::read(fixture_path("course/media/ferris.png")).unwrap());
}

#[test]
fn test_export_without_index() {
    let out = tempfile::tempdir().unwrap();
    let mut config = config(out.path(), vec![OutputFormat::Markdown]);
    config.include_index = false;

    let paths = export_course(&fixture_course(), &config, &NoFetcher).unwrap();
    let doc = fs::read_to_string(&paths[0]).unwrap();
    assert!(doc.starts_with("# Intro to Rust\n\n## 1. Getting Started\n\n### 1.1 Welcome"));
    assert!(!doc.contains("## Index"));
}

#[test]
fn test_export_without_assets() {
    let out = tempfile::tempdir().unwrap();
    let mut config = config(out.path(), vec![OutputFormat::Markdown]);
    config.download_assets = false;
    let fetcher = CountingFetcher::new(fixture_path("course"));

    let paths = export_course(&fixture_course(), &config, &fetcher).unwrap();
    let doc = fs::read_to_string(&paths[0]).unwrap();
    assert!(doc.contains("*[image unavailable: Ferris]*"));
    assert!(!out.path().join("assets").exists());
    assert!(fetcher.urls.borrow().is_empty());
}

#[test]
fn test_export_all_formats() {
    let out = tempfile::tempdir().unwrap();
    let course = fixture_course();
    let fetcher = CountingFetcher::new(fixture_path("course"));

    let paths = export_course(&course, &config(out.path(), OutputFormat::ALL.to_vec()), &fetcher).unwrap();
    let names: Vec<String> = paths
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, ["Intro_to_Rust.md", "Intro_to_Rust.txt", "Intro_to_Rust.pdf"]);

    let text = fs::read_to_string(&paths[1]).unwrap();
    assert!(text.starts_with("Intro to Rust\n=============\n\n1. Getting Started\n\n1.1 Welcome\n\nWhy Rust"));
    assert!(text.contains("[image: Ferris]"));
    assert!(!text.contains("**"));

    let pdf = fs::read(&paths[2]).unwrap();
    assert!(pdf.starts_with(b"%PDF-"));
    assert!(pdf.windows(5).any(|w| w == b"%%EOF"));

    // Later documents reuse the asset the first one downloaded.
    assert_eq!(fetcher.count("media/ferris.png"), 1);
}

#[test]
fn test_export_is_repeatable() {
    let out = tempfile::tempdir().unwrap();
    let course = fixture_course();
    let config = config(out.path(), vec![OutputFormat::Markdown]);

    let first_fetcher = CountingFetcher::new(fixture_path("course"));
    let first = export_course(&course, &config, &first_fetcher).unwrap();
    let first_doc = fs::read_to_string(&first[0]).unwrap();

    let second_fetcher = CountingFetcher::new(fixture_path("course"));
    let second = export_course(&course, &config, &second_fetcher).unwrap();
    let second_doc = fs::read_to_string(&second[0]).unwrap();

    assert_eq!(first_doc, second_doc);
    assert_eq!(first_fetcher.count("media/ferris.png"), 1);
    assert_eq!(second_fetcher.count("media/ferris.png"), 0);
}

#[test]
fn test_invalid_config_writes_nothing() {
    let out = tempfile::tempdir().unwrap();
    let target = out.path().join("out");
    let config = config(&target, Vec::new());

    let result = export_course(&fixture_course(), &config, &NoFetcher);
    assert!(matches!(result, Err(Error::InvalidConfig(_))));
    assert!(!target.exists());
}

#[test]
fn test_config_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("export.json");
    fs::write(
        &path,
        r#"{"course_name": "Intro to Rust", "formats": ["md", "pdf"], "pdf_theme": "forest"}"#,
    )
    .unwrap();

    let config = ExportConfig::from_json_file(&path).unwrap();
    assert_eq!(config.formats, [OutputFormat::Markdown, OutputFormat::Pdf]);
    assert_eq!(config.pdf_theme, "forest");
    assert!(config.validate().is_ok());
}
