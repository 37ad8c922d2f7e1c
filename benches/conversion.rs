//! Benchmarks for the scrape and export pipeline.
//!
//! Run with: cargo bench

use std::hint::black_box;
use std::io::Cursor;

use criterion::{Criterion, criterion_group, criterion_main};

use coursedown::asset::{AssetStore, NoFetcher};
use coursedown::block::scrape_lesson;
use coursedown::dom::HtmlFragment;
use coursedown::export::{Exporter, MarkdownExporter, PdfExporter};
use coursedown::markdown::html_to_markdown;
use coursedown::{CourseScheme, SnapshotSession, scrape_course};

const COURSE_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/course");
const WELCOME_HTML: &str = include_str!("../tests/fixtures/course/lessons/welcome.html");

fn load_course() -> CourseScheme {
    let mut session = SnapshotSession::open(COURSE_DIR, None).unwrap();
    scrape_course(&mut session, "Benchmark").unwrap()
}

/// A long rich-text body: the welcome lesson's text block repeated.
fn sample_body() -> String {
    let page = HtmlFragment::parse(WELCOME_HTML);
    let blocks = scrape_lesson(&page);
    let html = blocks
        .iter()
        .find_map(|b| match &b.content {
            coursedown::block::LessonBlock::Text { html, .. } => Some(html.clone()),
            _ => None,
        })
        .unwrap();
    html.repeat(50)
}

// ============================================================================
// Scraping Benchmarks
// ============================================================================

fn bench_scrape_lesson(c: &mut Criterion) {
    c.bench_function("scrape_lesson", |b| {
        b.iter(|| {
            let page = HtmlFragment::parse(black_box(WELCOME_HTML));
            scrape_lesson(&page)
        });
    });
}

fn bench_scrape_course(c: &mut Criterion) {
    c.bench_function("scrape_course", |b| {
        b.iter(load_course);
    });
}

// ============================================================================
// Conversion Benchmarks
// ============================================================================

fn bench_html_to_markdown(c: &mut Criterion) {
    let body = sample_body();
    c.bench_function("html_to_markdown", |b| {
        b.iter(|| html_to_markdown(black_box(&body)));
    });
}

fn bench_export_markdown(c: &mut Criterion) {
    let course = load_course();
    c.bench_function("export_markdown", |b| {
        b.iter(|| {
            let mut assets = AssetStore::disabled(&NoFetcher);
            MarkdownExporter::new().render(black_box(&course), &mut assets)
        });
    });
}

fn bench_export_pdf(c: &mut Criterion) {
    let course = load_course();
    c.bench_function("export_pdf", |b| {
        b.iter(|| {
            let mut assets = AssetStore::disabled(&NoFetcher);
            let mut out = Cursor::new(Vec::new());
            PdfExporter::new()
                .export(black_box(&course), &mut assets, &mut out)
                .unwrap();
            out.into_inner()
        });
    });
}

criterion_group!(
    benches,
    bench_scrape_lesson,
    bench_scrape_course,
    bench_html_to_markdown,
    bench_export_markdown,
    bench_export_pdf,
);
criterion_main!(benches);
