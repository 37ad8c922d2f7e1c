//! coursedown - Export Rise course snapshots to Markdown, plain text and PDF

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use coursedown::asset::{AssetFetcher, ChainFetcher, HttpFetcher, LocalFetcher, NoFetcher};
use coursedown::config::{normalize_course_name, parse_formats};
use coursedown::layout::Theme;
use coursedown::{ExportConfig, SnapshotSession, export_course, scrape_course};

#[derive(Parser)]
#[command(name = "coursedown")]
#[command(version, about = "Export Rise course lessons to Markdown, plain text and PDF", long_about = None)]
#[command(after_help = "EXAMPLES:
    coursedown saved-course                 Write Markdown to ./output/<course>
    coursedown saved-course -f md,pdf -o out --theme forest
    coursedown --list-themes                Show the PDF themes")]
struct Cli {
    /// Saved course directory (index.html + lessons/*.html)
    #[arg(value_name = "SNAPSHOT_DIR", required_unless_present = "list_themes")]
    snapshot: Option<PathBuf>,

    /// Output directory [default: ./output/<course>]
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Comma-separated output formats: md, txt, pdf
    #[arg(short, long, value_name = "FORMATS")]
    formats: Option<String>,

    /// PDF theme name
    #[arg(long, value_name = "NAME")]
    theme: Option<String>,

    /// JSON configuration file; flags override its values
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Leave the index out of the Markdown document
    #[arg(long)]
    no_index: bool,

    /// Do not download images and videos
    #[arg(long)]
    no_assets: bool,

    /// Base URL for relative asset links
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Cookie header sent with asset downloads
    #[arg(long, value_name = "VALUE")]
    cookie: Option<String>,

    /// List the available PDF themes and exit
    #[arg(long)]
    list_themes: bool,

    /// Only log warnings and errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Log debug details
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.quiet {
        "warn"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    if cli.list_themes {
        for name in Theme::names() {
            let marker = if name == Theme::DEFAULT { " (default)" } else { "" };
            println!("{name}{marker}");
        }
        return ExitCode::SUCCESS;
    }

    match run(cli) {
        Ok(paths) => {
            for path in paths {
                println!("{}", path.display());
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn load_config(cli: &Cli) -> coursedown::Result<ExportConfig> {
    let mut config = match &cli.config {
        Some(path) => ExportConfig::from_json_file(path)?,
        None => ExportConfig::default(),
    };
    if let Some(output) = &cli.output {
        config.output_dir = Some(output.clone());
    }
    if let Some(formats) = &cli.formats {
        config.formats = parse_formats(formats)?;
    }
    if let Some(theme) = &cli.theme {
        config.pdf_theme = theme.clone();
    }
    if cli.no_index {
        config.include_index = false;
    }
    if cli.no_assets {
        config.download_assets = false;
    }
    if cli.base_url.is_some() {
        config.base_url = cli.base_url.clone();
    }
    if cli.cookie.is_some() {
        config.cookie = cli.cookie.clone();
    }
    config.validate()?;
    Ok(config)
}

fn run(cli: Cli) -> coursedown::Result<Vec<PathBuf>> {
    let mut config = load_config(&cli)?;
    let Some(snapshot) = cli.snapshot else {
        return Ok(Vec::new());
    };

    let mut session = SnapshotSession::open(&snapshot, config.base_url.as_deref())?;
    let course = scrape_course(&mut session, &normalize_course_name(&config.course_name))?;
    if config.course_name == ExportConfig::default().course_name {
        config.course_name = normalize_course_name(&course.title);
    }

    let fetcher: Box<dyn AssetFetcher> = if config.download_assets {
        Box::new(
            ChainFetcher::new()
                .with(LocalFetcher::new(&snapshot))
                .with(HttpFetcher::new(config.cookie.clone())?),
        )
    } else {
        Box::new(NoFetcher)
    };
    export_course(&course, &config, fetcher.as_ref())
}
