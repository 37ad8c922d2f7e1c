//! Export configuration: output formats, JSON config files and validation.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::layout::{DEFAULT_CODE_WRAP, LayoutOptions, Theme};

/// Narrowest code wrap width accepted by [`ExportConfig::validate`].
pub const MIN_CODE_WRAP: usize = 20;

const DEFAULT_COURSE_NAME: &str = "course";

/// A document format the exporter can write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum OutputFormat {
    Markdown,
    PlainText,
    Pdf,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 3] = [OutputFormat::Markdown, OutputFormat::PlainText, OutputFormat::Pdf];

    /// File extension, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Markdown => "md",
            OutputFormat::PlainText => "txt",
            OutputFormat::Pdf => "pdf",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "md" | "markdown" => Ok(OutputFormat::Markdown),
            "txt" | "text" => Ok(OutputFormat::PlainText),
            "pdf" => Ok(OutputFormat::Pdf),
            _ => Err(Error::UnsupportedFormat(s.trim().to_string())),
        }
    }
}

impl TryFrom<String> for OutputFormat {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Parse a comma-separated format list such as `md,pdf`. Duplicates are
/// dropped, order is kept.
pub fn parse_formats(list: &str) -> Result<Vec<OutputFormat>> {
    let mut formats = Vec::new();
    for part in list.split(',').filter(|p| !p.trim().is_empty()) {
        let format: OutputFormat = part.parse()?;
        if !formats.contains(&format) {
            formats.push(format);
        }
    }
    Ok(formats)
}

/// Settings for one export run.
///
/// Every field has a default, so a JSON config file only needs the keys it
/// changes:
///
/// ```json
/// { "course_name": "Rust Basics", "formats": ["md", "pdf"], "pdf_theme": "forest" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportConfig {
    pub course_name: String,
    /// Defaults to `./output/{course_name}`.
    pub output_dir: Option<PathBuf>,
    pub formats: Vec<OutputFormat>,
    pub pdf_theme: String,
    pub include_index: bool,
    pub download_assets: bool,
    pub code_wrap_width: usize,
    /// Base for relative asset URLs when a page carries no `<base href>`.
    pub base_url: Option<String>,
    /// `Cookie` header sent with asset downloads.
    pub cookie: Option<String>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            course_name: DEFAULT_COURSE_NAME.to_string(),
            output_dir: None,
            formats: vec![OutputFormat::Markdown],
            pdf_theme: "default".to_string(),
            include_index: true,
            download_assets: true,
            code_wrap_width: DEFAULT_CODE_WRAP,
            base_url: None,
            cookie: None,
        }
    }
}

impl ExportConfig {
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Reject settings no export could run with.
    pub fn validate(&self) -> Result<()> {
        if self.formats.is_empty() {
            return Err(Error::InvalidConfig("no output format selected".to_string()));
        }
        if self.code_wrap_width < MIN_CODE_WRAP {
            return Err(Error::InvalidConfig(format!(
                "code_wrap_width must be at least {MIN_CODE_WRAP}, got {}",
                self.code_wrap_width
            )));
        }
        if let Some(base) = self.base_url.as_deref().filter(|b| !b.trim().is_empty()) {
            url::Url::parse(base.trim())
                .map_err(|e| Error::InvalidConfig(format!("invalid base URL {base:?}: {e}")))?;
        }
        Ok(())
    }

    pub fn output_dir(&self) -> PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(|| Path::new("output").join(normalize_course_name(&self.course_name)))
    }

    /// Theme for PDF output. Unknown names fall back to the default theme.
    pub fn theme(&self) -> Theme {
        Theme::named(&self.pdf_theme)
    }

    pub fn layout_options(&self) -> LayoutOptions {
        LayoutOptions {
            code_wrap_width: self.code_wrap_width,
        }
    }
}

/// Collapse whitespace, turn path separators into `-` and trim. An empty
/// result becomes `course`.
pub fn normalize_course_name(name: &str) -> String {
    let normalized = name
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .replace(['/', '\\'], "-")
        .trim()
        .to_string();
    if normalized.is_empty() {
        DEFAULT_COURSE_NAME.to_string()
    } else {
        normalized
    }
}
