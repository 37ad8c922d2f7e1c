//! Asset resolution: deriving collision-safe filenames for images, videos and
//! posters, fetching their bytes, and materializing them into the output
//! `assets/` directory exactly once.

mod fetch;
mod store;

pub use fetch::{AssetFetcher, ChainFetcher, HttpFetcher, LocalFetcher, NoFetcher};
pub use store::{AssetRecord, AssetStore};

use percent_encoding::percent_decode_str;
use url::Url;

/// Last path segment of `url` without query or fragment, percent-decoded.
///
/// Returns `None` for `data:` URIs and URLs without a usable segment.
///
/// ```
/// use coursedown::asset::safe_basename_from_url;
///
/// assert_eq!(
///     safe_basename_from_url("https://cdn.x.io/a/My%20Chart.png?w=800#top").as_deref(),
///     Some("My Chart.png")
/// );
/// assert_eq!(safe_basename_from_url("https://cdn.x.io/"), None);
/// ```
pub fn safe_basename_from_url(url: &str) -> Option<String> {
    let url = url.trim();
    if url.starts_with("data:") {
        return None;
    }
    let path = match Url::parse(url) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => url.split(['?', '#']).next().unwrap_or("").to_string(),
    };
    let segment = path.trim_end_matches('/').rsplit('/').next().unwrap_or("");
    let decoded = percent_decode_str(segment).decode_utf8_lossy();
    let decoded = decoded.trim();
    (!decoded.is_empty()).then(|| decoded.to_string())
}

/// Restrict `name` to `[A-Za-z0-9._-]`. Every other character becomes `_`;
/// leading and trailing `.`, `_` and `-` are trimmed; an empty result is
/// `asset`.
pub fn safe_filename(name: &str) -> String {
    let replaced: String = name
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let trimmed = replaced.trim_matches(|c| matches!(c, '.' | '_' | '-'));
    if trimmed.is_empty() {
        "asset".to_string()
    } else {
        trimmed.to_string()
    }
}

/// The filename prefix owned by a block: its trimmed id, or `block`.
pub fn asset_prefix(block_id: Option<&str>) -> String {
    match block_id.map(str::trim) {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => "block".to_string(),
    }
}

/// `{prefix}-{qualifier}-{basename}` (qualifier optional) made filesystem
/// safe. `fallback` names the file when the URL has no usable segment.
pub fn asset_filename(prefix: &str, qualifier: Option<&str>, url: &str, fallback: &str) -> String {
    let basename = safe_basename_from_url(url).unwrap_or_else(|| fallback.to_string());
    match qualifier {
        Some(q) => safe_filename(&format!("{prefix}-{q}-{basename}")),
        None => safe_filename(&format!("{prefix}-{basename}")),
    }
}
