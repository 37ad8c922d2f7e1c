//! Asset fetch capability and its implementations.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use percent_encoding::percent_decode_str;
use url::Url;

use crate::error::Result;

/// Produce the bytes behind a URL.
///
/// Every failure (network, non-2xx, unreadable file, bad encoding) is `None`.
/// Implementations that talk to the course host must carry the same session
/// credentials as the page the URL came from.
pub trait AssetFetcher {
    fn fetch(&self, url: &str) -> Option<Vec<u8>>;
}

/// Fetches nothing. Used when asset download is disabled.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoFetcher;

impl AssetFetcher for NoFetcher {
    fn fetch(&self, _url: &str) -> Option<Vec<u8>> {
        None
    }
}

/// Blocking HTTP(S) fetcher that replays the course session cookie.
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
    cookie: Option<String>,
}

impl HttpFetcher {
    pub const TIMEOUT: Duration = Duration::from_secs(30);

    pub fn new(cookie: Option<String>) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Self::TIMEOUT)
            .user_agent(concat!("coursedown/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            cookie: cookie.filter(|c| !c.trim().is_empty()),
        })
    }
}

impl AssetFetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Option<Vec<u8>> {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return None;
        }
        let mut request = self.client.get(url);
        if let Some(cookie) = &self.cookie {
            request = request.header(reqwest::header::COOKIE, cookie);
        }
        let response = match request.send() {
            Ok(response) => response,
            Err(e) => {
                log::debug!("GET {url} failed: {e}");
                return None;
            }
        };
        if !response.status().is_success() {
            log::debug!("GET {url} returned {}", response.status());
            return None;
        }
        response.bytes().ok().map(|b| b.to_vec())
    }
}

/// Reads `data:` URIs, `file://` URLs and paths relative to a saved course
/// snapshot.
#[derive(Debug, Clone)]
pub struct LocalFetcher {
    root: PathBuf,
}

impl LocalFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl AssetFetcher for LocalFetcher {
    fn fetch(&self, url: &str) -> Option<Vec<u8>> {
        let url = url.trim();
        if let Some(data) = url.strip_prefix("data:") {
            return decode_data_uri(data);
        }
        if url.starts_with("file:") {
            let path = Url::parse(url).ok()?.to_file_path().ok()?;
            return fs::read(path).ok();
        }
        if url.contains("://") {
            return None;
        }
        let path = url.split(['?', '#']).next().unwrap_or("");
        let path = percent_decode_str(path).decode_utf8_lossy();
        let relative = path.trim_start_matches('/');
        if relative.is_empty() {
            return None;
        }
        fs::read(self.root.join(relative)).ok()
    }
}

/// `[<mediatype>][;base64],<data>`
fn decode_data_uri(data: &str) -> Option<Vec<u8>> {
    let (meta, payload) = data.split_once(',')?;
    if meta.split(';').any(|p| p.eq_ignore_ascii_case("base64")) {
        let cleaned: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
        STANDARD.decode(cleaned).ok()
    } else {
        Some(percent_decode_str(payload).collect())
    }
}

/// Tries each fetcher in order and returns the first hit.
#[derive(Default)]
pub struct ChainFetcher {
    fetchers: Vec<Box<dyn AssetFetcher>>,
}

impl ChainFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, fetcher: impl AssetFetcher + 'static) -> Self {
        self.fetchers.push(Box::new(fetcher));
        self
    }
}

impl AssetFetcher for ChainFetcher {
    fn fetch(&self, url: &str) -> Option<Vec<u8>> {
        self.fetchers.iter().find_map(|f| f.fetch(url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_uri_base64() {
        let fetcher = LocalFetcher::new(".");
        assert_eq!(
            fetcher.fetch("data:image/png;base64,aGVsbG8="),
            Some(b"hello".to_vec())
        );
    }

    #[test]
    fn test_data_uri_percent_encoded() {
        let fetcher = LocalFetcher::new(".");
        assert_eq!(fetcher.fetch("data:,a%20b"), Some(b"a b".to_vec()));
        assert_eq!(fetcher.fetch("data:nocomma"), None);
    }

    #[test]
    fn test_relative_path_under_root() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("media")).unwrap();
        fs::write(dir.path().join("media/pic one.png"), b"png").unwrap();

        let fetcher = LocalFetcher::new(dir.path());
        assert_eq!(fetcher.fetch("media/pic%20one.png?v=2"), Some(b"png".to_vec()));
        assert_eq!(fetcher.fetch("/media/pic%20one.png"), Some(b"png".to_vec()));
        assert_eq!(fetcher.fetch("media/missing.png"), None);
        assert_eq!(fetcher.fetch("https://example.com/media/pic.png"), None);
    }

    #[test]
    fn test_file_url() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.mp4");
        fs::write(&path, b"mp4").unwrap();
        let url = Url::from_file_path(&path).unwrap();
        assert_eq!(LocalFetcher::new("/").fetch(url.as_str()), Some(b"mp4".to_vec()));
    }

    #[test]
    fn test_chain_returns_first_hit() {
        struct Fixed(&'static [u8]);
        impl AssetFetcher for Fixed {
            fn fetch(&self, _url: &str) -> Option<Vec<u8>> {
                Some(self.0.to_vec())
            }
        }

        let chain = ChainFetcher::new().with(NoFetcher).with(Fixed(b"one")).with(Fixed(b"two"));
        assert_eq!(chain.fetch("anything"), Some(b"one".to_vec()));
        assert_eq!(ChainFetcher::new().fetch("anything"), None);
    }

    #[test]
    fn test_http_fetcher_ignores_other_schemes() {
        let fetcher = HttpFetcher::new(Some("session=abc".to_string())).unwrap();
        assert_eq!(fetcher.fetch("data:,x"), None);
        assert_eq!(fetcher.fetch("relative/path.png"), None);
    }
}
