//! Per-document asset directory with idempotent materialization.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use super::fetch::AssetFetcher;

/// Source URL to local filename mapping for everything an output document
/// references under `assets/`.
pub type AssetRecord = BTreeMap<String, String>;

/// Materializes assets into one directory, each filename at most once.
///
/// A filename that is already on disk (non-empty) or was written earlier in
/// the run is never fetched again; a filename whose fetch failed is not
/// retried during the same run. A store without a directory is disabled and
/// reports every asset as unavailable.
pub struct AssetStore<'f> {
    dir: Option<PathBuf>,
    fetcher: &'f dyn AssetFetcher,
    materialized: HashSet<String>,
    failed: HashSet<String>,
    record: AssetRecord,
    fetches: usize,
}

impl<'f> AssetStore<'f> {
    pub fn new(dir: impl Into<PathBuf>, fetcher: &'f dyn AssetFetcher) -> Self {
        Self {
            dir: Some(dir.into()),
            fetcher,
            materialized: HashSet::new(),
            failed: HashSet::new(),
            record: AssetRecord::new(),
            fetches: 0,
        }
    }

    pub fn disabled(fetcher: &'f dyn AssetFetcher) -> Self {
        Self {
            dir: None,
            ..Self::new(PathBuf::new(), fetcher)
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.dir.is_some()
    }

    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    /// Path of a materialized asset.
    pub fn path_of(&self, filename: &str) -> Option<PathBuf> {
        let dir = self.dir.as_ref()?;
        self.materialized
            .contains(filename)
            .then(|| dir.join(filename))
    }

    /// Path of `filename` if it is materialized or already on disk.
    pub fn find(&self, filename: &str) -> Option<PathBuf> {
        if let Some(path) = self.path_of(filename) {
            return Some(path);
        }
        let path = self.dir.as_ref()?.join(filename);
        fs::metadata(&path)
            .is_ok_and(|m| m.is_file() && m.len() > 0)
            .then_some(path)
    }

    pub fn record(&self) -> &AssetRecord {
        &self.record
    }

    /// Number of fetches issued so far.
    pub fn fetch_count(&self) -> usize {
        self.fetches
    }

    /// Make sure `filename` exists in the asset directory, fetching `url` if
    /// needed. Returns whether the file is available.
    pub fn ensure(&mut self, url: &str, filename: &str) -> bool {
        let Some(dir) = self.dir.clone() else {
            return false;
        };
        if url.trim().is_empty() || filename.is_empty() {
            return false;
        }
        if self.materialized.contains(filename) {
            self.record.insert(url.to_string(), filename.to_string());
            return true;
        }
        if self.failed.contains(filename) {
            return false;
        }

        let path = dir.join(filename);
        if fs::metadata(&path).is_ok_and(|m| m.is_file() && m.len() > 0) {
            log::debug!("asset {filename} already present");
            self.mark_materialized(url, filename);
            return true;
        }

        self.fetches += 1;
        let bytes = match self.fetcher.fetch(url) {
            Some(bytes) if !bytes.is_empty() => bytes,
            _ => {
                log::warn!("could not fetch asset {url}");
                self.failed.insert(filename.to_string());
                return false;
            }
        };

        match write_atomically(&dir, filename, &bytes) {
            Ok(()) => {
                self.mark_materialized(url, filename);
                true
            }
            Err(e) => {
                log::warn!("could not write asset {}: {e}", path.display());
                self.failed.insert(filename.to_string());
                false
            }
        }
    }

    fn mark_materialized(&mut self, url: &str, filename: &str) {
        self.materialized.insert(filename.to_string());
        self.record.insert(url.to_string(), filename.to_string());
    }
}

/// Write through a temporary sibling so an interrupted run never leaves a
/// truncated file under the final name.
fn write_atomically(dir: &Path, filename: &str, bytes: &[u8]) -> std::io::Result<()> {
    fs::create_dir_all(dir)?;
    let partial = dir.join(format!(".{filename}.part"));
    fs::write(&partial, bytes)?;
    fs::rename(&partial, dir.join(filename))
}
