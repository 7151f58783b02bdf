//! Mock content source for testing.
//!
//! Provides [`MockContentSource`] for unit testing without filesystem access.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::source::{
    ContentError, ContentSource, DirEntry, EntryKind, GitHubFile, check_path,
};

const BACKEND: &str = "Mock";

/// Mock content source for testing.
///
/// Stores files in memory keyed by repository path. Use the builder methods
/// to configure the mock with test data.
///
/// # Example
///
/// ```ignore
/// use folio_content::{ContentSource, MockContentSource};
///
/// let source = MockContentSource::new()
///     .with_file("content/blog/hello/index.mdx", "# Hello");
///
/// let files = source.download("content/blog/hello").unwrap();
/// ```
#[derive(Debug, Default)]
pub struct MockContentSource {
    files: RwLock<BTreeMap<String, String>>,
    downloads: AtomicUsize,
    listings: AtomicUsize,
}

impl MockContentSource {
    /// Create a new empty mock source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_file(self, path: impl Into<String>, content: impl Into<String>) -> Self {
        self.insert(path, content);
        self
    }

    /// Add or replace a file on an existing source.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn insert(&self, path: impl Into<String>, content: impl Into<String>) {
        self.files
            .write()
            .unwrap()
            .insert(path.into(), content.into());
    }

    /// Number of `download` calls served so far.
    #[must_use]
    pub fn download_count(&self) -> usize {
        self.downloads.load(Ordering::SeqCst)
    }

    /// Number of `list_dir` calls served so far.
    #[must_use]
    pub fn list_count(&self) -> usize {
        self.listings.load(Ordering::SeqCst)
    }
}

impl ContentSource for MockContentSource {
    fn list_dir(&self, path: &str) -> Result<Vec<DirEntry>, ContentError> {
        self.listings.fetch_add(1, Ordering::SeqCst);
        check_path(path).map_err(|e| e.with_backend(BACKEND))?;

        let prefix = format!("{path}/");
        let files = self.files.read().unwrap();
        let mut seen = BTreeSet::new();
        let mut entries = Vec::new();

        for file_path in files.keys() {
            let Some(rest) = file_path.strip_prefix(&prefix) else {
                continue;
            };
            let (name, kind) = match rest.split_once('/') {
                Some((dir, _)) => (dir, EntryKind::Dir),
                None => (rest, EntryKind::File),
            };
            if seen.insert(name.to_owned()) {
                entries.push(DirEntry {
                    name: name.to_owned(),
                    path: format!("{prefix}{name}"),
                    kind,
                });
            }
        }

        if entries.is_empty() {
            return Err(ContentError::not_found(path).with_backend(BACKEND));
        }
        Ok(entries)
    }

    fn download(&self, path: &str) -> Result<Vec<GitHubFile>, ContentError> {
        self.downloads.fetch_add(1, Ordering::SeqCst);
        check_path(path).map_err(|e| e.with_backend(BACKEND))?;

        let prefix = format!("{path}/");
        let files = self.files.read().unwrap();

        let nested: Vec<GitHubFile> = files
            .iter()
            .filter(|(p, _)| p.starts_with(&prefix))
            .map(|(p, c)| GitHubFile::new(p.clone(), c.clone()))
            .collect();
        if !nested.is_empty() {
            return Ok(nested);
        }

        Ok(files
            .get(&format!("{path}.mdx"))
            .map(|content| vec![GitHubFile::new(format!("{path}/index.mdx"), content.clone())])
            .unwrap_or_default())
    }
}
