//! Content source trait and error types.
//!
//! Provides the core [`ContentSource`] trait for listing and downloading
//! content-repository files, along with [`ContentError`] for unified error
//! handling across backends.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// One file of the content repository.
///
/// `path` is relative to the repository root and always `/`-separated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitHubFile {
    /// Repository-relative path (e.g., `content/blog/hello/index.mdx`).
    pub path: String,
    /// UTF-8 file content.
    pub content: String,
}

impl GitHubFile {
    /// Create a file record.
    #[must_use]
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }
}

/// Kind of a directory listing entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// Regular file.
    File,
    /// Directory.
    Dir,
}

/// Entry of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirEntry {
    /// Entry name (last path segment).
    pub name: String,
    /// Repository-relative path (e.g., `content/blog/hello.mdx`).
    pub path: String,
    /// Whether the entry is a file or a directory.
    pub kind: EntryKind,
}

/// Semantic error categories.
#[derive(Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum ContentErrorKind {
    /// Resource does not exist.
    NotFound,
    /// Permission denied.
    PermissionDenied,
    /// Invalid path or identifier.
    InvalidPath,
    /// Content is not valid UTF-8.
    InvalidContent,
    /// Backend is temporarily unavailable.
    Unavailable,
    /// Operation timed out.
    Timeout,
    /// Other/unknown error category.
    Other,
}

/// Retry guidance.
#[derive(Debug, PartialEq, Eq, Default)]
pub enum ErrorStatus {
    /// Don't retry (not found, invalid path).
    #[default]
    Permanent,
    /// Retry immediately (timeout, connection reset).
    Temporary,
    /// Retry with backoff (service unavailable).
    Persistent,
}

/// Content source error with semantic kind and backend-specific source.
#[derive(Debug)]
pub struct ContentError {
    /// Semantic error category.
    pub kind: ContentErrorKind,
    /// Retry guidance.
    pub status: ErrorStatus,
    /// Path context (if applicable).
    pub path: Option<PathBuf>,
    /// Backend identifier (e.g., "Fs", "Mock").
    pub backend: Option<&'static str>,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl ContentError {
    /// Create a new content error.
    #[must_use]
    pub fn new(kind: ContentErrorKind) -> Self {
        Self {
            kind,
            status: ErrorStatus::Permanent,
            path: None,
            backend: None,
            source: None,
        }
    }

    /// Attach path context.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Attach backend identifier.
    #[must_use]
    pub fn with_backend(mut self, backend: &'static str) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Set retry status.
    #[must_use]
    pub fn with_status(mut self, status: ErrorStatus) -> Self {
        self.status = status;
        self
    }

    /// Attach the underlying error source.
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Create a not found error with path.
    #[must_use]
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::new(ContentErrorKind::NotFound).with_path(path)
    }

    /// Create an invalid path error.
    #[must_use]
    pub fn invalid_path(path: impl Into<PathBuf>) -> Self {
        Self::new(ContentErrorKind::InvalidPath).with_path(path)
    }

    /// Create a content error from an I/O error.
    #[must_use]
    pub fn io(err: std::io::Error, path: Option<PathBuf>) -> Self {
        let kind = match err.kind() {
            std::io::ErrorKind::NotFound => ContentErrorKind::NotFound,
            std::io::ErrorKind::PermissionDenied => ContentErrorKind::PermissionDenied,
            std::io::ErrorKind::InvalidData => ContentErrorKind::InvalidContent,
            std::io::ErrorKind::TimedOut => ContentErrorKind::Timeout,
            _ => ContentErrorKind::Other,
        };
        let status = match err.kind() {
            std::io::ErrorKind::TimedOut => ErrorStatus::Temporary,
            _ => ErrorStatus::Permanent,
        };
        let mut error = Self::new(kind).with_status(status).with_source(err);
        if let Some(p) = path {
            error = error.with_path(p);
        }
        error
    }

    /// Whether the error means the requested resource is absent.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.kind == ContentErrorKind::NotFound
    }
}

impl std::fmt::Display for ContentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Format: "[Backend] Kind: message (path: content/blog)"
        if let Some(backend) = self.backend {
            write!(f, "[{backend}] ")?;
        }

        let kind_str = match self.kind {
            ContentErrorKind::NotFound => "Not found",
            ContentErrorKind::PermissionDenied => "Permission denied",
            ContentErrorKind::InvalidPath => "Invalid path",
            ContentErrorKind::InvalidContent => "Invalid content",
            ContentErrorKind::Unavailable => "Unavailable",
            ContentErrorKind::Timeout => "Timeout",
            ContentErrorKind::Other => "Error",
        };

        write!(f, "{kind_str}")?;

        if let Some(source) = &self.source {
            write!(f, ": {source}")?;
        }

        if let Some(path) = &self.path {
            write!(f, " (path: {})", path.display())?;
        }

        Ok(())
    }
}

impl std::error::Error for ContentError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|s| s.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Access to the content repository.
///
/// Implementations map repository paths to their backend. All paths are
/// `/`-separated and relative to the repository root.
pub trait ContentSource: Send + Sync {
    /// List the immediate entries of a directory.
    ///
    /// # Errors
    ///
    /// Returns [`ContentError`] if the directory doesn't exist or can't be read.
    fn list_dir(&self, path: &str) -> Result<Vec<DirEntry>, ContentError>;

    /// Download a content unit.
    ///
    /// If `path` is a directory, returns every file beneath it. Otherwise
    /// returns the single file `{path}.mdx`, reported as `{path}/index.mdx`
    /// so both layouts look the same to callers. Returns an empty set when
    /// neither exists.
    ///
    /// # Errors
    ///
    /// Returns [`ContentError`] if the backend fails to read existing files.
    fn download(&self, path: &str) -> Result<Vec<GitHubFile>, ContentError>;
}

/// Reject paths that could escape the repository root.
pub(crate) fn check_path(path: &str) -> Result<(), ContentError> {
    let escapes = path
        .split('/')
        .any(|segment| segment == ".." || segment.contains('\\'));
    if escapes || path.starts_with('/') {
        return Err(ContentError::invalid_path(path));
    }
    Ok(())
}
