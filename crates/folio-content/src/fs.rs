//! Filesystem content source.
//!
//! [`FsContentSource`] reads a local checkout of the content repository.

use std::fs;
use std::path::{Path, PathBuf};

use crate::source::{
    ContentError, ContentSource, DirEntry, EntryKind, GitHubFile, check_path,
};

const BACKEND: &str = "Fs";

/// Content source backed by a directory on disk.
///
/// Hidden files and directories (names starting with `.`) are never listed
/// or downloaded.
#[derive(Debug, Clone)]
pub struct FsContentSource {
    root: PathBuf,
}

impl FsContentSource {
    /// Create a source rooted at a repository checkout.
    #[must_use]
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Repository root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> Result<PathBuf, ContentError> {
        check_path(path).map_err(|e| e.with_backend(BACKEND))?;
        Ok(self.root.join(path))
    }
}

impl ContentSource for FsContentSource {
    fn list_dir(&self, path: &str) -> Result<Vec<DirEntry>, ContentError> {
        let dir = self.resolve(path)?;
        if !dir.is_dir() {
            return Err(ContentError::not_found(path).with_backend(BACKEND));
        }

        let entries = read_entries(&dir)?
            .into_iter()
            .map(|(name, is_dir)| DirEntry {
                path: format!("{path}/{name}"),
                name,
                kind: if is_dir { EntryKind::Dir } else { EntryKind::File },
            })
            .collect();
        Ok(entries)
    }

    fn download(&self, path: &str) -> Result<Vec<GitHubFile>, ContentError> {
        let target = self.resolve(path)?;

        if target.is_dir() {
            let mut files = Vec::new();
            collect_files(&target, path, &mut files)?;
            tracing::debug!(path, count = files.len(), "downloaded content directory");
            return Ok(files);
        }

        let single = self.resolve(&format!("{path}.mdx"))?;
        if single.is_file() {
            return Ok(vec![GitHubFile {
                path: format!("{path}/index.mdx"),
                content: read_file(&single)?,
            }]);
        }

        tracing::debug!(path, "no content found");
        Ok(Vec::new())
    }
}

/// Collect every file beneath `dir`, recursing into subdirectories.
fn collect_files(dir: &Path, prefix: &str, files: &mut Vec<GitHubFile>) -> Result<(), ContentError> {
    for (name, is_dir) in read_entries(dir)? {
        let path = dir.join(&name);
        let repo_path = format!("{prefix}/{name}");
        if is_dir {
            collect_files(&path, &repo_path, files)?;
        } else {
            files.push(GitHubFile {
                content: read_file(&path)?,
                path: repo_path,
            });
        }
    }
    Ok(())
}

/// Read directory entries as `(name, is_dir)`, sorted by name, hidden entries skipped.
fn read_entries(dir: &Path) -> Result<Vec<(String, bool)>, ContentError> {
    let entries = fs::read_dir(dir)
        .map_err(|e| ContentError::io(e, Some(dir.to_path_buf())).with_backend(BACKEND))?;

    let mut result: Vec<(String, bool)> = entries
        .filter_map(Result::ok)
        .filter_map(|e| {
            let name = e.file_name().to_string_lossy().into_owned();
            if name.starts_with('.') {
                return None;
            }
            let is_dir = e.file_type().is_ok_and(|t| t.is_dir());
            Some((name, is_dir))
        })
        .collect();
    result.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(result)
}

/// Read a file as text. Binary assets are decoded lossily.
fn read_file(path: &Path) -> Result<String, ContentError> {
    let bytes = fs::read(path)
        .map_err(|e| ContentError::io(e, Some(path.to_path_buf())).with_backend(BACKEND))?;
    match String::from_utf8(bytes) {
        Ok(text) => Ok(text),
        Err(err) => {
            tracing::debug!(path = %path.display(), "file is not UTF-8, decoding lossily");
            Ok(String::from_utf8_lossy(err.as_bytes()).into_owned())
        }
    }
}
