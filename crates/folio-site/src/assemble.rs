//! Page assembly.
//!
//! Turns the File Set of one content unit into a [`CompiledPage`]:
//!
//! 1. Locate the entry document (`{slug}/index.md` or `{slug}/index.mdx`)
//! 2. Rewrite paths under the entry's directory to `./`-relative paths
//! 3. Compile the entry with the remaining files available for imports
//! 4. Estimate the reading time of the entry

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use folio_bundler::{BundleError, Bundler, TransformSet};
use folio_content::GitHubFile;
use regex::Regex;

use crate::page::CompiledPage;
use crate::reading_time::reading_time;

/// Error assembling a page.
#[derive(Debug, thiserror::Error)]
pub enum AssembleError {
    /// Two files map to the same relative path.
    #[error("duplicate file path after rewriting: {0}")]
    DuplicatePath(String),
    /// The entry pattern could not be built from the slug.
    #[error("invalid entry pattern for slug {slug:?}: {source}")]
    EntryPattern {
        /// Offending slug.
        slug: String,
        /// Regex compile error.
        #[source]
        source: regex::Error,
    },
    /// Compilation failed.
    #[error(transparent)]
    Bundle(#[from] BundleError),
}

/// Compile the content unit for `slug`.
///
/// Returns `Ok(None)` when no file of `files` is the unit's entry document.
///
/// # Errors
///
/// Returns [`AssembleError::DuplicatePath`] if two files collide after path
/// rewriting and [`AssembleError::Bundle`] if compilation fails.
pub fn assemble(
    slug: &str,
    files: &[GitHubFile],
    bundler: &Bundler,
    transforms: &TransformSet,
) -> Result<Option<CompiledPage>, AssembleError> {
    let pattern = entry_pattern(slug)?;
    let Some(entry) = files.iter().find(|f| pattern.is_match(&f.path)) else {
        tracing::debug!(slug, files = files.len(), "no entry document");
        return Ok(None);
    };

    let root_dir = entry_root(&entry.path);
    let mut relative = BTreeMap::new();
    for file in files {
        let path = relative_path(&file.path, root_dir);
        match relative.entry(path) {
            Entry::Occupied(e) => return Err(AssembleError::DuplicatePath(e.key().clone())),
            Entry::Vacant(e) => {
                e.insert(file.content.clone());
            }
        }
    }
    relative.remove(&relative_path(&entry.path, root_dir));

    let bundle = bundler.bundle(&entry.content, &relative, transforms)?;
    tracing::debug!(slug, files = files.len(), "assembled page");

    Ok(Some(CompiledPage {
        code: bundle.code,
        frontmatter: bundle.frontmatter,
        read_time: Some(reading_time(&entry.content)),
        slug: slug.to_owned(),
    }))
}

fn entry_pattern(slug: &str) -> Result<Regex, AssembleError> {
    Regex::new(&format!(r"(^|/){}/index\.mdx?$", regex::escape(slug))).map_err(|source| {
        AssembleError::EntryPattern {
            slug: slug.to_owned(),
            source,
        }
    })
}

/// Directory of the entry document, with its trailing slash.
fn entry_root(entry_path: &str) -> &str {
    entry_path
        .strip_suffix("index.mdx")
        .or_else(|| entry_path.strip_suffix("index.md"))
        .unwrap_or(entry_path)
}

fn relative_path(path: &str, root_dir: &str) -> String {
    match path.strip_prefix(root_dir) {
        Some(rest) => format!("./{rest}"),
        None => path.to_owned(),
    }
}
