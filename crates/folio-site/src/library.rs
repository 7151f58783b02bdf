//! Cached content operations.
//!
//! [`Library`] ties the content source, the cache and the compiler together.
//! Downloads, compiled pages and directory listings are cached in the
//! `content` bucket:
//!
//! | Key | Etag |
//! |---|---|
//! | `{area}:{slug}:downloaded` | none |
//! | `{area}:{slug}:compiled` | SHA-256 of the downloaded File Set |
//! | `{area}:dir-list` | none |
//!
//! A changed File Set therefore always recompiles, while stale downloads and
//! listings live until the cache expires them or a caller forces a refresh.

use std::cmp::Ordering;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use folio_bundler::{Bundler, TransformSet};
use folio_cache::{Cache, CacheBucket, CacheBucketExt};
use folio_content::{ContentError, ContentErrorKind, ContentSource, GitHubFile};
use rayon::prelude::*;
use sha2::{Digest, Sha256};

use crate::assemble::{AssembleError, assemble};
use crate::keys::CacheKey;
use crate::listing::{DirListItem, area_dir, list_dir};
use crate::page::{CompiledPage, PageListItem};

/// Content area holding blog posts.
pub const BLOG_AREA: &str = "blog";

/// Cache bucket used for content entries.
const BUCKET: &str = "content";

/// What to do when one page of a batch fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BatchFailurePolicy {
    /// Log the failure and leave the page out.
    #[default]
    Skip,
    /// Fail the whole batch.
    Abort,
}

/// Configuration for [`Library`].
#[derive(Debug, Clone, Copy, Default)]
pub struct LibraryConfig {
    /// Handling of per-page failures in batch operations.
    pub batch_failure: BatchFailurePolicy,
}

/// Per-call fetch options.
#[derive(Debug, Clone, Copy, Default)]
pub struct FetchOptions {
    /// Skip cache reads. Fresh results are still written back.
    pub force_fresh: bool,
}

/// Error from a library operation.
#[derive(Debug, thiserror::Error)]
pub enum LibraryError {
    /// The content source failed.
    #[error("content source error: {0}")]
    Content(#[from] ContentError),
    /// A page failed to assemble.
    #[error("failed to compile {area}/{slug}: {source}")]
    Assemble {
        /// Content area.
        area: String,
        /// Page slug.
        slug: String,
        /// Underlying error.
        #[source]
        source: AssembleError,
    },
}

/// Cached access to compiled content.
pub struct Library {
    source: Arc<dyn ContentSource>,
    bucket: Box<dyn CacheBucket>,
    bundler: Bundler,
    transforms: TransformSet,
    config: LibraryConfig,
}

impl Library {
    /// Create a library over `source`, caching in `cache`.
    #[must_use]
    pub fn new(
        source: Arc<dyn ContentSource>,
        cache: &dyn Cache,
        bundler: Bundler,
        transforms: TransformSet,
        config: LibraryConfig,
    ) -> Self {
        Self {
            source,
            bucket: cache.bucket(BUCKET),
            bundler,
            transforms,
            config,
        }
    }

    /// Compiled page for `slug` in `area`, or `None` if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`LibraryError`] if the download or compilation fails.
    pub fn page(
        &self,
        area: &str,
        slug: &str,
        opts: &FetchOptions,
    ) -> Result<Option<CompiledPage>, LibraryError> {
        let files = self.download(area, slug, opts)?;
        self.compile(area, slug, &files, opts)
    }

    /// Content units of `area`.
    ///
    /// # Errors
    ///
    /// Returns [`LibraryError::Content`] if the area cannot be listed.
    pub fn dir_list(
        &self,
        area: &str,
        opts: &FetchOptions,
    ) -> Result<Vec<DirListItem>, LibraryError> {
        let key = CacheKey::DirList { area }.to_string();
        if !opts.force_fresh
            && let Some(items) = self.bucket.get_json::<Vec<DirListItem>>(&key, "")
        {
            return Ok(items);
        }

        let items = list_dir(self.source.as_ref(), area)?;
        tracing::debug!(area, count = items.len(), "listed content area");
        self.bucket.set_json(&key, "", &items);
        Ok(items)
    }

    /// Every compiled page of `area`, in listing order.
    ///
    /// Downloads run concurrently; compilation runs one page at a time.
    /// Units without an entry document are left out.
    ///
    /// # Errors
    ///
    /// Returns [`LibraryError`] if the area cannot be listed, or if a page
    /// fails under [`BatchFailurePolicy::Abort`].
    pub fn pages_in_dir(
        &self,
        area: &str,
        opts: &FetchOptions,
    ) -> Result<Vec<CompiledPage>, LibraryError> {
        let items = self.dir_list(area, opts)?;

        let downloads: Vec<_> = items
            .par_iter()
            .map(|item| (item, self.download(area, &item.slug, opts)))
            .collect();

        let mut pages = Vec::with_capacity(downloads.len());
        for (item, files) in downloads {
            let compiled = files.and_then(|files| self.compile(area, &item.slug, &files, opts));
            match compiled {
                Ok(Some(page)) => pages.push(page),
                Ok(None) => {}
                Err(e) => match self.config.batch_failure {
                    BatchFailurePolicy::Skip => {
                        tracing::warn!(area, slug = %item.slug, error = %e, "skipping page");
                    }
                    BatchFailurePolicy::Abort => return Err(e),
                },
            }
        }

        tracing::info!(area, pages = pages.len(), "compiled content area");
        Ok(pages)
    }

    /// Blog posts for listings, newest first.
    ///
    /// Posts without a parseable date sort last; ties keep listing order.
    ///
    /// # Errors
    ///
    /// Returns [`LibraryError`] under the same conditions as
    /// [`pages_in_dir`](Self::pages_in_dir).
    pub fn blog_list_items(&self, opts: &FetchOptions) -> Result<Vec<PageListItem>, LibraryError> {
        let mut pages = self.pages_in_dir(BLOG_AREA, opts)?;
        pages.sort_by(|a, b| newest_first(page_date(a), page_date(b)));
        Ok(pages.into_iter().map(PageListItem::from).collect())
    }

    fn download(
        &self,
        area: &str,
        slug: &str,
        opts: &FetchOptions,
    ) -> Result<Vec<GitHubFile>, LibraryError> {
        let key = CacheKey::Downloaded { area, slug }.to_string();
        if !opts.force_fresh
            && let Some(files) = self.bucket.get_json::<Vec<GitHubFile>>(&key, "")
        {
            return Ok(files);
        }

        let files = match self.source.download(&format!("{}/{slug}", area_dir(area))) {
            Ok(files) => files,
            Err(err) if err.is_not_found() || err.kind == ContentErrorKind::InvalidPath => {
                tracing::debug!(area, slug, error = %err, "content unit not addressable");
                Vec::new()
            }
            Err(err) => return Err(err.into()),
        };
        if files.is_empty() {
            tracing::debug!(area, slug, "content unit not found");
        } else {
            self.bucket.set_json(&key, "", &files);
        }
        Ok(files)
    }

    fn compile(
        &self,
        area: &str,
        slug: &str,
        files: &[GitHubFile],
        opts: &FetchOptions,
    ) -> Result<Option<CompiledPage>, LibraryError> {
        if files.is_empty() {
            return Ok(None);
        }

        let key = CacheKey::Compiled { area, slug }.to_string();
        let etag = file_set_etag(files);
        if !opts.force_fresh
            && let Some(page) = self.bucket.get_json::<CompiledPage>(&key, &etag)
        {
            return Ok(Some(page));
        }

        let page = assemble(slug, files, &self.bundler, &self.transforms).map_err(|source| {
            LibraryError::Assemble {
                area: area.to_owned(),
                slug: slug.to_owned(),
                source,
            }
        })?;
        if let Some(page) = &page {
            self.bucket.set_json(&key, &etag, page);
        }
        Ok(page)
    }
}

/// SHA-256 over the paths and contents of a File Set.
fn file_set_etag(files: &[GitHubFile]) -> String {
    let mut hasher = Sha256::new();
    for file in files {
        hasher.update(file.path.as_bytes());
        hasher.update([0]);
        hasher.update(file.content.as_bytes());
        hasher.update([0]);
    }
    hex::encode(hasher.finalize())
}

fn page_date(page: &CompiledPage) -> Option<NaiveDateTime> {
    parse_date(page.frontmatter.date.as_deref()?)
}

/// Parse an RFC 3339 timestamp, a `YYYY-MM-DDTHH:MM:SS` local time or a
/// plain `YYYY-MM-DD` date.
fn parse_date(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt);
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

/// Descending by date, undated last.
fn newest_first(a: Option<NaiveDateTime>, b: Option<NaiveDateTime>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
