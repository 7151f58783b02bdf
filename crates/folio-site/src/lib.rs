//! Page assembly and cached content operations for Folio.
//!
//! This crate provides:
//! - [`assemble`]: Compile one content unit's File Set into a [`CompiledPage`]
//! - [`Library`]: Cached page, listing and blog-index operations
//! - [`reading_time`]: Reading-time estimate of a document
//! - [`page_meta`]: Document head metadata for a page view
//!
//! # Quick Start
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use std::path::PathBuf;
//! use std::sync::Arc;
//! use folio_bundler::{Bundler, TransformSet};
//! use folio_cache::NullCache;
//! use folio_content::FsContentSource;
//! use folio_site::{FetchOptions, Library, LibraryConfig};
//!
//! let source = Arc::new(FsContentSource::new(PathBuf::from("site")));
//! let library = Library::new(
//!     source,
//!     &NullCache,
//!     Bundler::new(),
//!     TransformSet::new(),
//!     LibraryConfig::default(),
//! );
//!
//! let page = library.page("blog", "hello", &FetchOptions::default())?;
//! let posts = library.blog_list_items(&FetchOptions::default())?;
//! # Ok(())
//! # }
//! ```

mod assemble;
mod keys;
mod library;
mod listing;
mod page;
mod reading_time;

pub use assemble::{AssembleError, assemble};
pub use keys::CacheKey;
pub use library::{
    BLOG_AREA, BatchFailurePolicy, FetchOptions, Library, LibraryConfig, LibraryError,
};
pub use listing::{DirListItem, area_dir, list_dir};
pub use page::{
    CompiledPage, NOT_FOUND_DESCRIPTION, NOT_FOUND_TITLE, PageListItem, PageMeta, page_meta,
};
pub use reading_time::{ReadTime, WORDS_PER_MINUTE, reading_time};
