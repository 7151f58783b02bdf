//! Content repository access for Folio.
//!
//! This crate provides a [`ContentSource`] trait for listing and downloading
//! files from the content repository. Paths follow the repository layout:
//!
//! - `content/blog` - a content area
//! - `content/blog/hello-world` - one content unit (a directory with
//!   `index.mdx` and co-located assets, or a single `hello-world.mdx` file)
//!
//! # Architecture
//!
//! The crate provides:
//! - [`ContentSource`] trait with `list_dir()` and `download()` methods
//! - [`FsContentSource`] reading a local checkout of the repository
//! - [`MockContentSource`] for testing (behind `mock` feature flag)

mod fs;
#[cfg(feature = "mock")]
mod mock;
mod source;

pub use fs::FsContentSource;
#[cfg(feature = "mock")]
pub use mock::MockContentSource;
pub use source::{
    ContentError, ContentErrorKind, ContentSource, DirEntry, EntryKind, ErrorStatus, GitHubFile,
};
