//! MDX-style content compiler for Folio.
//!
//! Compiles markdown documents with YAML front matter and component imports
//! into self-contained HTML fragments.
//!
//! # Architecture
//!
//! - [`Bundler`] runs the pipeline for one document
//! - [`TransformSet`] carries the markdown and HTML passes for a compile
//! - [`Fragment`] is the rendered element tree HTML passes operate on
//!
//! # Example
//!
//! ```ignore
//! use std::collections::BTreeMap;
//! use folio_bundler::{Bundler, LinkEmbedder, PreUnwrapGuard, TransformSet};
//!
//! let transforms = TransformSet::standard(LinkEmbedder::default(), PreUnwrapGuard::Literal);
//! let bundle = Bundler::new().bundle("---\ntitle: Hi\n---\n# Hi\n", &BTreeMap::new(), &transforms)?;
//! assert_eq!(bundle.frontmatter.title.as_deref(), Some("Hi"));
//! ```

mod bundler;
mod components;
mod entities;
mod error;
mod frontmatter;
mod imports;
pub mod transforms;
mod tree;

pub use bundler::{Bundle, Bundler};
pub use error::{BundleError, EmbedError};
pub use frontmatter::{
    Frontmatter, MetaFields, Translation, TranslationAuthor, parse_frontmatter, split_frontmatter,
};
pub use transforms::{
    CloudinaryImages, CodeSandboxTransformer, EmbedTransformer, HtmlTransform, LinkEmbedder,
    MarkdownTransform, OEmbedProvider, OEmbedTransformer, PreUnwrapGuard, TransformSet,
    UnwrapPreContainers,
};
pub use tree::{Element, Fragment, Node};
