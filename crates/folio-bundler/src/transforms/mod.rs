//! Transform passes applied during compilation.
//!
//! A [`TransformSet`] holds two ordered lists of passes:
//!
//! - [`MarkdownTransform`] passes rewrite the markdown event stream before
//!   HTML rendering
//! - [`HtmlTransform`] passes rewrite the rendered element tree
//!
//! The set is an immutable value: building one with the `with_*` methods
//! returns a new set, and clones share their passes.

mod embed;
mod images;
mod pre_unwrap;
mod providers;

use std::fmt;
use std::sync::Arc;

use pulldown_cmark::Event;

pub use embed::{EmbedTransformer, LinkEmbedder};
pub use images::CloudinaryImages;
pub use pre_unwrap::{PreUnwrapGuard, UnwrapPreContainers};
pub use providers::{CodeSandboxTransformer, OEmbedProvider, OEmbedTransformer};

use crate::tree::Fragment;

/// Pass over the markdown event stream.
pub trait MarkdownTransform: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Rewrite the events of one document.
    fn transform<'a>(&self, events: Vec<Event<'a>>) -> Vec<Event<'a>>;
}

/// Pass over the rendered element tree.
pub trait HtmlTransform: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Rewrite the tree of one document in place.
    fn transform(&self, fragment: &mut Fragment);
}

/// Ordered markdown and HTML passes used for a compile.
#[derive(Clone, Default)]
pub struct TransformSet {
    markdown: Vec<Arc<dyn MarkdownTransform>>,
    html: Vec<Arc<dyn HtmlTransform>>,
}

impl TransformSet {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The site's standard passes: image URL normalization, link embedding,
    /// then pre-container unwrapping.
    #[must_use]
    pub fn standard(embedder: LinkEmbedder, pre_unwrap: PreUnwrapGuard) -> Self {
        Self::new()
            .with_markdown(CloudinaryImages)
            .with_markdown(embedder)
            .with_html(UnwrapPreContainers::new(pre_unwrap))
    }

    /// Append a markdown pass.
    #[must_use]
    pub fn with_markdown(mut self, pass: impl MarkdownTransform + 'static) -> Self {
        self.markdown.push(Arc::new(pass));
        self
    }

    /// Append an HTML pass.
    #[must_use]
    pub fn with_html(mut self, pass: impl HtmlTransform + 'static) -> Self {
        self.html.push(Arc::new(pass));
        self
    }

    /// Append all passes of `other` after this set's passes.
    #[must_use]
    pub fn then(mut self, other: &Self) -> Self {
        self.markdown.extend(other.markdown.iter().map(Arc::clone));
        self.html.extend(other.html.iter().map(Arc::clone));
        self
    }

    /// Run the markdown passes in order.
    pub(crate) fn apply_markdown<'a>(&self, mut events: Vec<Event<'a>>) -> Vec<Event<'a>> {
        for pass in &self.markdown {
            events = pass.transform(events);
        }
        events
    }

    /// Run the HTML passes in order.
    pub(crate) fn apply_html(&self, fragment: &mut Fragment) {
        for pass in &self.html {
            pass.transform(fragment);
        }
    }

    /// Names of the markdown passes, in order.
    #[must_use]
    pub fn markdown_names(&self) -> Vec<&'static str> {
        self.markdown.iter().map(|p| p.name()).collect()
    }

    /// Names of the HTML passes, in order.
    #[must_use]
    pub fn html_names(&self) -> Vec<&'static str> {
        self.html.iter().map(|p| p.name()).collect()
    }
}

impl fmt::Debug for TransformSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformSet")
            .field("markdown", &self.markdown_names())
            .field("html", &self.html_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_standard_set_order() {
        let set = TransformSet::standard(LinkEmbedder::new(Vec::new()), PreUnwrapGuard::Literal);

        assert_eq!(set.markdown_names(), vec!["cloudinary-images", "link-embedder"]);
        assert_eq!(set.html_names(), vec!["unwrap-pre-containers"]);
    }

    #[test]
    fn test_then_appends_without_replacing() {
        let builtin = TransformSet::new().with_markdown(CloudinaryImages);
        let configured = TransformSet::new().with_html(UnwrapPreContainers::default());

        let combined = builtin.clone().then(&configured);

        assert_eq!(combined.markdown_names(), vec!["cloudinary-images"]);
        assert_eq!(combined.html_names(), vec!["unwrap-pre-containers"]);
        assert!(builtin.html_names().is_empty());
    }
}
