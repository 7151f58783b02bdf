//! Embedding of standalone links.
//!
//! A paragraph that consists of nothing but a URL is offered to a list of
//! [`EmbedTransformer`] providers. The first provider that accepts the URL
//! replaces the paragraph with its HTML. Providers are checked in order.

use std::sync::{Arc, LazyLock};

use pulldown_cmark::{CowStr, Event, Tag, TagEnd};
use regex::Regex;
use url::Url;

use super::MarkdownTransform;
use crate::error::EmbedError;
use crate::tree::escape_html;

static YOUTUBE_HOST: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"youtu\.?be").expect("invalid youtube host regex"));

/// Provider turning a URL into embeddable HTML.
pub trait EmbedTransformer: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Whether this provider handles `url`.
    fn should_transform(&self, url: &Url) -> bool;

    /// Produce the embed HTML, or `None` to leave the link as it is.
    ///
    /// # Errors
    ///
    /// Returns [`EmbedError`] when the provider cannot be reached or answers
    /// with something unusable.
    fn get_html(&self, url: &Url) -> Result<Option<String>, EmbedError>;
}

/// Markdown pass replacing standalone links with provider embeds.
#[derive(Clone, Default)]
pub struct LinkEmbedder {
    providers: Vec<Arc<dyn EmbedTransformer>>,
}

impl LinkEmbedder {
    /// Create an embedder trying `providers` in order.
    #[must_use]
    pub fn new(providers: Vec<Arc<dyn EmbedTransformer>>) -> Self {
        Self { providers }
    }

    /// Append a provider.
    #[must_use]
    pub fn with_provider(mut self, provider: impl EmbedTransformer + 'static) -> Self {
        self.providers.push(Arc::new(provider));
        self
    }

    /// Embed HTML for a candidate URL, or `None` to keep the paragraph.
    fn embed(&self, raw: &str) -> Option<String> {
        let url = Url::parse(raw).ok()?;
        let provider = self.providers.iter().find(|p| p.should_transform(&url))?;

        match provider.get_html(&url) {
            Ok(Some(html)) => Some(wrap_embed(&url, html)),
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(url = raw, provider = provider.name(), error = %e, "failed to embed link");
                Some(error_html(raw))
            }
        }
    }
}

impl MarkdownTransform for LinkEmbedder {
    fn name(&self) -> &'static str {
        "link-embedder"
    }

    fn transform<'a>(&self, events: Vec<Event<'a>>) -> Vec<Event<'a>> {
        if self.providers.is_empty() {
            return events;
        }

        let mut out = Vec::with_capacity(events.len());
        let mut i = 0;
        while i < events.len() {
            if let Some((url, len)) = standalone_link(&events[i..])
                && let Some(html) = self.embed(&url)
            {
                out.push(Event::Html(CowStr::from(format!("{html}\n"))));
                i += len;
                continue;
            }
            out.push(events[i].clone());
            i += 1;
        }
        out
    }
}

/// Match a paragraph holding only a URL at the start of `events`.
///
/// Returns the URL and the number of events the paragraph spans.
fn standalone_link(events: &[Event<'_>]) -> Option<(String, usize)> {
    match events {
        [
            Event::Start(Tag::Paragraph),
            Event::Text(text),
            Event::End(TagEnd::Paragraph),
            ..,
        ] => {
            let text = text.trim();
            is_http_url(text).then(|| (text.to_owned(), 3))
        }
        [
            Event::Start(Tag::Paragraph),
            Event::Start(Tag::Link { dest_url, .. }),
            Event::Text(text),
            Event::End(TagEnd::Link),
            Event::End(TagEnd::Paragraph),
            ..,
        ] if **text == **dest_url && is_http_url(dest_url) => {
            Some((dest_url.to_string(), 5))
        }
        _ => None,
    }
}

fn is_http_url(text: &str) -> bool {
    (text.starts_with("http://") || text.starts_with("https://"))
        && !text.contains(char::is_whitespace)
}

/// Wrap provider HTML in a responsive container for known video hosts.
fn wrap_embed(url: &Url, html: String) -> String {
    let host = url.host_str().unwrap_or_default();
    let (embed_type, ratio) = if YOUTUBE_HOST.is_match(host) {
        ("youtube", "56.25%")
    } else if host.contains("codesandbox.io") {
        ("codesandbox", "80%")
    } else {
        return html;
    };
    format!(
        r#"<div class="embed" data-embed-type="{embed_type}"><div style="padding-bottom: {ratio}">{html}</div></div>"#
    )
}

fn error_html(url: &str) -> String {
    let url = escape_html(url, true);
    format!(r#"<p>Error embedding <a href="{url}">{url}</a>.</p>"#)
}
