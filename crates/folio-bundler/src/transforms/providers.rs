//! Embed providers.
//!
//! - [`OEmbedTransformer`] asks the content host for embed HTML over oEmbed
//! - [`CodeSandboxTransformer`] rewrites sandbox links to an iframe without
//!   any network access

use std::time::Duration;

use serde::Deserialize;
use ureq::Agent;
use url::Url;

use super::embed::EmbedTransformer;
use crate::error::EmbedError;
use crate::tree::escape_html;

/// Default HTTP timeout in seconds.
const DEFAULT_TIMEOUT: u64 = 10;

/// oEmbed endpoint for a set of hosts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OEmbedProvider {
    /// Provider name.
    pub name: &'static str,
    /// Hosts served by the provider (without `www.`).
    pub hosts: &'static [&'static str],
    /// oEmbed endpoint URL.
    pub endpoint: &'static str,
}

/// Providers known out of the box.
const BUILTIN_PROVIDERS: &[OEmbedProvider] = &[
    OEmbedProvider {
        name: "youtube",
        hosts: &["youtube.com", "youtu.be", "m.youtube.com"],
        endpoint: "https://www.youtube.com/oembed",
    },
    OEmbedProvider {
        name: "twitter",
        hosts: &["twitter.com", "x.com", "mobile.twitter.com"],
        endpoint: "https://publish.twitter.com/oembed",
    },
    OEmbedProvider {
        name: "vimeo",
        hosts: &["vimeo.com", "player.vimeo.com"],
        endpoint: "https://vimeo.com/api/oembed.json",
    },
];

#[derive(Deserialize)]
struct OEmbedResponse {
    html: Option<String>,
}

/// Embed provider performing oEmbed lookups.
pub struct OEmbedTransformer {
    agent: Agent,
    providers: Vec<OEmbedProvider>,
}

impl OEmbedTransformer {
    /// Create a transformer with the built-in provider table.
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build()
            .into();
        Self {
            agent,
            providers: BUILTIN_PROVIDERS.to_vec(),
        }
    }

    /// Replace the provider table.
    #[must_use]
    pub fn with_providers(mut self, providers: Vec<OEmbedProvider>) -> Self {
        self.providers = providers;
        self
    }

    fn provider_for(&self, url: &Url) -> Option<&OEmbedProvider> {
        let host = url.host_str()?;
        let host = host.strip_prefix("www.").unwrap_or(host);
        self.providers.iter().find(|p| p.hosts.contains(&host))
    }
}

impl Default for OEmbedTransformer {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEFAULT_TIMEOUT))
    }
}

impl EmbedTransformer for OEmbedTransformer {
    fn name(&self) -> &'static str {
        "oembed"
    }

    fn should_transform(&self, url: &Url) -> bool {
        self.provider_for(url).is_some()
    }

    fn get_html(&self, url: &Url) -> Result<Option<String>, EmbedError> {
        let Some(provider) = self.provider_for(url) else {
            return Ok(None);
        };
        let request_url = oembed_request_url(provider, url)?;

        tracing::debug!(provider = provider.name, url = %url, "requesting oEmbed");
        let response = self
            .agent
            .get(request_url.as_str())
            .header("Accept", "application/json")
            .call()?;

        let status = response.status().as_u16();
        if status >= 400 {
            return Err(EmbedError::HttpResponse { status });
        }

        let body: OEmbedResponse = response.into_body().read_json()?;
        Ok(body.html.filter(|html| !html.trim().is_empty()))
    }
}

/// Build `{endpoint}?url={url}&format=json`.
fn oembed_request_url(provider: &OEmbedProvider, url: &Url) -> Result<Url, EmbedError> {
    Url::parse_with_params(provider.endpoint, &[("url", url.as_str()), ("format", "json")])
        .map_err(|e| EmbedError::InvalidResponse(format!("bad endpoint {}: {e}", provider.endpoint)))
}

/// Embed provider for CodeSandbox links.
#[derive(Debug, Clone, Copy, Default)]
pub struct CodeSandboxTransformer;

impl EmbedTransformer for CodeSandboxTransformer {
    fn name(&self) -> &'static str {
        "codesandbox"
    }

    fn should_transform(&self, url: &Url) -> bool {
        url.host_str() == Some("codesandbox.io") && sandbox_id(url).is_some()
    }

    fn get_html(&self, url: &Url) -> Result<Option<String>, EmbedError> {
        let Some(id) = sandbox_id(url) else {
            return Ok(None);
        };
        let query = url.query().map(|q| format!("?{q}")).unwrap_or_default();
        let src = escape_html(&format!("https://codesandbox.io/embed/{id}{query}"), true);
        Ok(Some(format!(
            r#"<iframe src="{src}" style="width:100%; height:100%; border:0; border-radius: 4px; overflow:hidden;" allow="accelerometer; ambient-light-sensor; camera; encrypted-media; geolocation; gyroscope; hid; microphone; midi; payment; usb; vr; xr-spatial-tracking" sandbox="allow-forms allow-modals allow-popups allow-presentation allow-same-origin allow-scripts"></iframe>"#
        )))
    }
}

/// Sandbox id from `/s/{id}` or `/embed/{id}` paths.
fn sandbox_id(url: &Url) -> Option<&str> {
    let mut segments = url.path_segments()?;
    match segments.next()? {
        "s" | "embed" => segments.next().filter(|id| !id.is_empty()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_oembed_matches_known_hosts() {
        let oembed = OEmbedTransformer::default();

        assert!(oembed.should_transform(&url("https://www.youtube.com/watch?v=abc")));
        assert!(oembed.should_transform(&url("https://youtu.be/abc")));
        assert!(oembed.should_transform(&url("https://twitter.com/user/status/1")));
        assert!(!oembed.should_transform(&url("https://example.com/video")));
    }

    #[test]
    fn test_oembed_custom_providers() {
        let oembed = OEmbedTransformer::default().with_providers(vec![OEmbedProvider {
            name: "example",
            hosts: &["example.com"],
            endpoint: "https://example.com/oembed",
        }]);

        assert!(oembed.should_transform(&url("https://example.com/video")));
        assert!(!oembed.should_transform(&url("https://youtu.be/abc")));
    }

    #[test]
    fn test_oembed_request_url_encodes_target() {
        let provider = BUILTIN_PROVIDERS[0];

        let request = oembed_request_url(&provider, &url("https://youtu.be/abc?t=10")).unwrap();

        assert_eq!(
            request.as_str(),
            "https://www.youtube.com/oembed?url=https%3A%2F%2Fyoutu.be%2Fabc%3Ft%3D10&format=json"
        );
    }

    #[test]
    fn test_codesandbox_iframe() {
        let transformer = CodeSandboxTransformer;
        let link = url("https://codesandbox.io/s/react-demo?file=/src/App.js");

        assert!(transformer.should_transform(&link));
        let html = transformer.get_html(&link).unwrap().unwrap();
        assert!(html.starts_with(
            r#"<iframe src="https://codesandbox.io/embed/react-demo?file=/src/App.js""#
        ));
    }

    #[test]
    fn test_codesandbox_ignores_other_paths() {
        let transformer = CodeSandboxTransformer;

        assert!(!transformer.should_transform(&url("https://codesandbox.io/dashboard")));
        assert!(!transformer.should_transform(&url("https://example.com/s/demo")));
    }
}
