//! Cloudinary image URL normalization.
//!
//! Images hosted on Cloudinary without delivery transforms are rewritten to
//! request automatic format, automatic quality and 2x density:
//!
//! ```text
//! https://res.cloudinary.com/demo/image/upload/v123/sample.jpg
//! -> https://res.cloudinary.com/demo/image/upload/f_auto,q_auto,dpr_2.0/v123/sample.jpg
//! ```
//!
//! URLs that already carry transforms, and URLs on other hosts, are left as is.

use pulldown_cmark::{CowStr, Event, Tag};

use super::MarkdownTransform;

const DEFAULT_TRANSFORMS: &str = "f_auto,q_auto,dpr_2.0";

/// Markdown pass adding default delivery transforms to Cloudinary images.
#[derive(Debug, Clone, Copy, Default)]
pub struct CloudinaryImages;

impl MarkdownTransform for CloudinaryImages {
    fn name(&self) -> &'static str {
        "cloudinary-images"
    }

    fn transform<'a>(&self, events: Vec<Event<'a>>) -> Vec<Event<'a>> {
        events
            .into_iter()
            .map(|event| match event {
                Event::Start(Tag::Image {
                    link_type,
                    dest_url,
                    title,
                    id,
                }) => {
                    let dest_url = match rewrite_url(&dest_url) {
                        Some(url) => CowStr::from(url),
                        None => dest_url,
                    };
                    Event::Start(Tag::Image {
                        link_type,
                        dest_url,
                        title,
                        id,
                    })
                }
                other => other,
            })
            .collect()
    }
}

/// Parts of an upload URL.
#[derive(Debug, PartialEq, Eq)]
struct UploadUrl<'a> {
    cloud_name: &'a str,
    transforms: Option<&'a str>,
    version: Option<&'a str>,
    public_id: &'a str,
}

/// Return the rewritten URL, or `None` when it should stay unchanged.
fn rewrite_url(url: &str) -> Option<String> {
    if url.is_empty() {
        tracing::error!("image with empty URL");
        return None;
    }

    let parts = parse_upload_url(url)?;
    if parts.transforms.is_some() {
        return None;
    }

    let mut out = format!(
        "https://res.cloudinary.com/{}/image/upload/{DEFAULT_TRANSFORMS}",
        parts.cloud_name
    );
    if let Some(version) = parts.version {
        out.push('/');
        out.push_str(version);
    }
    out.push('/');
    out.push_str(parts.public_id);
    Some(out)
}

/// Parse `http(s)://res.cloudinary.com/{cloud}/image/upload[/transforms][/version]/{public_id}`.
fn parse_upload_url(url: &str) -> Option<UploadUrl<'_>> {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))?
        .strip_prefix("res.cloudinary.com/")?;

    let (cloud_name, after) = rest.split_once("/image/upload/")?;
    if cloud_name.is_empty() || cloud_name.contains('/') || after.is_empty() {
        return None;
    }

    let Some((first, remainder)) = after.split_once('/') else {
        return Some(UploadUrl {
            cloud_name,
            transforms: None,
            version: None,
            public_id: after,
        });
    };

    if remainder.is_empty() {
        // Nothing follows the first segment, so it is the public id.
        return Some(UploadUrl {
            cloud_name,
            transforms: None,
            version: None,
            public_id: after,
        });
    }

    if starts_with_version(first) {
        let version = is_version(first).then_some(first);
        let public_id = if version.is_some() { remainder } else { after };
        return Some(UploadUrl {
            cloud_name,
            transforms: None,
            version,
            public_id,
        });
    }

    Some(UploadUrl {
        cloud_name,
        transforms: Some(first),
        version: None,
        public_id: remainder,
    })
}

/// `v` followed by a digit: never a transforms segment.
fn starts_with_version(segment: &str) -> bool {
    let mut chars = segment.chars();
    chars.next() == Some('v') && chars.next().is_some_and(|c| c.is_ascii_digit())
}

fn is_version(segment: &str) -> bool {
    segment
        .strip_prefix('v')
        .is_some_and(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
}
