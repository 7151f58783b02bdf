//! Compiled page records.

use std::collections::BTreeMap;

use folio_bundler::Frontmatter;
use serde::{Deserialize, Serialize};

use crate::reading_time::ReadTime;

/// Title used when a page does not exist.
pub const NOT_FOUND_TITLE: &str = "Not found";

/// Description used when a page does not exist.
pub const NOT_FOUND_DESCRIPTION: &str =
    "You landed on a page that Kody the Coding Koala could not find 🐨😢";

/// A compiled content unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompiledPage {
    /// Compiled HTML fragment.
    pub code: String,
    /// Parsed front matter.
    pub frontmatter: Frontmatter,
    /// Reading-time estimate of the entry document.
    pub read_time: Option<ReadTime>,
    /// Slug within its content area.
    pub slug: String,
}

/// A compiled page without its code, for listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageListItem {
    /// Parsed front matter.
    pub frontmatter: Frontmatter,
    /// Reading-time estimate of the entry document.
    pub read_time: Option<ReadTime>,
    /// Slug within its content area.
    pub slug: String,
}

impl From<CompiledPage> for PageListItem {
    fn from(page: CompiledPage) -> Self {
        Self {
            frontmatter: page.frontmatter,
            read_time: page.read_time,
            slug: page.slug,
        }
    }
}

/// Document head metadata for a page view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageMeta {
    /// Page title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Page description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Extra meta tags from the front matter `meta` block.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Head metadata for a page, or the "not found" defaults when it is absent.
#[must_use]
pub fn page_meta(page: Option<&CompiledPage>) -> PageMeta {
    let Some(page) = page else {
        return PageMeta {
            title: Some(NOT_FOUND_TITLE.to_owned()),
            description: Some(NOT_FOUND_DESCRIPTION.to_owned()),
            extra: BTreeMap::new(),
        };
    };

    let fm = &page.frontmatter;
    let mut extra = BTreeMap::new();
    if let Some(meta) = &fm.meta {
        if !meta.keywords.is_empty() {
            extra.insert("keywords".to_owned(), serde_json::json!(meta.keywords));
        }
        extra.extend(meta.extra.iter().map(|(k, v)| (k.clone(), v.clone())));
    }

    PageMeta {
        title: fm.title.clone(),
        description: fm.description.clone(),
        extra,
    }
}

#[cfg(test)]
mod tests {
    use folio_bundler::MetaFields;
    use pretty_assertions::assert_eq;

    use super::*;

    fn page(frontmatter: Frontmatter) -> CompiledPage {
        CompiledPage {
            code: "<p>x</p>".to_owned(),
            frontmatter,
            read_time: None,
            slug: "hello".to_owned(),
        }
    }

    #[test]
    fn test_page_meta_not_found() {
        let meta = page_meta(None);

        assert_eq!(meta.title.as_deref(), Some("Not found"));
        assert_eq!(meta.description.as_deref(), Some(NOT_FOUND_DESCRIPTION));
    }

    #[test]
    fn test_page_meta_from_frontmatter() {
        let mut meta_extra = BTreeMap::new();
        meta_extra.insert("twitter:card".to_owned(), serde_json::json!("summary"));
        let page = page(Frontmatter {
            title: Some("Hello".to_owned()),
            description: Some("Greeting".to_owned()),
            meta: Some(MetaFields {
                keywords: vec!["rust".to_owned()],
                extra: meta_extra,
            }),
            ..Default::default()
        });

        let meta = page_meta(Some(&page));

        assert_eq!(
            serde_json::to_value(&meta).unwrap(),
            serde_json::json!({
                "title": "Hello",
                "description": "Greeting",
                "keywords": ["rust"],
                "twitter:card": "summary",
            })
        );
    }

    #[test]
    fn test_page_meta_missing_fields_degrade() {
        let meta = page_meta(Some(&page(Frontmatter::default())));

        assert_eq!(meta.title, None);
        assert!(meta.extra.is_empty());
    }

    #[test]
    fn test_list_item_drops_code() {
        let item = PageListItem::from(page(Frontmatter::default()));
        let json = serde_json::to_value(&item).unwrap();

        assert_eq!(json, serde_json::json!({"frontmatter": {}, "readTime": null, "slug": "hello"}));
    }

    #[test]
    fn test_compiled_page_serializes_camel_case() {
        let json = serde_json::to_value(page(Frontmatter::default())).unwrap();

        assert!(json.get("readTime").is_some());
        assert!(json.get("read_time").is_none());
    }
}
