//! YAML front matter.
//!
//! Front matter is an optional YAML block fenced by `---` lines at the very
//! top of a document. Well-known fields are lifted into typed fields when
//! they have the expected shape; everything else, including a well-known
//! field of the wrong shape, lands in [`Frontmatter::extra`].

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::BundleError;

/// Raw front matter mapping.
type Fields = serde_json::Map<String, serde_json::Value>;

/// Parsed front matter of a page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "Fields")]
pub struct Frontmatter {
    /// Page title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Short description used for listings and meta tags.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Publication date (`YYYY-MM-DD` or RFC 3339).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// Banner image URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub banner_url: Option<String>,
    /// Banner image credit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub banner_credit: Option<String>,
    /// Banner image alt text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub banner_alt: Option<String>,
    /// Categories the page belongs to.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<String>,
    /// Translations of the page.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub translations: Vec<Translation>,
    /// Extra meta tags.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<MetaFields>,
    /// Any other fields.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Translation of a page into another language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Translation {
    /// Language name.
    pub language: String,
    /// Link to the translated page.
    pub link: String,
    /// Translator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<TranslationAuthor>,
}

/// Author of a translation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationAuthor {
    /// Display name.
    pub name: String,
    /// Link to the author.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

/// The `meta` block of front matter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Fields")]
pub struct MetaFields {
    /// Keywords meta tag.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
    /// Other meta tags.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl From<Fields> for Frontmatter {
    fn from(mut fields: Fields) -> Self {
        Self {
            title: lift(&mut fields, "title"),
            description: lift(&mut fields, "description"),
            date: lift(&mut fields, "date"),
            banner_url: lift(&mut fields, "bannerUrl"),
            banner_credit: lift(&mut fields, "bannerCredit"),
            banner_alt: lift(&mut fields, "bannerAlt"),
            categories: lift(&mut fields, "categories").unwrap_or_default(),
            translations: lift(&mut fields, "translations").unwrap_or_default(),
            meta: lift(&mut fields, "meta"),
            extra: fields.into_iter().collect(),
        }
    }
}

impl From<Fields> for MetaFields {
    fn from(mut fields: Fields) -> Self {
        Self {
            keywords: lift(&mut fields, "keywords").unwrap_or_default(),
            extra: fields.into_iter().collect(),
        }
    }
}

/// Take `key` out of `fields` if it deserializes as `T`.
///
/// A null value is taken and yields `None`. A value of another shape is left
/// in place.
fn lift<T: DeserializeOwned>(fields: &mut Fields, key: &str) -> Option<T> {
    let parsed = Option::<T>::deserialize(fields.get(key)?);
    match parsed {
        Ok(value) => {
            fields.remove(key);
            value
        }
        Err(err) => {
            tracing::debug!(field = key, error = %err, "front matter field kept untyped");
            None
        }
    }
}

/// Split `source` into its front matter block (if any) and the body.
#[must_use]
pub fn split_frontmatter(source: &str) -> (Option<&str>, &str) {
    let source = source.strip_prefix('\u{feff}').unwrap_or(source);
    let Some(rest) = source
        .strip_prefix("---\n")
        .or_else(|| source.strip_prefix("---\r\n"))
    else {
        return (None, source);
    };

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "---" {
            let yaml = &rest[..offset];
            let body = &rest[offset + line.len()..];
            return (Some(yaml), body);
        }
        offset += line.len();
    }

    // Unterminated fence: treat the whole document as body.
    (None, source)
}

/// Parse a front matter block.
///
/// An empty block (or one holding only comments) yields the default.
///
/// # Errors
///
/// Returns [`BundleError::FrontMatter`] for malformed YAML or a block that is
/// not a mapping.
pub fn parse_frontmatter(yaml: &str) -> Result<Frontmatter, BundleError> {
    let is_empty = yaml
        .lines()
        .all(|line| line.trim().is_empty() || line.trim_start().starts_with('#'));
    if is_empty {
        return Ok(Frontmatter::default());
    }
    Ok(serde_yaml::from_str(yaml)?)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_split_frontmatter() {
        let source = "---\ntitle: Hello\n---\n# Body\n";
        let (yaml, body) = split_frontmatter(source);

        assert_eq!(yaml, Some("title: Hello\n"));
        assert_eq!(body, "# Body\n");
    }

    #[test]
    fn test_split_without_frontmatter() {
        let (yaml, body) = split_frontmatter("# Body\n");

        assert_eq!(yaml, None);
        assert_eq!(body, "# Body\n");
    }

    #[test]
    fn test_split_unterminated_fence() {
        let source = "---\ntitle: Hello\n";
        let (yaml, body) = split_frontmatter(source);

        assert_eq!(yaml, None);
        assert_eq!(body, source);
    }

    #[test]
    fn test_parse_known_and_extra_fields() {
        let yaml = r"
title: Hello
date: 2024-02-01
categories: [rust, web]
bannerUrl: https://res.cloudinary.com/demo/image/upload/v1/banner.jpg
translations:
  - language: Deutsch
    link: https://example.de/hallo
    author:
      name: Anna
meta:
  keywords: [a, b]
  twitterCard: summary
draft: true
";
        let fm = parse_frontmatter(yaml).unwrap();

        assert_eq!(fm.title.as_deref(), Some("Hello"));
        assert_eq!(fm.date.as_deref(), Some("2024-02-01"));
        assert_eq!(fm.categories, vec!["rust".to_owned(), "web".to_owned()]);
        assert_eq!(fm.translations[0].author.as_ref().unwrap().name, "Anna");
        let meta = fm.meta.unwrap();
        assert_eq!(meta.keywords, vec!["a".to_owned(), "b".to_owned()]);
        assert_eq!(meta.extra["twitterCard"], serde_json::json!("summary"));
        assert_eq!(fm.extra["draft"], serde_json::json!(true));
    }

    #[test]
    fn test_parse_empty_block() {
        assert_eq!(parse_frontmatter("").unwrap(), Frontmatter::default());
        assert_eq!(parse_frontmatter("# only a comment\n").unwrap(), Frontmatter::default());
    }

    #[test]
    fn test_parse_malformed_yaml() {
        let err = parse_frontmatter("title: [unclosed\n").unwrap_err();

        assert!(matches!(err, BundleError::FrontMatter(_)));
    }

    #[test]
    fn test_mistyped_field_kept_as_extra() {
        let fm = parse_frontmatter("title: Hello\ncategories: react\n").unwrap();

        assert_eq!(fm.title.as_deref(), Some("Hello"));
        assert!(fm.categories.is_empty());
        assert_eq!(fm.extra["categories"], serde_json::json!("react"));
    }

    #[test]
    fn test_incomplete_translation_kept_as_extra() {
        let fm = parse_frontmatter("translations:\n  - language: fr\n").unwrap();

        assert!(fm.translations.is_empty());
        assert_eq!(
            fm.extra["translations"],
            serde_json::json!([{"language": "fr"}])
        );
    }

    #[test]
    fn test_loose_meta_keywords() {
        let fm = parse_frontmatter("meta:\n  keywords: rust, web\n  author: Anna\n").unwrap();

        let meta = fm.meta.unwrap();
        assert!(meta.keywords.is_empty());
        assert_eq!(meta.extra["keywords"], serde_json::json!("rust, web"));
        assert_eq!(meta.extra["author"], serde_json::json!("Anna"));
    }

    #[test]
    fn test_null_field_is_absent() {
        let fm = parse_frontmatter("title:\ndescription: Text\n").unwrap();

        assert_eq!(fm.title, None);
        assert_eq!(fm.description.as_deref(), Some("Text"));
        assert!(fm.extra.is_empty());
    }

    #[test]
    fn test_non_mapping_block_is_error() {
        let err = parse_frontmatter("just a sentence\n").unwrap_err();

        assert!(matches!(err, BundleError::FrontMatter(_)));
    }

    #[test]
    fn test_json_round_trip_keeps_loose_fields() {
        let fm = parse_frontmatter("title: Hello\ncategories: react\n").unwrap();

        let json = serde_json::to_string(&fm).unwrap();
        let back: Frontmatter = serde_json::from_str(&json).unwrap();

        assert_eq!(back, fm);
    }

    #[test]
    fn test_serializes_camel_case() {
        let fm = Frontmatter {
            title: Some("T".to_owned()),
            banner_alt: Some("alt".to_owned()),
            ..Default::default()
        };

        let json = serde_json::to_value(&fm).unwrap();
        assert_eq!(json, serde_json::json!({"title": "T", "bannerAlt": "alt"}));
    }
}
