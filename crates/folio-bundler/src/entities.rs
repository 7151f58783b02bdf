//! HTML entity decoding.
//!
//! Rendered markdown only produces the XML entities and numeric references,
//! but raw HTML written by authors may use any of the common named ones.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

/// A complete entity reference at the start of a string.
static ENTITY_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^&(#[0-9]+|#[xX][0-9a-fA-F]+|[A-Za-z][A-Za-z0-9]*);")
        .expect("invalid entity prefix regex")
});

/// Any entity reference.
static ENTITY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(#[0-9]+|#[xX][0-9a-fA-F]+|[A-Za-z][A-Za-z0-9]*);")
        .expect("invalid entity regex")
});

/// Escape `&` characters that do not start an entity reference.
pub(crate) fn escape_dangling_amps(html: &str) -> Cow<'_, str> {
    if !html.contains('&') {
        return Cow::Borrowed(html);
    }

    let mut out = String::with_capacity(html.len() + 16);
    let mut last = 0;
    for (i, _) in html.match_indices('&') {
        out.push_str(&html[last..i]);
        if ENTITY_PREFIX.is_match(&html[i..]) {
            out.push('&');
        } else {
            out.push_str("&amp;");
        }
        last = i + 1;
    }
    out.push_str(&html[last..]);
    Cow::Owned(out)
}

/// Decode every entity reference in `text`; unknown entities are kept verbatim.
pub(crate) fn decode_entities(text: &str) -> Cow<'_, str> {
    if !text.contains('&') {
        return Cow::Borrowed(text);
    }
    ENTITY_PATTERN.replace_all(text, |caps: &regex::Captures| {
        decode_entity(&caps[1]).unwrap_or_else(|| caps[0].to_owned())
    })
}

/// Decode a single entity name (without `&` and `;`).
pub(crate) fn decode_entity(entity: &str) -> Option<String> {
    if let Some(num) = entity.strip_prefix('#') {
        let code = if let Some(hex) = num.strip_prefix(['x', 'X']) {
            u32::from_str_radix(hex, 16).ok()
        } else {
            num.parse::<u32>().ok()
        };
        return code.and_then(char::from_u32).map(String::from);
    }
    named_entity(entity).map(String::from)
}

fn named_entity(name: &str) -> Option<&'static str> {
    Some(match name {
        "lt" => "<",
        "gt" => ">",
        "amp" => "&",
        "apos" => "'",
        "quot" => "\"",
        "nbsp" => "\u{00a0}",
        "mdash" => "\u{2014}",
        "ndash" => "\u{2013}",
        "ldquo" => "\u{201c}",
        "rdquo" => "\u{201d}",
        "lsquo" => "\u{2018}",
        "rsquo" => "\u{2019}",
        "bull" => "\u{2022}",
        "hellip" => "\u{2026}",
        "rarr" => "\u{2192}",
        "larr" => "\u{2190}",
        "times" => "\u{00d7}",
        "copy" => "\u{00a9}",
        "reg" => "\u{00ae}",
        "trade" => "\u{2122}",
        "euro" => "\u{20ac}",
        "deg" => "\u{00b0}",
        "middot" => "\u{00b7}",
        "laquo" => "\u{00ab}",
        "raquo" => "\u{00bb}",
        _ => return None,
    })
}
