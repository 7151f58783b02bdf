//! Rendered element tree.
//!
//! A small hast-like tree of elements, text and comments. Rendered HTML is
//! parsed leniently: void elements never take children, unmatched end tags
//! are ignored and unclosed elements are closed at the end of input. Text
//! nodes count as children, so positional checks see whitespace between
//! elements the same way a browser DOM does.

use std::fmt::Write;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::entities::{decode_entities, decode_entity, escape_dangling_amps};

/// Elements that never have content.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Elements whose text content is written without escaping.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

fn is_void(tag: &str) -> bool {
    VOID_ELEMENTS.iter().any(|v| v.eq_ignore_ascii_case(tag))
}

fn is_raw_text(tag: &str) -> bool {
    RAW_TEXT_ELEMENTS.iter().any(|v| v.eq_ignore_ascii_case(tag))
}

/// Node of the element tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Element with tag, attributes and children.
    Element(Element),
    /// Decoded text.
    Text(String),
    /// Comment body.
    Comment(String),
}

impl Node {
    /// Create a text node.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Borrow as element, if this is one.
    #[must_use]
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Self::Element(el) => Some(el),
            _ => None,
        }
    }

    /// Whether this is an element with the given tag.
    #[must_use]
    pub fn is_element(&self, tag: &str) -> bool {
        self.as_element().is_some_and(|el| el.tag == tag)
    }
}

impl From<Element> for Node {
    fn from(el: Element) -> Self {
        Self::Element(el)
    }
}

/// Element node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    /// Tag name, case preserved.
    pub tag: String,
    /// Attributes in source order.
    pub attrs: Vec<(String, String)>,
    /// Child nodes.
    pub children: Vec<Node>,
}

impl Element {
    /// Create an element with no attributes or children.
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    /// Add an attribute.
    #[must_use]
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.push((name.into(), value.into()));
        self
    }

    /// Append children.
    #[must_use]
    pub fn with_children(mut self, children: impl IntoIterator<Item = Node>) -> Self {
        self.children.extend(children);
        self
    }

    /// Look up an attribute value.
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Top-level sequence of nodes produced from an HTML fragment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fragment {
    /// Top-level nodes.
    pub children: Vec<Node>,
}

impl Fragment {
    /// Parse an HTML fragment.
    ///
    /// # Errors
    ///
    /// Returns an error if the markup cannot be tokenized (e.g. an unterminated tag).
    pub fn parse(html: &str) -> Result<Self, quick_xml::Error> {
        let html = escape_dangling_amps(html);
        let mut reader = Reader::from_str(&html);
        reader.config_mut().trim_text(false);
        reader.config_mut().enable_all_checks(false);
        reader.config_mut().allow_unmatched_ends = true;

        let mut stack = vec![Element::default()];

        loop {
            match reader.read_event()? {
                Event::Start(e) => {
                    let el = decode_element(&reader, &e)?;
                    if is_void(&el.tag) {
                        push_child(&mut stack, Node::Element(el));
                    } else {
                        stack.push(el);
                    }
                }
                Event::Empty(e) => {
                    let el = decode_element(&reader, &e)?;
                    push_child(&mut stack, Node::Element(el));
                }
                Event::End(e) => {
                    let qname = e.name();
                    let name = reader.decoder().decode(qname.as_ref())?;
                    close_element(&mut stack, &name);
                }
                Event::Text(e) => {
                    let text = reader.decoder().decode(&e)?;
                    push_text(&mut stack, &text);
                }
                Event::GeneralRef(e) => {
                    let entity = reader.decoder().decode(&e)?;
                    match decode_entity(&entity) {
                        Some(text) => push_text(&mut stack, &text),
                        None => push_text(&mut stack, &format!("&{entity};")),
                    }
                }
                Event::CData(e) => {
                    push_text(&mut stack, &String::from_utf8_lossy(&e));
                }
                Event::Comment(e) => {
                    let body = reader.decoder().decode(&e)?.into_owned();
                    push_child(&mut stack, Node::Comment(body));
                }
                Event::Eof => break,
                Event::Decl(_) | Event::PI(_) | Event::DocType(_) => {}
            }
        }

        while stack.len() > 1 {
            pop_into_parent(&mut stack);
        }
        let root = stack.pop().unwrap_or_default();
        Ok(Self {
            children: root.children,
        })
    }

    /// Serialize back to HTML.
    #[must_use]
    pub fn to_html(&self) -> String {
        let mut out = String::with_capacity(4096);
        for node in &self.children {
            write_node(node, false, &mut out);
        }
        out
    }
}

fn decode_element(
    reader: &Reader<&[u8]>,
    e: &BytesStart<'_>,
) -> Result<Element, quick_xml::Error> {
    let tag = reader.decoder().decode(e.name().as_ref())?.into_owned();
    let mut attrs = Vec::new();
    for attr in e.html_attributes().flatten() {
        let key = reader.decoder().decode(attr.key.as_ref())?.into_owned();
        let raw = String::from_utf8_lossy(&attr.value);
        attrs.push((key, decode_entities(&raw).into_owned()));
    }
    Ok(Element {
        tag,
        attrs,
        children: Vec::new(),
    })
}

fn push_child(stack: &mut [Element], node: Node) {
    if let Some(top) = stack.last_mut() {
        top.children.push(node);
    }
}

/// Append text, merging with a preceding text node.
fn push_text(stack: &mut [Element], text: &str) {
    if text.is_empty() {
        return;
    }
    let Some(top) = stack.last_mut() else {
        return;
    };
    if let Some(Node::Text(last)) = top.children.last_mut() {
        last.push_str(text);
    } else {
        top.children.push(Node::Text(text.to_owned()));
    }
}

fn pop_into_parent(stack: &mut Vec<Element>) {
    if let Some(el) = stack.pop() {
        push_child(stack, Node::Element(el));
    }
}

/// Close the nearest open element named `name`, closing anything opened inside it.
fn close_element(stack: &mut Vec<Element>, name: &str) {
    let Some(pos) = stack.iter().skip(1).rposition(|el| el.tag == name) else {
        return;
    };
    let target = pos + 1;
    while stack.len() > target {
        pop_into_parent(stack);
    }
}

fn write_node(node: &Node, raw_text: bool, out: &mut String) {
    match node {
        Node::Text(text) if raw_text => out.push_str(text),
        Node::Text(text) => out.push_str(&escape_html(text, false)),
        Node::Comment(body) => {
            let _ = write!(out, "<!--{body}-->");
        }
        Node::Element(el) => {
            out.push('<');
            out.push_str(&el.tag);
            for (key, value) in &el.attrs {
                let _ = write!(out, r#" {key}="{}""#, escape_html(value, true));
            }
            if is_void(&el.tag) {
                out.push_str(" />");
                return;
            }
            out.push('>');
            let raw = is_raw_text(&el.tag);
            for child in &el.children {
                write_node(child, raw, out);
            }
            let _ = write!(out, "</{}>", el.tag);
        }
    }
}

/// Escape HTML special characters.
pub(crate) fn escape_html(text: &str, escape_quotes: bool) -> String {
    let mut result = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' if escape_quotes => result.push_str("&quot;"),
            _ => result.push(ch),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_parse_nested_elements() {
        let fragment = Fragment::parse("<p><strong>Bold</strong> text</p>").unwrap();

        let expected = Element::new("p").with_children([
            Element::new("strong")
                .with_children([Node::text("Bold")])
                .into(),
            Node::text(" text"),
        ]);
        assert_eq!(fragment.children, vec![Node::Element(expected)]);
    }

    #[test]
    fn test_whitespace_text_counts_as_child() {
        let fragment = Fragment::parse("<div>\n<pre>x</pre>\n</div>").unwrap();

        let div = fragment.children[0].as_element().unwrap();
        assert_eq!(div.children.len(), 3);
        assert!(div.children[1].is_element("pre"));
    }

    #[test]
    fn test_void_elements_take_no_children() {
        let fragment = Fragment::parse("<p>a<br>b<img src=\"x.png\" alt=\"\">c</p>").unwrap();

        let p = fragment.children[0].as_element().unwrap();
        assert_eq!(p.children.len(), 5);
        assert_eq!(fragment.to_html(), "<p>a<br />b<img src=\"x.png\" alt=\"\" />c</p>");
    }

    #[test]
    fn test_entities_round_trip() {
        let html = "<p>a &lt; b &amp;&amp; c&nbsp;d</p>";
        let fragment = Fragment::parse(html).unwrap();

        let p = fragment.children[0].as_element().unwrap();
        assert_eq!(p.children, vec![Node::text("a < b && c\u{a0}d")]);
        assert_eq!(fragment.to_html(), "<p>a &lt; b &amp;&amp; c\u{a0}d</p>");
    }

    #[test]
    fn test_dangling_ampersand_in_attribute() {
        let fragment = Fragment::parse(r#"<a href="/s?a=1&b=2">link</a>"#).unwrap();

        let a = fragment.children[0].as_element().unwrap();
        assert_eq!(a.attr("href"), Some("/s?a=1&b=2"));
        assert_eq!(fragment.to_html(), r#"<a href="/s?a=1&amp;b=2">link</a>"#);
    }

    #[test]
    fn test_boolean_attribute() {
        let fragment = Fragment::parse("<input disabled type=\"checkbox\"/>").unwrap();

        let input = fragment.children[0].as_element().unwrap();
        assert_eq!(input.attr("disabled"), Some(""));
        assert_eq!(input.attr("type"), Some("checkbox"));
    }

    #[test]
    fn test_unclosed_elements_closed_at_end() {
        let fragment = Fragment::parse("<div><p>open").unwrap();

        assert_eq!(fragment.to_html(), "<div><p>open</p></div>");
    }

    #[test]
    fn test_unmatched_end_tag_ignored() {
        let fragment = Fragment::parse("<p>text</span></p>").unwrap();

        assert_eq!(fragment.to_html(), "<p>text</p>");
    }

    #[test]
    fn test_component_tag_case_preserved() {
        let fragment = Fragment::parse("<Demo />\n").unwrap();

        assert!(fragment.children[0].is_element("Demo"));
    }

    #[test]
    fn test_comment_preserved() {
        let fragment = Fragment::parse("<!-- note --><p>x</p>").unwrap();

        assert_eq!(fragment.to_html(), "<!-- note --><p>x</p>");
    }

    #[test]
    fn test_empty_non_void_element_is_not_self_closed() {
        let fragment = Fragment::parse("<div class=\"embed\"/>").unwrap();

        assert_eq!(fragment.to_html(), "<div class=\"embed\"></div>");
    }
}
