//! Inlining of imported components.

use std::collections::HashMap;

use crate::transforms::HtmlTransform;
use crate::tree::{Fragment, Node};

/// HTML pass replacing `<Name />` elements with the imported component's nodes.
///
/// Children written inside a component tag are dropped along with the tag.
#[derive(Debug, Default)]
pub(crate) struct InlineComponents {
    components: HashMap<String, Fragment>,
}

impl InlineComponents {
    pub(crate) fn new(components: HashMap<String, Fragment>) -> Self {
        Self { components }
    }

    fn inline(&self, nodes: Vec<Node>) -> Vec<Node> {
        let mut out = Vec::with_capacity(nodes.len());
        for node in nodes {
            match node {
                Node::Element(mut el) => {
                    if let Some(component) = self.components.get(&el.tag) {
                        out.extend(component.children.iter().cloned());
                    } else {
                        el.children = self.inline(std::mem::take(&mut el.children));
                        out.push(Node::Element(el));
                    }
                }
                other => out.push(other),
            }
        }
        out
    }
}

impl HtmlTransform for InlineComponents {
    fn name(&self) -> &'static str {
        "inline-components"
    }

    fn transform(&self, fragment: &mut Fragment) {
        if self.components.is_empty() {
            return;
        }
        fragment.children = self.inline(std::mem::take(&mut fragment.children));
    }
}
