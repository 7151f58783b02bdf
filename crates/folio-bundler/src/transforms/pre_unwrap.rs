//! Unwrapping of `div` containers around code blocks.
//!
//! Some components wrap highlighted code in a `div`. When a `pre` element
//! sits inside a `div`, the `div` takes over the `pre`'s tag, attributes and
//! children, so the code block is no longer nested.

use super::HtmlTransform;
use crate::tree::{Element, Fragment, Node};

/// Which `pre` children qualify for unwrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PreUnwrapGuard {
    /// Skip only a `pre` that is the first of several children.
    #[default]
    Literal,
    /// Unwrap only when the `pre` is the container's only child.
    SoleChild,
}

impl PreUnwrapGuard {
    fn allows(self, index: usize, child_count: usize) -> bool {
        match self {
            Self::Literal => !(child_count != 1 && index == 0),
            Self::SoleChild => child_count == 1,
        }
    }
}

/// HTML pass replacing `div > pre` containers with the `pre` itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnwrapPreContainers {
    guard: PreUnwrapGuard,
}

impl UnwrapPreContainers {
    /// Create the pass with the given guard.
    #[must_use]
    pub fn new(guard: PreUnwrapGuard) -> Self {
        Self { guard }
    }

    fn visit(&self, nodes: &mut [Node]) {
        for node in nodes {
            if let Node::Element(el) = node {
                self.unwrap_container(el);
                self.visit(&mut el.children);
            }
        }
    }

    fn unwrap_container(&self, el: &mut Element) {
        if el.tag != "div" {
            return;
        }
        let count = el.children.len();
        let Some(index) = el
            .children
            .iter()
            .enumerate()
            .position(|(i, child)| child.is_element("pre") && self.guard.allows(i, count))
        else {
            return;
        };

        if let Node::Element(pre) = el.children.swap_remove(index) {
            *el = pre;
        }
    }
}

impl HtmlTransform for UnwrapPreContainers {
    fn name(&self) -> &'static str {
        "unwrap-pre-containers"
    }

    fn transform(&self, fragment: &mut Fragment) {
        self.visit(&mut fragment.children);
    }
}
