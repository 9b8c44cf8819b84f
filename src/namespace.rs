//! Removal of editor-specific namespaced elements and attributes.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::ast::{Element, Node, QName};

/// Namespace prefixes that survive cleaning.
///
/// Unprefixed names are always allowed. Anything else (`sodipodi:`,
/// `inkscape:`, `sketch:` ...) is stripped unless listed here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NamespacePolicy {
    allowed: BTreeSet<String>,
}

impl Default for NamespacePolicy {
    fn default() -> Self {
        Self {
            allowed: ["xml", "xlink", "svg"].into_iter().map(String::from).collect(),
        }
    }
}

impl NamespacePolicy {
    /// Allow an additional prefix.
    pub fn allow(mut self, prefix: impl Into<String>) -> Self {
        self.allowed.insert(prefix.into());
        self
    }

    pub fn allows_prefix(&self, prefix: Option<&str>) -> bool {
        prefix.is_none_or(|p| self.allowed.contains(p))
    }

    /// Whether a name may stay in the document.
    ///
    /// A namespace declaration `xmlns:p` is judged by the prefix it declares.
    pub fn allows(&self, name: &QName) -> bool {
        if name.prefix.as_deref() == Some("xmlns") {
            return self.allows_prefix(Some(name.local.as_str()));
        }
        self.allows_prefix(name.prefix.as_deref())
    }
}

/// Remove every element with a disallowed prefix, at any depth.
///
/// The root element itself cannot be removed; it is left alone with a warning.
pub fn strip_namespaced_elements(root: &mut Element, policy: &NamespacePolicy) {
    if !policy.allows(&root.name) {
        log::warn!("root element <{}> has a foreign prefix, keeping it", root.name.full_name());
    }
    strip_elements(root, policy);
}

fn strip_elements(elem: &mut Element, policy: &NamespacePolicy) {
    elem.children.retain(|node| match node {
        Node::Element(e) if !policy.allows(&e.name) => {
            log::debug!("removing <{}>", e.name.full_name());
            false
        }
        _ => true,
    });

    for child in elem.child_elements_mut() {
        strip_elements(child, policy);
    }
}

/// Remove every attribute with a disallowed prefix, at any depth.
pub fn strip_namespaced_attributes(root: &mut Element, policy: &NamespacePolicy) {
    root.for_each_element_mut(&mut |elem: &mut Element| {
        elem.attributes.retain(|attr| {
            let keep = policy.allows(&attr.name);
            if !keep {
                log::debug!("removing {} from <{}>", attr.name.full_name(), elem.name.full_name());
            }
            keep
        });
    });
}
