//! svgclean - strips editor cruft from SVG files
//!
//! svgclean removes editor-specific namespaced nodes and attributes and
//! comments, then repairs inline styles: dead fill and stroke properties,
//! text properties on shapes and vendor-prefixed properties are dropped, and
//! what remains is turned into presentation attributes.

mod ast;
mod comments;
mod error;
mod flatten;
mod namespace;
mod parse;
mod rules;
mod select;
mod serialize;
mod style;

pub use ast::*;
pub use comments::*;
pub use error::*;
pub use flatten::*;
pub use namespace::*;
pub use parse::*;
pub use rules::*;
pub use select::*;
pub use serialize::*;
pub use style::*;

use serde::{Deserialize, Serialize};

/// Clean an SVG string with default settings.
pub fn clean(svg: &str) -> Result<String, CleanError> {
    clean_with_options(svg, &Options::default())
}

/// Clean an SVG string with custom options.
pub fn clean_with_options(svg: &str, options: &Options) -> Result<String, CleanError> {
    let mut doc = parse_svg(svg)?;
    clean_document(&mut doc, options);
    Ok(serialize(&doc))
}

/// Run every cleaning pass over an already parsed document.
pub fn clean_document(doc: &mut Document, options: &Options) {
    log::debug!("stripping namespaced elements");
    strip_namespaced_elements(&mut doc.root, &options.namespaces);
    log::debug!("stripping namespaced attributes");
    strip_namespaced_attributes(&mut doc.root, &options.namespaces);
    log::debug!("stripping comments");
    strip_comments(doc);
    log::debug!("repairing styles");
    repair_styles(&mut doc.root, options);
}

/// Repair the `style` attribute of `root` and every element below it.
pub fn repair_styles(root: &mut Element, options: &Options) {
    root.for_each_element_mut(&mut |elem: &mut Element| repair_element_style(elem, options));
}

/// Repair one element's `style` attribute. Elements without one, or with a
/// blank one, are untouched.
pub fn repair_element_style(elem: &mut Element, options: &Options) {
    let Some(style) = elem.get_attr("style").filter(|s| !s.trim().is_empty()) else {
        return;
    };
    let mut decls = Declarations::parse(style);
    let changed = repair(&mut decls, &RuleContext::for_element(elem));

    if options.style_to_attributes {
        flatten_to_attributes(elem, &decls);
    } else if changed || decls.is_empty() {
        write_style(elem, &decls);
    }
}

/// Cleaning options.
///
/// Deserializes from JSON with camelCase keys; missing keys take their
/// defaults and unknown keys are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Options {
    /// Turn surviving style declarations into presentation attributes (default: true)
    pub style_to_attributes: bool,
    /// Namespace prefixes that are kept
    pub namespaces: NamespacePolicy,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            style_to_attributes: true,
            namespaces: NamespacePolicy::default(),
        }
    }
}

impl Options {
    /// Parse options from their JSON form, e.g. `{"styleToAttributes": false}`.
    pub fn from_json(json: &str) -> Result<Self, CleanError> {
        Ok(serde_json::from_str(json)?)
    }
}
