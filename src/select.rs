//! CSS-selector queries over the tree.
//!
//! Selectors are parsed and matched by the `selectors` crate. Namespace
//! prefixes stand in for namespace URLs, so `sodipodi|namedview` and
//! `[inkscape|label]` select prefixed names; `|rect` selects only unprefixed
//! elements. The qualified name may also be written with an escaped colon,
//! as in `sodipodi\:namedview`.

use std::borrow::Borrow;
use std::fmt;
use std::ptr;
use std::rc::Rc;
use std::str::FromStr;

use cssparser::ToCss;
use selectors::attr::{AttrSelectorOperation, CaseSensitivity, NamespaceConstraint};
use selectors::matching::{
    self, ElementSelectorFlags, IgnoreNthChildForInvalidation, MatchingContext, MatchingMode,
    NeedsSelectorFlags, QuirksMode,
};
use selectors::parser::{ParseRelative, SelectorParseErrorKind};
use selectors::{NthIndexCache, OpaqueElement, SelectorList};

use crate::ast::{Document, Element, Node, QName};
use crate::error::CleanError;

/// The `selectors` type bundle for SVG trees.
#[derive(Debug, Clone)]
pub struct SvgSelectors;

/// Owned string used for every name and value in a parsed selector.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct CssString(pub String);

impl From<&str> for CssString {
    fn from(s: &str) -> Self {
        CssString(s.to_string())
    }
}

impl AsRef<str> for CssString {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for CssString {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl ToCss for CssString {
    fn to_css<W>(&self, dest: &mut W) -> fmt::Result
    where
        W: fmt::Write,
    {
        cssparser::serialize_identifier(&self.0, dest)
    }
}

impl precomputed_hash::PrecomputedHash for CssString {
    fn precomputed_hash(&self) -> u32 {
        use std::hash::{DefaultHasher, Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        self.0.hash(&mut hasher);
        hasher.finish() as u32
    }
}

/// No non-tree-structural pseudo-classes are understood (`:hover`, `:link` ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PseudoClass {}

impl ToCss for PseudoClass {
    fn to_css<W>(&self, _dest: &mut W) -> fmt::Result
    where
        W: fmt::Write,
    {
        match *self {}
    }
}

impl selectors::parser::NonTSPseudoClass for PseudoClass {
    type Impl = SvgSelectors;

    fn is_active_or_hover(&self) -> bool {
        match *self {}
    }

    fn is_user_action_state(&self) -> bool {
        match *self {}
    }
}

/// No pseudo-elements are understood.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PseudoElement {}

impl ToCss for PseudoElement {
    fn to_css<W>(&self, _dest: &mut W) -> fmt::Result
    where
        W: fmt::Write,
    {
        match *self {}
    }
}

impl selectors::parser::PseudoElement for PseudoElement {
    type Impl = SvgSelectors;
}

impl selectors::SelectorImpl for SvgSelectors {
    type ExtraMatchingData<'a> = ();
    type AttrValue = CssString;
    type Identifier = CssString;
    type LocalName = CssString;
    type NamespacePrefix = CssString;
    type NamespaceUrl = CssString;
    type BorrowedLocalName = str;
    type BorrowedNamespaceUrl = str;

    type NonTSPseudoClass = PseudoClass;
    type PseudoElement = PseudoElement;
}

struct SelectorParser;

impl<'i> selectors::parser::Parser<'i> for SelectorParser {
    type Impl = SvgSelectors;
    type Error = SelectorParseErrorKind<'i>;

    // The prefix is its own namespace.
    fn namespace_for_prefix(&self, prefix: &CssString) -> Option<CssString> {
        Some(prefix.clone())
    }
}

/// An element together with the chain of its ancestors, as the matcher
/// needs to walk up and sideways from it.
#[derive(Debug, Clone)]
pub struct ElementRef<'a> {
    elem: &'a Element,
    parent: Option<Rc<ElementRef<'a>>>,
}

impl<'a> ElementRef<'a> {
    /// An element matched as if it had no parent.
    pub fn root(elem: &'a Element) -> Self {
        Self { elem, parent: None }
    }

    fn sibling(&self, elem: &'a Element) -> Self {
        Self {
            elem,
            parent: self.parent.clone(),
        }
    }

    fn siblings(&self) -> impl Iterator<Item = &'a Element> {
        let parent: Option<&'a Element> = self.parent.as_ref().map(|p| p.elem);
        parent.into_iter().flat_map(Element::child_elements)
    }

    /// `name` is a local name, or a qualified one when written with an
    /// escaped colon.
    fn name_is(name: &str, qname: &QName) -> bool {
        if name.contains(':') {
            qname.matches(name)
        } else {
            qname.local == name
        }
    }
}

impl<'a> selectors::Element for ElementRef<'a> {
    type Impl = SvgSelectors;

    fn opaque(&self) -> OpaqueElement {
        OpaqueElement::new(self.elem)
    }

    fn parent_element(&self) -> Option<Self> {
        self.parent.as_deref().cloned()
    }

    fn parent_node_is_shadow_root(&self) -> bool {
        false
    }

    fn containing_shadow_host(&self) -> Option<Self> {
        None
    }

    fn is_pseudo_element(&self) -> bool {
        false
    }

    fn prev_sibling_element(&self) -> Option<Self> {
        let mut prev = None;
        for sibling in self.siblings() {
            if ptr::eq(sibling, self.elem) {
                return prev.map(|e| self.sibling(e));
            }
            prev = Some(sibling);
        }
        None
    }

    fn next_sibling_element(&self) -> Option<Self> {
        let mut siblings = self.siblings().skip_while(|e| !ptr::eq(*e, self.elem));
        siblings.next()?;
        siblings.next().map(|e| self.sibling(e))
    }

    fn first_element_child(&self) -> Option<Self> {
        let child = self.elem.child_elements().next()?;
        Some(Self {
            elem: child,
            parent: Some(Rc::new(self.clone())),
        })
    }

    // SVG names are case-sensitive.
    fn is_html_element_in_html_document(&self) -> bool {
        false
    }

    fn has_local_name(&self, local_name: &str) -> bool {
        Self::name_is(local_name, &self.elem.name)
    }

    fn has_namespace(&self, ns: &str) -> bool {
        self.elem.name.prefix.as_deref().unwrap_or_default() == ns
    }

    fn is_same_type(&self, other: &Self) -> bool {
        self.elem.name == other.elem.name
    }

    fn attr_matches(
        &self,
        ns: &NamespaceConstraint<&CssString>,
        local_name: &CssString,
        operation: &AttrSelectorOperation<&CssString>,
    ) -> bool {
        let name = local_name.0.as_str();
        self.elem
            .attributes
            .iter()
            .filter(|attr| match ns {
                NamespaceConstraint::Any => Self::name_is(name, &attr.name),
                NamespaceConstraint::Specific(url) if url.0.is_empty() => attr.name.matches(name),
                NamespaceConstraint::Specific(url) => {
                    attr.name.prefix.as_deref() == Some(url.0.as_str()) && attr.name.local == name
                }
            })
            .any(|attr| operation.eval_str(&attr.value))
    }

    fn match_non_ts_pseudo_class(
        &self,
        pc: &PseudoClass,
        _context: &mut MatchingContext<SvgSelectors>,
    ) -> bool {
        match *pc {}
    }

    fn match_pseudo_element(
        &self,
        pe: &PseudoElement,
        _context: &mut MatchingContext<SvgSelectors>,
    ) -> bool {
        match *pe {}
    }

    fn apply_selector_flags(&self, _flags: ElementSelectorFlags) {}

    fn is_link(&self) -> bool {
        false
    }

    fn is_html_slot_element(&self) -> bool {
        false
    }

    fn has_id(&self, id: &CssString, case_sensitivity: CaseSensitivity) -> bool {
        self.elem
            .get_attr("id")
            .is_some_and(|have| case_sensitivity.eq(have.as_bytes(), id.0.as_bytes()))
    }

    fn has_class(&self, name: &CssString, case_sensitivity: CaseSensitivity) -> bool {
        self.elem.get_attr("class").is_some_and(|classes| {
            classes
                .split_ascii_whitespace()
                .any(|have| case_sensitivity.eq(have.as_bytes(), name.0.as_bytes()))
        })
    }

    fn imported_part(&self, _name: &CssString) -> Option<CssString> {
        None
    }

    fn is_part(&self, _name: &CssString) -> bool {
        false
    }

    fn is_empty(&self) -> bool {
        self.elem.children.iter().all(|child| match child {
            Node::Element(_) => false,
            Node::Text(text) | Node::CData(text) => text.is_empty(),
            _ => true,
        })
    }

    fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

/// A parsed selector list.
#[derive(Debug, Clone)]
pub struct Selector(SelectorList<SvgSelectors>);

impl Selector {
    pub fn parse(selector: &str) -> Result<Self, CleanError> {
        let mut input = cssparser::ParserInput::new(selector);
        let mut parser = cssparser::Parser::new(&mut input);
        SelectorList::parse(&SelectorParser, &mut parser, ParseRelative::No)
            .map(Self)
            .map_err(|err| CleanError::InvalidSelector {
                selector: selector.to_string(),
                reason: format!("{:?} at column {}", err.kind, err.location.column),
            })
    }

    /// Check an element, with its ancestors, against the selector.
    pub fn matches(&self, elem: &ElementRef<'_>) -> bool {
        let mut nth_index_cache = NthIndexCache::default();
        let mut context = MatchingContext::new(
            MatchingMode::Normal,
            None,
            &mut nth_index_cache,
            QuirksMode::NoQuirks,
            NeedsSelectorFlags::No,
            IgnoreNthChildForInvalidation::No,
        );
        matching::matches_selector_list(&self.0, elem, &mut context)
    }

    /// All matching elements below `scope`, in document order.
    pub fn select_descendants<'a>(&self, scope: ElementRef<'a>) -> Vec<&'a Element> {
        fn walk<'a>(sel: &Selector, elem: ElementRef<'a>, found: &mut Vec<&'a Element>) {
            let parent = Rc::new(elem);
            for child in parent.elem.child_elements() {
                let child = ElementRef {
                    elem: child,
                    parent: Some(Rc::clone(&parent)),
                };
                if sel.matches(&child) {
                    found.push(child.elem);
                }
                walk(sel, child, found);
            }
        }

        let mut found = Vec::new();
        walk(self, scope, &mut found);
        found
    }
}

impl FromStr for Selector {
    type Err = CleanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Element {
    /// Descendants of this element matching a CSS selector. The element is
    /// treated as the root of the search.
    pub fn select(&self, selector: &str) -> Result<Vec<&Element>, CleanError> {
        Ok(Selector::parse(selector)?.select_descendants(ElementRef::root(self)))
    }
}

impl Document {
    /// Elements of the document, root included, matching a CSS selector.
    pub fn select(&self, selector: &str) -> Result<Vec<&Element>, CleanError> {
        let selector = Selector::parse(selector)?;
        let root = ElementRef::root(&self.root);
        let mut found = Vec::new();
        if selector.matches(&root) {
            found.push(&self.root);
        }
        found.extend(selector.select_descendants(root));
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_svg;

    const SVG: &str = r#"<svg id="root"><g class="layer top" inkscape:label="One"><rect id="a"/><g><rect id="b" class="top"/></g></g><sodipodi:namedview id="base"/><text>hi</text></svg>"#;

    fn ids(found: Vec<&Element>) -> Vec<&str> {
        found.into_iter().map(|e| e.get_attr("id").unwrap_or("-")).collect()
    }

    #[test]
    fn type_and_id_selectors() {
        let doc = parse_svg(SVG).unwrap();
        assert_eq!(ids(doc.select("rect").unwrap()), ["a", "b"]);
        assert_eq!(ids(doc.select("#b").unwrap()), ["b"]);
        assert_eq!(ids(doc.select("svg").unwrap()), ["root"]);
        assert_eq!(ids(doc.select("rect, #base").unwrap()), ["a", "b", "base"]);
        assert_eq!(doc.select("*").unwrap().len(), 7);
    }

    #[test]
    fn prefixed_names() {
        let doc = parse_svg(SVG).unwrap();
        assert_eq!(ids(doc.select("sodipodi|namedview").unwrap()), ["base"]);
        assert_eq!(ids(doc.select(r"sodipodi\:namedview").unwrap()), ["base"]);
        assert_eq!(ids(doc.select("namedview").unwrap()), ["base"]);
        assert!(doc.select("|namedview").unwrap().is_empty());
        assert_eq!(doc.select("sodipodi|*").unwrap().len(), 1);
        assert_eq!(doc.select("[inkscape|label]").unwrap().len(), 1);
        assert_eq!(doc.select(r"[inkscape\:label]").unwrap().len(), 1);
        assert_eq!(doc.select("[inkscape|label='One']").unwrap().len(), 1);
        assert_eq!(doc.select("[inkscape|label=Two]").unwrap().len(), 0);
        assert!(doc.select("[label]").unwrap().is_empty());
    }

    #[test]
    fn classes_and_combinators() {
        let doc = parse_svg(SVG).unwrap();
        assert_eq!(ids(doc.select(".top").unwrap()), ["-", "b"]);
        assert_eq!(ids(doc.select("g.layer.top rect").unwrap()), ["a", "b"]);
        assert_eq!(ids(doc.select("g.layer > rect").unwrap()), ["a"]);
        assert_eq!(ids(doc.select("svg>g>g>rect.top").unwrap()), ["b"]);
        assert_eq!(ids(doc.select("g.layer + sodipodi|namedview").unwrap()), ["base"]);
        assert_eq!(ids(doc.select("rect:first-child").unwrap()), ["a", "b"]);
        assert_eq!(ids(doc.select("svg > :last-child").unwrap()), ["-"]);
        assert_eq!(ids(doc.select("g:not(.layer) > rect").unwrap()), ["b"]);
    }

    #[test]
    fn element_select_is_scoped() {
        let doc = parse_svg(SVG).unwrap();
        let layer = doc.select("g.layer").unwrap()[0];
        assert_eq!(ids(layer.select("rect").unwrap()), ["a", "b"]);
        assert!(layer.select("g.layer").unwrap().is_empty());
        assert!(layer.select("svg rect").unwrap().is_empty());
    }

    #[test]
    fn rejects_invalid_selectors() {
        for bad in ["", "  ", "> rect", "rect:hover", "[id", "[id='x]", "#", "rect::before"] {
            let err = Selector::parse(bad).unwrap_err();
            assert!(matches!(err, CleanError::InvalidSelector { .. }), "{bad:?}");
        }
    }
}
