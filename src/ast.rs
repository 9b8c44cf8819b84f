//! SVG Abstract Syntax Tree

/// A complete SVG document.
#[derive(Debug, Clone)]
pub struct Document {
    /// XML declaration (e.g., `<?xml version="1.0" encoding="UTF-8"?>`)
    pub xml_declaration: Option<XmlDeclaration>,
    /// DOCTYPE declaration
    pub doctype: Option<String>,
    /// Comments and processing instructions before the root element
    pub prolog: Vec<Node>,
    /// The root SVG element
    pub root: Element,
    /// Comments and processing instructions after the root element
    pub epilog: Vec<Node>,
}

/// XML declaration attributes.
#[derive(Debug, Clone)]
pub struct XmlDeclaration {
    pub version: String,
    pub encoding: Option<String>,
    pub standalone: Option<bool>,
}

/// An SVG/XML element.
#[derive(Debug, Clone)]
pub struct Element {
    /// Element name with optional prefix (e.g., "svg", "sodipodi:namedview")
    pub name: QName,
    /// Attributes on this element, in document order
    pub attributes: Vec<Attribute>,
    /// Child nodes
    pub children: Vec<Node>,
}

/// A qualified name (possibly with namespace prefix).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QName {
    /// Namespace prefix (e.g., "svg", "inkscape")
    pub prefix: Option<String>,
    /// Local name (e.g., "rect", "label")
    pub local: String,
}

impl QName {
    pub fn new(local: impl Into<String>) -> Self {
        Self {
            prefix: None,
            local: local.into(),
        }
    }

    pub fn with_prefix(prefix: impl Into<String>, local: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
            local: local.into(),
        }
    }

    /// Parse a qualified name from a string like "prefix:local" or just "local".
    pub fn parse(s: &str) -> Self {
        if let Some((prefix, local)) = s.split_once(':') {
            Self::with_prefix(prefix, local)
        } else {
            Self::new(s)
        }
    }

    /// Compare against a qualified name written as "prefix:local" or "local".
    pub fn matches(&self, qualified: &str) -> bool {
        match qualified.split_once(':') {
            Some((prefix, local)) => self.prefix.as_deref() == Some(prefix) && self.local == local,
            None => self.prefix.is_none() && self.local == qualified,
        }
    }

    /// Get the full name as a string.
    pub fn full_name(&self) -> String {
        match &self.prefix {
            Some(p) => format!("{}:{}", p, self.local),
            None => self.local.clone(),
        }
    }
}

/// An attribute on an element.
#[derive(Debug, Clone)]
pub struct Attribute {
    pub name: QName,
    pub value: String,
}

impl Attribute {
    /// Create an attribute from a qualified name ("fill", "xlink:href").
    pub fn new(name: &str, value: impl Into<String>) -> Self {
        Self {
            name: QName::parse(name),
            value: value.into(),
        }
    }
}

/// A node in the SVG tree.
#[derive(Debug, Clone)]
pub enum Node {
    /// An element node
    Element(Element),
    /// A text node
    Text(String),
    /// A comment node
    Comment(String),
    /// A CDATA section
    CData(String),
    /// A processing instruction (e.g., `<?xml-stylesheet ... ?>`)
    ProcessingInstruction { target: String, content: Option<String> },
}

/// Elements whose content is rendered as text.
const TEXT_ELEMENTS: &[&str] = &[
    "text", "tspan", "textPath", "tref", "altGlyph", "flowRoot", "flowPara", "flowSpan", "flowDiv",
];

impl Element {
    pub fn new(name: &str) -> Self {
        Self {
            name: QName::parse(name),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Get an attribute value by qualified name.
    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name.matches(name))
            .map(|a| a.value.as_str())
    }

    /// Set an attribute value, overwriting in place or appending.
    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        if let Some(attr) = self.attributes.iter_mut().find(|a| a.name.matches(name)) {
            attr.value = value.into();
        } else {
            self.attributes.push(Attribute::new(name, value));
        }
    }

    /// Remove an attribute by qualified name, returning its value.
    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        let index = self.attributes.iter().position(|a| a.name.matches(name))?;
        Some(self.attributes.remove(index).value)
    }

    /// Check if this element has a specific local name.
    pub fn is(&self, name: &str) -> bool {
        self.name.local == name
    }

    /// Iterate over child elements only (skip text, comments, etc.).
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|n| match n {
            Node::Element(e) => Some(e),
            _ => None,
        })
    }

    /// Iterate over child elements mutably.
    pub fn child_elements_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.children.iter_mut().filter_map(|n| match n {
            Node::Element(e) => Some(e),
            _ => None,
        })
    }

    /// Whether this is an element type that renders text.
    pub fn is_text_element(&self) -> bool {
        TEXT_ELEMENTS.contains(&self.name.local.as_str())
    }

    /// Whether this element, or anything below it, renders text.
    pub fn can_render_text(&self) -> bool {
        self.is_text_element() || self.child_elements().any(Element::can_render_text)
    }

    /// Recursively visit all descendant elements (not including `self`).
    pub fn for_each_descendant(&self, f: &mut impl FnMut(&Element)) {
        for child in self.child_elements() {
            f(child);
            child.for_each_descendant(f);
        }
    }

    /// Recursively visit this element and all descendants mutably, parents first.
    pub fn for_each_element_mut(&mut self, f: &mut impl FnMut(&mut Element)) {
        f(self);
        for child in self.child_elements_mut() {
            child.for_each_element_mut(f);
        }
    }
}

impl Document {
    /// Recursively visit all elements in the document.
    pub fn for_each_element(&self, mut f: impl FnMut(&Element)) {
        f(&self.root);
        self.root.for_each_descendant(&mut f);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qname_matches_prefix_exactly() {
        let label = QName::parse("inkscape:label");
        assert!(label.matches("inkscape:label"));
        assert!(!label.matches("label"));
        assert!(QName::parse("style").matches("style"));
        assert!(!QName::parse("style").matches("svg:style"));
    }

    #[test]
    fn set_attr_overwrites_in_place() {
        let mut rect = Element::new("rect");
        rect.set_attr("fill", "red");
        rect.set_attr("width", "10");
        rect.set_attr("fill", "blue");
        let names: Vec<_> = rect.attributes.iter().map(|a| a.name.full_name()).collect();
        assert_eq!(names, ["fill", "width"]);
        assert_eq!(rect.get_attr("fill"), Some("blue"));
        assert_eq!(rect.remove_attr("fill").as_deref(), Some("blue"));
        assert_eq!(rect.get_attr("fill"), None);
    }

    #[test]
    fn text_detection_looks_through_descendants() {
        let mut text = Element::new("text");
        text.children.push(Node::Text("hi".into()));
        let mut inner = Element::new("g");
        inner.children.push(Node::Element(text));
        let mut outer = Element::new("g");
        outer.children.push(Node::Element(Element::new("rect")));
        outer.children.push(Node::Element(inner));

        assert!(outer.can_render_text());
        assert!(!Element::new("rect").can_render_text());
        assert!(!Element::new("g").can_render_text());
    }
}
