use crate::ast::{Document, Element, Node};

/// Remove comment nodes everywhere in the document, including around the root.
pub fn strip_comments(doc: &mut Document) {
    doc.prolog.retain(|node| !matches!(node, Node::Comment(_)));
    doc.epilog.retain(|node| !matches!(node, Node::Comment(_)));
    remove_comments(&mut doc.root);
}

fn remove_comments(elem: &mut Element) {
    elem.children
        .retain(|node| !matches!(node, Node::Comment(_)));

    for child in elem.child_elements_mut() {
        remove_comments(child);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_svg;
    use crate::serialize::serialize;

    #[test]
    fn removes_nested_comments_only() {
        let svg = "<!-- a --><svg> <!-- b --><g>x<!-- c --><!-- d -->y</g></svg><!-- e -->";
        let mut doc = parse_svg(svg).unwrap();
        strip_comments(&mut doc);
        assert_eq!(serialize(&doc), "<svg> <g>xy</g></svg>");
    }
}
