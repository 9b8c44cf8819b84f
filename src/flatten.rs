//! Writing repaired declarations back onto an element.

use crate::ast::{Attribute, Element};
use crate::style::Declarations;

/// Move every declaration that can be written as an attribute onto the
/// element and drop the `style` attribute.
///
/// An existing attribute with the same name is overwritten. New attributes
/// take the place the `style` attribute had. Declarations whose property is
/// not a valid attribute name (custom properties, names with whitespace or
/// prefixes) stay behind in a rewritten `style`.
pub fn flatten_to_attributes(elem: &mut Element, decls: &Declarations) {
    let (attributes, leftover): (Vec<_>, Vec<_>) =
        decls.iter().partition(|(prop, _)| is_attribute_name(prop));

    let style_at = elem.attributes.iter().position(|a| a.name.matches("style"));
    let mut insert_at = if leftover.is_empty() {
        match style_at {
            Some(index) => {
                elem.attributes.remove(index);
                index
            }
            None => elem.attributes.len(),
        }
    } else {
        let kept: Declarations = leftover.into_iter().collect();
        log::trace!("{}: keeping style {kept}", elem.name.local);
        elem.set_attr("style", kept.to_string());
        style_at.unwrap_or(elem.attributes.len() - 1) + 1
    };

    for (prop, value) in attributes {
        if let Some(existing) = elem.attributes.iter_mut().find(|a| a.name.matches(prop)) {
            log::trace!("{}: {prop}={:?} overridden by style", elem.name.local, existing.value);
            existing.value = value.to_string();
        } else {
            elem.attributes.insert(insert_at, Attribute::new(prop, value));
            insert_at += 1;
        }
    }
}

/// An unprefixed XML name: a letter or `_`, then letters, digits, `-`, `_`
/// or `.`.
fn is_attribute_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

/// Store the declarations back in the `style` attribute, or remove the
/// attribute when nothing is left.
pub fn write_style(elem: &mut Element, decls: &Declarations) {
    if decls.is_empty() {
        elem.remove_attr("style");
    } else {
        elem.set_attr("style", decls.to_string());
    }
}
