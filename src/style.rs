//! Inline `style` declarations.

use std::fmt;

use indexmap::IndexMap;

/// The parsed contents of a `style` attribute.
///
/// Declarations keep the order they were written in. When a property is
/// declared twice, the later value wins but the property stays at the
/// position of its first declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Declarations {
    entries: IndexMap<String, String>,
}

impl Declarations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `property:value;...` text.
    ///
    /// Empty segments and segments without a `:` are skipped. Property names
    /// are lower-cased; values are kept as written, minus surrounding
    /// whitespace.
    pub fn parse(style: &str) -> Self {
        let mut decls = Self::new();
        for segment in style.split(';') {
            let Some((prop, value)) = segment.split_once(':') else {
                continue;
            };
            let prop = prop.trim();
            if prop.is_empty() {
                continue;
            }
            decls.insert(prop.to_ascii_lowercase(), value.trim());
        }
        decls
    }

    /// Insert or overwrite a declaration.
    pub fn insert(&mut self, prop: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(prop.into(), value.into());
    }

    pub fn get(&self, prop: &str) -> Option<&str> {
        self.entries.get(prop).map(String::as_str)
    }

    /// Remove a declaration, keeping the order of the rest.
    pub fn remove(&mut self, prop: &str) -> Option<String> {
        self.entries.shift_remove(prop)
    }

    /// Keep only the declarations for which `keep` returns true.
    pub fn retain(&mut self, mut keep: impl FnMut(&str, &str) -> bool) {
        self.entries.retain(|prop, value| keep(prop, value));
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(p, v)| (p.as_str(), v.as_str()))
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut String)> {
        self.entries.iter_mut().map(|(p, v)| (p.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Serializes as `prop:value;` for every declaration, including the last.
impl fmt::Display for Declarations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (prop, value) in self.iter() {
            write!(f, "{prop}:{value};")?;
        }
        Ok(())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Declarations {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut decls = Self::new();
        for (prop, value) in iter {
            decls.insert(prop, value);
        }
        decls
    }
}
