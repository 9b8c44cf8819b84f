//! SVG parsing from XML.

use std::collections::HashMap;

use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::{BytesDecl, BytesPI, BytesStart, Event};
use quick_xml::Reader;

use crate::ast::*;
use crate::error::CleanError;

/// Parse an SVG string into a Document.
pub fn parse_svg(svg: &str) -> Result<Document, CleanError> {
    let mut reader = Reader::from_str(svg);

    let mut xml_declaration = None;
    let mut doctype = None;
    let mut prolog = Vec::new();
    let mut epilog = Vec::new();
    let mut root = None;
    let mut entities = Entities::new();

    loop {
        let event = reader.read_event()?;
        // Misc nodes land before or after the root depending on where we are
        let misc = if root.is_none() { &mut prolog } else { &mut epilog };
        match event {
            Event::Decl(decl) => {
                xml_declaration = Some(parse_declaration(&decl)?);
            }
            Event::DocType(dt) => {
                let dt = String::from_utf8_lossy(&dt).into_owned();
                entities = parse_entities(&dt);
                if !entities.is_empty() {
                    log::debug!("DOCTYPE declares {} entities", entities.len());
                }
                doctype = Some(dt);
            }
            Event::Start(start) if root.is_none() => {
                root = Some(parse_element(&mut reader, &start, &entities)?);
            }
            Event::Empty(start) if root.is_none() => {
                root = Some(parse_element_start(&start, &entities)?);
            }
            Event::Start(_) | Event::Empty(_) => {
                return Err(CleanError::InvalidSvg("Multiple root elements".into()));
            }
            Event::Comment(comment) => {
                misc.push(Node::Comment(String::from_utf8_lossy(&comment).into_owned()));
            }
            Event::PI(pi) => {
                misc.push(parse_processing_instruction(&pi));
            }
            Event::Text(_) => {
                // Whitespace between top-level constructs is not kept
            }
            Event::Eof => break,
            _ => {}
        }
    }

    let root = root.ok_or_else(|| CleanError::InvalidSvg("No root element found".into()))?;

    Ok(Document {
        xml_declaration,
        doctype,
        prolog,
        root,
        epilog,
    })
}

/// General entities declared in a DOCTYPE internal subset, by name.
type Entities = HashMap<String, String>;

/// Collect `<!ENTITY name "value">` declarations from the DOCTYPE text.
///
/// Parameter entities (`<!ENTITY % name ...>`) and external entities
/// (`SYSTEM`/`PUBLIC`) are skipped.
fn parse_entities(doctype: &str) -> Entities {
    let mut entities = Entities::new();
    let mut rest = doctype;
    while let Some(start) = rest.find("<!ENTITY") {
        rest = rest[start + "<!ENTITY".len()..].trim_start();
        let Some(name_end) = rest.find(char::is_whitespace) else {
            break;
        };
        let name = &rest[..name_end];
        rest = rest[name_end..].trim_start();
        if name == "%" {
            continue;
        }
        let Some(quote) = rest.chars().next().filter(|c| matches!(c, '"' | '\'')) else {
            continue;
        };
        let Some(value_end) = rest[1..].find(quote) else {
            break;
        };
        entities
            .entry(name.to_string())
            .or_insert_with(|| rest[1..1 + value_end].to_string());
        rest = &rest[1 + value_end + 1..];
    }
    entities
}

/// Resolve declared entities first, then the five predefined ones.
fn resolver<'e>(entities: &'e Entities) -> impl FnMut(&str) -> Option<&'e str> + 'e {
    move |name| {
        entities
            .get(name)
            .map(String::as_str)
            .or_else(|| resolve_predefined_entity(name))
    }
}

fn parse_declaration(decl: &BytesDecl) -> Result<XmlDeclaration, CleanError> {
    Ok(XmlDeclaration {
        version: String::from_utf8_lossy(decl.version()?.as_ref()).into_owned(),
        encoding: decl
            .encoding()
            .transpose()
            .ok()
            .flatten()
            .map(|e| String::from_utf8_lossy(e.as_ref()).into_owned()),
        standalone: decl.standalone().transpose().ok().flatten().map(|s| {
            let s = String::from_utf8_lossy(s.as_ref());
            s == "yes"
        }),
    })
}

fn parse_processing_instruction(pi: &BytesPI) -> Node {
    let content = String::from_utf8_lossy(pi).into_owned();
    let (target, content) = content
        .split_once(char::is_whitespace)
        .map(|(t, r)| (t.to_string(), Some(r.to_string())))
        .unwrap_or_else(|| (content, None));
    Node::ProcessingInstruction { target, content }
}

fn parse_element(
    reader: &mut Reader<&[u8]>,
    start: &BytesStart,
    entities: &Entities,
) -> Result<Element, CleanError> {
    let mut element = parse_element_start(start, entities)?;

    loop {
        match reader.read_event()? {
            Event::Start(start) => {
                element
                    .children
                    .push(Node::Element(parse_element(reader, &start, entities)?));
            }
            Event::Empty(start) => {
                element
                    .children
                    .push(Node::Element(parse_element_start(&start, entities)?));
            }
            Event::End(_) => {
                break;
            }
            Event::Text(text) => {
                let text = text.unescape_with(resolver(entities))?;
                element.children.push(Node::Text(text.into_owned()));
            }
            Event::Comment(comment) => {
                element
                    .children
                    .push(Node::Comment(String::from_utf8_lossy(&comment).into_owned()));
            }
            Event::CData(cdata) => {
                element
                    .children
                    .push(Node::CData(String::from_utf8_lossy(&cdata).into_owned()));
            }
            Event::PI(pi) => {
                element.children.push(parse_processing_instruction(&pi));
            }
            Event::Eof => {
                return Err(CleanError::InvalidSvg("Unexpected end of file".into()));
            }
            _ => {}
        }
    }

    Ok(element)
}

fn parse_element_start(start: &BytesStart, entities: &Entities) -> Result<Element, CleanError> {
    let name_bytes = start.name();
    let name = std::str::from_utf8(name_bytes.as_ref())?;

    let mut element = Element {
        name: QName::parse(name),
        attributes: Vec::new(),
        children: Vec::new(),
    };

    for attr in start.attributes() {
        let attr = attr?;
        let key = std::str::from_utf8(attr.key.as_ref())?;
        let value = attr.unescape_value_with(resolver(entities))?;
        element.attributes.push(Attribute {
            name: QName::parse(key),
            value: value.into_owned(),
        });
    }

    Ok(element)
}
