//! Mapper document reader built on quick-xml
//!
//! Comments, processing instructions and the DOCTYPE carry nothing the
//! builder needs and are dropped. Whitespace-only text is kept because it
//! separates SQL tokens that were written on different lines.

use super::{Element, Node};
use crate::error::{Error, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// Parse a mapper document into its root element
pub fn parse_document(input: &str) -> Result<Element> {
    let mut reader = Reader::from_str(input);
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let position = reader.buffer_position() as usize;
        let event = match reader.read_event() {
            Ok(event) => event,
            Err(e) => return Err(xml_error(reader.error_position() as usize, e.to_string())),
        };

        match event {
            Event::Start(start) => stack.push(start_element(&start, position)?),
            Event::Empty(start) => {
                let element = start_element(&start, position)?;
                attach(&mut stack, &mut root, element, position)?;
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| xml_error(position, "unexpected closing tag"))?;
                attach(&mut stack, &mut root, element, position)?;
            }
            Event::Text(text) => {
                let content = text
                    .unescape()
                    .map_err(|e| xml_error(position, e.to_string()))?;
                if let Some(parent) = stack.last_mut() {
                    parent.children.push(Node::Text(content.into_owned()));
                }
            }
            Event::CData(cdata) => {
                let content = String::from_utf8(cdata.into_inner().into_owned())
                    .map_err(|e| xml_error(position, e.to_string()))?;
                if let Some(parent) = stack.last_mut() {
                    parent.children.push(Node::CData(content));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(xml_error(
            input.len(),
            format!("unclosed element <{}>", open.name),
        ));
    }

    root.ok_or_else(|| xml_error(0, "document has no root element"))
}

fn start_element(start: &BytesStart<'_>, position: usize) -> Result<Element> {
    let mut element = Element::new(String::from_utf8_lossy(start.name().as_ref()).into_owned());
    for attr in start.attributes() {
        let attr = attr.map_err(|e| xml_error(position, e.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|e| xml_error(position, e.to_string()))?;
        element.attributes.insert(key, value.into_owned());
    }
    Ok(element)
}

fn attach(
    stack: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
    position: usize,
) -> Result<()> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(Node::Element(element));
        return Ok(());
    }
    if root.is_some() {
        return Err(xml_error(position, "document has more than one root element"));
    }
    *root = Some(element);
    Ok(())
}

fn xml_error(offset: usize, message: impl Into<String>) -> Error {
    Error::XmlError {
        message: message.into(),
        span: Some((offset, 0)),
    }
}
