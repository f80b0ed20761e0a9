//! Tolerant, position-tracking XML reader
//!
//! Inbound operator documents vary wildly in structure and namespace usage, so
//! the response parsers work over a small element tree rather than typed
//! deserialization. Lookups match on local names (prefix-insensitive), and
//! every element remembers the line/column where it started so validation
//! violations can point at the source.

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::WireError;

/// One element of a parsed XML document
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    /// Local name with any namespace prefix stripped
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub text: String,
    pub children: Vec<Element>,
    pub line: u32,
    pub column: u32,
}

impl Element {
    /// Parses a complete document and returns its root element
    pub fn parse(xml: &str) -> Result<Element, WireError> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            let offset = reader.buffer_position() as usize;
            match reader.read_event() {
                Ok(Event::Start(start)) => {
                    let element = element_from_start(xml, offset, &start)?;
                    stack.push(element);
                }
                Ok(Event::Empty(start)) => {
                    let element = element_from_start(xml, offset, &start)?;
                    attach(&mut stack, &mut root, element, xml, offset)?;
                }
                Ok(Event::Text(text)) => {
                    if let Some(current) = stack.last_mut() {
                        let value = text
                            .unescape()
                            .map_err(|e| malformed(xml, offset, &e.to_string()))?;
                        current.text.push_str(value.trim());
                    }
                }
                Ok(Event::CData(data)) => {
                    if let Some(current) = stack.last_mut() {
                        current
                            .text
                            .push_str(String::from_utf8_lossy(&data).trim());
                    }
                }
                Ok(Event::End(_)) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| malformed(xml, offset, "unexpected closing tag"))?;
                    attach(&mut stack, &mut root, element, xml, offset)?;
                }
                Ok(Event::Eof) => break,
                // Prolog, comments, and processing instructions are irrelevant
                Ok(_) => {}
                Err(e) => {
                    let offset = reader.error_position() as usize;
                    return Err(malformed(xml, offset, &e.to_string()));
                }
            }
        }

        if !stack.is_empty() {
            return Err(malformed(xml, xml.len(), "unclosed element"));
        }

        root.ok_or_else(|| malformed(xml, 0, "document has no root element"))
    }

    /// First descendant (depth-first, self excluded) with the given local name
    pub fn find(&self, local_name: &str) -> Option<&Element> {
        for child in &self.children {
            if child.name == local_name {
                return Some(child);
            }
            if let Some(found) = child.find(local_name) {
                return Some(found);
            }
        }
        None
    }

    /// All descendants with the given local name, in document order
    pub fn find_all(&self, local_name: &str) -> Vec<&Element> {
        let mut out = Vec::new();
        self.collect_all(local_name, &mut out);
        out
    }

    fn collect_all<'a>(&'a self, local_name: &str, out: &mut Vec<&'a Element>) {
        for child in &self.children {
            if child.name == local_name {
                out.push(child);
            }
            child.collect_all(local_name, out);
        }
    }

    /// Trimmed text content, None when empty
    pub fn text(&self) -> Option<&str> {
        let trimmed = self.text.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed)
        }
    }

    /// Text of the first descendant matching any of the candidate names.
    ///
    /// Operators disagree on element naming (`numeroProtocolo` vs
    /// `numeroProtocoloRecebimento`), so extraction always carries fallbacks.
    pub fn first_text(&self, names: &[&str]) -> Option<String> {
        names
            .iter()
            .find_map(|name| self.find(name).and_then(|e| e.text().map(str::to_string)))
    }

    /// Attribute value by name
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

fn element_from_start(
    xml: &str,
    offset: usize,
    start: &quick_xml::events::BytesStart<'_>,
) -> Result<Element, WireError> {
    let name = local_name(&String::from_utf8_lossy(start.name().as_ref()));
    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| malformed(xml, offset, &e.to_string()))?;
        let key = local_name(&String::from_utf8_lossy(attr.key.as_ref()));
        let value = attr
            .unescape_value()
            .map_err(|e| malformed(xml, offset, &e.to_string()))?
            .into_owned();
        attributes.push((key, value));
    }

    let (line, column) = position_at(xml, offset);
    Ok(Element {
        name,
        attributes,
        text: String::new(),
        children: Vec::new(),
        line,
        column,
    })
}

fn attach(
    stack: &mut Vec<Element>,
    root: &mut Option<Element>,
    element: Element,
    xml: &str,
    offset: usize,
) -> Result<(), WireError> {
    match stack.last_mut() {
        Some(parent) => {
            parent.children.push(element);
            Ok(())
        }
        None if root.is_none() => {
            *root = Some(element);
            Ok(())
        }
        None => Err(malformed(xml, offset, "multiple root elements")),
    }
}

fn malformed(xml: &str, offset: usize, message: &str) -> WireError {
    let (line, column) = position_at(xml, offset);
    WireError::Malformed {
        line,
        column,
        message: message.to_string(),
    }
}

fn local_name(qualified: &str) -> String {
    qualified
        .rsplit(':')
        .next()
        .unwrap_or(qualified)
        .to_string()
}

/// Converts a byte offset into 1-based line and column numbers
pub(crate) fn position_at(input: &str, offset: usize) -> (u32, u32) {
    let offset = offset.min(input.len());
    let prefix = &input.as_bytes()[..offset];
    let line = prefix.iter().filter(|b| **b == b'\n').count() as u32 + 1;
    let column = match prefix.iter().rposition(|b| *b == b'\n') {
        Some(pos) => (offset - pos) as u32,
        None => offset as u32 + 1,
    };
    (line, column)
}
