//! XML to generic node tree.
//!
//! Elements become JSON-like values so that XML documents can be decoded
//! with the same serde machinery as JSON ones:
//!
//! - attributes become `"@name"` keys, text next to child elements `"$text"`;
//! - an element with neither attributes nor children becomes its text, or
//!   `null` when it is empty;
//! - a child element that occurs more than once becomes an array.
//!
//! The last rule is why every repeatable field read from this tree has to
//! accept a single value as well as a list: one `<component>` and a list
//! of one look different here.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde_json::{Map, Value};

use crate::error::{ParseErrorKind, Result, SbomCodecError};

/// Nesting beyond this is rejected rather than walked.
const MAX_DEPTH: usize = 128;

pub(crate) const TEXT_KEY: &str = "$text";

struct Frame {
    name: String,
    fields: Map<String, Value>,
    text: String,
}

impl Frame {
    fn open(element: &BytesStart<'_>) -> Result<Self> {
        let mut fields = Map::new();
        for attr in element.attributes() {
            let attr = attr.map_err(quick_xml::Error::from)?;
            let key = attr.key.as_ref();
            if key == b"xmlns" || key.starts_with(b"xmlns:") {
                continue;
            }
            let value = attr.unescape_value()?;
            fields.insert(
                format!("@{}", local_name(attr.key.local_name().as_ref())),
                Value::String(value.into_owned()),
            );
        }
        Ok(Self {
            name: local_name(element.local_name().as_ref()),
            fields,
            text: String::new(),
        })
    }

    fn close(mut self) -> (String, Value) {
        let value = if self.fields.is_empty() {
            if self.text.is_empty() {
                Value::Null
            } else {
                Value::String(self.text)
            }
        } else {
            if !self.text.is_empty() {
                self.fields.insert(TEXT_KEY.to_string(), Value::String(self.text));
            }
            Value::Object(self.fields)
        };
        (self.name, value)
    }
}

fn local_name(name: &[u8]) -> String {
    let name = String::from_utf8_lossy(name);
    name.rfind(':')
        .map_or_else(|| name.to_string(), |idx| name[idx + 1..].to_string())
}

/// Insert a child, turning a repeated name into an array.
fn attach(parent: &mut Map<String, Value>, name: String, value: Value) {
    match parent.get_mut(&name) {
        Some(Value::Array(items)) => items.push(value),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, value]);
        }
        None => {
            parent.insert(name, value);
        }
    }
}

fn invalid(message: impl Into<String>) -> SbomCodecError {
    SbomCodecError::parse("XML document", ParseErrorKind::InvalidXml(message.into()))
}

/// Parse a document into `(root element name, root value)`.
pub(crate) fn parse(content: &str) -> Result<(String, Value)> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Frame> = Vec::new();
    let mut root: Option<(String, Value)> = None;

    loop {
        let event = reader.read_event().map_err(|e| {
            invalid(format!(
                "error at position {}: {}",
                reader.buffer_position(),
                e
            ))
        })?;
        match event {
            Event::Start(ref e) => {
                if stack.len() >= MAX_DEPTH {
                    return Err(invalid(format!("elements nested deeper than {MAX_DEPTH}")));
                }
                stack.push(Frame::open(e)?);
            }
            Event::Empty(ref e) => {
                let (name, value) = Frame::open(e)?.close();
                match stack.last_mut() {
                    Some(parent) => attach(&mut parent.fields, name, value),
                    None if root.is_none() => root = Some((name, value)),
                    None => return Err(invalid("more than one root element")),
                }
            }
            Event::Text(ref e) => {
                if let Some(frame) = stack.last_mut() {
                    frame.text.push_str(&e.unescape()?);
                }
            }
            Event::CData(e) => {
                if let Some(frame) = stack.last_mut() {
                    frame.text.push_str(&String::from_utf8_lossy(&e.into_inner()));
                }
            }
            Event::End(_) => {
                let Some(frame) = stack.pop() else {
                    return Err(invalid("closing tag without an open element"));
                };
                let (name, value) = frame.close();
                match stack.last_mut() {
                    Some(parent) => attach(&mut parent.fields, name, value),
                    None if root.is_none() => root = Some((name, value)),
                    None => return Err(invalid("more than one root element")),
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(invalid(format!("unclosed element <{}>", open.name)));
    }
    root.ok_or_else(|| invalid("no root element"))
}
