//! Document validation: the media-type contract, well-formedness, and the
//! root tag.
//!
//! Uses `quick-xml`'s event reader to build a small owned element tree; the
//! extractor then walks that tree instead of the raw event stream.

use std::fmt::Display;

use quick_xml::{
  Reader,
  events::{BytesStart, Event},
};

use crate::{CONTENT_TYPE, Error, ROOT_TAG, Result};

/// Deepest element nesting accepted. Result documents need three levels.
pub const MAX_DEPTH: usize = 16;

// ─── Element tree ────────────────────────────────────────────────────────────

/// An owned XML element: name, attributes, child elements, and its own
/// (trimmed, unescaped) character data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
  pub name:       String,
  pub attributes: Vec<(String, String)>,
  pub children:   Vec<Element>,
  pub text:       String,
}

impl Element {
  /// The first child element called `name`.
  pub fn child(&self, name: &str) -> Option<&Element> {
    self.children.iter().find(|c| c.name == name)
  }

  /// Every child element called `name`, in document order.
  pub fn children_named<'a>(
    &'a self,
    name: &'a str,
  ) -> impl Iterator<Item = &'a Element> + 'a {
    self.children.iter().filter(move |c| c.name == name)
  }

  pub fn attribute(&self, name: &str) -> Option<&str> {
    self
      .attributes
      .iter()
      .find(|(k, _)| k == name)
      .map(|(_, v)| v.as_str())
  }
}

// ─── Validation ──────────────────────────────────────────────────────────────

/// Check `payload` against the result-document contract and return its root.
///
/// The content type is checked first, before any parsing is attempted.
pub fn validate(payload: &[u8], content_type: Option<&str>) -> Result<Element> {
  match content_type {
    Some(ct) if ct == CONTENT_TYPE => {}
    other => {
      return Err(Error::UnsupportedMediaType(other.unwrap_or_default().to_string()));
    }
  }

  let root = parse_tree(payload)?;
  if root.name != ROOT_TAG {
    return Err(Error::UnexpectedDocumentShape(root.name));
  }
  Ok(root)
}

/// Parse a complete XML document into its root [`Element`].
pub fn parse_tree(xml: &[u8]) -> Result<Element> {
  let mut reader = Reader::from_reader(xml);
  reader.config_mut().trim_text(true);

  let mut open: Vec<Element> = Vec::new();
  let mut root: Option<Element> = None;
  let mut buf = Vec::new();

  loop {
    match reader.read_event_into(&mut buf) {
      Ok(Event::Start(ref e)) => {
        if open.len() >= MAX_DEPTH {
          return Err(malformed(format!("elements nested deeper than {MAX_DEPTH}")));
        }
        open.push(element(e)?);
      }
      Ok(Event::Empty(ref e)) => attach(element(e)?, &mut open, &mut root)?,
      Ok(Event::End(_)) => {
        // quick-xml has already matched the end tag against its start tag.
        let done = open.pop().ok_or_else(|| malformed("unmatched closing tag"))?;
        attach(done, &mut open, &mut root)?;
      }
      Ok(Event::Text(ref t)) => {
        let text = t.unescape().map_err(malformed)?;
        push_text(&text, &mut open)?;
      }
      Ok(Event::CData(ref c)) => {
        let text = std::str::from_utf8(c).map_err(malformed)?;
        push_text(text, &mut open)?;
      }
      Ok(Event::Eof) => break,
      // Declarations, comments, processing instructions, doctypes.
      Ok(_) => {}
      Err(e) => return Err(malformed(e)),
    }
    buf.clear();
  }

  if let Some(unclosed) = open.last() {
    return Err(malformed(format!("unclosed element <{}>", unclosed.name)));
  }
  root.ok_or_else(|| malformed("no root element"))
}

fn element(start: &BytesStart<'_>) -> Result<Element> {
  let name = std::str::from_utf8(start.name().as_ref())
    .map_err(malformed)?
    .to_owned();

  let mut attributes = Vec::new();
  for attr in start.attributes() {
    let attr = attr.map_err(malformed)?;
    let key = std::str::from_utf8(attr.key.as_ref())
      .map_err(malformed)?
      .to_owned();
    let value = attr.unescape_value().map_err(malformed)?.into_owned();
    attributes.push((key, value));
  }

  Ok(Element { name, attributes, ..Element::default() })
}

/// Hand a finished element to its parent, or make it the root.
fn attach(
  done: Element,
  open: &mut [Element],
  root: &mut Option<Element>,
) -> Result<()> {
  match open.last_mut() {
    Some(parent) => parent.children.push(done),
    None if root.is_none() => *root = Some(done),
    None => return Err(malformed("more than one root element")),
  }
  Ok(())
}

fn push_text(text: &str, open: &mut [Element]) -> Result<()> {
  match open.last_mut() {
    Some(parent) => parent.text.push_str(text),
    None if text.trim().is_empty() => {}
    None => return Err(malformed("text outside the root element")),
  }
  Ok(())
}

fn malformed(e: impl Display) -> Error { Error::MalformedDocument(e.to_string()) }
