//! Owned XML element tree with the small set of lookups feed normalization needs.
//!
//! Documents are built once from text using `quick-xml` and are read-only
//! afterwards. Lookups mirror what a DOM offers for tag-name queries:
//!
//! - [`Element::find`] - first descendant with a given tag name
//! - [`Element::find_all`] - every descendant with a given tag name
//! - [`Element::attr`] - attribute by qualified name
//! - [`Element::text`] - concatenated text content of the subtree
//!
//! Tag names are compared against the element's *local* name (namespace
//! prefix stripped) and are case-sensitive, so `find("link")` also matches
//! `<atom:link>`.

use std::borrow::Cow;
use std::str::FromStr;

use encoding_rs::{Encoding, UTF_16BE, UTF_16LE, UTF_8};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use thiserror::Error;

/// SEC-003: Maximum element nesting depth accepted while building a tree.
/// Feeds are shallow; anything deeper is almost certainly hostile.
pub const MAX_DEPTH: usize = 256;

/// Errors that can occur while building a [`Document`].
#[derive(Debug, Error)]
pub enum XmlError {
    /// The underlying reader rejected the input.
    #[error("XML parse error at byte {position}: {message}")]
    Parse { position: u64, message: String },

    /// SEC-003: Element nesting exceeds [`MAX_DEPTH`].
    #[error("XML nesting depth exceeds maximum of {0} levels")]
    MaxDepthExceeded(usize),

    /// Input ended while elements were still open.
    #[error("Unclosed element <{0}>")]
    Unclosed(String),

    /// A closing tag appeared with nothing open.
    #[error("Unexpected closing tag </{0}>")]
    UnexpectedEnd(String),

    /// A second top-level element followed the root.
    #[error("Document has more than one root element")]
    MultipleRoots,

    /// The input contained no element at all.
    #[error("Document has no root element")]
    NoRoot,

    /// The input was detected as UTF-8 but is not valid UTF-8.
    #[error("Document is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    /// The XML declaration names an encoding we cannot decode.
    #[error("Unsupported document encoding: {0}")]
    UnknownEncoding(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Node {
    Element(Element),
    Text(String),
}

/// A single element and its owned subtree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Node>,
}

impl Element {
    /// Qualified tag name as written, e.g. `atom:link`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Tag name with any namespace prefix removed.
    pub fn local_name(&self) -> &str {
        self.name
            .rsplit_once(':')
            .map_or(self.name.as_str(), |(_, local)| local)
    }

    /// Whether this element's local name is exactly `tag`.
    pub fn is(&self, tag: &str) -> bool {
        self.local_name() == tag
    }

    /// Value of the attribute with the given qualified name.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Direct child elements in document order.
    pub fn children(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        })
    }

    /// All descendant elements in document order, excluding `self`.
    pub fn descendants(&self) -> impl Iterator<Item = &Element> {
        self.walk().map(|(_, element)| element)
    }

    /// First descendant whose local name is `tag`.
    pub fn find(&self, tag: &str) -> Option<&Element> {
        self.descendants().find(|element| element.is(tag))
    }

    /// Every descendant whose local name is `tag`, in document order.
    pub fn find_all<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.descendants().filter(move |element| element.is(tag))
    }

    /// First descendant named `tag` whose direct parent is named `parent`.
    ///
    /// Equivalent to the CSS selector `parent > tag` evaluated against this
    /// element's subtree; `self` may act as the parent.
    pub fn find_child_of(&self, parent: &str, tag: &str) -> Option<&Element> {
        self.walk()
            .find(|(p, element)| p.is(parent) && element.is(tag))
            .map(|(_, element)| element)
    }

    /// Concatenated text and CDATA of the whole subtree, untrimmed.
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for node in &self.children {
            match node {
                Node::Text(text) => out.push_str(text),
                Node::Element(element) => element.collect_text(out),
            }
        }
    }

    fn walk(&self) -> Walk<'_> {
        Walk {
            stack: vec![(self, self.children.iter())],
        }
    }
}

/// Pre-order traversal yielding `(parent, element)` pairs.
struct Walk<'a> {
    stack: Vec<(&'a Element, std::slice::Iter<'a, Node>)>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = (&'a Element, &'a Element);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (parent, next) = {
                let (parent, iter) = self.stack.last_mut()?;
                (*parent, iter.next())
            };
            match next {
                Some(Node::Element(child)) => {
                    self.stack.push((child, child.children.iter()));
                    return Some((parent, child));
                }
                Some(Node::Text(_)) => {}
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}

/// A parsed, well-formed XML document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    root: Element,
}

impl Document {
    /// Builds a document from XML text.
    ///
    /// # Security
    ///
    /// SEC-002: `quick-xml` (0.37) never reads `<!ENTITY>` declarations, and
    /// text is unescaped with the predefined-entity resolver only. A document
    /// referencing a custom entity (`&xxe;`) is rejected with
    /// [`XmlError::Parse`] instead of being expanded.
    pub fn parse(input: &str) -> Result<Self, XmlError> {
        let input = input.strip_prefix('\u{feff}').unwrap_or(input);
        let mut reader = Reader::from_str(input);

        let mut open: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            let event = reader.read_event().map_err(|e| XmlError::Parse {
                position: reader.error_position(),
                message: e.to_string(),
            })?;

            match event {
                Event::Start(start) => {
                    // SEC-003: Reject excessively nested documents
                    if open.len() >= MAX_DEPTH {
                        return Err(XmlError::MaxDepthExceeded(MAX_DEPTH));
                    }
                    open.push(element_from(&start, &reader)?);
                }
                Event::Empty(start) => {
                    let element = element_from(&start, &reader)?;
                    attach(&mut open, &mut root, element)?;
                }
                Event::End(end) => {
                    let element = open.pop().ok_or_else(|| {
                        XmlError::UnexpectedEnd(String::from_utf8_lossy(end.name().as_ref()).into())
                    })?;
                    attach(&mut open, &mut root, element)?;
                }
                Event::Text(text) => {
                    if let Some(parent) = open.last_mut() {
                        let text = text.unescape().map_err(|e| parse_error(&reader, e))?;
                        push_text(parent, text);
                    }
                }
                Event::CData(cdata) => {
                    if let Some(parent) = open.last_mut() {
                        let text = reader
                            .decoder()
                            .decode(&cdata)
                            .map_err(|e| parse_error(&reader, e))?;
                        push_text(parent, text);
                    }
                }
                Event::Eof => break,
                // Declarations, comments, processing instructions, DOCTYPE
                _ => {}
            }
        }

        if let Some(unclosed) = open.pop() {
            return Err(XmlError::Unclosed(unclosed.name));
        }

        let root = root.ok_or(XmlError::NoRoot)?;
        tracing::trace!(root = %root.name, "Built XML document");
        Ok(Self { root })
    }

    /// Builds a document from raw bytes in any encoding it declares.
    ///
    /// The encoding is taken from a byte order mark, then from the UTF-16
    /// shape of a leading `<?`, then from the declaration's `encoding`
    /// pseudo-attribute, and is UTF-8 otherwise. UTF-8 is decoded strictly;
    /// other encodings replace undecodable bytes.
    pub fn parse_bytes(bytes: &[u8]) -> Result<Self, XmlError> {
        Self::parse(&decode_document(bytes)?)
    }

    /// The document element.
    pub fn root(&self) -> &Element {
        &self.root
    }

    /// Every element in document order, root included.
    pub fn descendants(&self) -> impl Iterator<Item = &Element> {
        std::iter::once(&self.root).chain(self.root.descendants())
    }

    /// First element in the document whose local name is `tag`.
    pub fn find(&self, tag: &str) -> Option<&Element> {
        self.descendants().find(|element| element.is(tag))
    }

    /// Every element in the document whose local name is `tag`.
    pub fn find_all<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.descendants().filter(move |element| element.is(tag))
    }
}

impl FromStr for Document {
    type Err = XmlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn decode_document(bytes: &[u8]) -> Result<Cow<'_, str>, XmlError> {
    let (encoding, bom_len) = detect_encoding(bytes)?;
    let body = &bytes[bom_len..];

    if encoding == UTF_8 {
        return Ok(Cow::Borrowed(std::str::from_utf8(body)?));
    }

    let (text, had_errors) = encoding.decode_without_bom_handling(body);
    if had_errors {
        tracing::warn!(encoding = encoding.name(), "Replaced undecodable bytes in document");
    }
    tracing::debug!(encoding = encoding.name(), "Decoded non-UTF-8 document");
    Ok(text)
}

fn detect_encoding(bytes: &[u8]) -> Result<(&'static Encoding, usize), XmlError> {
    if let Some(found) = Encoding::for_bom(bytes) {
        return Ok(found);
    }

    match bytes {
        [0x3C, 0x00, 0x3F, 0x00, ..] => return Ok((UTF_16LE, 0)),
        [0x00, 0x3C, 0x00, 0x3F, ..] => return Ok((UTF_16BE, 0)),
        _ => {}
    }

    match declared_encoding(bytes) {
        // Reaching the declaration means the bytes are ASCII-compatible, so a
        // declared UTF-16 is wrong; output_encoding() maps it to UTF-8.
        Some(label) => Encoding::for_label(label.as_bytes())
            .map(|encoding| (encoding.output_encoding(), 0))
            .ok_or(XmlError::UnknownEncoding(label)),
        None => Ok((UTF_8, 0)),
    }
}

/// Value of `encoding="..."` in a leading `<?xml ... ?>` declaration.
fn declared_encoding(bytes: &[u8]) -> Option<String> {
    let decl = bytes.strip_prefix(b"<?xml")?;
    let end = decl.windows(2).position(|pair| pair == b"?>")?;
    let decl = std::str::from_utf8(&decl[..end]).ok()?;

    let rest = &decl[decl.find("encoding")? + "encoding".len()..];
    let rest = rest.trim_start().strip_prefix('=')?.trim_start();
    let quote = rest.chars().next().filter(|c| *c == '"' || *c == '\'')?;
    let value = &rest[1..];
    let close = value.find(quote)?;
    Some(value[..close].trim().to_string())
}

fn parse_error(reader: &Reader<&[u8]>, e: impl std::fmt::Display) -> XmlError {
    XmlError::Parse {
        position: reader.buffer_position(),
        message: e.to_string(),
    }
}

fn element_from(start: &BytesStart<'_>, reader: &Reader<&[u8]>) -> Result<Element, XmlError> {
    let decoder = reader.decoder();
    let name = decoder
        .decode(start.name().as_ref())
        .map_err(|e| parse_error(reader, e))?
        .into_owned();

    let mut attributes = Vec::new();
    for attr_result in start.attributes() {
        let attr = match attr_result {
            Ok(attr) => attr,
            Err(e) => {
                tracing::warn!(element = %name, error = %e, "Skipping malformed XML attribute");
                continue;
            }
        };
        let key = decoder
            .decode(attr.key.as_ref())
            .map_err(|e| parse_error(reader, e))?
            .into_owned();
        let value = attr
            .decode_and_unescape_value(decoder)
            .map_err(|e| parse_error(reader, e))?
            .into_owned();
        attributes.push((key, value));
    }

    Ok(Element {
        name,
        attributes,
        children: Vec::new(),
    })
}

fn attach(
    open: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
) -> Result<(), XmlError> {
    match open.last_mut() {
        Some(parent) => {
            parent.children.push(Node::Element(element));
            Ok(())
        }
        None if root.is_some() => Err(XmlError::MultipleRoots),
        None => {
            *root = Some(element);
            Ok(())
        }
    }
}

fn push_text(parent: &mut Element, text: Cow<'_, str>) {
    // Adjacent text and CDATA runs read the same as one node
    if let Some(Node::Text(last)) = parent.children.last_mut() {
        last.push_str(&text);
    } else {
        parent.children.push(Node::Text(text.into_owned()));
    }
}
