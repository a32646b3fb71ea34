//! MSBuild project descriptor tree.
//!
//! Reads a `.csproj` file into a small owned element tree and writes it back
//! with uniform indentation. Whitespace-only text between elements is not
//! significant and is regenerated by the writer.

use std::borrow::Cow;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use quick_xml::escape::partial_escape;
use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesPI, BytesStart, BytesText, Event};
use quick_xml::name::QName;
use quick_xml::{Reader, Writer};

use crate::error::{Result, UnpackError};

/// Tag of the root element every project file must have.
pub const PROJECT_TAG: &str = "Project";

/// A node inside the descriptor tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// A nested element
    Element(Element),
    /// Character data (unescaped)
    Text(String),
    /// A `<![CDATA[...]]>` section
    CData(String),
    /// A comment body, without the `<!--` and `-->` markers
    Comment(String),
    /// The `<?xml ...?>` declaration
    Declaration(Declaration),
    /// A `<!DOCTYPE ...>` body
    DocType(String),
    /// A processing instruction body
    ProcessingInstruction(String),
}

/// The `<?xml ...?>` declaration fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    /// XML version, usually `1.0`
    pub version: String,
    /// Declared encoding
    pub encoding: Option<String>,
    /// Declared standalone flag
    pub standalone: Option<String>,
}

/// An element with its attributes (in document order) and children.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    /// Tag name
    pub name: String,
    /// Attributes as written in the source
    pub attributes: Vec<(String, String)>,
    /// Child nodes in document order
    pub children: Vec<Node>,
}

impl Element {
    /// Create an empty element.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Create an element holding a single text node.
    pub fn with_text(name: impl Into<String>, text: impl Into<String>) -> Self {
        let mut element = Self::new(name);
        element.children.push(Node::Text(text.into()));
        element
    }

    /// Look up an attribute value.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Direct child elements in document order.
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(e) => Some(e),
            _ => None,
        })
    }

    /// Mutable direct child elements in document order.
    pub fn child_elements_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.children.iter_mut().filter_map(|node| match node {
            Node::Element(e) => Some(e),
            _ => None,
        })
    }

    /// Direct child elements with the given tag.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> {
        self.child_elements().filter(move |e| e.name == name)
    }

    /// First direct child element with the given tag.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.child_elements().find(|e| e.name == name)
    }

    /// Character data directly inside this element, CDATA included.
    pub fn text(&self) -> String {
        let mut text = String::new();
        for node in &self.children {
            match node {
                Node::Text(t) | Node::CData(t) => text.push_str(t),
                _ => {}
            }
        }
        text
    }

    /// Append a child element after the existing children.
    pub fn push_child(&mut self, child: Element) {
        self.children.push(Node::Element(child));
    }
}

/// A parsed project file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectDescriptor {
    /// Nodes before the root element
    pub prolog: Vec<Node>,
    /// The single root element
    pub root: Element,
    /// Nodes after the root element
    pub epilog: Vec<Node>,
}

impl ProjectDescriptor {
    /// Load and parse a descriptor from disk.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| UnpackError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::parse_at(&content, path)
    }

    /// Parse a descriptor from a string.
    pub fn parse(xml: &str) -> Result<Self> {
        Self::parse_at(xml, Path::new(""))
    }

    fn parse_at(xml: &str, path: &Path) -> Result<Self> {
        let parse_err = |message: String| UnpackError::Parse {
            path: path.to_path_buf(),
            message,
        };

        let xml = xml.strip_prefix('\u{feff}').unwrap_or(xml);
        let mut reader = Reader::from_str(xml);

        let mut prolog = Vec::new();
        let mut epilog = Vec::new();
        let mut root: Option<Element> = None;
        let mut stack: Vec<Element> = Vec::new();
        let mut buf = Vec::new();

        loop {
            let node = match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => {
                    stack.push(element_from_start(e).map_err(parse_err)?);
                    None
                }
                Ok(Event::End(_)) => match stack.pop() {
                    Some(done) => Some(Node::Element(done)),
                    None => return Err(parse_err("unexpected closing tag".to_string())),
                },
                Ok(Event::Empty(ref e)) => {
                    Some(Node::Element(element_from_start(e).map_err(parse_err)?))
                }
                Ok(Event::Text(ref e)) => {
                    let text = e.unescape().map_err(|e| parse_err(e.to_string()))?;
                    // Indentation only; the writer regenerates it
                    if text.trim().is_empty() {
                        None
                    } else {
                        Some(Node::Text(text.into_owned()))
                    }
                }
                Ok(Event::CData(ref e)) => {
                    Some(Node::CData(String::from_utf8_lossy(e.as_ref()).to_string()))
                }
                Ok(Event::Comment(ref e)) => {
                    Some(Node::Comment(String::from_utf8_lossy(e).to_string()))
                }
                Ok(Event::Decl(ref e)) => {
                    Some(Node::Declaration(declaration_from(e).map_err(parse_err)?))
                }
                Ok(Event::DocType(ref e)) => {
                    Some(Node::DocType(String::from_utf8_lossy(e).to_string()))
                }
                Ok(Event::PI(ref e)) => Some(Node::ProcessingInstruction(
                    String::from_utf8_lossy(e).to_string(),
                )),
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(parse_err(format!(
                        "XML error at position {}: {}",
                        reader.buffer_position(),
                        e
                    )))
                }
                #[allow(unreachable_patterns)]
                Ok(_) => None,
            };
            buf.clear();

            let Some(node) = node else {
                continue;
            };

            if let Some(parent) = stack.last_mut() {
                parent.children.push(node);
                continue;
            }

            // Top level
            match node {
                Node::Element(element) => {
                    if root.is_some() {
                        return Err(parse_err(format!(
                            "more than one root element (found <{}>)",
                            element.name
                        )));
                    }
                    root = Some(element);
                }
                Node::Text(_) | Node::CData(_) => {
                    return Err(parse_err("text outside of the root element".to_string()));
                }
                other if root.is_none() => prolog.push(other),
                other => epilog.push(other),
            }
        }

        if let Some(open) = stack.last() {
            return Err(parse_err(format!("unclosed element <{}>", open.name)));
        }

        let root = root.ok_or_else(|| UnpackError::Structure {
            path: path.to_path_buf(),
            expected: PROJECT_TAG.to_string(),
        })?;

        Ok(Self {
            prolog,
            root,
            epilog,
        })
    }

    /// Ensure the root element carries the expected tag.
    pub fn require_root(&self, tag: &str, path: &Path) -> Result<&Element> {
        if self.root.name == tag {
            Ok(&self.root)
        } else {
            Err(UnpackError::Structure {
                path: path.to_path_buf(),
                expected: tag.to_string(),
            })
        }
    }

    /// Serialize the tree, indenting nested elements by `indent` spaces.
    pub fn to_xml_string(&self, indent: usize) -> std::result::Result<String, String> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', indent);

        for node in &self.prolog {
            write_node(&mut writer, node)?;
        }
        write_element(&mut writer, &self.root)?;
        for node in &self.epilog {
            write_node(&mut writer, node)?;
        }

        let mut result = writer.into_inner();
        result.push(b'\n');
        Ok(String::from_utf8_lossy(&result).to_string())
    }

    /// Write the tree back to `path`, replacing its contents.
    pub fn save<P: AsRef<Path>>(&self, path: P, indent: usize) -> Result<()> {
        let path = path.as_ref();
        let content = self
            .to_xml_string(indent)
            .map_err(|msg| write_err(path, msg))?;

        let mut file = fs::File::create(path).map_err(|e| UnpackError::write(path, e))?;
        file.write_all(content.as_bytes())
            .map_err(|e| UnpackError::write(path, e))?;
        tracing::debug!("Wrote {} bytes to {}", content.len(), path.display());
        Ok(())
    }
}

fn write_err(path: &Path, msg: String) -> UnpackError {
    UnpackError::write(
        PathBuf::from(path),
        std::io::Error::new(std::io::ErrorKind::InvalidData, msg),
    )
}

fn element_from_start(e: &BytesStart) -> std::result::Result<Element, String> {
    let mut element = Element::new(String::from_utf8_lossy(e.name().as_ref()).to_string());
    for attr in e.attributes() {
        let attr = attr.map_err(|e| e.to_string())?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
        let value = attr.unescape_value().map_err(|e| e.to_string())?;
        element.attributes.push((key, value.into_owned()));
    }
    Ok(element)
}

fn declaration_from(e: &BytesDecl) -> std::result::Result<Declaration, String> {
    let version = e.version().map_err(|e| e.to_string())?;
    let encoding = e.encoding().transpose().map_err(|e| e.to_string())?;
    let standalone = e.standalone().transpose().map_err(|e| e.to_string())?;
    Ok(Declaration {
        version: lossy(version),
        encoding: encoding.map(lossy),
        standalone: standalone.map(lossy),
    })
}

fn lossy(raw: Cow<'_, [u8]>) -> String {
    String::from_utf8_lossy(&raw).to_string()
}

/// Escape an attribute value for a double-quoted attribute, leaving
/// apostrophes alone so MSBuild conditions stay readable.
fn escape_attribute(value: &str) -> String {
    partial_escape(value).replace('"', "&quot;")
}

fn write_node<W: Write>(writer: &mut Writer<W>, node: &Node) -> std::result::Result<(), String> {
    let event = match node {
        Node::Element(element) => return write_element(writer, element),
        Node::Text(text) => Event::Text(BytesText::from_escaped(partial_escape(text.as_str()))),
        Node::CData(data) => Event::CData(BytesCData::new(data.as_str())),
        Node::Comment(body) => Event::Comment(BytesText::from_escaped(body.as_str())),
        Node::Declaration(decl) => Event::Decl(BytesDecl::new(
            &decl.version,
            decl.encoding.as_deref(),
            decl.standalone.as_deref(),
        )),
        Node::DocType(body) => Event::DocType(BytesText::from_escaped(body.as_str())),
        Node::ProcessingInstruction(body) => Event::PI(BytesPI::new(body.as_str())),
    };
    writer.write_event(event).map_err(|e| e.to_string())
}

fn write_element<W: Write>(
    writer: &mut Writer<W>,
    element: &Element,
) -> std::result::Result<(), String> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in &element.attributes {
        start.push_attribute(Attribute {
            key: QName(key.as_bytes()),
            value: Cow::Owned(escape_attribute(value).into_bytes()),
        });
    }

    if element.children.is_empty() {
        return writer
            .write_event(Event::Empty(start))
            .map_err(|e| e.to_string());
    }

    writer
        .write_event(Event::Start(start))
        .map_err(|e| e.to_string())?;
    for child in &element.children {
        write_node(writer, child)?;
    }
    writer
        .write_event(Event::End(BytesEnd::new(element.name.as_str())))
        .map_err(|e| e.to_string())
}
