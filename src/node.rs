//! Parsed YAML node tree.
//!
//! [`Node`] is the tree the YAML adapter walks. It is built from `yaml-rust2`'s event
//! parser rather than its loader, so aliases stay visible as [`Node::Alias`] instead of
//! being expanded, and mapping pairs keep their source order.
//!
//! ## Examples
//!
//! ```rust
//! use serde_ordered::node::{Node, NodeKind};
//!
//! let doc = Node::parse("b: 1\na: [x, y]\n").unwrap();
//! assert_eq!(doc.kind(), NodeKind::Document);
//!
//! let root = doc.unwrap_document();
//! assert_eq!(root.kind(), NodeKind::Mapping);
//! assert_eq!(root.emit().unwrap(), "b: 1\na:\n  - x\n  - y\n");
//! ```

use crate::{Error, Result};
use std::fmt;
use yaml_rust2::parser::{Event, EventReceiver, Parser, Tag};
use yaml_rust2::scanner::TScalarStyle;
use yaml_rust2::yaml::Hash as YamlHash;
use yaml_rust2::{Yaml, YamlEmitter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Document,
    Mapping,
    Sequence,
    Scalar,
    Alias,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeKind::Document => "document",
            NodeKind::Mapping => "mapping",
            NodeKind::Sequence => "sequence",
            NodeKind::Scalar => "scalar",
            NodeKind::Alias => "alias",
        };
        f.write_str(name)
    }
}

/// How a scalar was written in the source.
///
/// Only plain scalars go through type resolution; quoted and block scalars are always
/// strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarStyle {
    Plain,
    Quoted,
}

/// Prefix shared by the YAML core schema tags (`!!str`, `!!int`, ...).
pub const CORE_TAG_PREFIX: &str = "tag:yaml.org,2002:";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scalar {
    pub value: String,
    pub style: ScalarStyle,
    /// Fully resolved tag, e.g. `tag:yaml.org,2002:str` for `!!str`.
    pub tag: Option<String>,
}

impl Scalar {
    pub fn plain(value: impl Into<String>) -> Self {
        Scalar {
            value: value.into(),
            style: ScalarStyle::Plain,
            tag: None,
        }
    }

    pub fn quoted(value: impl Into<String>) -> Self {
        Scalar {
            value: value.into(),
            style: ScalarStyle::Quoted,
            tag: None,
        }
    }

    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Returns the core schema type name (`str`, `int`, `float`, `bool`, `null`) when the
    /// scalar carries one of those tags.
    #[must_use]
    pub fn core_tag(&self) -> Option<&str> {
        let name = self.tag.as_deref()?.strip_prefix(CORE_TAG_PREFIX)?;
        matches!(name, "str" | "int" | "float" | "bool" | "null").then_some(name)
    }

    /// Resolves the scalar to a typed YAML value (null, bool, integer, float or string).
    ///
    /// A core schema tag decides the type outright and yields [`Yaml::BadValue`] when the
    /// text does not fit it. Other tags are ignored.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_ordered::node::{Scalar, CORE_TAG_PREFIX};
    /// use yaml_rust2::Yaml;
    ///
    /// assert_eq!(Scalar::plain("42").resolve(), Yaml::Integer(42));
    /// assert_eq!(Scalar::plain("~").resolve(), Yaml::Null);
    /// assert_eq!(Scalar::quoted("42").resolve(), Yaml::String("42".to_string()));
    ///
    /// let tagged = Scalar::plain("42").with_tag(format!("{}str", CORE_TAG_PREFIX));
    /// assert_eq!(tagged.resolve(), Yaml::String("42".to_string()));
    /// ```
    #[must_use]
    pub fn resolve(&self) -> Yaml {
        let value = &self.value;
        match self.core_tag() {
            Some("str") => Yaml::String(value.clone()),
            Some("int") => value.parse::<i64>().map_or(Yaml::BadValue, Yaml::Integer),
            Some("float") => {
                let real = Yaml::Real(value.clone());
                if real.as_f64().is_some() {
                    real
                } else {
                    Yaml::BadValue
                }
            }
            Some("bool") => value.parse::<bool>().map_or(Yaml::BadValue, Yaml::Boolean),
            Some(_) => match value.as_str() {
                "~" | "null" | "" => Yaml::Null,
                _ => Yaml::BadValue,
            },
            None => match self.style {
                ScalarStyle::Plain => Yaml::from_str(value),
                ScalarStyle::Quoted => Yaml::String(value.clone()),
            },
        }
    }
}

fn tag_name(tag: Tag) -> String {
    let handle = if tag.handle == "!!" {
        CORE_TAG_PREFIX
    } else {
        tag.handle.as_str()
    };
    format!("{}{}", handle, tag.suffix)
}

/// A YAML node.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Document(Box<Node>),
    /// Key/value pairs in source order.
    Mapping(Vec<(Node, Node)>),
    Sequence(Vec<Node>),
    Scalar(Scalar),
    /// A reference to an anchored node, by anchor id.
    Alias(usize),
}

impl Node {
    #[must_use]
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Document(_) => NodeKind::Document,
            Node::Mapping(_) => NodeKind::Mapping,
            Node::Sequence(_) => NodeKind::Sequence,
            Node::Scalar(_) => NodeKind::Scalar,
            Node::Alias(_) => NodeKind::Alias,
        }
    }

    pub fn plain(value: impl Into<String>) -> Self {
        Node::Scalar(Scalar::plain(value))
    }

    pub fn quoted(value: impl Into<String>) -> Self {
        Node::Scalar(Scalar::quoted(value))
    }

    /// Parses the first document of `text`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Yaml`] for malformed YAML and [`Error::UnexpectedEnd`] if `text`
    /// holds no document at all.
    pub fn parse(text: &str) -> Result<Node> {
        Node::parse_all(text)?
            .into_iter()
            .next()
            .ok_or_else(|| end_of_text(text))
    }

    /// Parses every document of a multi-document stream, each wrapped in a
    /// [`Node::Document`].
    pub fn parse_all(text: &str) -> Result<Vec<Node>> {
        let mut builder = TreeBuilder::default();
        let mut parser = Parser::new(text.chars());
        parser.load(&mut builder, true).map_err(Error::yaml)?;
        Ok(builder.documents)
    }

    /// Returns the content of a document node, or the node itself.
    #[must_use]
    pub fn unwrap_document(self) -> Node {
        match self {
            Node::Document(inner) => *inner,
            other => other,
        }
    }

    /// Converts the tree to `yaml-rust2`'s value type, resolving plain scalars.
    ///
    /// # Errors
    ///
    /// Aliases cannot be converted and are reported as [`Error::UnsupportedConstruct`].
    pub fn to_yaml(&self) -> Result<Yaml> {
        match self {
            Node::Document(inner) => inner.to_yaml(),
            Node::Mapping(pairs) => {
                let mut hash = YamlHash::new();
                for (key, value) in pairs {
                    hash.insert(key.to_yaml()?, value.to_yaml()?);
                }
                Ok(Yaml::Hash(hash))
            }
            Node::Sequence(items) => items
                .iter()
                .map(Node::to_yaml)
                .collect::<Result<Vec<_>>>()
                .map(Yaml::Array),
            Node::Scalar(scalar) => match scalar.resolve() {
                Yaml::BadValue => Err(bad_tagged_value(scalar)),
                resolved => Ok(resolved),
            },
            Node::Alias(_) => Err(Error::unsupported("cannot emit an alias node")),
        }
    }

    /// Emits the tree as YAML text without a leading `---` document marker.
    pub fn emit(&self) -> Result<String> {
        let yaml = self.to_yaml()?;
        let mut out = String::new();
        YamlEmitter::new(&mut out).dump(&yaml).map_err(Error::yaml)?;

        let body = out
            .strip_prefix("---\n")
            .or_else(|| out.strip_prefix("--- "))
            .unwrap_or(&out);
        Ok(format!("{}\n", body))
    }
}

pub(crate) fn bad_tagged_value(scalar: &Scalar) -> Error {
    Error::yaml(format!(
        "invalid value {:?} for tag {}",
        scalar.value,
        scalar.tag.as_deref().unwrap_or("?")
    ))
}

fn end_of_text(text: &str) -> Error {
    let line = text.lines().count().max(1);
    let col = text.lines().last().map_or(0, |l| l.chars().count()) + 1;
    Error::unexpected_end(line, col, "a YAML document")
}

enum Frame {
    Sequence(Vec<Node>),
    Mapping(Vec<(Node, Node)>, Option<Node>),
}

#[derive(Default)]
struct TreeBuilder {
    stack: Vec<Frame>,
    root: Option<Node>,
    documents: Vec<Node>,
}

impl TreeBuilder {
    fn push_node(&mut self, node: Node) {
        match self.stack.last_mut() {
            None => self.root = Some(node),
            Some(Frame::Sequence(items)) => items.push(node),
            Some(Frame::Mapping(pairs, pending)) => match pending.take() {
                None => *pending = Some(node),
                Some(key) => pairs.push((key, node)),
            },
        }
    }
}

impl EventReceiver for TreeBuilder {
    fn on_event(&mut self, ev: Event) {
        match ev {
            Event::DocumentStart { .. } => self.root = None,
            Event::DocumentEnd { .. } => {
                if let Some(root) = self.root.take() {
                    self.documents.push(Node::Document(Box::new(root)));
                }
            }
            Event::SequenceStart { .. } => self.stack.push(Frame::Sequence(Vec::new())),
            Event::SequenceEnd => {
                if let Some(Frame::Sequence(items)) = self.stack.pop() {
                    self.push_node(Node::Sequence(items));
                }
            }
            Event::MappingStart { .. } => self.stack.push(Frame::Mapping(Vec::new(), None)),
            Event::MappingEnd => {
                if let Some(Frame::Mapping(pairs, _)) = self.stack.pop() {
                    self.push_node(Node::Mapping(pairs));
                }
            }
            Event::Scalar(value, style, _, tag) => {
                let mut scalar = if matches!(style, TScalarStyle::Plain) {
                    Scalar::plain(value)
                } else {
                    Scalar::quoted(value)
                };
                scalar.tag = tag.map(tag_name);
                self.push_node(Node::Scalar(scalar));
            }
            Event::Alias(id) => self.push_node(Node::Alias(id)),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mapping_pairs_keep_source_order() {
        let root = Node::parse("zeta: 1\nalpha: 2\nmid: 3\n")
            .unwrap()
            .unwrap_document();
        match root {
            Node::Mapping(pairs) => {
                let keys: Vec<_> = pairs
                    .iter()
                    .map(|(k, _)| match k {
                        Node::Scalar(s) => s.value.as_str(),
                        _ => panic!("expected scalar key"),
                    })
                    .collect();
                assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
            }
            other => panic!("expected mapping, got {:?}", other),
        }
    }

    #[test]
    fn test_scalar_styles() {
        let root = Node::parse("[plain, 'single', \"double\"]")
            .unwrap()
            .unwrap_document();
        assert_eq!(
            root,
            Node::Sequence(vec![
                Node::plain("plain"),
                Node::quoted("single"),
                Node::quoted("double"),
            ])
        );
    }

    #[test]
    fn test_scalar_tags_are_recorded() {
        let root = Node::parse("!!str 1: !custom x
").unwrap().unwrap_document();
        match root {
            Node::Mapping(pairs) => {
                let (key, value) = &pairs[0];
                assert_eq!(
                    key,
                    &Node::Scalar(Scalar::plain("1").with_tag("tag:yaml.org,2002:str"))
                );
                match value {
                    Node::Scalar(s) => {
                        assert_eq!(s.tag.as_deref(), Some("!custom"));
                        assert_eq!(s.core_tag(), None);
                    }
                    other => panic!("expected scalar, got {:?}", other),
                }
            }
            other => panic!("expected mapping, got {:?}", other),
        }
    }

    #[test]
    fn test_core_tags_decide_resolution() {
        let tagged = |value: &str, name: &str| {
            Scalar::plain(value).with_tag(format!("{}{}", CORE_TAG_PREFIX, name))
        };
        assert_eq!(tagged("true", "str").resolve(), Yaml::String("true".to_string()));
        assert_eq!(tagged("12", "int").resolve(), Yaml::Integer(12));
        assert_eq!(tagged("12", "float").resolve(), Yaml::Real("12".to_string()));
        assert_eq!(tagged("false", "bool").resolve(), Yaml::Boolean(false));
        assert_eq!(tagged("", "null").resolve(), Yaml::Null);
        assert_eq!(tagged("x", "int").resolve(), Yaml::BadValue);
        assert_eq!(tagged("yes", "bool").resolve(), Yaml::BadValue);
        assert_eq!(
            Scalar::quoted("7").with_tag(format!("{}int", CORE_TAG_PREFIX)).resolve(),
            Yaml::Integer(7)
        );
        assert_eq!(Scalar::plain("7").with_tag("!local").resolve(), Yaml::Integer(7));

        let bad = Node::Scalar(tagged("x", "int"));
        assert!(matches!(bad.emit(), Err(Error::Yaml(_))));
    }

    #[test]
    fn test_aliases_stay_visible() {
        let root = Node::parse("a: &x 1\nb: *x\n").unwrap().unwrap_document();
        match root {
            Node::Mapping(pairs) => assert_eq!(pairs[1].1.kind(), NodeKind::Alias),
            other => panic!("expected mapping, got {:?}", other),
        }
    }

    #[test]
    fn test_multiple_documents() {
        let docs = Node::parse_all("---\na: 1\n---\n- x\n").unwrap();
        assert_eq!(docs.len(), 2);
        assert!(docs.iter().all(|d| d.kind() == NodeKind::Document));
    }

    #[test]
    fn test_empty_text_has_no_document() {
        assert!(matches!(Node::parse(""), Err(Error::UnexpectedEnd { .. })));
        assert!(matches!(Node::parse("a: [1"), Err(Error::Yaml(_))));
    }

    #[test]
    fn test_emit_strips_document_marker() {
        let node = Node::Mapping(vec![(Node::plain("k"), Node::quoted("true"))]);
        assert_eq!(node.emit().unwrap(), "k: \"true\"\n");

        assert_eq!(Node::Mapping(vec![]).emit().unwrap(), "{}\n");
        assert!(Node::Alias(0).emit().is_err());
    }
}
