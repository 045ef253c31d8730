//! YAML adapter.
//!
//! Walks a parsed [`Node`] tree into a [`YamlValue`] (or a typed [`OrderedMap`]) and
//! back. Mappings keep their pair order, and keys keep the type they were written with:
//! `1`, `1.5`, `true` and `~` are integer, float, bool and null keys.
//!
//! Aliases are not expanded; meeting one is an [`Error::UnsupportedConstruct`].
//! Core schema tags (`!!str`, `!!int`, `!!float`, `!!bool`, `!!null`) override the plain
//! scalar rules; any other tag is ignored.
//!
//! ## Examples
//!
//! ```rust
//! use serde_ordered::{yaml, Key, YamlValue};
//!
//! let text = "zeta: 1\n1: int key\n~: null key\n";
//! let value: YamlValue = yaml::from_str(text).unwrap();
//!
//! let keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
//! assert_eq!(keys, vec![Key::from("zeta"), Key::Integer(1), Key::Null]);
//!
//! assert_eq!(yaml::to_string(&value).unwrap(), text);
//! ```

use crate::node::{bad_tagged_value, Node, Scalar, ScalarStyle};
use crate::{from_value, to_value, Error, Key, Number, ObjectKey, OrderedMap, Result, Value, YamlValue};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::hash::Hash;
use yaml_rust2::Yaml;

/// Types that can be decoded from a YAML node tree.
pub trait FromYaml: Sized {
    fn from_node(node: &Node) -> Result<Self>;
}

/// Types that can be encoded as a YAML node tree.
pub trait ToYaml {
    fn to_node(&self) -> Result<Node>;
}

impl FromYaml for YamlValue {
    fn from_node(node: &Node) -> Result<Self> {
        decode_node(root(node))
    }
}

/// A typed map. Each key and value is decoded to a [`YamlValue`] first and then
/// deserialized into `K` / `V`.
impl<K, V> FromYaml for OrderedMap<K, V>
where
    K: DeserializeOwned + Eq + Hash + Clone,
    V: DeserializeOwned,
{
    fn from_node(node: &Node) -> Result<Self> {
        match root(node) {
            Node::Mapping(pairs) => {
                let mut map = OrderedMap::with_capacity(pairs.len());
                for (key, value) in pairs {
                    key_scalar(key)?;
                    let key = decode_typed::<K>(key)?;
                    map.insert(key, decode_typed::<V>(value)?);
                }
                Ok(map)
            }
            other => Err(Error::unsupported(&format!(
                "expected a mapping, got a {}",
                other.kind()
            ))),
        }
    }
}

impl ToYaml for YamlValue {
    fn to_node(&self) -> Result<Node> {
        encode_value(self)
    }
}

impl<K, V> ToYaml for OrderedMap<K, V>
where
    K: Serialize + Eq + Hash,
    V: Serialize,
{
    fn to_node(&self) -> Result<Node> {
        let entries = self.checked_entries()?;
        let mut pairs = Vec::with_capacity(entries.len());
        for (key, value) in entries {
            let key = Key::from_value(to_value(key)?)?;
            let value: YamlValue = to_value(value)?;
            pairs.push((encode_value(&key.into_value())?, encode_value(&value)?));
        }
        Ok(Node::Mapping(pairs))
    }
}

/// Parses YAML text and decodes its first document.
///
/// # Examples
///
/// ```rust
/// use serde_ordered::{yaml, OrderedMap};
///
/// let map: OrderedMap<String, u32> = yaml::from_str("aaa: 1\nccc: 2\nbbb: 3\n").unwrap();
/// let keys: Vec<_> = map.keys().map(String::as_str).collect();
/// assert_eq!(keys, vec!["aaa", "ccc", "bbb"]);
/// ```
///
/// # Errors
///
/// Returns [`Error::Yaml`] for malformed text and [`Error::UnsupportedConstruct`] for
/// aliases, non-scalar keys and (for typed maps) non-mapping documents.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_str<T>(text: &str) -> Result<T>
where
    T: FromYaml,
{
    T::from_node(&Node::parse(text)?)
}

#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_node<T>(node: &Node) -> Result<T>
where
    T: FromYaml,
{
    T::from_node(node)
}

#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_node<T>(value: &T) -> Result<Node>
where
    T: ?Sized + ToYaml,
{
    value.to_node()
}

/// Encodes a value as YAML text in recorded key order.
///
/// # Examples
///
/// ```rust
/// use serde_ordered::{yaml, OrderedMap};
///
/// let mut map = OrderedMap::new();
/// map.insert("ccc".to_string(), vec![1]);
/// map.insert("aaa".to_string(), vec![]);
/// assert_eq!(yaml::to_string(&map).unwrap(), "ccc:\n  - 1\naaa: []\n");
/// ```
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string<T>(value: &T) -> Result<String>
where
    T: ?Sized + ToYaml,
{
    value.to_node()?.emit()
}

fn root(node: &Node) -> &Node {
    match node {
        Node::Document(inner) => inner,
        other => other,
    }
}

fn key_scalar(node: &Node) -> Result<&Scalar> {
    match node {
        Node::Scalar(scalar) => Ok(scalar),
        other => Err(Error::unsupported(&format!(
            "a mapping key must be a scalar, got a {}",
            other.kind()
        ))),
    }
}

fn decode_node(node: &Node) -> Result<YamlValue> {
    match node {
        Node::Document(_) => Err(Error::unsupported("unexpected document node")),
        Node::Alias(_) => Err(Error::unsupported("unexpected alias node")),
        Node::Scalar(scalar) => decode_scalar(scalar),
        Node::Sequence(items) => items
            .iter()
            .map(decode_node)
            .collect::<Result<Vec<_>>>()
            .map(Value::Array),
        Node::Mapping(pairs) => {
            let mut map = OrderedMap::with_capacity(pairs.len());
            for (key, value) in pairs {
                let key = Key::from_value(decode_scalar(key_scalar(key)?)?)?;
                map.insert(key, decode_node(value)?);
            }
            Ok(Value::Object(map))
        }
    }
}

fn decode_scalar(scalar: &Scalar) -> Result<YamlValue> {
    let resolved = scalar.resolve();
    match &resolved {
        Yaml::Null => Ok(Value::Null),
        Yaml::Boolean(b) => Ok(Value::Bool(*b)),
        Yaml::Integer(i) => Ok(Value::Number(Number::Integer(*i))),
        Yaml::Real(text) => resolved
            .as_f64()
            .map(|f| Value::Number(Number::Float(f)))
            .ok_or_else(|| Error::yaml(format!("invalid float {:?}", text))),
        Yaml::String(s) => Ok(Value::String(s.clone())),
        Yaml::BadValue => Err(bad_tagged_value(scalar)),
        other => Err(Error::unsupported(&format!("unexpected scalar {:?}", other))),
    }
}

/// Decodes a node into `T`. An untagged plain scalar that resolved to a non-string type
/// is retried as its source text, so `1: x` fills a `String`-keyed map.
fn decode_typed<T>(node: &Node) -> Result<T>
where
    T: DeserializeOwned,
{
    let value = decode_node(node)?;
    match node {
        Node::Scalar(scalar)
            if scalar.style == ScalarStyle::Plain
                && scalar.tag.is_none()
                && !value.is_string() =>
        {
            from_value(value).or_else(|err| {
                from_value(YamlValue::String(scalar.value.clone())).map_err(|_| err)
            })
        }
        _ => from_value(value),
    }
}

fn format_float(f: f64) -> String {
    if f.is_nan() {
        ".nan".to_string()
    } else if f == f64::INFINITY {
        ".inf".to_string()
    } else if f == f64::NEG_INFINITY {
        "-.inf".to_string()
    } else {
        format!("{:?}", f)
    }
}

fn encode_value(value: &YamlValue) -> Result<Node> {
    match value {
        Value::Null => Ok(Node::plain("null")),
        Value::Bool(b) => Ok(Node::plain(b.to_string())),
        Value::Number(Number::Float(f)) => Ok(Node::plain(format_float(*f))),
        Value::Number(n) => Ok(Node::plain(n.to_string())),
        Value::String(s) => Ok(Node::quoted(s.as_str())),
        Value::Array(items) => items
            .iter()
            .map(encode_value)
            .collect::<Result<Vec<_>>>()
            .map(Node::Sequence),
        Value::Object(obj) => {
            let entries = obj.checked_entries()?;
            let mut pairs = Vec::with_capacity(entries.len());
            for (key, value) in entries {
                pairs.push((encode_value(&key.clone().into_value())?, encode_value(value)?));
            }
            Ok(Node::Mapping(pairs))
        }
    }
}
