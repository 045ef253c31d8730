//! # serde_ordered
//!
//! Order-preserving generic values for JSON and YAML.
//!
//! Generic decoders usually materialize objects into hash maps and lose the order in
//! which keys were written. This crate decodes documents of unknown shape into a
//! [`Value`] tree where every object is an [`OrderedMap`], so re-encoding writes the keys
//! back exactly as they came in, at every nesting level.
//!
//! ## Key Features
//!
//! - **Order preserving**: objects remember first-insertion order; re-assigning a key
//!   keeps its position, removing and re-inserting it moves it to the end
//! - **Delegated literals**: numbers, strings and keywords are decoded and encoded by
//!   `serde_json`; only the structure is parsed here
//! - **YAML too**: a node-tree adapter over `yaml-rust2`, with keys of any scalar type
//! - **Typed maps**: `OrderedMap<K, V>` decodes and encodes directly, for both formats
//! - **Serde compatible**: [`Value`] and [`OrderedMap`] implement `Serialize` and
//!   `Deserialize`, with [`to_value`] / [`from_value`] conversions
//!
//! ## Quick Start
//!
//! ```rust
//! use serde_ordered::{from_str, to_string, Value};
//!
//! let input = r#"{"key":[{"a2":"one","a0":true,"a1":3}]}"#;
//! let value: Value = from_str(input).unwrap();
//! assert_eq!(to_string(&value).unwrap(), input);
//! ```
//!
//! ### Editing a document
//!
//! ```rust
//! use serde_ordered::{from_str, to_string, Value};
//!
//! let mut value: Value = from_str(r#"{"c":1,"a":2,"b":3}"#).unwrap();
//! let obj = value.as_object_mut().unwrap();
//!
//! obj.insert("c".to_string(), Value::from(10)); // keeps its position
//! obj.remove("a");
//! obj.insert("a".to_string(), Value::from(20)); // moves to the end
//!
//! assert_eq!(to_string(&value).unwrap(), r#"{"c":10,"b":3,"a":20}"#);
//! ```
//!
//! ### Typed maps
//!
//! ```rust
//! use serde_ordered::{from_str, to_string, OrderedMap};
//!
//! let map: OrderedMap<String, Vec<u32>> = from_str(r#"{"z":[1],"a":[2,3]}"#).unwrap();
//! assert_eq!(to_string(&map).unwrap(), r#"{"z":[1],"a":[2,3]}"#);
//! ```
//!
//! ### YAML
//!
//! ```rust
//! use serde_ordered::{yaml, YamlValue};
//!
//! let text = "ccc: 1\naaa: 2\n1.5: float key\ntrue: bool key\n";
//! let value: YamlValue = yaml::from_str(text).unwrap();
//! assert_eq!(yaml::to_string(&value).unwrap(), text);
//! ```
//!
//! ## Modules
//!
//! - [`cursor`]: read position over a byte buffer, literal decoding through `serde_json`
//! - [`map`]: [`OrderedMap`]
//! - [`value`]: [`Value`], [`Number`]
//! - [`key`]: [`Key`] and the [`ObjectKey`] abstraction
//! - [`de`] / [`ser`]: JSON decoding and encoding
//! - [`node`] / [`yaml`]: YAML node tree and adapter
//! - [`options`]: [`EncodeOptions`]
//! - [`error`]: [`Error`]

pub mod cursor;
pub mod de;
pub mod error;
pub mod key;
pub mod macros;
pub mod map;
pub mod node;
pub mod options;
pub mod ser;
pub mod value;
pub mod yaml;

pub use cursor::Cursor;
pub use de::{from_value, FromJson, ValueDeserializer};
pub use error::{Error, Result};
pub use key::{Key, ObjectKey};
pub use map::OrderedMap;
pub use node::Node;
pub use options::EncodeOptions;
pub use ser::{to_value, Encoder, ToJson, ValueSerializer};
pub use value::{Number, Value, YamlValue};
pub use yaml::{FromYaml, ToYaml};

use std::io;

/// Encodes a value as compact JSON.
///
/// # Examples
///
/// ```rust
/// use serde_ordered::{ordered, to_string};
///
/// let value = ordered!({"b": 1, "a": [true, null]});
/// assert_eq!(to_string(&value).unwrap(), r#"{"b":1,"a":[true,null]}"#);
/// ```
///
/// # Errors
///
/// Returns an error if a map is internally inconsistent or a typed key is not a string.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string<T>(value: &T) -> Result<String>
where
    T: ?Sized + ToJson,
{
    to_string_with_options(value, EncodeOptions::default())
}

/// Encodes a value as indented JSON (two spaces per level).
///
/// # Examples
///
/// ```rust
/// use serde_ordered::{ordered, to_string_pretty};
///
/// let value = ordered!({"b": 1, "a": []});
/// assert_eq!(to_string_pretty(&value).unwrap(), "{\n  \"b\": 1,\n  \"a\": []\n}");
/// ```
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string_pretty<T>(value: &T) -> Result<String>
where
    T: ?Sized + ToJson,
{
    to_string_with_options(value, EncodeOptions::pretty())
}

#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string_with_options<T>(value: &T, options: EncodeOptions) -> Result<String>
where
    T: ?Sized + ToJson,
{
    let bytes = to_vec_with_options(value, options)?;
    String::from_utf8(bytes).map_err(Error::custom)
}

#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_vec<T>(value: &T) -> Result<Vec<u8>>
where
    T: ?Sized + ToJson,
{
    to_vec_with_options(value, EncodeOptions::default())
}

fn to_vec_with_options<T>(value: &T, options: EncodeOptions) -> Result<Vec<u8>>
where
    T: ?Sized + ToJson,
{
    let mut encoder = Encoder::new(Vec::with_capacity(128), options);
    value.to_json(&mut encoder)?;
    Ok(encoder.into_inner())
}

/// Encodes a value as compact JSON into a writer.
///
/// # Errors
///
/// Returns an error if encoding fails or writing to the writer fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer<W, T>(writer: W, value: &T) -> Result<()>
where
    W: io::Write,
    T: ?Sized + ToJson,
{
    to_writer_with_options(writer, value, EncodeOptions::default())
}

#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer_with_options<W, T>(writer: W, value: &T, options: EncodeOptions) -> Result<()>
where
    W: io::Write,
    T: ?Sized + ToJson,
{
    let mut encoder = Encoder::new(writer, options);
    value.to_json(&mut encoder)?;
    encoder
        .into_inner()
        .flush()
        .map_err(|e| Error::io(&e.to_string()))
}

/// Decodes a complete JSON document from bytes.
///
/// The whole input must be one value, optionally surrounded by whitespace.
///
/// # Examples
///
/// ```rust
/// use serde_ordered::{from_slice, Error, Value};
///
/// let value: Value = from_slice(b" [1, 2] ").unwrap();
/// assert!(value.is_array());
///
/// let err = from_slice::<Value>(b"{}0").unwrap_err();
/// assert!(matches!(err, Error::TrailingData { .. }));
///
/// let err = from_slice::<Value>(b"   ").unwrap_err();
/// assert!(matches!(err, Error::UnexpectedEnd { .. }));
/// ```
///
/// # Errors
///
/// Returns an error if the input is not valid JSON, is empty, or has data after the
/// value. Error messages include line and column information.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_slice<T>(input: &[u8]) -> Result<T>
where
    T: FromJson,
{
    let mut cursor = Cursor::new(input);
    if !cursor.has_more() {
        return Err(cursor.unexpected_end("a value"));
    }
    let value = T::from_json(&mut cursor)?;
    if cursor.has_more() {
        let (line, col) = cursor.location();
        return Err(Error::trailing_data(line, col));
    }
    Ok(value)
}

/// Decodes a complete JSON document from a string.
///
/// # Examples
///
/// ```rust
/// use serde_ordered::{from_str, OrderedMap, Value};
///
/// let value: Value = from_str(r#"{"b":null,"a":1.5}"#).unwrap();
/// assert_eq!(value.get("a").and_then(Value::as_f64), Some(1.5));
///
/// let map: OrderedMap<String, Option<f64>> = from_str(r#"{"b":null,"a":1.5}"#).unwrap();
/// assert_eq!(map.get("b"), Some(&None));
/// ```
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_str<T>(input: &str) -> Result<T>
where
    T: FromJson,
{
    from_slice(input.as_bytes())
}

/// Decodes a complete JSON document from an I/O stream.
///
/// The stream is read to the end before decoding.
///
/// # Errors
///
/// Returns an error if reading fails or the content is not a single JSON value.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_reader<R, T>(mut reader: R) -> Result<T>
where
    R: io::Read,
    T: FromJson,
{
    let mut bytes = Vec::new();
    reader
        .read_to_end(&mut bytes)
        .map_err(|e| Error::io(&e.to_string()))?;
    from_slice(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct User {
        id: u32,
        name: String,
        active: bool,
        tags: Vec<String>,
    }

    #[test]
    fn test_value_struct_round_trip() {
        let user = User {
            id: 123,
            name: "Alice".to_string(),
            active: true,
            tags: vec!["admin".to_string(), "user".to_string()],
        };

        let value: Value = to_value(&user).unwrap();
        let json = to_string(&value).unwrap();
        assert_eq!(
            json,
            r#"{"id":123,"name":"Alice","active":true,"tags":["admin","user"]}"#
        );

        let back: User = from_value(from_str::<Value>(&json).unwrap()).unwrap();
        assert_eq!(user, back);
    }

    #[test]
    fn test_pretty_printing_decodes_back() {
        let value: Value = from_str(r#"{"z":{"y":[1,{"x":null}]},"a":"b"}"#).unwrap();
        let pretty = to_string_pretty(&value).unwrap();
        assert!(pretty.contains('\n'));
        assert_eq!(from_str::<Value>(&pretty).unwrap(), value);
    }

    #[test]
    fn test_writer_and_reader() {
        let value: Value = from_str(r#"{"k":[1,2]}"#).unwrap();

        let mut buffer = Vec::new();
        to_writer(&mut buffer, &value).unwrap();
        assert_eq!(buffer, to_vec(&value).unwrap());

        let back: Value = from_reader(std::io::Cursor::new(buffer)).unwrap();
        assert_eq!(back, value);
    }

    #[test]
    fn test_trailing_data_location() {
        let err = from_str::<Value>("{}\n  0").unwrap_err();
        assert_eq!(err, Error::trailing_data(2, 3));
    }

    #[test]
    fn test_custom_options() {
        let value: Value = from_str(r#"[1]"#).unwrap();
        let json = to_string_with_options(&value, EncodeOptions::pretty().with_indent(4)).unwrap();
        assert_eq!(json, "[\n    1\n]");
    }
}
