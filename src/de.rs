//! Order-preserving JSON decoding.
//!
//! A recursive-descent decoder over a [`Cursor`]. Structure (objects, arrays and the
//! separators between their members) is parsed here; every literal is handed to the
//! scalar codec through [`Cursor::decode_scalar`].
//!
//! ## Overview
//!
//! - **Dispatch on the leading byte**: `{` starts an object, `[` an array, and any of
//!   `n t f - 0-9 "` a literal. Anything else is an [`Error::InvalidValueStart`].
//! - **Objects** are decoded by a small state machine (expect key, expect value,
//!   completed) into an [`OrderedMap`], so keys keep their source order.
//! - **Duplicate keys**: the last value wins and the key keeps its first position.
//!
//! The same object state machine decodes typed maps ([`OrderedMap<K, V>`]), where each
//! key and value is decoded by the codec as a whole.
//!
//! ## Usage
//!
//! Most users should use the high-level functions in the crate root:
//!
//! ```rust
//! use serde_ordered::{from_str, to_string, Value};
//!
//! let value: Value = from_str(r#"{"c":1,"a":2,"b":3}"#).unwrap();
//! assert_eq!(to_string(&value).unwrap(), r#"{"c":1,"a":2,"b":3}"#);
//! ```
//!
//! Values can then be turned into Rust types with [`from_value`]:
//!
//! ```rust
//! use serde::Deserialize;
//! use serde_ordered::{from_str, from_value, Value};
//!
//! #[derive(Deserialize, Debug, PartialEq)]
//! struct Point { x: i32, y: i32 }
//!
//! let value: Value = from_str(r#"{"y":2,"x":1}"#).unwrap();
//! let point: Point = from_value(value).unwrap();
//! assert_eq!(point, Point { x: 1, y: 2 });
//! ```

use crate::{Cursor, Error, Number, ObjectKey, OrderedMap, Result, Value};
use serde::de::{DeserializeOwned, IgnoredAny, IntoDeserializer};
use serde::{de, forward_to_deserialize_any};
use std::collections::HashMap;
use std::hash::Hash;

/// Types that can be decoded from JSON text at a cursor.
pub trait FromJson: Sized {
    /// Decodes one value starting at the cursor's position.
    ///
    /// Input after the value is left untouched.
    fn from_json(cursor: &mut Cursor<'_>) -> Result<Self>;
}

impl FromJson for Value {
    fn from_json(cursor: &mut Cursor<'_>) -> Result<Self> {
        decode_value(cursor)
    }
}

/// A typed map. Keys and values are decoded by the scalar codec, so ordering inside a
/// nested value is whatever `V`'s own `Deserialize` impl keeps.
impl<K, V> FromJson for OrderedMap<K, V>
where
    K: DeserializeOwned + Eq + Hash + Clone,
    V: DeserializeOwned,
{
    fn from_json(cursor: &mut Cursor<'_>) -> Result<Self> {
        if cursor.peek() == Some(b'n') {
            cursor.decode_scalar::<()>()?;
            return Ok(OrderedMap::new());
        }
        decode_object_with(cursor, decode_typed::<V>)
    }
}

#[inline]
fn is_value_start(b: u8) -> bool {
    matches!(b, b'n' | b't' | b'f' | b'-' | b'0'..=b'9' | b'"' | b'[' | b'{')
}

fn invalid_value_start(cursor: &Cursor<'_>, found: u8) -> Error {
    let (line, col) = cursor.location();
    Error::invalid_value_start(line, col, found)
}

fn unexpected_token(cursor: &Cursor<'_>, expected: u8, found: u8) -> Error {
    let (line, col) = cursor.location();
    Error::unexpected_token(line, col, expected, found)
}

/// Decodes any JSON value at the cursor into a [`Value`].
///
/// # Examples
///
/// ```rust
/// use serde_ordered::de::decode_value;
/// use serde_ordered::Cursor;
///
/// let mut cursor = Cursor::new(br#"[true, {"b": null, "a": 1}] trailing"#);
/// let value = decode_value(&mut cursor).unwrap();
///
/// assert!(value.is_array());
/// assert_eq!(cursor.peek(), Some(b't'));
/// ```
pub fn decode_value(cursor: &mut Cursor<'_>) -> Result<Value> {
    match cursor.peek() {
        None => Err(cursor.unexpected_end("a value")),
        Some(b'{') => decode_object(cursor).map(Value::Object),
        Some(b'[') => decode_array(cursor).map(Value::Array),
        Some(b) if is_value_start(b) => cursor.decode_scalar::<Value>(),
        Some(b) => Err(invalid_value_start(cursor, b)),
    }
}

/// Decodes a JSON object into an [`OrderedMap`], recursing into its values.
pub fn decode_object(cursor: &mut Cursor<'_>) -> Result<OrderedMap<String, Value>> {
    decode_object_with(cursor, decode_value)
}

/// Decodes a JSON array, recursing into its elements.
pub fn decode_array(cursor: &mut Cursor<'_>) -> Result<Vec<Value>> {
    cursor.expect(b'[')?;
    let mut values = Vec::new();
    if cursor.peek() == Some(b']') {
        cursor.advance(1)?;
        return Ok(values);
    }

    loop {
        values.push(decode_value(cursor)?);
        match cursor.peek() {
            None => return Err(cursor.unexpected_end("',' or ']'")),
            Some(b']') => {
                cursor.advance(1)?;
                return Ok(values);
            }
            Some(b',') => cursor.advance(1)?,
            Some(found) => return Err(unexpected_token(cursor, b',', found)),
        }
    }
}

fn decode_typed<V>(cursor: &mut Cursor<'_>) -> Result<V>
where
    V: DeserializeOwned,
{
    match cursor.peek() {
        None => Err(cursor.unexpected_end("a value")),
        Some(b) if is_value_start(b) => cursor.decode_scalar::<V>(),
        Some(b) => Err(invalid_value_start(cursor, b)),
    }
}

/// Interprets the text of an object key as `K` with the codec's map-key rules, so a
/// quoted `"10"` or `"true"` fills an integer or bool key.
fn decode_key<K>(text: String) -> serde_json::Result<K>
where
    K: DeserializeOwned + Eq + Hash,
{
    let mut object = serde_json::Map::new();
    object.insert(text, serde_json::Value::Null);
    let entry: HashMap<K, IgnoredAny> = serde_json::from_value(serde_json::Value::Object(object))?;
    entry
        .into_keys()
        .next()
        .ok_or_else(|| de::Error::custom("object key vanished while decoding"))
}

enum ObjectState<K> {
    ExpectKey,
    ExpectValue(K),
    Completed,
}

fn decode_object_with<K, V, F>(cursor: &mut Cursor<'_>, mut decode: F) -> Result<OrderedMap<K, V>>
where
    K: DeserializeOwned + Eq + Hash + Clone,
    F: FnMut(&mut Cursor<'_>) -> Result<V>,
{
    cursor.expect(b'{')?;
    let mut map = OrderedMap::new();
    if cursor.peek() == Some(b'}') {
        cursor.advance(1)?;
        return Ok(map);
    }

    let mut state = ObjectState::ExpectKey;
    loop {
        state = match state {
            ObjectState::Completed => return Ok(map),
            ObjectState::ExpectKey => {
                match cursor.peek() {
                    None => return Err(cursor.unexpected_end("an object key")),
                    Some(b'"') => {}
                    Some(found) => {
                        let (line, col) = cursor.location();
                        return Err(Error::key_format(line, col, found));
                    }
                }
                let (line, col) = cursor.location();
                let text = cursor.decode_scalar::<String>()?;
                let key = decode_key::<K>(text).map_err(|err| Error::scalar(line, col, err))?;
                cursor.expect(b':')?;
                ObjectState::ExpectValue(key)
            }
            ObjectState::ExpectValue(key) => {
                let value = decode(cursor)?;
                map.insert(key, value);
                match cursor.peek() {
                    None => return Err(cursor.unexpected_end("',' or '}'")),
                    Some(b'}') => {
                        cursor.advance(1)?;
                        ObjectState::Completed
                    }
                    Some(b',') => {
                        cursor.advance(1)?;
                        ObjectState::ExpectKey
                    }
                    Some(found) => return Err(unexpected_token(cursor, b',', found)),
                }
            }
        };
    }
}

/// Interprets a [`Value`] as an instance of type `T`.
///
/// Works with both JSON (`Value<String>`) and YAML (`Value<Key>`) trees.
///
/// # Errors
///
/// Returns an error if the value does not match the shape `T` expects.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_value<T, K>(value: Value<K>) -> Result<T>
where
    T: DeserializeOwned,
    K: ObjectKey,
{
    T::deserialize(ValueDeserializer::new(value))
}

struct SeqDeserializer<K> {
    iter: std::vec::IntoIter<Value<K>>,
}

impl<K> SeqDeserializer<K> {
    fn new(vec: Vec<Value<K>>) -> Self {
        SeqDeserializer {
            iter: vec.into_iter(),
        }
    }
}

impl<'de, K> de::SeqAccess<'de> for SeqDeserializer<K>
where
    K: ObjectKey,
{
    type Error = Error;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>>
    where
        T: de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some(value) => seed.deserialize(ValueDeserializer::new(value)).map(Some),
            None => Ok(None),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        match self.iter.size_hint() {
            (lower, Some(upper)) if lower == upper => Some(upper),
            _ => None,
        }
    }
}

struct MapDeserializer<K> {
    iter: crate::map::IntoIter<K, Value<K>>,
    value: Option<Value<K>>,
}

impl<K: ObjectKey> MapDeserializer<K> {
    fn new(map: OrderedMap<K, Value<K>>) -> Self {
        MapDeserializer {
            iter: map.into_iter(),
            value: None,
        }
    }
}

impl<'de, K> de::MapAccess<'de> for MapDeserializer<K>
where
    K: ObjectKey,
{
    type Error = Error;

    fn next_key_seed<S>(&mut self, seed: S) -> Result<Option<S::Value>>
    where
        S: de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some((key, value)) => {
                self.value = Some(value);
                seed.deserialize(ValueDeserializer::new(key.into_value()))
                    .map(Some)
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<S>(&mut self, seed: S) -> Result<S::Value>
    where
        S: de::DeserializeSeed<'de>,
    {
        match self.value.take() {
            Some(value) => seed.deserialize(ValueDeserializer::new(value)),
            None => Err(Error::custom("next_value_seed called before next_key_seed")),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        match self.iter.size_hint() {
            (lower, Some(upper)) if lower == upper => Some(upper),
            _ => None,
        }
    }
}

struct EnumDeserializer<K> {
    variant: Value<K>,
    value: Option<Value<K>>,
}

impl<'de, K> de::EnumAccess<'de> for EnumDeserializer<K>
where
    K: ObjectKey,
{
    type Error = Error;
    type Variant = VariantDeserializer<K>;

    fn variant_seed<V>(self, seed: V) -> Result<(V::Value, Self::Variant)>
    where
        V: de::DeserializeSeed<'de>,
    {
        let variant = seed.deserialize(ValueDeserializer::new(self.variant))?;
        let visitor = VariantDeserializer { value: self.value };
        Ok((variant, visitor))
    }
}

struct VariantDeserializer<K> {
    value: Option<Value<K>>,
}

impl<'de, K> de::VariantAccess<'de> for VariantDeserializer<K>
where
    K: ObjectKey,
{
    type Error = Error;

    fn unit_variant(self) -> Result<()> {
        match self.value {
            Some(Value::Null) | None => Ok(()),
            _ => Err(Error::custom("expected unit variant")),
        }
    }

    fn newtype_variant_seed<T>(self, seed: T) -> Result<T::Value>
    where
        T: de::DeserializeSeed<'de>,
    {
        match self.value {
            Some(value) => seed.deserialize(ValueDeserializer::new(value)),
            None => Err(Error::custom("expected newtype variant")),
        }
    }

    fn tuple_variant<V>(self, _len: usize, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Some(Value::Array(arr)) => visitor.visit_seq(SeqDeserializer::new(arr)),
            _ => Err(Error::custom("expected tuple variant")),
        }
    }

    fn struct_variant<V>(self, _fields: &'static [&'static str], visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Some(Value::Object(obj)) => visitor.visit_map(MapDeserializer::new(obj)),
            _ => Err(Error::custom("expected struct variant")),
        }
    }
}

/// A serde `Deserializer` reading from an owned [`Value`].
pub struct ValueDeserializer<K = String> {
    value: Value<K>,
}

impl<K> ValueDeserializer<K> {
    pub fn new(value: Value<K>) -> Self {
        ValueDeserializer { value }
    }
}

impl<'de, K> de::Deserializer<'de> for ValueDeserializer<K>
where
    K: ObjectKey,
{
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Value::Null => visitor.visit_unit(),
            Value::Bool(b) => visitor.visit_bool(b),
            Value::Number(Number::Integer(i)) => visitor.visit_i64(i),
            Value::Number(Number::Unsigned(u)) => visitor.visit_u64(u),
            Value::Number(Number::Float(f)) => visitor.visit_f64(f),
            Value::String(s) => visitor.visit_string(s),
            Value::Array(arr) => visitor.visit_seq(SeqDeserializer::new(arr)),
            Value::Object(obj) => visitor.visit_map(MapDeserializer::new(obj)),
        }
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Value::Null => visitor.visit_none(),
            _ => visitor.visit_some(self),
        }
    }

    fn deserialize_newtype_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_enum<V>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Value::String(s) => visitor.visit_enum(s.into_deserializer()),
            Value::Object(obj) => {
                let mut entries = obj.into_iter();
                match (entries.next(), entries.next()) {
                    (Some((variant, value)), None) => visitor.visit_enum(EnumDeserializer {
                        variant: variant.into_value(),
                        value: Some(value),
                    }),
                    _ => Err(Error::custom(
                        "expected an object with a single key naming the variant",
                    )),
                }
            }
            _ => Err(Error::custom("expected enum")),
        }
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf unit unit_struct seq tuple
        tuple_struct map struct identifier ignored_any
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    fn decode(input: &str) -> Result<Value> {
        let mut cursor = Cursor::new(input.as_bytes());
        decode_value(&mut cursor)
    }

    fn keys(value: &Value) -> Vec<&str> {
        value
            .as_object()
            .map(|obj| obj.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    #[test]
    fn test_object_keeps_source_order() {
        let value = decode(r#"{"c":1,"a":2,"b":3}"#).unwrap();
        assert_eq!(keys(&value), vec!["c", "a", "b"]);
    }

    #[test]
    fn test_duplicate_key_last_wins_first_position() {
        let value = decode(r#"{"a":1,"b":2,"a":3}"#).unwrap();
        assert_eq!(keys(&value), vec!["a", "b"]);
        assert_eq!(value.get("a").and_then(Value::as_i64), Some(3));
    }

    #[test]
    fn test_empty_containers() {
        assert_eq!(decode("{}").unwrap(), Value::Object(OrderedMap::new()));
        assert_eq!(decode(" [ ] ").unwrap(), Value::Array(vec![]));
    }

    #[test]
    fn test_invalid_value_start() {
        assert_eq!(decode("+1"), Err(Error::invalid_value_start(1, 1, b'+')));
        assert_eq!(
            decode(r#"{"a":}"#),
            Err(Error::invalid_value_start(1, 6, b'}'))
        );
        assert_eq!(decode("[1,]"), Err(Error::invalid_value_start(1, 4, b']')));
    }

    #[test]
    fn test_key_must_be_quoted() {
        assert_eq!(decode(r#"{1:"x"}"#), Err(Error::key_format(1, 2, b'1')));
        assert_eq!(decode(r#"{"a":1,}"#), Err(Error::key_format(1, 8, b'}')));
    }

    #[test]
    fn test_missing_separator() {
        assert_eq!(
            decode(r#"{"a":[1,2,3}"#),
            Err(Error::unexpected_token(1, 12, b',', b'}'))
        );
        assert_eq!(
            decode(r#"{"a" 1}"#),
            Err(Error::unexpected_token(1, 6, b':', b'1'))
        );
    }

    #[test]
    fn test_truncated_input() {
        for input in ["{", "[", r#"{"a""#, r#"{"a":1"#, "[1,2"] {
            let err = decode(input).unwrap_err();
            assert!(err.is_eof(), "{:?} gave {:?}", input, err);
        }
    }

    #[test]
    fn test_literal_errors_come_from_codec() {
        for input in ["fal", "tru", "00", r#""foo"#, "1e1000"] {
            assert!(
                matches!(decode(input), Err(Error::Scalar { .. })),
                "{:?} should be rejected by the codec",
                input
            );
        }
    }

    #[test]
    fn test_typed_map() {
        let mut cursor = Cursor::new(br#"{"z":[1,2],"a":[],"m":[3]}"#);
        let map = OrderedMap::<String, Vec<u8>>::from_json(&mut cursor).unwrap();
        let keys: Vec<_> = map.keys().cloned().collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
        assert_eq!(map.get("z"), Some(&vec![1, 2]));
    }

    #[test]
    fn test_typed_map_null_is_empty() {
        let mut cursor = Cursor::new(b"null");
        let map = OrderedMap::<String, i32>::from_json(&mut cursor).unwrap();
        assert!(map.is_empty());

        let mut cursor = Cursor::new(b"[1]");
        let err = OrderedMap::<String, i32>::from_json(&mut cursor).unwrap_err();
        assert_eq!(err, Error::unexpected_token(1, 1, b'{', b'['));
    }

    #[test]
    fn test_typed_map_value_type_mismatch() {
        let mut cursor = Cursor::new(br#"{"a":"x"}"#);
        let err = OrderedMap::<String, i32>::from_json(&mut cursor).unwrap_err();
        assert!(matches!(err, Error::Scalar { line: 1, col: 6, .. }));
    }

    #[derive(Deserialize, Debug, PartialEq)]
    enum Shape {
        Empty,
        Circle(f64),
        Rect { w: u32, h: u32 },
    }

    #[derive(Deserialize, Debug, PartialEq)]
    struct Drawing {
        name: String,
        layer: Option<u8>,
        shapes: Vec<Shape>,
    }

    #[test]
    fn test_from_value() {
        let value = decode(
            r#"{"shapes":["Empty",{"Circle":1.5},{"Rect":{"w":2,"h":3}}],"layer":null,"name":"d"}"#,
        )
        .unwrap();
        let drawing: Drawing = from_value(value).unwrap();
        assert_eq!(
            drawing,
            Drawing {
                name: "d".to_string(),
                layer: None,
                shapes: vec![Shape::Empty, Shape::Circle(1.5), Shape::Rect { w: 2, h: 3 }],
            }
        );
    }
}
