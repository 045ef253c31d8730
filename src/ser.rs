//! Order-preserving JSON encoding.
//!
//! This module provides the [`Encoder`] that writes a [`Value`] or a typed
//! [`OrderedMap`] back to JSON, walking every object in its recorded key order, and the
//! [`ValueSerializer`] that converts any `T: Serialize` into a [`Value`].
//!
//! ## Overview
//!
//! - **Structure** (braces, brackets, separators, indentation) is written here
//! - **Scalars** (numbers, strings, booleans, keys) are written by `serde_json`, which
//!   owns their textual form
//! - **Compact by default**: `{"k1":v1,"k2":v2}` with no whitespace
//!
//! ## Usage
//!
//! ```rust
//! use serde_ordered::{to_string, OrderedMap};
//!
//! let mut map = OrderedMap::new();
//! map.insert("zeta".to_string(), 1.5);
//! map.insert("alpha".to_string(), 1200.0);
//!
//! assert_eq!(to_string(&map).unwrap(), r#"{"zeta":1.5,"alpha":1200.0}"#);
//! ```

use crate::{EncodeOptions, Error, Number, ObjectKey, OrderedMap, Result, Value};
use serde::{ser, Serialize};
use std::hash::Hash;
use std::io;
use std::marker::PhantomData;

/// Types that can be written as JSON by an [`Encoder`].
pub trait ToJson {
    fn to_json<W: io::Write>(&self, encoder: &mut Encoder<W>) -> Result<()>;
}

impl ToJson for Value {
    fn to_json<W: io::Write>(&self, encoder: &mut Encoder<W>) -> Result<()> {
        encoder.write_value(self)
    }
}

/// A typed map. Keys must serialize to JSON strings; numbers and booleans are quoted.
impl<K, V> ToJson for OrderedMap<K, V>
where
    K: Serialize + Eq + Hash,
    V: Serialize,
{
    fn to_json<W: io::Write>(&self, encoder: &mut Encoder<W>) -> Result<()> {
        encoder.write_map(self, |encoder, value| encoder.write_typed(value))
    }
}

fn codec_error(err: serde_json::Error) -> Error {
    if err.is_io() {
        Error::io(&err.to_string())
    } else {
        Error::custom(err)
    }
}

/// Writes JSON text to an `io::Write` sink.
///
/// # Examples
///
/// ```rust
/// use serde_ordered::{from_str, Encoder, EncodeOptions, Value};
///
/// let value: Value = from_str(r#"[{"b":1,"a":2}]"#).unwrap();
///
/// let mut encoder = Encoder::new(Vec::new(), EncodeOptions::new());
/// encoder.write_value(&value).unwrap();
/// assert_eq!(encoder.into_inner(), br#"[{"b":1,"a":2}]"#);
/// ```
pub struct Encoder<W> {
    writer: W,
    options: EncodeOptions,
    depth: usize,
}

impl<W> Encoder<W>
where
    W: io::Write,
{
    pub fn new(writer: W, options: EncodeOptions) -> Self {
        Encoder {
            writer,
            options,
            depth: 0,
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_raw(&mut self, bytes: &[u8]) -> Result<()> {
        self.writer
            .write_all(bytes)
            .map_err(|e| Error::io(&e.to_string()))
    }

    fn write_scalar<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        serde_json::to_writer(&mut self.writer, value).map_err(codec_error)
    }

    fn write_indent(&mut self) -> Result<()> {
        for _ in 0..self.depth * self.options.indent {
            self.write_raw(b" ")?;
        }
        Ok(())
    }

    fn begin_member(&mut self, first: bool) -> Result<()> {
        if !first {
            self.write_raw(b",")?;
        }
        if self.options.pretty {
            self.write_raw(b"\n")?;
            self.write_indent()?;
        }
        Ok(())
    }

    fn end_container(&mut self, close: &[u8], empty: bool) -> Result<()> {
        self.depth -= 1;
        if self.options.pretty && !empty {
            self.write_raw(b"\n")?;
            self.write_indent()?;
        }
        self.write_raw(close)
    }

    /// Writes a [`Value`], objects in recorded key order.
    pub fn write_value(&mut self, value: &Value) -> Result<()> {
        match value {
            Value::Null => self.write_raw(b"null"),
            Value::Bool(b) => self.write_scalar(b),
            Value::Number(n) => self.write_scalar(n),
            Value::String(s) => self.write_scalar(s.as_str()),
            Value::Array(arr) => {
                self.write_raw(b"[")?;
                self.depth += 1;
                for (i, element) in arr.iter().enumerate() {
                    self.begin_member(i == 0)?;
                    self.write_value(element)?;
                }
                self.end_container(b"]", arr.is_empty())
            }
            Value::Object(obj) => self.write_map(obj, |encoder, value| encoder.write_value(value)),
        }
    }

    /// Writes an object, one member per recorded key.
    ///
    /// Fails with [`Error::InternalConsistency`] before writing anything if the map's
    /// recorded keys and lookup disagree.
    pub fn write_map<K, V, F>(&mut self, map: &OrderedMap<K, V>, mut write_value: F) -> Result<()>
    where
        K: Serialize + Eq + Hash,
        F: FnMut(&mut Self, &V) -> Result<()>,
    {
        let entries = map.checked_entries()?;
        self.write_raw(b"{")?;
        self.depth += 1;
        for (i, (key, value)) in entries.iter().enumerate() {
            self.begin_member(i == 0)?;
            self.write_key(*key)?;
            if self.options.pretty {
                self.write_raw(b": ")?;
            } else {
                self.write_raw(b":")?;
            }
            write_value(self, *value)?;
        }
        self.end_container(b"}", entries.is_empty())
    }

    fn write_key<K>(&mut self, key: &K) -> Result<()>
    where
        K: ?Sized + Serialize,
    {
        match serde_json::to_value(key).map_err(codec_error)? {
            serde_json::Value::String(s) => self.write_scalar(&s),
            serde_json::Value::Number(n) => self.write_scalar(&n.to_string()),
            serde_json::Value::Bool(b) => self.write_scalar(&b.to_string()),
            other => Err(Error::key_must_be_string(other)),
        }
    }

    /// Writes any `T: Serialize` through the codec. Pretty output goes through a
    /// [`Value`] first so nested members are indented too.
    pub fn write_typed<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        if self.options.pretty {
            let value: Value = to_value(value)?;
            self.write_value(&value)
        } else {
            self.write_scalar(value)
        }
    }
}

/// Converts any `T: Serialize` into a [`Value`].
///
/// Map keys and struct fields become object keys in the order they are serialized.
/// Enums use the externally tagged form: unit variants are strings and every other
/// variant is a single-key object.
///
/// # Examples
///
/// ```rust
/// use serde::Serialize;
/// use serde_ordered::{to_value, Value};
///
/// #[derive(Serialize)]
/// struct Point { y: i32, x: i32 }
///
/// let value: Value = to_value(&Point { y: 2, x: 1 }).unwrap();
/// let keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
/// assert_eq!(keys, vec!["y", "x"]);
/// ```
///
/// # Errors
///
/// Returns an error if a map key cannot be turned into a key of type `K`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_value<T, K>(value: &T) -> Result<Value<K>>
where
    T: ?Sized + Serialize,
    K: ObjectKey,
{
    value.serialize(ValueSerializer::new())
}

fn variant_key<K: ObjectKey>(variant: &'static str) -> Result<K> {
    K::from_value(Value::String(variant.to_string()))
}

fn wrap_variant<K: ObjectKey>(variant: Option<&'static str>, value: Value<K>) -> Result<Value<K>> {
    match variant {
        None => Ok(value),
        Some(name) => {
            let mut map = OrderedMap::new();
            map.insert(variant_key(name)?, value);
            Ok(Value::Object(map))
        }
    }
}

/// A serde `Serializer` producing a [`Value`] keyed by `K`.
pub struct ValueSerializer<K = String> {
    marker: PhantomData<K>,
}

impl<K> ValueSerializer<K> {
    pub fn new() -> Self {
        ValueSerializer {
            marker: PhantomData,
        }
    }
}

impl<K> Default for ValueSerializer<K> {
    fn default() -> Self {
        Self::new()
    }
}

pub struct SerializeVec<K> {
    vec: Vec<Value<K>>,
    variant: Option<&'static str>,
}

pub struct SerializeMap<K> {
    map: OrderedMap<K, Value<K>>,
    current_key: Option<K>,
    variant: Option<&'static str>,
}

impl<K> ser::Serializer for ValueSerializer<K>
where
    K: ObjectKey,
{
    type Ok = Value<K>;
    type Error = Error;

    type SerializeSeq = SerializeVec<K>;
    type SerializeTuple = SerializeVec<K>;
    type SerializeTupleStruct = SerializeVec<K>;
    type SerializeTupleVariant = SerializeVec<K>;
    type SerializeMap = SerializeMap<K>;
    type SerializeStruct = SerializeMap<K>;
    type SerializeStructVariant = SerializeMap<K>;

    fn serialize_bool(self, v: bool) -> Result<Value<K>> {
        Ok(Value::Bool(v))
    }

    fn serialize_i8(self, v: i8) -> Result<Value<K>> {
        Ok(Value::from(v))
    }

    fn serialize_i16(self, v: i16) -> Result<Value<K>> {
        Ok(Value::from(v))
    }

    fn serialize_i32(self, v: i32) -> Result<Value<K>> {
        Ok(Value::from(v))
    }

    fn serialize_i64(self, v: i64) -> Result<Value<K>> {
        Ok(Value::Number(Number::Integer(v)))
    }

    fn serialize_u8(self, v: u8) -> Result<Value<K>> {
        Ok(Value::from(v))
    }

    fn serialize_u16(self, v: u16) -> Result<Value<K>> {
        Ok(Value::from(v))
    }

    fn serialize_u32(self, v: u32) -> Result<Value<K>> {
        Ok(Value::from(v))
    }

    fn serialize_u64(self, v: u64) -> Result<Value<K>> {
        Ok(Value::Number(Number::from(v)))
    }

    fn serialize_i128(self, v: i128) -> Result<Value<K>> {
        if let Ok(i) = i64::try_from(v) {
            Ok(Value::Number(Number::Integer(i)))
        } else if let Ok(u) = u64::try_from(v) {
            Ok(Value::Number(Number::Unsigned(u)))
        } else {
            Err(Error::custom(format!("number {} out of range", v)))
        }
    }

    fn serialize_u128(self, v: u128) -> Result<Value<K>> {
        u64::try_from(v)
            .map(|u| Value::Number(Number::from(u)))
            .map_err(|_| Error::custom(format!("number {} out of range", v)))
    }

    fn serialize_f32(self, v: f32) -> Result<Value<K>> {
        Ok(Value::Number(Number::Float(f64::from(v))))
    }

    fn serialize_f64(self, v: f64) -> Result<Value<K>> {
        Ok(Value::Number(Number::Float(v)))
    }

    fn serialize_char(self, v: char) -> Result<Value<K>> {
        Ok(Value::String(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> Result<Value<K>> {
        Ok(Value::String(v.to_string()))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Value<K>> {
        Ok(Value::Array(v.iter().map(|&b| Value::from(b)).collect()))
    }

    fn serialize_none(self) -> Result<Value<K>> {
        Ok(Value::Null)
    }

    fn serialize_some<T>(self, value: &T) -> Result<Value<K>>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Value<K>> {
        Ok(Value::Null)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Value<K>> {
        Ok(Value::Null)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Value<K>> {
        Ok(Value::String(variant.to_string()))
    }

    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<Value<K>>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Value<K>>
    where
        T: ?Sized + Serialize,
    {
        wrap_variant(Some(variant), to_value(value)?)
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SerializeVec<K>> {
        Ok(SerializeVec::new(len.unwrap_or(0), None))
    }

    fn serialize_tuple(self, len: usize) -> Result<SerializeVec<K>> {
        Ok(SerializeVec::new(len, None))
    }

    fn serialize_tuple_struct(self, _name: &'static str, len: usize) -> Result<SerializeVec<K>> {
        Ok(SerializeVec::new(len, None))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<SerializeVec<K>> {
        Ok(SerializeVec::new(len, Some(variant)))
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<SerializeMap<K>> {
        Ok(SerializeMap::new(None))
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<SerializeMap<K>> {
        Ok(SerializeMap::new(None))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<SerializeMap<K>> {
        Ok(SerializeMap::new(Some(variant)))
    }
}

impl<K> SerializeVec<K>
where
    K: ObjectKey,
{
    fn new(capacity: usize, variant: Option<&'static str>) -> Self {
        SerializeVec {
            vec: Vec::with_capacity(capacity),
            variant,
        }
    }

    fn push<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.vec.push(to_value(value)?);
        Ok(())
    }

    fn finish(self) -> Result<Value<K>> {
        wrap_variant(self.variant, Value::Array(self.vec))
    }
}

impl<K> SerializeMap<K>
where
    K: ObjectKey,
{
    fn new(variant: Option<&'static str>) -> Self {
        SerializeMap {
            map: OrderedMap::new(),
            current_key: None,
            variant,
        }
    }

    fn field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.map.insert(variant_key(key)?, to_value(value)?);
        Ok(())
    }

    fn finish(self) -> Result<Value<K>> {
        wrap_variant(self.variant, Value::Object(self.map))
    }
}

impl<K> ser::SerializeSeq for SerializeVec<K>
where
    K: ObjectKey,
{
    type Ok = Value<K>;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Value<K>> {
        self.finish()
    }
}

impl<K> ser::SerializeTuple for SerializeVec<K>
where
    K: ObjectKey,
{
    type Ok = Value<K>;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Value<K>> {
        self.finish()
    }
}

impl<K> ser::SerializeTupleStruct for SerializeVec<K>
where
    K: ObjectKey,
{
    type Ok = Value<K>;
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Value<K>> {
        self.finish()
    }
}

impl<K> ser::SerializeTupleVariant for SerializeVec<K>
where
    K: ObjectKey,
{
    type Ok = Value<K>;
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Value<K>> {
        self.finish()
    }
}

impl<K> ser::SerializeMap for SerializeMap<K>
where
    K: ObjectKey,
{
    type Ok = Value<K>;
    type Error = Error;

    fn serialize_key<T>(&mut self, key: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.current_key = Some(K::from_value(to_value(key)?)?);
        Ok(())
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let key = self
            .current_key
            .take()
            .ok_or_else(|| Error::custom("serialize_value called without serialize_key"))?;
        self.map.insert(key, to_value(value)?);
        Ok(())
    }

    fn end(self) -> Result<Value<K>> {
        self.finish()
    }
}

impl<K> ser::SerializeStruct for SerializeMap<K>
where
    K: ObjectKey,
{
    type Ok = Value<K>;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.field(key, value)
    }

    fn end(self) -> Result<Value<K>> {
        self.finish()
    }
}

impl<K> ser::SerializeStructVariant for SerializeMap<K>
where
    K: ObjectKey,
{
    type Ok = Value<K>;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.field(key, value)
    }

    fn end(self) -> Result<Value<K>> {
        self.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Key;
    use std::collections::BTreeMap;

    fn encode<T: ToJson>(value: &T, options: EncodeOptions) -> Result<String> {
        let mut encoder = Encoder::new(Vec::new(), options);
        value.to_json(&mut encoder)?;
        Ok(String::from_utf8(encoder.into_inner()).unwrap())
    }

    #[test]
    fn test_compact_object_in_recorded_order() {
        let mut obj = OrderedMap::new();
        obj.insert("c".to_string(), Value::from(1));
        obj.insert("a".to_string(), Value::from("x\"y"));
        obj.insert("b".to_string(), Value::Array(vec![Value::Null, Value::Bool(false)]));

        let json = encode(&Value::Object(obj), EncodeOptions::new()).unwrap();
        assert_eq!(json, r#"{"c":1,"a":"x\"y","b":[null,false]}"#);
    }

    #[test]
    fn test_pretty_output() {
        let mut inner = OrderedMap::new();
        inner.insert("k".to_string(), Value::from(1));
        let mut obj = OrderedMap::new();
        obj.insert("z".to_string(), Value::Object(inner));
        obj.insert("a".to_string(), Value::Array(vec![]));

        let json = encode(&Value::Object(obj), EncodeOptions::pretty()).unwrap();
        assert_eq!(json, "{\n  \"z\": {\n    \"k\": 1\n  },\n  \"a\": []\n}");
    }

    #[test]
    fn test_typed_map_quotes_scalar_keys() {
        let mut map = OrderedMap::new();
        map.insert(10u32, "ten");
        map.insert(2u32, "two");
        assert_eq!(
            encode(&map, EncodeOptions::new()).unwrap(),
            r#"{"10":"ten","2":"two"}"#
        );

        let mut map = OrderedMap::new();
        map.insert(true, 1);
        assert_eq!(encode(&map, EncodeOptions::new()).unwrap(), r#"{"true":1}"#);
    }

    #[test]
    fn test_wide_integers_convert_when_they_fit() {
        let value: Value = to_value(&(-5i128)).unwrap();
        assert_eq!(value, Value::Number(Number::Integer(-5)));
        let value: Value = to_value(&u128::from(u64::MAX)).unwrap();
        assert_eq!(value, Value::Number(Number::Unsigned(u64::MAX)));

        assert!(to_value::<_, String>(&i128::MIN).is_err());
        assert!(to_value::<_, String>(&u128::MAX).is_err());

        let mut map = OrderedMap::new();
        map.insert("big".to_string(), u128::MAX);
        assert!(encode(&map, EncodeOptions::new()).is_ok());
        assert!(encode(&map, EncodeOptions::pretty()).is_err());
    }

    #[test]
    fn test_typed_map_rejects_compound_keys() {
        let mut map = OrderedMap::new();
        map.insert(vec![1, 2], 0);
        let err = encode(&map, EncodeOptions::new()).unwrap_err();
        assert!(matches!(err, Error::KeyMustBeString(_)));
    }

    #[test]
    fn test_typed_map_pretty_indents_nested_values() {
        let mut nested = BTreeMap::new();
        nested.insert("x", 1);
        let mut map = OrderedMap::new();
        map.insert("p".to_string(), nested);

        assert_eq!(
            encode(&map, EncodeOptions::pretty()).unwrap(),
            "{\n  \"p\": {\n    \"x\": 1\n  }\n}"
        );
    }

    #[test]
    fn test_corrupted_map_is_reported() {
        let mut obj = OrderedMap::new();
        obj.insert("a".to_string(), Value::from(1));
        obj.insert("b".to_string(), Value::from(2));
        obj.corrupt_for_test("b");

        let err = encode(&Value::Object(obj), EncodeOptions::new()).unwrap_err();
        assert!(matches!(err, Error::InternalConsistency(_)));
    }

    #[derive(Serialize)]
    enum Event {
        Start,
        Move(i32, i32),
        Named { label: String },
    }

    #[test]
    fn test_to_value_enums_are_externally_tagged() {
        let value: Value = to_value(&vec![
            Event::Start,
            Event::Move(1, -1),
            Event::Named {
                label: "x".to_string(),
            },
        ])
        .unwrap();
        assert_eq!(
            encode(&value, EncodeOptions::new()).unwrap(),
            r#"["Start",{"Move":[1,-1]},{"Named":{"label":"x"}}]"#
        );
    }

    #[test]
    fn test_to_value_keeps_map_key_types_for_yaml() {
        let mut map = OrderedMap::new();
        map.insert(3i64, "c");
        map.insert(1i64, "a");

        let value: Value<Key> = to_value(&map).unwrap();
        let keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec![Key::Integer(3), Key::Integer(1)]);
    }
}
