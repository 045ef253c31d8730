//! Generic, order-preserving value tree.
//!
//! [`Value`] represents any decoded document. Every object level is an
//! [`OrderedMap`], so keys come back out in the order they went in, however deeply
//! they are nested.
//!
//! The key type is a parameter: `Value` (that is, `Value<String>`) is the JSON tree and
//! `Value<Key>` the YAML tree, whose mappings accept any scalar as a key.
//!
//! ## Examples
//!
//! ```rust
//! use serde_ordered::{from_str, Value};
//!
//! let value: Value = from_str(r#"{"c":1,"a":{"z":true,"y":null}}"#).unwrap();
//!
//! let root = value.as_object().unwrap();
//! let keys: Vec<_> = root.keys().cloned().collect();
//! assert_eq!(keys, vec!["c", "a"]);
//!
//! let nested = value.get("a").and_then(|v| v.as_object()).unwrap();
//! let keys: Vec<_> = nested.keys().cloned().collect();
//! assert_eq!(keys, vec!["z", "y"]);
//! ```

use crate::{Key, ObjectKey, OrderedMap};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::borrow::Borrow;
use std::fmt;
use std::hash::Hash;
use std::marker::PhantomData;

/// Any document value.
///
/// # Examples
///
/// ```rust
/// use serde_ordered::{Number, Value};
///
/// let null = Value::<String>::Null;
/// let num = Value::<String>::Number(Number::Integer(42));
/// let text = Value::<String>::from("hello");
///
/// assert!(null.is_null());
/// assert!(num.is_number());
/// assert!(text.is_string());
/// ```
#[derive(Clone)]
pub enum Value<K = String> {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Array(Vec<Value<K>>),
    Object(OrderedMap<K, Value<K>>),
}

/// The YAML flavor of [`Value`], keyed by arbitrary scalars.
pub type YamlValue = Value<Key>;

/// A numeric value, as classified by the scalar codec.
///
/// # Examples
///
/// ```rust
/// use serde_ordered::Number;
///
/// assert_eq!(Number::Integer(42).as_i64(), Some(42));
/// assert_eq!(Number::Float(42.0).as_i64(), Some(42));
/// assert_eq!(Number::Float(3.5).as_f64(), 3.5);
/// assert_eq!(Number::Unsigned(u64::MAX).as_i64(), None);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Number {
    Integer(i64),
    /// Only used for integers above `i64::MAX`.
    Unsigned(u64),
    Float(f64),
}

impl Number {
    #[inline]
    #[must_use]
    pub const fn is_integer(&self) -> bool {
        matches!(self, Number::Integer(_) | Number::Unsigned(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_float(&self) -> bool {
        matches!(self, Number::Float(_))
    }

    /// Converts this number to an `i64` if it is integral and in range.
    #[inline]
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Number::Integer(i) => Some(*i),
            Number::Unsigned(u) => i64::try_from(*u).ok(),
            Number::Float(f) => {
                if f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64 {
                    Some(*f as i64)
                } else {
                    None
                }
            }
        }
    }

    #[inline]
    #[must_use]
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Number::Integer(i) => u64::try_from(*i).ok(),
            Number::Unsigned(u) => Some(*u),
            Number::Float(_) => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_f64(&self) -> f64 {
        match self {
            Number::Integer(i) => *i as f64,
            Number::Unsigned(u) => *u as f64,
            Number::Float(f) => *f,
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Integer(i) => write!(f, "{}", i),
            Number::Unsigned(u) => write!(f, "{}", u),
            Number::Float(fl) => write!(f, "{}", fl),
        }
    }
}

impl Serialize for Number {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Number::Integer(i) => serializer.serialize_i64(*i),
            Number::Unsigned(u) => serializer.serialize_u64(*u),
            Number::Float(f) => serializer.serialize_f64(*f),
        }
    }
}

macro_rules! impl_from_integer {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Number {
                fn from(value: $ty) -> Self {
                    Number::Integer(i64::from(value))
                }
            }

            impl<K> From<$ty> for Value<K> {
                fn from(value: $ty) -> Self {
                    Value::Number(Number::from(value))
                }
            }
        )*
    };
}

impl_from_integer!(i8, i16, i32, i64, u8, u16, u32);

impl From<u64> for Number {
    fn from(value: u64) -> Self {
        match i64::try_from(value) {
            Ok(i) => Number::Integer(i),
            Err(_) => Number::Unsigned(value),
        }
    }
}

impl From<f64> for Number {
    fn from(value: f64) -> Self {
        Number::Float(value)
    }
}

impl<K> Value<K> {
    #[inline]
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    #[inline]
    #[must_use]
    pub const fn is_bool(&self) -> bool {
        matches!(self, Value::Bool(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_number(&self) -> bool {
        matches!(self, Value::Number(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_string(&self) -> bool {
        matches!(self, Value::String(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_array(&self) -> bool {
        matches!(self, Value::Array(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_object(&self) -> bool {
        matches!(self, Value::Object(_))
    }

    #[inline]
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_number(&self) -> Option<&Number> {
        match self {
            Value::Number(n) => Some(n),
            _ => None,
        }
    }

    /// If the value is an integer or a whole-number float that fits in `i64`, returns it.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_ordered::{Number, Value};
    ///
    /// assert_eq!(Value::<String>::from(42).as_i64(), Some(42));
    /// assert_eq!(Value::<String>::Number(Number::Float(42.5)).as_i64(), None);
    /// ```
    #[inline]
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        self.as_number().and_then(Number::as_i64)
    }

    #[inline]
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        self.as_number().map(Number::as_f64)
    }

    #[inline]
    #[must_use]
    pub fn as_array(&self) -> Option<&Vec<Value<K>>> {
        match self {
            Value::Array(arr) => Some(arr),
            _ => None,
        }
    }

    pub fn as_array_mut(&mut self) -> Option<&mut Vec<Value<K>>> {
        match self {
            Value::Array(arr) => Some(arr),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_object(&self) -> Option<&OrderedMap<K, Value<K>>> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    pub fn as_object_mut(&mut self) -> Option<&mut OrderedMap<K, Value<K>>> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Takes the value out, leaving `Null` in its place.
    pub fn take(&mut self) -> Value<K> {
        std::mem::replace(self, Value::Null)
    }
}

impl<K> Value<K>
where
    K: Eq + Hash,
{
    /// Looks up `key` if this value is an object.
    #[must_use]
    pub fn get<Q>(&self, key: &Q) -> Option<&Value<K>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.as_object().and_then(|obj| obj.get(key))
    }
}

impl<K> Default for Value<K> {
    fn default() -> Self {
        Value::Null
    }
}

impl<K> fmt::Debug for Value<K>
where
    K: fmt::Debug + Eq + Hash,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("Null"),
            Value::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            Value::Number(n) => f.debug_tuple("Number").field(n).finish(),
            Value::String(s) => f.debug_tuple("String").field(s).finish(),
            Value::Array(arr) => f.debug_tuple("Array").field(arr).finish(),
            Value::Object(obj) => f.debug_tuple("Object").field(obj).finish(),
        }
    }
}

impl<K> PartialEq for Value<K>
where
    K: Eq + Hash,
{
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a == b,
            _ => false,
        }
    }
}

/// Compact JSON text, keys in recorded order.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = crate::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}

impl<K> Serialize for Value<K>
where
    K: Serialize + Eq + Hash,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Number(n) => n.serialize(serializer),
            Value::String(s) => serializer.serialize_str(s),
            Value::Array(arr) => arr.serialize(serializer),
            Value::Object(obj) => obj.serialize(serializer),
        }
    }
}

impl<'de, K> Deserialize<'de> for Value<K>
where
    K: ObjectKey,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ValueVisitor<K>(PhantomData<K>);

        impl<'de, K> Visitor<'de> for ValueVisitor<K>
        where
            K: ObjectKey,
        {
            type Value = Value<K>;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("any valid value")
            }

            fn visit_bool<E>(self, value: bool) -> Result<Self::Value, E> {
                Ok(Value::Bool(value))
            }

            fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E> {
                Ok(Value::Number(Number::Integer(value)))
            }

            fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E> {
                Ok(Value::Number(Number::from(value)))
            }

            fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E> {
                Ok(Value::Number(Number::Float(value)))
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E> {
                Ok(Value::String(value.to_string()))
            }

            fn visit_string<E>(self, value: String) -> Result<Self::Value, E> {
                Ok(Value::String(value))
            }

            fn visit_unit<E>(self) -> Result<Self::Value, E> {
                Ok(Value::Null)
            }

            fn visit_none<E>(self) -> Result<Self::Value, E> {
                Ok(Value::Null)
            }

            fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
            where
                D: Deserializer<'de>,
            {
                Deserialize::deserialize(deserializer)
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: de::SeqAccess<'de>,
            {
                let mut vec = Vec::new();
                while let Some(elem) = seq.next_element()? {
                    vec.push(elem);
                }
                Ok(Value::Array(vec))
            }

            // Entries arrive in source order, so the map records that order.
            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: de::MapAccess<'de>,
            {
                let mut values = OrderedMap::new();
                while let Some((key, value)) = map.next_entry::<K, Value<K>>()? {
                    values.insert(key, value);
                }
                Ok(Value::Object(values))
            }
        }

        deserializer.deserialize_any(ValueVisitor(PhantomData))
    }
}

impl<K> TryFrom<Value<K>> for i64 {
    type Error = crate::Error;

    fn try_from(value: Value<K>) -> crate::Result<Self> {
        match value {
            Value::Number(n) => n
                .as_i64()
                .ok_or_else(|| crate::Error::custom(format!("cannot convert {} to i64", n))),
            _ => Err(crate::Error::custom("expected integer")),
        }
    }
}

impl<K> TryFrom<Value<K>> for f64 {
    type Error = crate::Error;

    fn try_from(value: Value<K>) -> crate::Result<Self> {
        match value {
            Value::Number(n) => Ok(n.as_f64()),
            _ => Err(crate::Error::custom("expected number")),
        }
    }
}

impl<K> TryFrom<Value<K>> for bool {
    type Error = crate::Error;

    fn try_from(value: Value<K>) -> crate::Result<Self> {
        match value {
            Value::Bool(b) => Ok(b),
            _ => Err(crate::Error::custom("expected bool")),
        }
    }
}

impl<K> TryFrom<Value<K>> for String {
    type Error = crate::Error;

    fn try_from(value: Value<K>) -> crate::Result<Self> {
        match value {
            Value::String(s) => Ok(s),
            _ => Err(crate::Error::custom("expected string")),
        }
    }
}

impl<K> From<bool> for Value<K> {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl<K> From<u64> for Value<K> {
    fn from(value: u64) -> Self {
        Value::Number(Number::from(value))
    }
}

impl<K> From<f64> for Value<K> {
    fn from(value: f64) -> Self {
        Value::Number(Number::Float(value))
    }
}

impl<K> From<Number> for Value<K> {
    fn from(value: Number) -> Self {
        Value::Number(value)
    }
}

impl<K> From<String> for Value<K> {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl<K> From<&str> for Value<K> {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl<K> From<Vec<Value<K>>> for Value<K> {
    fn from(value: Vec<Value<K>>) -> Self {
        Value::Array(value)
    }
}

impl<K> From<OrderedMap<K, Value<K>>> for Value<K> {
    fn from(value: OrderedMap<K, Value<K>>) -> Self {
        Value::Object(value)
    }
}
