//! Object key types.
//!
//! JSON objects are always keyed by strings, while YAML mappings accept any scalar as a
//! key. [`ObjectKey`] abstracts over the two so that [`Value`] and the serde bridges can
//! be shared: `Value<String>` is the JSON tree and `Value<Key>` the YAML tree.

use crate::{Error, Number, Result, Value};
use serde::de::{self, DeserializeOwned, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::hash::{Hash, Hasher};

/// A type usable as the key of a [`Value`] object.
pub trait ObjectKey: Clone + Eq + Hash + fmt::Debug + Serialize + DeserializeOwned {
    /// Views the key as a scalar value.
    fn into_value(self) -> Value<Self>;

    /// Builds a key from a serialized value, failing for values that cannot be keys.
    fn from_value(value: Value<Self>) -> Result<Self>;
}

impl ObjectKey for String {
    fn into_value(self) -> Value<Self> {
        Value::String(self)
    }

    fn from_value(value: Value<Self>) -> Result<Self> {
        match value {
            Value::String(s) => Ok(s),
            Value::Number(n) => Ok(n.to_string()),
            Value::Bool(b) => Ok(b.to_string()),
            other => Err(Error::key_must_be_string(format!("{:?}", other))),
        }
    }
}

/// A scalar mapping key, as found in YAML documents.
///
/// Keys keep the type they were written with: `1`, `"1"`, `1.0`, `true` and `~` are five
/// distinct keys. Floats compare bitwise so that every key can be hashed.
///
/// # Examples
///
/// ```rust
/// use serde_ordered::Key;
///
/// assert_ne!(Key::Integer(1), Key::String("1".to_string()));
/// assert_eq!(Key::Float(1.5), Key::Float(1.5));
/// assert_eq!(Key::from("name").to_string(), "name");
/// ```
#[derive(Debug, Clone)]
pub enum Key {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

impl Key {
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Key::String(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Key::Integer(i) => Some(*i),
            _ => None,
        }
    }
}

impl PartialEq for Key {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Key::Null, Key::Null) => true,
            (Key::Bool(a), Key::Bool(b)) => a == b,
            (Key::Integer(a), Key::Integer(b)) => a == b,
            (Key::Float(a), Key::Float(b)) => a.to_bits() == b.to_bits(),
            (Key::String(a), Key::String(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Key {}

impl Hash for Key {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Key::Null => {}
            Key::Bool(b) => b.hash(state),
            Key::Integer(i) => i.hash(state),
            Key::Float(f) => f.to_bits().hash(state),
            Key::String(s) => s.hash(state),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Null => write!(f, "null"),
            Key::Bool(b) => write!(f, "{}", b),
            Key::Integer(i) => write!(f, "{}", i),
            Key::Float(fl) => write!(f, "{}", fl),
            Key::String(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Key::String(value.to_string())
    }
}

impl From<String> for Key {
    fn from(value: String) -> Self {
        Key::String(value)
    }
}

impl From<i64> for Key {
    fn from(value: i64) -> Self {
        Key::Integer(value)
    }
}

impl From<bool> for Key {
    fn from(value: bool) -> Self {
        Key::Bool(value)
    }
}

impl ObjectKey for Key {
    fn into_value(self) -> Value<Self> {
        match self {
            Key::Null => Value::Null,
            Key::Bool(b) => Value::Bool(b),
            Key::Integer(i) => Value::Number(Number::Integer(i)),
            Key::Float(f) => Value::Number(Number::Float(f)),
            Key::String(s) => Value::String(s),
        }
    }

    fn from_value(value: Value<Self>) -> Result<Self> {
        match value {
            Value::Null => Ok(Key::Null),
            Value::Bool(b) => Ok(Key::Bool(b)),
            Value::Number(Number::Integer(i)) => Ok(Key::Integer(i)),
            Value::Number(Number::Unsigned(u)) => Err(Error::unsupported(&format!(
                "integer key {} does not fit in i64",
                u
            ))),
            Value::Number(Number::Float(f)) => Ok(Key::Float(f)),
            Value::String(s) => Ok(Key::String(s)),
            Value::Array(_) => Err(Error::unsupported("a sequence cannot be a mapping key")),
            Value::Object(_) => Err(Error::unsupported("a mapping cannot be a mapping key")),
        }
    }
}

impl Serialize for Key {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Key::Null => serializer.serialize_unit(),
            Key::Bool(b) => serializer.serialize_bool(*b),
            Key::Integer(i) => serializer.serialize_i64(*i),
            Key::Float(f) => serializer.serialize_f64(*f),
            Key::String(s) => serializer.serialize_str(s),
        }
    }
}

impl<'de> Deserialize<'de> for Key {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct KeyVisitor;

        impl<'de> Visitor<'de> for KeyVisitor {
            type Value = Key;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a scalar mapping key")
            }

            fn visit_bool<E>(self, value: bool) -> std::result::Result<Key, E> {
                Ok(Key::Bool(value))
            }

            fn visit_i64<E>(self, value: i64) -> std::result::Result<Key, E> {
                Ok(Key::Integer(value))
            }

            fn visit_u64<E>(self, value: u64) -> std::result::Result<Key, E>
            where
                E: de::Error,
            {
                i64::try_from(value)
                    .map(Key::Integer)
                    .map_err(|_| E::custom(format!("integer key {} does not fit in i64", value)))
            }

            fn visit_f64<E>(self, value: f64) -> std::result::Result<Key, E> {
                Ok(Key::Float(value))
            }

            fn visit_str<E>(self, value: &str) -> std::result::Result<Key, E> {
                Ok(Key::String(value.to_string()))
            }

            fn visit_string<E>(self, value: String) -> std::result::Result<Key, E> {
                Ok(Key::String(value))
            }

            fn visit_unit<E>(self) -> std::result::Result<Key, E> {
                Ok(Key::Null)
            }

            fn visit_none<E>(self) -> std::result::Result<Key, E> {
                Ok(Key::Null)
            }
        }

        deserializer.deserialize_any(KeyVisitor)
    }
}
