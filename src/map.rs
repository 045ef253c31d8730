//! Insertion-ordered map.
//!
//! [`OrderedMap`] pairs a hash lookup with an explicit key sequence recording the order
//! in which keys were first inserted. Every mutation goes through this type, so the two
//! always agree on membership:
//!
//! - re-inserting an existing key replaces its value and keeps its position
//! - removing a key drops it from both the lookup and the sequence
//! - a removed key inserted again is appended at the end
//!
//! ## Examples
//!
//! ```rust
//! use serde_ordered::OrderedMap;
//!
//! let mut map = OrderedMap::new();
//! map.insert("c", 1);
//! map.insert("a", 2);
//! map.insert("c", 3);
//!
//! let keys: Vec<_> = map.keys().copied().collect();
//! assert_eq!(keys, vec!["c", "a"]);
//! assert_eq!(map.get("c"), Some(&3));
//! ```

use serde::de::{MapAccess, Visitor};
use serde::ser::{Error as _, SerializeMap};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::marker::PhantomData;

/// A map which remembers the order in which its keys were first inserted.
///
/// Unlike [`HashMap`], iteration always follows that order. The zero value
/// (`OrderedMap::new()` or `Default`) is a valid empty map.
#[derive(Clone)]
pub struct OrderedMap<K, V> {
    entries: HashMap<K, V>,
    keys: Vec<K>,
}

impl<K, V> OrderedMap<K, V> {
    /// Creates an empty `OrderedMap`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_ordered::OrderedMap;
    ///
    /// let map: OrderedMap<String, i32> = OrderedMap::new();
    /// assert!(map.is_empty());
    /// ```
    #[must_use]
    pub fn new() -> Self {
        OrderedMap {
            entries: HashMap::new(),
            keys: Vec::new(),
        }
    }

    /// Creates an empty `OrderedMap` with room for `capacity` entries.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        OrderedMap {
            entries: HashMap::with_capacity(capacity),
            keys: Vec::with_capacity(capacity),
        }
    }

    /// Returns the number of entries in the map.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Returns `true` if the map contains no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Returns an iterator over the keys, in insertion order.
    pub fn keys(&self) -> std::slice::Iter<'_, K> {
        self.keys.iter()
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.keys.clear();
    }
}

impl<K, V> OrderedMap<K, V>
where
    K: Eq + Hash,
{
    /// Returns a reference to the value stored under `key`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_ordered::OrderedMap;
    ///
    /// let mut map = OrderedMap::new();
    /// map.insert("key".to_string(), 42);
    /// assert_eq!(map.get("key"), Some(&42));
    /// assert_eq!(map.get("missing"), None);
    /// ```
    #[must_use]
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.get(key)
    }

    /// Returns a mutable reference to the value stored under `key`.
    ///
    /// The key keeps its position; membership cannot change through this reference.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.get_mut(key)
    }

    #[must_use]
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.contains_key(key)
    }

    /// Removes `key`, returning its value if it was present.
    ///
    /// A later insert of the same key appends it at the end of the order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_ordered::OrderedMap;
    ///
    /// let mut map = OrderedMap::new();
    /// map.insert("a", 1);
    /// map.insert("c", 2);
    /// map.insert("b", 3);
    /// assert_eq!(map.remove("c"), Some(2));
    /// map.insert("c", 4);
    ///
    /// let keys: Vec<_> = map.keys().copied().collect();
    /// assert_eq!(keys, vec!["a", "b", "c"]);
    /// ```
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let value = self.entries.remove(key)?;
        if let Some(index) = self
            .keys
            .iter()
            .position(|k| Borrow::<Q>::borrow(k) == key)
        {
            self.keys.remove(index);
        }
        Some(value)
    }

    /// Returns an iterator over the values, in insertion order.
    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        self.iter().map(|(_, v)| v)
    }

    /// Returns an iterator over `(key, value)` pairs, in insertion order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            keys: self.keys.iter(),
            entries: &self.entries,
        }
    }

    /// Looks up the value of every recorded key, in order.
    ///
    /// Fails if a recorded key has no value, which can only happen to a corrupted map.
    pub(crate) fn checked_entries(&self) -> crate::Result<Vec<(&K, &V)>> {
        let mut out = Vec::with_capacity(self.keys.len());
        for key in &self.keys {
            let value = self.entries.get(key).ok_or_else(|| {
                crate::Error::internal_consistency("a key is listed in the order but is not mapped")
            })?;
            out.push((key, value));
        }
        Ok(out)
    }
}

impl<K, V> OrderedMap<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Inserts `value` under `key`.
    ///
    /// If the key was already present its value is replaced in place, its position is
    /// kept, and the old value is returned.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_ordered::OrderedMap;
    ///
    /// let mut map = OrderedMap::new();
    /// assert!(map.insert("key".to_string(), 42).is_none());
    /// assert_eq!(map.insert("key".to_string(), 43), Some(42));
    /// assert_eq!(map.len(), 1);
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        if let Some(slot) = self.entries.get_mut(&key) {
            return Some(std::mem::replace(slot, value));
        }
        self.keys.push(key.clone());
        self.entries.insert(key, value);
        None
    }
}

#[cfg(test)]
impl<K, V> OrderedMap<K, V>
where
    K: Eq + Hash,
{
    /// Drops `key` from the lookup only, leaving the recorded order stale.
    pub(crate) fn corrupt_for_test<Q>(&mut self, key: &Q)
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.remove(key);
    }
}

impl<K, V> Default for OrderedMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> fmt::Debug for OrderedMap<K, V>
where
    K: fmt::Debug + Eq + Hash,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Two maps are equal when they hold the same entries in the same order.
impl<K, V> PartialEq for OrderedMap<K, V>
where
    K: Eq + Hash,
    V: PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.keys == other.keys && self.iter().zip(other.iter()).all(|(a, b)| a.1 == b.1)
    }
}

/// Iterator over the entries of an [`OrderedMap`], in insertion order.
pub struct Iter<'a, K, V> {
    keys: std::slice::Iter<'a, K>,
    entries: &'a HashMap<K, V>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V>
where
    K: Eq + Hash,
{
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        for key in self.keys.by_ref() {
            if let Some(value) = self.entries.get(key) {
                return Some((key, value));
            }
        }
        None
    }
}

impl<'a, K, V> IntoIterator for &'a OrderedMap<K, V>
where
    K: Eq + Hash,
{
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Owning iterator over the entries of an [`OrderedMap`], in insertion order.
pub struct IntoIter<K, V> {
    keys: std::vec::IntoIter<K>,
    entries: HashMap<K, V>,
}

impl<K, V> Iterator for IntoIter<K, V>
where
    K: Eq + Hash,
{
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        for key in self.keys.by_ref() {
            if let Some(value) = self.entries.remove(&key) {
                return Some((key, value));
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.keys.len()))
    }
}

impl<K, V> IntoIterator for OrderedMap<K, V>
where
    K: Eq + Hash,
{
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            keys: self.keys.into_iter(),
            entries: self.entries,
        }
    }
}

impl<K, V> FromIterator<(K, V)> for OrderedMap<K, V>
where
    K: Eq + Hash + Clone,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut map = OrderedMap::new();
        map.extend(iter);
        map
    }
}

impl<K, V> Extend<(K, V)> for OrderedMap<K, V>
where
    K: Eq + Hash + Clone,
{
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K, V> From<OrderedMap<K, V>> for HashMap<K, V> {
    fn from(map: OrderedMap<K, V>) -> Self {
        map.entries
    }
}

impl<K, V> Serialize for OrderedMap<K, V>
where
    K: Serialize + Eq + Hash,
    V: Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let entries = self.checked_entries().map_err(S::Error::custom)?;
        let mut map = serializer.serialize_map(Some(entries.len()))?;
        for (key, value) in entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de, K, V> Deserialize<'de> for OrderedMap<K, V>
where
    K: Deserialize<'de> + Eq + Hash + Clone,
    V: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct OrderedMapVisitor<K, V>(PhantomData<(K, V)>);

        impl<'de, K, V> Visitor<'de> for OrderedMapVisitor<K, V>
        where
            K: Deserialize<'de> + Eq + Hash + Clone,
            V: Deserialize<'de>,
        {
            type Value = OrderedMap<K, V>;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a map")
            }

            fn visit_unit<E>(self) -> Result<Self::Value, E> {
                Ok(OrderedMap::new())
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut map = OrderedMap::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((key, value)) = access.next_entry()? {
                    map.insert(key, value);
                }
                Ok(map)
            }
        }

        deserializer.deserialize_map(OrderedMapVisitor(PhantomData))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys_of<V>(map: &OrderedMap<&'static str, V>) -> Vec<&'static str> {
        map.keys().copied().collect()
    }

    #[test]
    fn test_reassignment_keeps_position() {
        let mut map = OrderedMap::new();
        map.insert("c", 1);
        map.insert("a", 2);
        map.insert("c", 3);

        assert_eq!(keys_of(&map), vec!["c", "a"]);
        assert_eq!(map.get("c"), Some(&3));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_remove_then_reinsert_appends() {
        let mut map = OrderedMap::new();
        map.insert("a", 1);
        map.insert("c", 2);
        map.insert("b", 3);

        assert_eq!(map.remove("c"), Some(2));
        assert_eq!(keys_of(&map), vec!["a", "b"]);

        map.insert("c", 4);
        assert_eq!(keys_of(&map), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_remove_missing_key() {
        let mut map: OrderedMap<&str, i32> = OrderedMap::new();
        assert_eq!(map.remove("nope"), None);
        map.insert("a", 1);
        assert_eq!(map.remove("nope"), None);
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_clear() {
        let mut map = OrderedMap::new();
        map.insert("a", 1);
        map.insert("b", 2);
        map.clear();
        assert!(map.is_empty());
        assert_eq!(map.keys().count(), 0);
        assert_eq!(map.get("a"), None);
    }

    #[test]
    fn test_clone_is_independent() {
        let mut map = OrderedMap::new();
        map.insert("a", 1);
        map.insert("b", 2);

        let mut copy = map.clone();
        copy.insert("c", 3);
        copy.remove("a");
        copy.insert("b", 20);

        assert_eq!(keys_of(&map), vec!["a", "b"]);
        assert_eq!(map.get("b"), Some(&2));
        assert_eq!(keys_of(&copy), vec!["b", "c"]);
    }

    #[test]
    fn test_iteration_follows_insertion_order() {
        let map: OrderedMap<&str, i32> = vec![("z", 1), ("y", 2), ("x", 3)]
            .into_iter()
            .collect();

        let pairs: Vec<_> = map.iter().map(|(k, v)| (*k, *v)).collect();
        assert_eq!(pairs, vec![("z", 1), ("y", 2), ("x", 3)]);

        let values: Vec<_> = map.values().copied().collect();
        assert_eq!(values, vec![1, 2, 3]);

        let owned: Vec<_> = map.into_iter().collect();
        assert_eq!(owned, vec![("z", 1), ("y", 2), ("x", 3)]);
    }

    #[test]
    fn test_equality_is_order_sensitive() {
        let ab: OrderedMap<&str, i32> = vec![("a", 1), ("b", 2)].into_iter().collect();
        let ba: OrderedMap<&str, i32> = vec![("b", 2), ("a", 1)].into_iter().collect();
        assert_ne!(ab, ba);
        assert_eq!(ab, ab.clone());
    }

    #[test]
    fn test_get_mut_keeps_order() {
        let mut map = OrderedMap::new();
        map.insert("a", 1);
        map.insert("b", 2);
        if let Some(v) = map.get_mut("a") {
            *v = 10;
        }
        assert_eq!(keys_of(&map), vec!["a", "b"]);
        assert_eq!(map.get("a"), Some(&10));
    }

    #[test]
    fn test_checked_entries_detects_corruption() {
        let mut map = OrderedMap::new();
        map.insert("a", 1);
        map.insert("b", 2);
        assert_eq!(map.checked_entries().unwrap().len(), 2);

        map.corrupt_for_test("a");
        assert!(matches!(
            map.checked_entries(),
            Err(crate::Error::InternalConsistency(_))
        ));
    }
}
