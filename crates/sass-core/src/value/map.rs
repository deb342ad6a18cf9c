//! Sass maps (spec §3.1, §4.1): insertion-ordered key/value pairs with
//! fuzzy-equal key lookup, backed by `indexmap` for O(1) access that
//! still iterates in insertion order (`map.keys`/`map.values`/`@each`
//! over a map all depend on stable ordering).

use indexmap::IndexMap;

use super::Value;

/// A Sass map value.
#[derive(Debug, Clone, Default)]
pub struct SassMap {
    entries: IndexMap<Value, Value>,
}

impl SassMap {
    /// The empty map, `()`'s map interpretation.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from an ordered sequence of pairs; later duplicate keys
    /// overwrite earlier ones but keep the earlier key's position, per
    /// the map literal semantics of the language (spec §4.1).
    #[must_use]
    pub fn from_pairs(pairs: Vec<(Value, Value)>) -> Self {
        let mut entries = IndexMap::new();
        for (k, v) in pairs {
            entries.insert(k, v);
        }
        Self { entries }
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if the map has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up a value by key.
    #[must_use]
    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Insert or overwrite a key, returning the previous value if any.
    /// Preserves the original position when overwriting, matching
    /// `indexmap::IndexMap::insert`'s documented behavior.
    pub fn insert(&mut self, key: Value, value: Value) -> Option<Value> {
        self.entries.insert(key, value)
    }

    /// Remove a key, returning its value if present. Shifts later
    /// entries down by one position (`shift_remove`), preserving
    /// relative order of the remaining entries for `map.remove`.
    pub fn remove(&mut self, key: &Value) -> Option<Value> {
        self.entries.shift_remove(key)
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &Value> {
        self.entries.keys()
    }

    /// Values in insertion order.
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.entries.values()
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&Value, &Value)> {
        self.entries.iter()
    }

    /// A new map with `other`'s entries overlaid on top of `self`'s
    /// (later keys win, `self`'s ordering is kept for shared keys,
    /// `other`'s new keys are appended), for `map.merge`.
    #[must_use]
    pub fn merged_with(&self, other: &Self) -> Self {
        let mut merged = self.clone();
        for (k, v) in other.iter() {
            merged.insert(k.clone(), v.clone());
        }
        merged
    }

    /// Structural equality: same entries, fuzzy-equal values, any order
    /// (maps are unordered for equality purposes even though iteration
    /// is ordered, spec §4.1).
    #[must_use]
    pub fn fuzzy_eq(&self, other: &Self) -> bool {
        if self.entries.len() != other.entries.len() {
            return false;
        }
        self.entries.iter().all(|(k, v)| other.get(k).is_some_and(|ov| ov.fuzzy_eq(v)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::number::Number;

    fn num(n: f64) -> Value {
        Value::Number(Number::unitless(n))
    }

    #[test]
    fn insert_overwrite_keeps_position() {
        let mut map = SassMap::from_pairs(vec![(num(1.0), num(10.0)), (num(2.0), num(20.0))]);
        map.insert(num(1.0), num(99.0));
        let keys: Vec<_> = map.keys().cloned().collect();
        assert_eq!(keys, vec![num(1.0), num(2.0)]);
        assert_eq!(map.get(&num(1.0)), Some(&num(99.0)));
    }

    #[test]
    fn merged_with_appends_new_keys() {
        let a = SassMap::from_pairs(vec![(num(1.0), num(10.0))]);
        let b = SassMap::from_pairs(vec![(num(2.0), num(20.0))]);
        let merged = a.merged_with(&b);
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn fuzzy_eq_ignores_order() {
        let a = SassMap::from_pairs(vec![(num(1.0), num(10.0)), (num(2.0), num(20.0))]);
        let b = SassMap::from_pairs(vec![(num(2.0), num(20.0)), (num(1.0), num(10.0))]);
        assert!(a.fuzzy_eq(&b));
    }
}
