//! `HArray`: an insertion-ordered, open-addressed map keyed by string.
//!
//! Backing storage is a dense `items` vector holding entries in insertion
//! order, plus a separate `buckets` table mapping a key's hash to the index
//! of the first candidate in `items`; collisions chain through each entry's
//! `next` field. This is the classic "dense array + index table" shape, kept
//! separate from a library hash map so that iteration order is guaranteed to
//! be insertion order rather than an implementation detail.

mod error;

use ahash::RandomState;

pub use error::HArrayError;

const EMPTY: i64 = -1;

/// Fixed hasher seed so that hash values (and therefore collision chains)
/// are reproducible within and across runs of the same program.
const HASH_STATE: RandomState = RandomState::with_seeds(
    0x9E37_79B9_7F4A_7C15,
    0xBF58_476D_1CE4_E5B9,
    0x94D0_49BB_1331_11EB,
    0x2545_F491_4F6C_DD1D,
);

#[derive(Clone, Debug)]
struct Entry<V> {
    hash: u64,
    key: String,
    value: V,
    next: i64,
}

/// An insertion-ordered map from `String` keys to values of type `V`.
#[derive(Clone, Debug)]
pub struct HArray<V> {
    items: Vec<Entry<V>>,
    buckets: Vec<i64>,
}

impl<V> Default for HArray<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: PartialEq> PartialEq for HArray<V> {
    /// Two `HArray`s are equal iff they hold the same key/value pairs in
    /// the same insertion order. Bucket-table layout never factors in.
    fn eq(&self, other: &Self) -> bool {
        self.items.len() == other.items.len()
            && self
                .items
                .iter()
                .zip(other.items.iter())
                .all(|(a, b)| a.key == b.key && a.value == b.value)
    }
}

impl<V> HArray<V> {
    /// Creates an empty `HArray` with no bucket allocation yet.
    #[must_use]
    pub fn new() -> Self {
        Self { items: Vec::new(), buckets: Vec::new() }
    }

    /// Creates an empty `HArray` with buckets pre-sized for `capacity`
    /// entries (rounded up to the next power of two).
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let mut harray = Self::new();
        if capacity > 0 {
            harray.buckets = vec![EMPTY; next_power_of_two(capacity)];
        }
        harray
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Current bucket-table size. Always a power of two, 0 when the map has
    /// never been grown.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.buckets.len()
    }

    fn hash_of(key: &str) -> u64 {
        HASH_STATE.hash_one(key)
    }

    fn find(&self, key: &str) -> Option<usize> {
        if self.buckets.is_empty() {
            return None;
        }
        let hash = Self::hash_of(key);
        let mask = self.buckets.len() - 1;
        let mut cursor = self.buckets[(hash as usize) & mask];
        while cursor != EMPTY {
            let entry = &self.items[cursor as usize];
            if entry.hash == hash && entry.key == key {
                return Some(cursor as usize);
            }
            cursor = entry.next;
        }
        None
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.find(key).is_some()
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&V> {
        self.find(key).map(|index| &self.items[index].value)
    }

    #[must_use]
    pub fn get_mut(&mut self, key: &str) -> Option<&mut V> {
        self.find(key).map(move |index| &mut self.items[index].value)
    }

    /// Returns the `(key, value)` pair at insertion-order position `index`.
    #[must_use]
    pub fn get_index(&self, index: usize) -> Option<(&str, &V)> {
        self.items.get(index).map(|entry| (entry.key.as_str(), &entry.value))
    }

    /// Inserts `value` under `key`, returning the previous value if `key`
    /// was already present (in which case its insertion position is kept).
    pub fn insert(&mut self, key: impl Into<String>, value: V) -> Option<V> {
        let key = key.into();
        if let Some(index) = self.find(&key) {
            return Some(std::mem::replace(&mut self.items[index].value, value));
        }

        self.grow_if_needed();
        let hash = Self::hash_of(&key);
        let index = self.items.len();
        let mask = self.buckets.len() - 1;
        let slot = (hash as usize) & mask;
        self.items.push(Entry { hash, key, value, next: self.buckets[slot] });
        self.buckets[slot] = index as i64;
        None
    }

    /// Removes `key`, returning its value. Preserves insertion order of the
    /// remaining entries; rebuilds the bucket table since every index after
    /// the removed one shifts down by one.
    pub fn remove(&mut self, key: &str) -> Option<V> {
        let index = self.find(key)?;
        let entry = self.items.remove(index);
        self.rebuild_buckets();
        Some(entry.value)
    }

    /// Renames `from` to `to`, keeping the entry's insertion position.
    /// Fails if `from` is absent or `to` is already taken.
    pub fn rename(&mut self, from: &str, to: impl Into<String>) -> Result<(), HArrayError> {
        let to = to.into();
        let index = self.find(from).ok_or(HArrayError::KeyNotFound)?;
        if from != to && self.contains_key(&to) {
            return Err(HArrayError::KeyAlreadyExists);
        }
        self.items[index].key = to;
        self.items[index].hash = Self::hash_of(&self.items[index].key);
        self.rebuild_buckets();
        Ok(())
    }

    /// Reorders entries by key, ascending or descending, and rebuilds the
    /// bucket table to match the new positions.
    pub fn sort(&mut self, ascending: bool) {
        if ascending {
            self.items.sort_by(|a, b| a.key.cmp(&b.key));
        } else {
            self.items.sort_by(|a, b| b.key.cmp(&a.key));
        }
        self.rebuild_buckets();
    }

    /// Shrinks the bucket table and backing storage to fit the current
    /// number of entries, dropping any excess capacity left behind by prior
    /// growth or removals.
    pub fn compact(&mut self) {
        self.items.shrink_to_fit();
        let fitted = next_power_of_two(self.items.len());
        if fitted < self.buckets.len() {
            self.buckets = vec![EMPTY; fitted];
            self.relink_all();
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.items.iter().map(|entry| (entry.key.as_str(), &entry.value))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(|entry| entry.key.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.items.iter().map(|entry| &entry.value)
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut V> {
        self.items.iter_mut().map(|entry| &mut entry.value)
    }

    fn grow_if_needed(&mut self) {
        const LOAD_FACTOR_NUM: usize = 3;
        const LOAD_FACTOR_DEN: usize = 4;

        if self.buckets.is_empty() {
            self.buckets = vec![EMPTY; 8];
            return;
        }
        if (self.items.len() + 1) * LOAD_FACTOR_DEN > self.buckets.len() * LOAD_FACTOR_NUM {
            self.buckets = vec![EMPTY; self.buckets.len() * 2];
            self.relink_all();
        }
    }

    fn rebuild_buckets(&mut self) {
        if self.buckets.is_empty() && !self.items.is_empty() {
            self.buckets = vec![EMPTY; next_power_of_two(self.items.len())];
        }
        self.relink_all();
    }

    fn relink_all(&mut self) {
        if self.buckets.is_empty() {
            return;
        }
        for slot in &mut self.buckets {
            *slot = EMPTY;
        }
        let mask = self.buckets.len() - 1;
        for index in 0..self.items.len() {
            let slot = (self.items[index].hash as usize) & mask;
            self.items[index].next = self.buckets[slot];
            self.buckets[slot] = index as i64;
        }
    }
}

fn next_power_of_two(value: usize) -> usize {
    value.max(1).next_power_of_two()
}
