//! Copy-on-write mutable shadow over an immutable encoded dictionary.
//!
//! An `MDict` wraps a read-only [`DictReader`] and overlays pending edits in
//! a hash map. Keys read from the immutable image are materialized lazily
//! into the map on first access; deleted keys stay in the map as tombstones
//! (empty [`MValue`]s) shadowing the immutable entry. Nothing is re-encoded
//! until [`encode_to`](MDict::encode_to) is called — and if the dict was
//! never mutated, the original image is emitted by reference.
//!
//! Every key held in the map is backed by owning storage ([`SharedBytes`]):
//! a transient caller key that induces a new entry is copied first, so no
//! key ever points into caller memory.

use std::rc::Rc;

use rustc_hash::FxHashMap;
use vellum_core::{DictReader, EncodedValue, Encoder, SharedBytes, SharedKeys, ToEncoder};

use crate::collection::MCollection;
use crate::mvalue::MValue;

/// A mutable dictionary of [`MValue`]s shadowing an immutable one.
pub struct MDict<N> {
    base: MCollection,
    dict: Option<Rc<dyn DictReader>>,
    count: u32,
    map: FxHashMap<SharedBytes, MValue<N>>,
}

impl<N: std::fmt::Debug> std::fmt::Debug for MDict<N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MDict")
            .field("count", &self.count)
            .field("mutated", &self.base.is_mutated())
            .field("backed", &self.dict.is_some())
            .field("overlay", &self.map)
            .finish()
    }
}

impl<N> MDict<N> {
    /// An empty mutable dictionary with no immutable backing.
    pub fn new() -> MDict<N> {
        MDict {
            base: MCollection::new(None),
            dict: None,
            count: 0,
            map: FxHashMap::default(),
        }
    }

    /// Shadow an immutable dictionary. `shared_keys` is consulted for every
    /// lookup into the backing dict.
    pub fn wrap(dict: Rc<dyn DictReader>, shared_keys: Option<Rc<SharedKeys>>) -> MDict<N> {
        let count = dict.count();
        MDict {
            base: MCollection::new(shared_keys),
            dict: Some(dict),
            count,
            map: FxHashMap::default(),
        }
    }

    /// Install this dict under a parent collection so mutations propagate
    /// upward.
    pub fn init_parent(&mut self, parent: Option<&MCollection>) {
        self.base.init(parent);
    }

    /// The collection base (mutation mark, shared keys).
    pub fn collection(&self) -> &MCollection {
        &self.base
    }

    /// Live entry count.
    #[inline]
    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn is_mutated(&self) -> bool {
        self.base.is_mutated()
    }

    fn backing_get(&self, key: &[u8]) -> Option<EncodedValue> {
        self.dict.as_ref()?.get(key, self.base.shared_keys())
    }

    /// True if `key` currently resolves to a live value.
    pub fn contains(&self, key: &[u8]) -> bool {
        match self.map.get(key) {
            Some(entry) => !entry.is_empty(),
            None => self.backing_get(key).is_some(),
        }
    }

    /// Look up `key`, materializing an entry for an immutable-backed key on
    /// first access. Returns the map entry itself, so a shadowing tombstone
    /// comes back as an empty value. The borrow ends before any further
    /// mutation can happen.
    pub fn get(&mut self, key: &[u8]) -> Option<&MValue<N>> {
        if !self.map.contains_key(key) {
            let value = self.backing_get(key)?;
            self.map
                .insert(SharedBytes::copy_of(key), MValue::encoded(value));
        }
        self.map.get(key)
    }

    /// Write `value` under `key`. Storing an empty value deletes the key.
    /// A change with no effect (empty over empty, or an absent key set to
    /// empty) is skipped without marking the dict mutated.
    pub fn set(&mut self, key: &[u8], value: MValue<N>) {
        if let Some(existing) = self.map.get_mut(key) {
            if value.is_empty() && existing.is_empty() {
                return;
            }
            self.base.mutate();
            self.count = self.count + !value.is_empty() as u32 - !existing.is_empty() as u32;
            *existing = value;
        } else {
            if self.backing_get(key).is_some() {
                if value.is_empty() {
                    self.count -= 1;
                }
            } else {
                if value.is_empty() {
                    return;
                }
                self.count += 1;
            }
            self.base.mutate();
            self.map.insert(SharedBytes::copy_of(key), value);
        }
    }

    /// Remove `key` (a shorthand for storing a tombstone).
    pub fn remove(&mut self, key: &[u8]) {
        self.set(key, MValue::empty());
    }

    /// Delete every entry: all immutable keys become tombstones and all
    /// overlay entries are dropped.
    pub fn clear(&mut self) {
        if self.count == 0 {
            return;
        }
        self.base.mutate();
        self.map.clear();
        let map = &mut self.map;
        if let Some(dict) = &self.dict {
            dict.for_each(self.base.shared_keys(), &mut |key, _| {
                map.insert(SharedBytes::copy_of(key), MValue::empty());
            });
        }
        self.count = 0;
    }

    /// Visit every live entry: overlay entries first (arbitrary order among
    /// themselves), then surviving immutable-backed entries in the backing
    /// dict's native order.
    pub fn enumerate(&self, mut callback: impl FnMut(&[u8], &MValue<N>)) {
        for (key, value) in &self.map {
            if !value.is_empty() {
                callback(key.as_slice(), value);
            }
        }
        let map = &self.map;
        if let Some(dict) = &self.dict {
            dict.for_each(self.base.shared_keys(), &mut |key, value| {
                if !map.contains_key(key) {
                    callback(key, &MValue::encoded(value));
                }
            });
        }
    }
}

impl<N: ToEncoder> MDict<N> {
    /// Stream this dictionary to an encoder. An unmutated dict emits its
    /// original image by reference; otherwise the live entries are
    /// re-encoded.
    pub fn encode_to(&self, enc: &mut dyn Encoder) {
        if !self.base.is_mutated() {
            if let Some(dict) = &self.dict {
                enc.write_dict_ref(dict.as_ref(), self.base.shared_keys());
                return;
            }
        }
        tracing::trace!(count = self.count, "re-encoding mutated dict");
        enc.begin_dict(self.count);
        self.enumerate(|key, value| {
            enc.write_key(key);
            value.encode_to(&mut *enc);
        });
        enc.end_dict();
    }
}

impl<N> Default for MDict<N> {
    fn default() -> Self {
        MDict::new()
    }
}

impl<N: Clone> Clone for MDict<N> {
    /// The clone shares the immutable backing and copies the overlay; its
    /// mutation mark keeps the flag but detaches from any parent chain.
    fn clone(&self) -> MDict<N> {
        MDict {
            base: self.base.clone(),
            dict: self.dict.clone(),
            count: self.count,
            map: self.map.clone(),
        }
    }
}
