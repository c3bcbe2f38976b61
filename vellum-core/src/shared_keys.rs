//! Interned dictionary keys.
//!
//! Frequently repeated dictionary keys can be replaced by small integer ids
//! in the encoded image. `SharedKeys` is the bidirectional interning map the
//! reader consults to resolve ids back to key bytes and the encoder consults
//! to emit ids for keys interned ahead of time.
//!
//! Only short, identifier-like keys are eligible (at most 16 bytes of
//! `[A-Za-z0-9_-]`), and the table caps at 2048 entries; everything else is
//! written inline. Ids are assigned sequentially from 0 and never reused.
//!
//! Wire state: `[count: varint][len: varint, key_bytes...]*`

use rustc_hash::FxHashMap;

use crate::bytes::SharedBytes;
use crate::error::{CodecError, Result};
use crate::varint::{get_uvarint, put_uvarint};

/// Longest key eligible for interning, in bytes.
pub const MAX_SHARED_KEY_LEN: usize = 16;
/// Maximum number of interned keys.
pub const MAX_SHARED_KEYS: usize = 2048;

/// Bidirectional map between eligible key bytes and small integer ids.
#[derive(Debug, Default, Clone)]
pub struct SharedKeys {
    by_key: FxHashMap<SharedBytes, u32>,
    by_id: Vec<SharedBytes>,
}

impl SharedKeys {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of interned keys.
    pub fn count(&self) -> u32 {
        self.by_id.len() as u32
    }

    /// Whether `key` may be interned at all: 1..=16 bytes of alphanumerics,
    /// underscore, or hyphen.
    pub fn is_eligible(key: &[u8]) -> bool {
        !key.is_empty()
            && key.len() <= MAX_SHARED_KEY_LEN
            && key
                .iter()
                .all(|&b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
    }

    /// The id for an already interned key.
    pub fn encode(&self, key: &[u8]) -> Option<u32> {
        self.by_key.get(key).copied()
    }

    /// The id for `key`, interning it if eligible and capacity remains.
    pub fn encode_and_add(&mut self, key: &[u8]) -> Option<u32> {
        if let Some(&id) = self.by_key.get(key) {
            return Some(id);
        }
        if !Self::is_eligible(key) || self.by_id.len() >= MAX_SHARED_KEYS {
            return None;
        }
        let id = self.by_id.len() as u32;
        let owned = SharedBytes::from(key);
        self.by_id.push(owned.clone());
        self.by_key.insert(owned, id);
        Some(id)
    }

    /// The key bytes for `id`, if assigned.
    pub fn decode(&self, id: u32) -> Option<&[u8]> {
        self.by_id.get(id as usize).map(|k| k.as_slice())
    }

    /// Serialize the table: `[count][len key_bytes]*`.
    pub fn serialize(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        put_uvarint(&mut buf, self.by_id.len() as u64);
        for key in &self.by_id {
            put_uvarint(&mut buf, key.len() as u64);
            buf.extend_from_slice(key);
        }
        buf
    }

    /// Rebuild a table from [`serialize`](Self::serialize) output. Ids are
    /// reassigned in order, so they match the serialized table exactly.
    pub fn deserialize(data: &[u8]) -> Result<Self> {
        let mut pos = 0;
        let (count, used) = get_uvarint(data)?;
        pos += used;
        let mut keys = SharedKeys::new();
        for _ in 0..count {
            let (len, used) = get_uvarint(&data[pos..])?;
            pos += used;
            let len = len as usize;
            if pos + len > data.len() {
                return Err(CodecError::UnexpectedEof);
            }
            let key = &data[pos..pos + len];
            if keys.encode_and_add(key).is_none() {
                return Err(CodecError::IneligibleKey);
            }
            pos += len;
        }
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_and_resolve() {
        let mut keys = SharedKeys::new();
        let a = keys.encode_and_add(b"name").unwrap();
        let b = keys.encode_and_add(b"age").unwrap();
        assert_eq!(a, 0);
        assert_eq!(b, 1);
        assert_eq!(keys.encode_and_add(b"name"), Some(a));
        assert_eq!(keys.count(), 2);

        assert_eq!(keys.encode(b"name"), Some(0));
        assert_eq!(keys.encode(b"missing"), None);
        assert_eq!(keys.decode(0), Some(b"name".as_slice()));
        assert_eq!(keys.decode(7), None);
    }

    #[test]
    fn test_eligibility() {
        assert!(SharedKeys::is_eligible(b"snake_case-1"));
        assert!(!SharedKeys::is_eligible(b""));
        assert!(!SharedKeys::is_eligible(b"has space"));
        assert!(!SharedKeys::is_eligible(b"seventeen-bytes-x"));

        let mut keys = SharedKeys::new();
        assert_eq!(keys.encode_and_add(b"has space"), None);
        assert_eq!(keys.count(), 0);
    }

    #[test]
    fn test_capacity_cap() {
        let mut keys = SharedKeys::new();
        for i in 0..MAX_SHARED_KEYS {
            assert!(keys.encode_and_add(format!("k{}", i).as_bytes()).is_some());
        }
        assert_eq!(keys.encode_and_add(b"overflow"), None);
        // Existing keys still resolve.
        assert_eq!(keys.encode(b"k0"), Some(0));
    }

    #[test]
    fn test_wire_round_trip() {
        let mut keys = SharedKeys::new();
        for k in [b"alpha".as_slice(), b"beta", b"gamma-3"] {
            keys.encode_and_add(k);
        }
        let restored = SharedKeys::deserialize(&keys.serialize()).unwrap();
        assert_eq!(restored.count(), 3);
        assert_eq!(restored.encode(b"beta"), keys.encode(b"beta"));
        assert_eq!(restored.decode(2), Some(b"gamma-3".as_slice()));
    }

    #[test]
    fn test_deserialize_truncated() {
        let mut keys = SharedKeys::new();
        keys.encode_and_add(b"alpha");
        let wire = keys.serialize();
        let err = SharedKeys::deserialize(&wire[..wire.len() - 1]).unwrap_err();
        assert_eq!(err, CodecError::UnexpectedEof);
    }
}
