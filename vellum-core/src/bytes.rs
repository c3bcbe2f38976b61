//! Reference-counted owning byte buffer with value-type ergonomics.
//!
//! `SharedBytes` pairs an atomically refcounted heap block with an
//! `(offset, len)` window, so several buffers may share one block
//! ([`subslice`](SharedBytes::subslice) gives a window into the same bytes
//! without copying). Clone bumps the refcount, drop releases it, and the
//! block is freed when the last reference goes away. Observed bytes are
//! immutable once the block exists; `resize` and `append` always build a
//! fresh block rather than touching one that might be shared.
//!
//! Three states:
//! - **null** — no block at all (the default).
//! - **empty** — a zero-length window over a real block.
//! - **populated** — a non-empty window.
//!
//! Null and empty compare equal (content equality over zero bytes); they
//! differ only in whether an address exists.

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{Deref, Range};
use std::sync::Arc;

use crate::slice_ext::SliceExt;

/// A refcounted owning byte buffer presented as a slice.
#[derive(Clone, Default)]
pub struct SharedBytes {
    block: Option<Arc<[u8]>>,
    off: usize,
    len: usize,
}

impl SharedBytes {
    /// The null buffer: no block, no address, zero length.
    pub const fn null() -> Self {
        SharedBytes {
            block: None,
            off: 0,
            len: 0,
        }
    }

    /// Allocate a zero-initialized buffer of `len` bytes.
    ///
    /// `with_len(0)` is the empty-but-addressed state, distinct from
    /// [`null`](Self::null).
    pub fn with_len(len: usize) -> Self {
        SharedBytes {
            block: Some(Arc::from(vec![0u8; len])),
            off: 0,
            len,
        }
    }

    /// Allocate a fresh buffer holding a copy of `bytes`.
    pub fn copy_of(bytes: &[u8]) -> Self {
        SharedBytes::from(bytes)
    }

    /// Allocate `bytes.len() + 1` bytes, copy `bytes`, and write a
    /// terminating zero after them. The advertised length excludes the
    /// terminator, so the contents can be handed to C-string consumers.
    pub fn null_padded_string(bytes: &[u8]) -> Self {
        let mut v = Vec::with_capacity(bytes.len() + 1);
        v.extend_from_slice(bytes);
        v.push(0);
        SharedBytes {
            block: Some(Arc::from(v)),
            off: 0,
            len: bytes.len(),
        }
    }

    /// True if this buffer has no backing block.
    #[inline]
    pub fn is_null(&self) -> bool {
        self.block.is_none()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        match &self.block {
            Some(block) => &block[self.off..self.off + self.len],
            None => &[],
        }
    }

    /// Number of buffers currently sharing the backing block (0 for null).
    pub fn ref_count(&self) -> usize {
        self.block.as_ref().map(Arc::strong_count).unwrap_or(0)
    }

    /// A new buffer sharing this one's block, windowed to `range`.
    ///
    /// Panics if `range` is out of bounds (API contract breach).
    pub fn subslice(&self, range: Range<usize>) -> SharedBytes {
        assert!(
            range.start <= range.end && range.end <= self.len,
            "subslice {:?} outside buffer of {} bytes",
            range,
            self.len
        );
        SharedBytes {
            block: self.block.clone(),
            off: self.off + range.start,
            len: range.end - range.start,
        }
    }

    /// An independently owned copy of the contents.
    pub fn deep_copy(&self) -> SharedBytes {
        if self.is_null() {
            SharedBytes::null()
        } else {
            SharedBytes::copy_of(self.as_slice())
        }
    }

    /// Change the advertised size to `new_len`, preserving the common
    /// prefix. A no-op when the size is unchanged; otherwise a fresh block
    /// is allocated and the old one released — a shared block is never
    /// reallocated in place.
    pub fn resize(&mut self, new_len: usize) {
        if new_len == self.len {
            return;
        }
        if self.block.is_none() {
            *self = SharedBytes::with_len(new_len);
            return;
        }
        let keep = self.len.min(new_len);
        let mut v = vec![0u8; new_len];
        v[..keep].copy_from_slice(&self.as_slice()[..keep]);
        *self = SharedBytes::from(v);
    }

    /// Append `tail` to the contents, growing into a fresh block.
    ///
    /// Panics if `tail` aliases this buffer's own bytes (API contract
    /// breach): the old block is released during the append.
    pub fn append(&mut self, tail: &[u8]) {
        if !tail.is_empty() {
            assert!(
                !self.as_slice().contains_address_range(tail),
                "append source aliases destination buffer"
            );
        }
        let mut v = Vec::with_capacity(self.len + tail.len());
        v.extend_from_slice(self.as_slice());
        v.extend_from_slice(tail);
        *self = SharedBytes::from(v);
    }

    /// Reduce the advertised size to `new_len` without reallocating.
    /// Capacity is not reclaimed. Panics if `new_len > len()`.
    pub fn shorten(&mut self, new_len: usize) {
        assert!(
            new_len <= self.len,
            "shorten to {} past end of {}-byte buffer",
            new_len,
            self.len
        );
        self.len = new_len;
    }
}

impl Deref for SharedBytes {
    type Target = [u8];

    #[inline]
    fn deref(&self) -> &[u8] {
        self.as_slice()
    }
}

impl AsRef<[u8]> for SharedBytes {
    #[inline]
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}

impl Borrow<[u8]> for SharedBytes {
    #[inline]
    fn borrow(&self) -> &[u8] {
        self.as_slice()
    }
}

impl From<Vec<u8>> for SharedBytes {
    fn from(v: Vec<u8>) -> Self {
        let len = v.len();
        SharedBytes {
            block: Some(Arc::from(v)),
            off: 0,
            len,
        }
    }
}

impl From<&[u8]> for SharedBytes {
    fn from(bytes: &[u8]) -> Self {
        SharedBytes::from(bytes.to_vec())
    }
}

impl From<&str> for SharedBytes {
    fn from(s: &str) -> Self {
        SharedBytes::from(s.as_bytes())
    }
}

impl From<String> for SharedBytes {
    fn from(s: String) -> Self {
        SharedBytes::from(s.into_bytes())
    }
}

impl PartialEq for SharedBytes {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl Eq for SharedBytes {}

impl PartialEq<[u8]> for SharedBytes {
    fn eq(&self, other: &[u8]) -> bool {
        self.as_slice() == other
    }
}

impl PartialEq<&[u8]> for SharedBytes {
    fn eq(&self, other: &&[u8]) -> bool {
        self.as_slice() == *other
    }
}

impl PartialOrd for SharedBytes {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SharedBytes {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_slice().cmp(other.as_slice())
    }
}

impl Hash for SharedBytes {
    /// Hashes exactly like `[u8]`, so `&[u8]` probes into maps keyed by
    /// `SharedBytes` resolve through `Borrow<[u8]>`.
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_slice().hash(state)
    }
}

impl fmt::Debug for SharedBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            return write!(f, "SharedBytes(null)");
        }
        let bytes = self.as_slice();
        if bytes.len() <= 16 {
            write!(f, "SharedBytes[{}]({})", self.len, bytes.to_hex())
        } else {
            write!(f, "SharedBytes[{}]({}…)", self.len, bytes[..16].to_hex())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_vs_empty() {
        let null = SharedBytes::null();
        assert!(null.is_null());
        assert!(null.is_empty());
        assert_eq!(null.ref_count(), 0);

        let empty = SharedBytes::with_len(0);
        assert!(!empty.is_null());
        assert!(empty.is_empty());
        assert_eq!(empty.ref_count(), 1);

        // Content equality: zero bytes either way.
        assert_eq!(null, empty);
    }

    #[test]
    fn test_clone_shares_block() {
        let a = SharedBytes::from(b"shared".as_slice());
        let b = a.clone();
        assert_eq!(a.ref_count(), 2);
        assert_eq!(b.ref_count(), 2);
        assert_eq!(a.as_slice().as_ptr(), b.as_slice().as_ptr());
        drop(b);
        assert_eq!(a.ref_count(), 1);
    }

    #[test]
    fn test_deep_copy_is_independent() {
        let a = SharedBytes::from(b"payload".as_slice());
        let b = a.deep_copy();
        assert_eq!(a, b);
        assert_eq!(b.ref_count(), 1);
        assert_ne!(a.as_slice().as_ptr(), b.as_slice().as_ptr());
    }

    #[test]
    fn test_subslice_shares() {
        let a = SharedBytes::from(b"0123456789".as_slice());
        let mid = a.subslice(2..6);
        assert_eq!(mid.as_slice(), b"2345");
        assert_eq!(a.ref_count(), 2);
        // Window into the same block, not a copy.
        assert!(a.as_slice().contains_address_range(mid.as_slice()));
    }

    #[test]
    #[should_panic(expected = "subslice")]
    fn test_subslice_out_of_bounds() {
        let a = SharedBytes::from(b"abc".as_slice());
        let _ = a.subslice(1..5);
    }

    #[test]
    fn test_resize_preserves_prefix() {
        let mut a = SharedBytes::from(b"abcdef".as_slice());
        a.resize(3);
        assert_eq!(a.as_slice(), b"abc");
        a.resize(5);
        assert_eq!(a.as_slice(), b"abc\0\0");
        a.resize(5); // no-op
        assert_eq!(a.len(), 5);
    }

    #[test]
    fn test_resize_does_not_disturb_sharers() {
        let mut a = SharedBytes::from(b"abcdef".as_slice());
        let b = a.clone();
        a.resize(2);
        assert_eq!(a.as_slice(), b"ab");
        assert_eq!(b.as_slice(), b"abcdef");
        assert_eq!(b.ref_count(), 1);
    }

    #[test]
    fn test_resize_from_null() {
        let mut a = SharedBytes::null();
        a.resize(4);
        assert_eq!(a.as_slice(), b"\0\0\0\0");
        assert!(!a.is_null());
    }

    #[test]
    fn test_append() {
        let mut a = SharedBytes::from(b"head".as_slice());
        a.append(b"+tail");
        assert_eq!(a.as_slice(), b"head+tail");

        let mut n = SharedBytes::null();
        n.append(b"x");
        assert_eq!(n.as_slice(), b"x");
    }

    #[test]
    #[should_panic(expected = "aliases")]
    fn test_append_alias_detected() {
        let mut a = SharedBytes::from(b"abcdef".as_slice());
        let alias: &[u8] = unsafe { std::slice::from_raw_parts(a.as_slice().as_ptr(), 3) };
        a.append(alias);
    }

    #[test]
    fn test_shorten() {
        let mut a = SharedBytes::from(b"abcdef".as_slice());
        let block = a.as_slice().as_ptr();
        a.shorten(4);
        assert_eq!(a.as_slice(), b"abcd");
        // Same block; only the advertised size changed.
        assert_eq!(a.as_slice().as_ptr(), block);
    }

    #[test]
    #[should_panic(expected = "shorten")]
    fn test_shorten_past_end() {
        let mut a = SharedBytes::from(b"ab".as_slice());
        a.shorten(3);
    }

    #[test]
    fn test_null_padded_string() {
        let a = SharedBytes::null_padded_string(b"hello");
        assert_eq!(a.len(), 5);
        assert_eq!(a.as_slice(), b"hello");
        // The terminator sits just past the advertised end.
        let raw = unsafe { std::slice::from_raw_parts(a.as_slice().as_ptr(), 6) };
        assert_eq!(raw[5], 0);
    }

    #[test]
    fn test_ordering() {
        let a = SharedBytes::from(b"abc".as_slice());
        let b = SharedBytes::from(b"abcd".as_slice());
        let c = SharedBytes::from(b"abd".as_slice());
        assert!(a < b); // strict prefix sorts first
        assert!(b < c);
    }
}
