//! 32-bit content hash for byte strings.
//!
//! Used for hash-table keying of byte slices and for key placement in the
//! hash array-mapped trie. Stable within a process run; not a wire format.

use xxhash_rust::xxh32::xxh32;

const HASH_SEED: u32 = 0;

/// Hash the contents of a byte string to a 32-bit value.
#[inline]
pub fn hash32(bytes: &[u8]) -> u32 {
    xxh32(bytes, HASH_SEED)
}
