//! # Vellum Core
//!
//! Byte substrate and integer codecs for the Vellum compact binary document
//! encoding.
//!
//! This crate provides:
//! - [`SharedBytes`]: a refcounted owning byte buffer with value semantics,
//!   plus view operations over plain `&[u8]` ([`SliceExt`])
//! - Integer codecs: LEB128 varints, out-of-band fixed-length ints, and
//!   `memcmp`-collatable unsigned ints
//! - A 32-bit content hash ([`hash32`])
//! - The [`Encoder`] and [`DictReader`] seams the mutable overlay writes to
//!   and reads from, with [`DocEncoder`] / [`Doc`] as the in-memory
//!   reference implementation
//! - [`SharedKeys`]: the interning table for short dictionary keys
//!
//! ## Design Principles
//!
//! 1. **Zero-copy reads**: values handed out by a [`Doc`] are windows into
//!    the image, sharing its block.
//! 2. **Synchronous and allocation-infallible**: no I/O, no out-of-memory
//!    errors surfaced to callers.
//! 3. **Decode failures are values**: codec errors come back as
//!    [`CodecError`], never panics; contract breaches (out-of-range
//!    subslices, aliasing appends) panic.

pub mod bytes;
pub mod collatable;
pub mod dict;
pub mod doc;
pub mod encode;
pub mod error;
pub mod hash;
pub mod shared_keys;
pub mod slice_ext;
pub mod value;
pub mod varint;

// Re-export main types
pub use bytes::SharedBytes;
pub use dict::DictReader;
pub use doc::{Doc, DocEncoder};
pub use encode::{Encoder, ToEncoder};
pub use error::{CodecError, Result};
pub use hash::hash32;
pub use shared_keys::{SharedKeys, MAX_SHARED_KEYS, MAX_SHARED_KEY_LEN};
pub use slice_ext::SliceExt;
pub use value::{EncodedValue, ValueKind};
