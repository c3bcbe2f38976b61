//! # Vellum Mutable
//!
//! Mutable overlay structures over the Vellum byte substrate.
//!
//! This crate provides:
//! - [`MDict`]: a copy-on-write mutable shadow over an immutable encoded
//!   dictionary, re-encoded only on demand
//! - [`MValue`] / [`MCollection`]: the value slots and mutation-tracking
//!   base the overlay is built from
//! - [`MHashTree`]: a mutable hash array-mapped trie keyed by byte strings
//!
//! Instances are single-owner and not safe for concurrent mutation; sharing
//! the immutable image under several `MDict`s is fine.

pub mod collection;
pub mod hash_tree;
pub mod mdict;
pub mod mvalue;

// Re-export main types
pub use collection::{MCollection, MutationMark};
pub use hash_tree::MHashTree;
pub use mdict::MDict;
pub use mvalue::MValue;
