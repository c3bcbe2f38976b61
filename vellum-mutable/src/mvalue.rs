//! Discriminated values held by the mutable collections.

use vellum_core::{EncodedValue, Encoder, ToEncoder};

/// A value slot inside a mutable collection.
///
/// `Empty` doubles as the tombstone marker: a map entry in the empty state
/// shadows a key of the underlying immutable dictionary to mark deletion.
/// Containers filter tombstones before streaming to an encoder.
#[derive(Debug, Clone, PartialEq)]
pub enum MValue<N> {
    /// Tombstone / sentinel.
    Empty,
    /// Reference into an immutable encoded image.
    Encoded(EncodedValue),
    /// Materialized native value.
    Native(N),
}

impl<N> MValue<N> {
    pub fn empty() -> MValue<N> {
        MValue::Empty
    }

    pub fn encoded(value: EncodedValue) -> MValue<N> {
        MValue::Encoded(value)
    }

    pub fn native(value: N) -> MValue<N> {
        MValue::Native(value)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        matches!(self, MValue::Empty)
    }

    /// The referenced immutable encoded value, if this slot holds one.
    pub fn value(&self) -> Option<&EncodedValue> {
        match self {
            MValue::Encoded(v) => Some(v),
            _ => None,
        }
    }

    /// The materialized native value, if this slot holds one.
    pub fn native_value(&self) -> Option<&N> {
        match self {
            MValue::Native(n) => Some(n),
            _ => None,
        }
    }
}

impl<N> Default for MValue<N> {
    fn default() -> Self {
        MValue::Empty
    }
}

impl<N: ToEncoder> MValue<N> {
    /// Stream this value to an encoder. Tombstones are the container's
    /// responsibility to filter; encoding one writes nothing.
    pub fn encode_to(&self, enc: &mut dyn Encoder) {
        match self {
            MValue::Empty => {
                debug_assert!(false, "tombstones must be filtered before encoding");
            }
            MValue::Encoded(value) => enc.write_encoded(value),
            MValue::Native(native) => native.encode_to(enc),
        }
    }
}
