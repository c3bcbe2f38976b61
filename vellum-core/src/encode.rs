//! Encoder interface and the native-value bridge.

use crate::dict::DictReader;
use crate::shared_keys::SharedKeys;
use crate::value::EncodedValue;

/// Streaming sink for encoded values.
///
/// Dictionary structure is written as `begin_dict(count)`, then for each
/// entry a `write_key` followed by exactly one value write, then
/// `end_dict()`. The count passed to `begin_dict` must equal the number of
/// keys actually written.
pub trait Encoder {
    fn begin_dict(&mut self, count: u32);
    fn write_key(&mut self, key: &[u8]);
    fn end_dict(&mut self);

    fn write_null(&mut self);
    fn write_bool(&mut self, value: bool);
    fn write_int(&mut self, value: i64);
    fn write_uint(&mut self, value: u64);
    fn write_float(&mut self, value: f64);
    fn write_string(&mut self, value: &[u8]);
    fn write_data(&mut self, value: &[u8]);

    /// Re-emit an already encoded value verbatim.
    fn write_encoded(&mut self, value: &EncodedValue);

    /// Emit a whole immutable dictionary by reference.
    fn write_dict_ref(&mut self, dict: &dyn DictReader, shared_keys: Option<&SharedKeys>) {
        self.begin_dict(dict.count());
        dict.for_each(shared_keys, &mut |key, value| {
            self.write_key(key);
            self.write_encoded(&value);
        });
        self.end_dict();
    }
}

/// Bridge from a native value to the encoder primitives.
///
/// Materialized values in the mutable overlay implement this so a container
/// can stream them out without knowing their concrete type.
pub trait ToEncoder {
    fn encode_to(&self, enc: &mut dyn Encoder);
}

impl ToEncoder for bool {
    fn encode_to(&self, enc: &mut dyn Encoder) {
        enc.write_bool(*self);
    }
}

impl ToEncoder for i64 {
    fn encode_to(&self, enc: &mut dyn Encoder) {
        enc.write_int(*self);
    }
}

impl ToEncoder for u64 {
    fn encode_to(&self, enc: &mut dyn Encoder) {
        enc.write_uint(*self);
    }
}

impl ToEncoder for f64 {
    fn encode_to(&self, enc: &mut dyn Encoder) {
        enc.write_float(*self);
    }
}

impl ToEncoder for str {
    fn encode_to(&self, enc: &mut dyn Encoder) {
        enc.write_string(self.as_bytes());
    }
}

impl ToEncoder for String {
    fn encode_to(&self, enc: &mut dyn Encoder) {
        enc.write_string(self.as_bytes());
    }
}

impl ToEncoder for Vec<u8> {
    fn encode_to(&self, enc: &mut dyn Encoder) {
        enc.write_data(self);
    }
}
