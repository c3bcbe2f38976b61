//! In-memory document image: the reference [`Encoder`] / [`DictReader`] pair.
//!
//! `DocEncoder` streams values into a byte image using the tagged wire of
//! [`crate::value`]; `Doc` owns a sealed image and serves reads from it.
//! Values handed out by `Doc` are windows into the image (no copying), which
//! is what lets the mutable overlay keep references into an image it does
//! not own exclusively.
//!
//! Both sides may be given the same [`SharedKeys`] table: the encoder then
//! writes interned keys as ids, and the reader resolves ids back to bytes.
//! Keys are interned ahead of time via [`SharedKeys::encode_and_add`]; the
//! encoder itself only looks ids up.

use std::rc::Rc;

use crate::bytes::SharedBytes;
use crate::dict::DictReader;
use crate::encode::Encoder;
use crate::error::{CodecError, Result};
use crate::shared_keys::SharedKeys;
use crate::value::{
    keyref_end, value_end, EncodedValue, KEYREF_INLINE, KEYREF_SHARED, TAG_DATA, TAG_DICT,
    TAG_FALSE, TAG_FLOAT, TAG_INT, TAG_NULL, TAG_STRING, TAG_TRUE, TAG_UINT,
};
use crate::varint::{get_uvarint, get_uvarint32, put_int_of_length, put_uvarint};

// ---------------------------------------------------------------------------
// Write path
// ---------------------------------------------------------------------------

/// Streaming encoder producing a document image whose root is a dictionary.
#[derive(Debug, Default)]
pub struct DocEncoder {
    buf: Vec<u8>,
    shared_keys: Option<Rc<SharedKeys>>,
    depth: u32,
}

impl DocEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// An encoder that writes interned keys as shared-key ids.
    pub fn with_shared_keys(shared_keys: Rc<SharedKeys>) -> Self {
        DocEncoder {
            buf: Vec::new(),
            shared_keys: Some(shared_keys),
            depth: 0,
        }
    }

    /// Seal the image and hand it over as a readable [`Doc`].
    ///
    /// Fails if the written stream is not exactly one complete dictionary.
    pub fn finish(self) -> Result<Doc> {
        debug_assert_eq!(self.depth, 0, "unbalanced begin_dict/end_dict");
        let doc = Doc::new(SharedBytes::from(self.buf))?;
        tracing::trace!(bytes = doc.image().len(), "sealed document image");
        Ok(doc)
    }

    fn push_int(&mut self, tag: u8, n: i64, is_unsigned: bool) {
        let mut payload = Vec::with_capacity(8);
        let len = put_int_of_length(&mut payload, n, is_unsigned);
        self.buf.push(tag);
        self.buf.push(len as u8);
        self.buf.extend_from_slice(&payload);
    }

    fn push_sized(&mut self, tag: u8, bytes: &[u8]) {
        self.buf.push(tag);
        put_uvarint(&mut self.buf, bytes.len() as u64);
        self.buf.extend_from_slice(bytes);
    }
}

impl Encoder for DocEncoder {
    fn begin_dict(&mut self, count: u32) {
        self.buf.push(TAG_DICT);
        put_uvarint(&mut self.buf, count as u64);
        self.depth += 1;
    }

    fn write_key(&mut self, key: &[u8]) {
        debug_assert!(self.depth > 0, "write_key outside a dictionary");
        if let Some(id) = self.shared_keys.as_deref().and_then(|sk| sk.encode(key)) {
            self.buf.push(KEYREF_SHARED);
            put_uvarint(&mut self.buf, id as u64);
        } else {
            self.buf.push(KEYREF_INLINE);
            put_uvarint(&mut self.buf, key.len() as u64);
            self.buf.extend_from_slice(key);
        }
    }

    fn end_dict(&mut self) {
        debug_assert!(self.depth > 0, "end_dict without begin_dict");
        self.depth -= 1;
    }

    fn write_null(&mut self) {
        self.buf.push(TAG_NULL);
    }

    fn write_bool(&mut self, value: bool) {
        self.buf.push(if value { TAG_TRUE } else { TAG_FALSE });
    }

    fn write_int(&mut self, value: i64) {
        self.push_int(TAG_INT, value, false);
    }

    fn write_uint(&mut self, value: u64) {
        self.push_int(TAG_UINT, value as i64, true);
    }

    fn write_float(&mut self, value: f64) {
        self.buf.push(TAG_FLOAT);
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    fn write_string(&mut self, value: &[u8]) {
        self.push_sized(TAG_STRING, value);
    }

    fn write_data(&mut self, value: &[u8]) {
        self.push_sized(TAG_DATA, value);
    }

    fn write_encoded(&mut self, value: &EncodedValue) {
        self.buf.extend_from_slice(value.as_bytes());
    }
}

// ---------------------------------------------------------------------------
// Read path
// ---------------------------------------------------------------------------

/// A sealed, validated document image whose root is a dictionary.
#[derive(Debug, Clone)]
pub struct Doc {
    image: SharedBytes,
    count: u32,
}

impl Doc {
    /// Validate `image` as one complete dictionary and wrap it.
    pub fn new(image: SharedBytes) -> Result<Doc> {
        let bytes = image.as_slice();
        match bytes.first() {
            None => return Err(CodecError::UnexpectedEof),
            Some(&TAG_DICT) => {}
            Some(_) => return Err(CodecError::RootNotDict),
        }
        let end = value_end(bytes, 0)?;
        if end != bytes.len() {
            return Err(CodecError::TrailingData);
        }
        let (count, _) = get_uvarint32(&bytes[1..])?;
        Ok(Doc { image, count })
    }

    /// Reinterpret a dictionary-kinded encoded value as a readable `Doc`.
    /// The window keeps sharing the original image's block.
    pub fn from_encoded(value: &EncodedValue) -> Result<Doc> {
        Doc::new(value.shared_bytes().clone())
    }

    /// The underlying image.
    pub fn image(&self) -> &SharedBytes {
        &self.image
    }

    /// Walk the entries, pushing `(key_start, value_start, value_end)` spans.
    /// Returns early when `visit` reports it is done.
    ///
    /// The image was validated at construction, so a parse error here means
    /// it was corrupted out from under us; the walk just stops in that case.
    fn walk(&self, mut visit: impl FnMut(usize, usize, usize) -> bool) {
        let bytes = self.image.as_slice();
        let Ok((_, header)) = get_uvarint(&bytes[1..]) else {
            debug_assert!(false, "validated image failed to parse");
            return;
        };
        let mut pos = 1 + header;
        for _ in 0..self.count {
            let key_start = pos;
            let Ok(value_start) = keyref_end(bytes, pos) else {
                debug_assert!(false, "validated image failed to parse");
                return;
            };
            let Ok(end) = value_end(bytes, value_start) else {
                debug_assert!(false, "validated image failed to parse");
                return;
            };
            if visit(key_start, value_start, end) {
                return;
            }
            pos = end;
        }
    }

    /// Resolve the key reference at `pos` to key bytes.
    fn key_at<'a>(&'a self, pos: usize, shared_keys: Option<&'a SharedKeys>) -> Option<&'a [u8]> {
        let bytes = self.image.as_slice();
        match bytes[pos] {
            KEYREF_INLINE => {
                let (len, used) = get_uvarint(&bytes[pos + 1..]).ok()?;
                bytes.get(pos + 1 + used..pos + 1 + used + len as usize)
            }
            KEYREF_SHARED => {
                let (id, _) = get_uvarint32(&bytes[pos + 1..]).ok()?;
                shared_keys?.decode(id)
            }
            _ => None,
        }
    }
}

impl DictReader for Doc {
    fn count(&self) -> u32 {
        self.count
    }

    fn get(&self, key: &[u8], shared_keys: Option<&SharedKeys>) -> Option<EncodedValue> {
        let mut found = None;
        self.walk(|key_start, value_start, end| {
            if self.key_at(key_start, shared_keys) == Some(key) {
                found = Some(EncodedValue::from_window(
                    self.image.subslice(value_start..end),
                ));
                true
            } else {
                false
            }
        });
        found
    }

    fn for_each(
        &self,
        shared_keys: Option<&SharedKeys>,
        callback: &mut dyn FnMut(&[u8], EncodedValue),
    ) {
        self.walk(|key_start, value_start, end| {
            // Entries with unresolvable shared ids cannot be surfaced as
            // byte keys; they are skipped (the table the image was written
            // with must be supplied for a full walk).
            if let Some(key) = self.key_at(key_start, shared_keys) {
                let value = EncodedValue::from_window(self.image.subslice(value_start..end));
                callback(key, value);
            }
            false
        });
    }
}
