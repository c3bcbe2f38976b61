//! Encoded value windows and the tagged value wire.
//!
//! Every encoded value is self-delimiting: a one-byte tag followed by a
//! tag-specific payload. Integers use the fixed-length codec with the length
//! carried in a byte after the tag; strings and data carry a varint length;
//! dictionaries carry a varint entry count and then `count` key/value pairs.
//!
//! ```text
//! value  := 0x00                            null
//!         | 0x01 | 0x02                     false / true
//!         | 0x03 len:u8 bytes[len]          int   (LE, sign-extended)
//!         | 0x04 len:u8 bytes[len]          uint  (LE, zero-extended)
//!         | 0x05 f64_le[8]                  float
//!         | 0x06 len:varint bytes[len]      string
//!         | 0x07 len:varint bytes[len]      data
//!         | 0x08 count:varint entry*        dict
//! entry  := keyref value
//! keyref := 0x00 len:varint bytes[len]      inline key
//!         | 0x01 id:varint                  shared key id
//! ```
//!
//! An [`EncodedValue`] is an owning window over one complete value inside an
//! immutable image; windows share the image's block, so handing them around
//! never copies the image.

use crate::bytes::SharedBytes;
use crate::error::{CodecError, Result};
use crate::varint::{get_int_of_length, get_uint_of_length, get_uvarint};

pub(crate) const TAG_NULL: u8 = 0x00;
pub(crate) const TAG_FALSE: u8 = 0x01;
pub(crate) const TAG_TRUE: u8 = 0x02;
pub(crate) const TAG_INT: u8 = 0x03;
pub(crate) const TAG_UINT: u8 = 0x04;
pub(crate) const TAG_FLOAT: u8 = 0x05;
pub(crate) const TAG_STRING: u8 = 0x06;
pub(crate) const TAG_DATA: u8 = 0x07;
pub(crate) const TAG_DICT: u8 = 0x08;

pub(crate) const KEYREF_INLINE: u8 = 0x00;
pub(crate) const KEYREF_SHARED: u8 = 0x01;

/// The kind of an encoded value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Null,
    Bool,
    Int,
    Float,
    String,
    Data,
    Dict,
}

impl ValueKind {
    pub(crate) fn from_tag(tag: u8) -> Result<ValueKind> {
        match tag {
            TAG_NULL => Ok(ValueKind::Null),
            TAG_FALSE | TAG_TRUE => Ok(ValueKind::Bool),
            TAG_INT | TAG_UINT => Ok(ValueKind::Int),
            TAG_FLOAT => Ok(ValueKind::Float),
            TAG_STRING => Ok(ValueKind::String),
            TAG_DATA => Ok(ValueKind::Data),
            TAG_DICT => Ok(ValueKind::Dict),
            other => Err(CodecError::InvalidTag(other)),
        }
    }
}

/// End offset of the value starting at `pos`, validating structure and
/// bounds along the way.
pub(crate) fn value_end(buf: &[u8], pos: usize) -> Result<usize> {
    let &tag = buf.get(pos).ok_or(CodecError::UnexpectedEof)?;
    let end = match tag {
        TAG_NULL | TAG_FALSE | TAG_TRUE => pos + 1,
        TAG_INT | TAG_UINT => {
            let &len = buf.get(pos + 1).ok_or(CodecError::UnexpectedEof)?;
            if len == 0 || len > 8 {
                return Err(CodecError::InvalidLength(len));
            }
            pos + 2 + len as usize
        }
        TAG_FLOAT => pos + 9,
        TAG_STRING | TAG_DATA => {
            let (len, used) = get_uvarint(&buf[pos + 1..])?;
            pos + 1 + used + len as usize
        }
        TAG_DICT => {
            let (count, used) = get_uvarint(&buf[pos + 1..])?;
            let mut p = pos + 1 + used;
            for _ in 0..count {
                p = keyref_end(buf, p)?;
                p = value_end(buf, p)?;
            }
            p
        }
        other => return Err(CodecError::InvalidTag(other)),
    };
    if end > buf.len() {
        return Err(CodecError::UnexpectedEof);
    }
    Ok(end)
}

/// End offset of the key reference starting at `pos`.
pub(crate) fn keyref_end(buf: &[u8], pos: usize) -> Result<usize> {
    let &kind = buf.get(pos).ok_or(CodecError::UnexpectedEof)?;
    let end = match kind {
        KEYREF_INLINE => {
            let (len, used) = get_uvarint(&buf[pos + 1..])?;
            pos + 1 + used + len as usize
        }
        KEYREF_SHARED => {
            let (_, used) = get_uvarint(&buf[pos + 1..])?;
            pos + 1 + used
        }
        other => return Err(CodecError::InvalidTag(other)),
    };
    if end > buf.len() {
        return Err(CodecError::UnexpectedEof);
    }
    Ok(end)
}

/// An owning window over one complete encoded value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedValue {
    pub(crate) bytes: SharedBytes,
}

impl EncodedValue {
    pub(crate) fn from_window(bytes: SharedBytes) -> EncodedValue {
        debug_assert!(!bytes.is_empty(), "encoded value window cannot be empty");
        EncodedValue { bytes }
    }

    /// The raw encoded bytes of this value.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        self.bytes.as_slice()
    }

    /// The owning window itself (shares the image's block).
    #[inline]
    pub fn shared_bytes(&self) -> &SharedBytes {
        &self.bytes
    }

    pub fn kind(&self) -> ValueKind {
        // Windows are validated at construction; an invalid tag here means
        // the image was corrupted out from under us.
        ValueKind::from_tag(self.bytes.as_slice()[0]).unwrap_or(ValueKind::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self.bytes.as_slice()[0] {
            TAG_TRUE => Some(true),
            TAG_FALSE => Some(false),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        let b = self.bytes.as_slice();
        match b[0] {
            TAG_INT => {
                let len = *b.get(1)? as usize;
                Some(get_int_of_length(b.get(2..2 + len)?))
            }
            TAG_UINT => {
                let len = *b.get(1)? as usize;
                i64::try_from(get_uint_of_length(b.get(2..2 + len)?)).ok()
            }
            _ => None,
        }
    }

    pub fn as_uint(&self) -> Option<u64> {
        let b = self.bytes.as_slice();
        match b[0] {
            TAG_UINT => {
                let len = *b.get(1)? as usize;
                Some(get_uint_of_length(b.get(2..2 + len)?))
            }
            TAG_INT => {
                let len = *b.get(1)? as usize;
                u64::try_from(get_int_of_length(b.get(2..2 + len)?)).ok()
            }
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        let b = self.bytes.as_slice();
        if b[0] != TAG_FLOAT {
            return None;
        }
        Some(f64::from_le_bytes(b.get(1..9)?.try_into().ok()?))
    }

    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(self.payload(TAG_STRING)?).ok()
    }

    pub fn as_data(&self) -> Option<&[u8]> {
        self.payload(TAG_DATA)
    }

    fn payload(&self, expected_tag: u8) -> Option<&[u8]> {
        let b = self.bytes.as_slice();
        if b[0] != expected_tag {
            return None;
        }
        let (len, used) = get_uvarint(&b[1..]).ok()?;
        b.get(1 + used..1 + used + len as usize)
    }
}
