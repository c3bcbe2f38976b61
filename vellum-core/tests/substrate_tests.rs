//! Cross-module substrate behavior: windows keep images alive, codecs
//! compose, and the shared-key table survives its wire form.

use std::rc::Rc;

use vellum_core::collatable::put_collatable_uint;
use vellum_core::varint::{put_uvarint, size_of_uvarint};
use vellum_core::{DictReader, DocEncoder, Encoder, SharedBytes, SharedKeys, SliceExt};

#[test]
fn windows_keep_the_image_alive() {
    let value = {
        let mut enc = DocEncoder::new();
        enc.begin_dict(1);
        enc.write_key(b"payload");
        enc.write_string(b"still here");
        enc.end_dict();
        let doc = enc.finish().unwrap();
        doc.get(b"payload", None).unwrap()
        // doc (and its handle on the image) drops here
    };
    assert_eq!(value.as_str(), Some("still here"));
    assert_eq!(value.shared_bytes().ref_count(), 1);
}

#[test]
fn owned_copies_are_independent() {
    let original = SharedBytes::from(b"some bytes".as_slice());
    let copy = original.deep_copy();
    drop(original);
    assert_eq!(copy.as_slice(), b"some bytes");
    assert_eq!(copy.ref_count(), 1);
}

#[test]
fn varint_sizes_match_bytes_used() {
    for shift in 0..64 {
        let n = 1u64 << shift;
        let mut buf = Vec::new();
        let written = put_uvarint(&mut buf, n);
        assert_eq!(written, size_of_uvarint(n));
        assert_eq!(written, buf.len());
    }
}

#[test]
fn collatable_encodings_sort_like_numbers() {
    let values = [0u64, 1, 255, 256, 1 << 32];
    let encoded: Vec<Vec<u8>> = values
        .iter()
        .map(|&n| {
            let mut buf = Vec::new();
            put_collatable_uint(&mut buf, n);
            buf
        })
        .collect();
    for pair in encoded.windows(2) {
        assert!(pair[0] < pair[1], "{:?} !< {:?}", pair[0], pair[1]);
    }
}

#[test]
fn shared_keys_survive_reload() {
    let mut sk = SharedKeys::new();
    for key in [b"type".as_slice(), b"id", b"rev", b"deleted"] {
        sk.encode_and_add(key);
    }

    // Encode with the live table.
    let live = Rc::new(sk.clone());
    let mut enc = DocEncoder::with_shared_keys(live.clone());
    enc.begin_dict(1);
    enc.write_key(b"rev");
    enc.write_int(12);
    enc.end_dict();
    let doc = enc.finish().unwrap();

    // Read with a table rebuilt from the wire state.
    let reloaded = SharedKeys::deserialize(&sk.serialize()).unwrap();
    assert_eq!(doc.get(b"rev", Some(&reloaded)).unwrap().as_int(), Some(12));

    let mut seen = Vec::new();
    doc.for_each(Some(&reloaded), &mut |key, _| seen.push(key.to_vec()));
    assert_eq!(seen, vec![b"rev".to_vec()]);
}

#[test]
fn hex_and_hash_are_stable_views() {
    let bytes = SharedBytes::from(b"\xDE\xAD\xBE\xEF".as_slice());
    assert_eq!(bytes.as_slice().to_hex(), "deadbeef");
    assert_eq!(bytes.as_slice().hash32(), b"\xDE\xAD\xBE\xEF".hash32());
}
