use std::marker::PhantomData;

use endian_serde::{decode, encode, encode_to_vec, Decoder, EndianSerde, Endianness, Error};

/// the reference byte stream used by most decoding tests.
const REFERENCE: [u8; 8] = [0x01, 0x23, 0x45, 0x67, 0x89, 0xAB, 0xCD, 0xEF];

#[derive(Debug, Default, PartialEq, EndianSerde)]
struct Untagged {
    a: u8,
    b: i16,
    c: u32,
}

#[derive(Debug, Default, Clone, PartialEq, EndianSerde)]
struct TaggedPair {
    #[endian(big)]
    a: u16,
    #[endian(little)]
    b: u16,
}

#[derive(Debug, Default, PartialEq, EndianSerde)]
struct Nested {
    #[endian(big)]
    a: u16,
    b: TaggedPair,
    #[endian(little)]
    c: u16,
}

#[test]
fn untagged_fields_use_the_stream_default() {
    let mut value = Untagged::default();
    decode(&mut REFERENCE.as_slice(), Endianness::Big, &mut value).unwrap();
    assert_eq!(
        value,
        Untagged {
            a: 0x01,
            b: 0x2345,
            c: 0x6789_ABCD,
        }
    );

    let mut value = Untagged::default();
    decode(&mut REFERENCE.as_slice(), Endianness::Little, &mut value).unwrap();
    assert_eq!(
        value,
        Untagged {
            a: 0x01,
            b: 0x4523,
            c: 0xCDAB_8967_u32,
        }
    );
}

#[test]
fn tagged_fields_override_the_default() {
    // the tags fully determine the orders, so the stream default must not matter
    for default_order in [Endianness::Big, Endianness::Little] {
        let mut value = TaggedPair::default();
        decode(&mut REFERENCE.as_slice(), default_order, &mut value).unwrap();
        assert_eq!(
            value,
            TaggedPair {
                a: 0x0123,
                b: 0x6745,
            }
        );
    }
}

#[test]
fn nested_record_overrides_resolve_per_field() {
    let mut value = Nested::default();
    decode(&mut REFERENCE.as_slice(), Endianness::Big, &mut value).unwrap();
    assert_eq!(
        value,
        Nested {
            a: 0x0123,
            b: TaggedPair {
                a: 0x4567,
                b: 0xAB89,
            },
            c: 0xEFCD,
        }
    );
}

#[test]
fn encoding_mirrors_decoding() {
    let value = Nested {
        a: 0x0123,
        b: TaggedPair {
            a: 0x4567,
            b: 0xAB89,
        },
        c: 0xEFCD,
    };
    assert_eq!(value.wire_size(), 8);
    assert_eq!(encode_to_vec(&value, Endianness::Big).unwrap(), REFERENCE);
}

#[test]
fn round_trips_survive_nesting_and_both_orders() {
    #[derive(Debug, Default, PartialEq, EndianSerde)]
    struct Deep {
        header: Nested,
        flags: [u8; 3],
        #[endian(little)]
        trailer: i64,
        records: Vec<TaggedPair>,
    }

    let original = Deep {
        header: Nested {
            a: 0x1111,
            b: TaggedPair {
                a: 0x2222,
                b: 0x3333,
            },
            c: 0x4444,
        },
        flags: [1, 0, 7],
        trailer: -123_456_789,
        records: vec![
            TaggedPair {
                a: 0xAAAA,
                b: 0xBBBB,
            },
            TaggedPair {
                a: 0xCCCC,
                b: 0xDDDD,
            },
        ],
    };

    for order in [Endianness::Big, Endianness::Little] {
        let wire = encode_to_vec(&original, order).unwrap();
        assert_eq!(wire.len(), original.wire_size());

        let mut reconstructed = Deep {
            records: vec![TaggedPair::default(); 2],
            ..Deep::default()
        };
        decode(&mut wire.as_slice(), order, &mut reconstructed).unwrap();
        assert_eq!(reconstructed, original);
    }
}

#[test]
fn sequence_elements_ignore_the_enclosing_override() {
    #[derive(Debug, Default, PartialEq, EndianSerde)]
    struct SeqHolder {
        #[endian(little)]
        words: [u16; 2],
    }

    // the field is tagged little, but the elements must follow the stream default (big)
    let mut value = SeqHolder::default();
    decode(
        &mut [0x01u8, 0x23, 0x45, 0x67].as_slice(),
        Endianness::Big,
        &mut value,
    )
    .unwrap();
    assert_eq!(value.words, [0x0123, 0x4567]);

    let mut wire = Vec::new();
    encode(&mut wire, Endianness::Big, &value).unwrap();
    assert_eq!(wire, [0x01, 0x23, 0x45, 0x67]);
}

#[test]
fn sequence_elements_ignore_overrides_inherited_through_records() {
    #[derive(Debug, Default, PartialEq, EndianSerde)]
    struct Inner {
        // untagged, inherits the enclosing field's override...
        lone: u16,
        // ...but the array elements still follow the stream default
        words: [u16; 2],
    }

    #[derive(Debug, Default, PartialEq, EndianSerde)]
    struct Outer {
        #[endian(little)]
        inner: Inner,
    }

    let mut value = Outer::default();
    decode(
        &mut [0x01u8, 0x23, 0x45, 0x67, 0x89, 0xAB].as_slice(),
        Endianness::Big,
        &mut value,
    )
    .unwrap();
    assert_eq!(value.inner.lone, 0x2301);
    assert_eq!(value.inner.words, [0x4567, 0x89AB]);
}

#[test]
fn record_overrides_still_apply_inside_sequence_elements() {
    // elements recurse with the stream default as their inherited order, and their own
    // field tags apply from there
    let mut values = vec![TaggedPair::default(); 2];
    decode(&mut REFERENCE.as_slice(), Endianness::Little, &mut values).unwrap();
    assert_eq!(
        values,
        [
            TaggedPair {
                a: 0x0123,
                b: 0x6745,
            },
            TaggedPair {
                a: 0x89AB,
                b: 0xEFCD,
            },
        ]
    );
}

#[test]
fn truncation_leaves_earlier_fields_decoded() {
    let mut value = Untagged::default();
    let err = decode(
        &mut [0x01u8, 0x02, 0x03].as_slice(),
        Endianness::Big,
        &mut value,
    )
    .unwrap_err();
    assert!(matches!(err, Error::TruncatedInput { width: 4, .. }));
    // fields before the failure keep their decoded values, the rest is untouched
    assert_eq!(value.a, 0x01);
    assert_eq!(value.b, 0x0203);
    assert_eq!(value.c, 0);
}

#[test]
fn float_fields_fail_with_unsupported_shape() {
    #[derive(Debug, Default, EndianSerde)]
    struct WithFloat {
        id: u8,
        weight: f32,
    }

    let mut value = WithFloat::default();
    let err = decode(&mut REFERENCE.as_slice(), Endianness::Big, &mut value).unwrap_err();
    assert!(matches!(err, Error::UnsupportedShape { type_name: "f32" }));
    // the walk got as far as the float
    assert_eq!(value.id, 0x01);

    let err = encode_to_vec(&value, Endianness::Big).unwrap_err();
    assert!(matches!(err, Error::UnsupportedShape { type_name: "f32" }));
}

#[test]
fn bool_fields_decode_lossily() {
    #[derive(Debug, Default, PartialEq, EndianSerde)]
    struct Flags {
        enabled: bool,
        visible: bool,
    }

    let mut value = Flags::default();
    decode(&mut [0xFFu8, 0x00].as_slice(), Endianness::Big, &mut value).unwrap();
    assert_eq!(
        value,
        Flags {
            enabled: true,
            visible: false,
        }
    );
    // 0xFF collapses to the canonical true byte on the way back out
    assert_eq!(encode_to_vec(&value, Endianness::Big).unwrap(), [0x01, 0x00]);
}

#[test]
fn ignored_fields_consume_no_bytes() {
    #[derive(Debug, Default, PartialEq, EndianSerde)]
    struct WithIgnored {
        a: u16,
        #[endian(ignore)]
        scratch: u32,
        // a float is fine as long as it stays off the wire
        #[endian(ignore)]
        ratio: f32,
        b: u16,
    }

    let mut value = WithIgnored {
        scratch: 0xDEAD_BEEF,
        ratio: 1.25,
        ..WithIgnored::default()
    };
    assert_eq!(value.wire_size(), 4);

    decode(
        &mut [0x00u8, 0x01, 0x00, 0x02].as_slice(),
        Endianness::Big,
        &mut value,
    )
    .unwrap();
    assert_eq!(value.a, 1);
    assert_eq!(value.b, 2);
    // ignored fields are left exactly as they were
    assert_eq!(value.scratch, 0xDEAD_BEEF);
    assert_eq!(value.ratio, 1.25);

    assert_eq!(
        encode_to_vec(&value, Endianness::Big).unwrap(),
        [0x00, 0x01, 0x00, 0x02]
    );
}

#[test]
fn unrecognized_attribute_values_fall_back_to_inherited() {
    #[derive(Debug, Default, PartialEq, EndianSerde)]
    struct SloppyTags {
        #[endian(native)]
        a: u16,
        #[endian("little")]
        b: u16,
    }

    // `native` is not a recognized value, so `a` follows the stream default; the quoted
    // string form of a recognized value works
    let mut value = SloppyTags::default();
    decode(
        &mut [0x01u8, 0x02, 0x03, 0x04].as_slice(),
        Endianness::Big,
        &mut value,
    )
    .unwrap();
    assert_eq!(value.a, 0x0102);
    assert_eq!(value.b, 0x0403);
}

#[test]
fn tuple_unit_and_generic_structs_derive() {
    #[derive(Debug, Default, PartialEq, EndianSerde)]
    struct Pair(u16, #[endian(little)] u16);

    #[derive(Debug, Default, PartialEq, EndianSerde)]
    struct Empty;

    #[derive(Debug, Default, PartialEq, EndianSerde)]
    struct Wrapper<T> {
        inner: T,
        tail: u8,
    }

    let mut pair = Pair::default();
    decode(
        &mut [0x01u8, 0x02, 0x03, 0x04].as_slice(),
        Endianness::Big,
        &mut pair,
    )
    .unwrap();
    assert_eq!(pair, Pair(0x0102, 0x0403));

    let mut empty = Empty;
    let mut stream: &[u8] = &[0xAA];
    decode(&mut stream, Endianness::Big, &mut empty).unwrap();
    assert_eq!(stream, [0xAA]);
    assert_eq!(empty.wire_size(), 0);

    let mut wrapper = Wrapper::<u16>::default();
    decode(
        &mut [0x01u8, 0x02, 0x03].as_slice(),
        Endianness::Big,
        &mut wrapper,
    )
    .unwrap();
    assert_eq!(
        wrapper,
        Wrapper {
            inner: 0x0102,
            tail: 0x03,
        }
    );
}

#[test]
fn phantom_fields_are_zero_width() {
    #[derive(Debug, Default, PartialEq, EndianSerde)]
    struct WithMarker {
        a: u16,
        marker: PhantomData<u64>,
        b: u16,
    }

    let mut value = WithMarker::default();
    decode(
        &mut [0x00u8, 0x01, 0x00, 0x02].as_slice(),
        Endianness::Big,
        &mut value,
    )
    .unwrap();
    assert_eq!(value.a, 1);
    assert_eq!(value.b, 2);
    assert_eq!(value.wire_size(), 4);
}

#[test]
fn decoder_reads_consecutive_records() {
    let mut decoder = Decoder::new(REFERENCE.as_slice(), Endianness::Big);
    let first: TaggedPair = decoder.decode_new().unwrap();
    let second: TaggedPair = decoder.decode_new().unwrap();
    assert_eq!(
        first,
        TaggedPair {
            a: 0x0123,
            b: 0x6745,
        }
    );
    assert_eq!(
        second,
        TaggedPair {
            a: 0x89AB,
            b: 0xEFCD,
        }
    );
    // a third record runs off the end of the stream
    let err = decoder.decode_new::<TaggedPair>().unwrap_err();
    assert!(matches!(err, Error::TruncatedInput { .. }));
}
