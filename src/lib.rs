//! this is a crate for serializing and deserializing rust structs into a packed binary format
//! where the byte order of every field can be controlled individually.
//!
//! the format is the obvious one: all fields are laid out in declaration order, one after the
//! other, with no padding, no framing and no length prefixes. what this crate adds on top of
//! plain packed serialization is per-field endianness. a call to [`encode`] or [`decode`] picks
//! a stream-wide default byte order, and any field of a struct can override that order for
//! itself and for everything nested inside it using the `#[endian(...)]` attribute.
//!
//! this is useful for binary formats that mix conventions, which happens more often than one
//! would hope: a network header with big-endian length fields carrying a vendor payload with
//! little-endian counters, firmware blobs that embed structures produced by different
//! hardware, and so on.
//!
//! decoding works in place: the caller hands in a mutable reference to an already constructed
//! value and every field of it is overwritten with bytes read from the stream. encoding reads
//! the value and writes its packed representation to the stream. the streams are plain
//! [`std::io::Read`] and [`std::io::Write`] and stay owned by the caller.
//!
//! ### byte order resolution
//!
//! the rules for which byte order a field ends up with are:
//!
//! - a field tagged `#[endian(big)]` or `#[endian(little)]` uses that order, for its whole
//!   subtree, regardless of what the enclosing context uses. the innermost tag wins.
//! - an untagged field inherits the order of its enclosing context, which at the top level is
//!   the default order passed to [`encode`] / [`decode`].
//! - the elements of a sequence (`[T; N]` or `Vec<T>`) always use the stream-wide *default*
//!   order, not the order inherited from an enclosing struct field. this asymmetry looks odd
//!   but is intentional and wire formats depend on it; see the note on [`EndianSerde`].
//! - a field tagged `#[endian(ignore)]` takes no part in encoding or decoding at all and
//!   consumes no stream bytes.
//! - any other value inside `#[endian(...)]` is treated as "no override" and falls back to
//!   the inherited order.
//!
//! ### supported field types
//!
//! `bool` and the fixed-width integers of 1, 2, 4 and 8 bytes, structs of supported types,
//! and fixed arrays and `Vec`s of supported types. `PhantomData` and `()` are supported as
//! zero-width placeholders. floats, strings and maps are not supported; a float reached during
//! a walk fails with [`Error::UnsupportedShape`] rather than silently producing bytes.
//!
//! # Example
//! ```
//! use endian_serde::{EndianSerde, Endianness};
//!
//! #[derive(Debug, Default, PartialEq, EndianSerde)]
//! struct VendorReport {
//!     // inherits the stream default, big-endian on the wire here
//!     message_len: u16,
//!
//!     // the vendor counter is always little-endian, whatever the stream uses
//!     #[endian(little)]
//!     counter: u32,
//!
//!     ready: bool,
//! }
//!
//! fn main() -> Result<(), endian_serde::Error> {
//!     let report = VendorReport {
//!         message_len: 0x0102,
//!         counter: 0x11223344,
//!         ready: true,
//!     };
//!
//!     let mut wire = Vec::new();
//!     endian_serde::encode(&mut wire, Endianness::Big, &report)?;
//!     assert_eq!(wire, [0x01, 0x02, 0x44, 0x33, 0x22, 0x11, 0x01]);
//!
//!     let mut reconstructed = VendorReport::default();
//!     endian_serde::decode(&mut wire.as_slice(), Endianness::Big, &mut reconstructed)?;
//!     assert_eq!(reconstructed, report);
//!     Ok(())
//! }
//! ```

use core::marker::PhantomData;
use std::io::{Read, Write};

pub use endian_serde_macros::EndianSerde;
use thiserror::Error;

/// endianness.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum Endianness {
    Big,
    Little,
}

/// an error which can occur while encoding or decoding.
#[derive(Debug, Error)]
pub enum Error {
    /// the walk reached a value whose shape this crate can not encode or decode, for example
    /// a float field without an `#[endian(ignore)]` tag on it.
    #[error("unsupported shape: {type_name}")]
    UnsupportedShape { type_name: &'static str },

    /// the stream ran out of bytes in the middle of a scalar field. fields decoded before
    /// this point keep their decoded values, the rest of the target is untouched.
    #[error("stream ended while reading a {width} byte field")]
    TruncatedInput {
        width: usize,
        #[source]
        source: std::io::Error,
    },

    /// the underlying sink did not accept all bytes of a scalar field.
    #[error("failed to write a {width} byte field to the stream")]
    WriteFailed {
        width: usize,
        #[source]
        source: std::io::Error,
    },
}

/// a trait for types which can be encoded to and decoded from a packed binary format with
/// per-field byte order control.
///
/// usually derived with `#[derive(EndianSerde)]` and driven through the top level [`encode`]
/// and [`decode`] functions. the two order arguments of the trait methods are what make the
/// resolution rules work: `order` is the effective order for this value, inherited from the
/// enclosing context or forced by a field tag, and `default_order` is the order that was
/// passed to the outermost call. struct fields recurse with their resolved order, sequence
/// elements recurse with `default_order`. implementations must keep that rule intact, since
/// existing wire formats depend on sequence elements not picking up an enclosing field's
/// override.
pub trait EndianSerde {
    /// the number of bytes this value occupies on the wire: the sum of the widths of all of
    /// its scalar leaves. ignored fields contribute nothing.
    fn wire_size(&self) -> usize;

    /// encode this value into the given stream.
    ///
    /// `order` is the effective byte order for this value, `default_order` is the stream-wide
    /// default captured at the outermost call.
    fn endian_serialize<W: Write + ?Sized>(
        &self,
        stream: &mut W,
        order: Endianness,
        default_order: Endianness,
    ) -> Result<(), Error>;

    /// decode a value from the given stream into `self`, overwriting it in place.
    ///
    /// on failure the fields decoded so far keep their new values, there is no rollback.
    fn endian_deserialize<R: Read + ?Sized>(
        &mut self,
        stream: &mut R,
        order: Endianness,
        default_order: Endianness,
    ) -> Result<(), Error>;
}

/// encodes the given value into the given stream using the given default byte order.
pub fn encode<W: Write + ?Sized, T: EndianSerde>(
    stream: &mut W,
    default_order: Endianness,
    value: &T,
) -> Result<(), Error> {
    value.endian_serialize(stream, default_order, default_order)
}

/// decodes a value from the given stream into `value`, in place, using the given default
/// byte order.
///
/// on success the stream has advanced by exactly `value.wire_size()` bytes. on failure the
/// target should be treated as partial, fields decoded before the error keep their decoded
/// values.
pub fn decode<R: Read + ?Sized, T: EndianSerde>(
    stream: &mut R,
    default_order: Endianness,
    value: &mut T,
) -> Result<(), Error> {
    value.endian_deserialize(stream, default_order, default_order)
}

/// encodes the given value to a freshly allocated byte vector using the given default byte
/// order.
pub fn encode_to_vec<T: EndianSerde>(
    value: &T,
    default_order: Endianness,
) -> Result<Vec<u8>, Error> {
    let mut buf = Vec::with_capacity(value.wire_size());
    encode(&mut buf, default_order, value)?;
    Ok(buf)
}

/// an encoder which binds an output stream to a default byte order, for writing several
/// values in a row without repeating the order at every call.
pub struct Encoder<W: Write> {
    stream: W,
    default_order: Endianness,
}
impl<W: Write> Encoder<W> {
    /// creates a new encoder which encodes into the given stream using the given default
    /// byte order.
    pub fn new(stream: W, default_order: Endianness) -> Self {
        Self {
            stream,
            default_order,
        }
    }

    /// encodes the given value into the stream.
    pub fn encode<T: EndianSerde>(&mut self, value: &T) -> Result<(), Error> {
        encode(&mut self.stream, self.default_order, value)
    }

    /// the default byte order of this encoder.
    pub fn default_order(&self) -> Endianness {
        self.default_order
    }

    /// consumes this encoder and returns its internal stream.
    pub fn into_stream(self) -> W {
        self.stream
    }
}

/// a decoder which binds an input stream to a default byte order.
pub struct Decoder<R: Read> {
    stream: R,
    default_order: Endianness,
}
impl<R: Read> Decoder<R> {
    /// creates a new decoder which decodes values from the given stream using the given
    /// default byte order.
    pub fn new(stream: R, default_order: Endianness) -> Self {
        Self {
            stream,
            default_order,
        }
    }

    /// decodes a value from the stream into `value`, in place.
    pub fn decode<T: EndianSerde>(&mut self, value: &mut T) -> Result<(), Error> {
        decode(&mut self.stream, self.default_order, value)
    }

    /// decodes a fresh value of type `T` from the stream, starting from its default value.
    pub fn decode_new<T: EndianSerde + Default>(&mut self) -> Result<T, Error> {
        let mut value = T::default();
        self.decode(&mut value)?;
        Ok(value)
    }

    /// the default byte order of this decoder.
    pub fn default_order(&self) -> Endianness {
        self.default_order
    }

    /// consumes this decoder and returns its internal stream.
    pub fn into_stream(self) -> R {
        self.stream
    }
}

impl EndianSerde for u8 {
    fn wire_size(&self) -> usize {
        1
    }

    fn endian_serialize<W: Write + ?Sized>(
        &self,
        stream: &mut W,
        _order: Endianness,
        _default_order: Endianness,
    ) -> Result<(), Error> {
        write_scalar_bytes(stream, &[*self])
    }

    fn endian_deserialize<R: Read + ?Sized>(
        &mut self,
        stream: &mut R,
        _order: Endianness,
        _default_order: Endianness,
    ) -> Result<(), Error> {
        *self = read_scalar_byte(stream)?;
        Ok(())
    }
}

impl EndianSerde for i8 {
    fn wire_size(&self) -> usize {
        1
    }

    fn endian_serialize<W: Write + ?Sized>(
        &self,
        stream: &mut W,
        _order: Endianness,
        _default_order: Endianness,
    ) -> Result<(), Error> {
        write_scalar_bytes(stream, &[*self as u8])
    }

    fn endian_deserialize<R: Read + ?Sized>(
        &mut self,
        stream: &mut R,
        _order: Endianness,
        _default_order: Endianness,
    ) -> Result<(), Error> {
        *self = read_scalar_byte(stream)? as i8;
        Ok(())
    }
}

impl EndianSerde for bool {
    fn wire_size(&self) -> usize {
        1
    }

    fn endian_serialize<W: Write + ?Sized>(
        &self,
        stream: &mut W,
        _order: Endianness,
        _default_order: Endianness,
    ) -> Result<(), Error> {
        write_scalar_bytes(stream, &[*self as u8])
    }

    /// any nonzero byte decodes to `true`. re-encoding such a value writes the canonical
    /// byte `1`, so `bool` round-trips are not byte exact for inputs other than 0 and 1.
    fn endian_deserialize<R: Read + ?Sized>(
        &mut self,
        stream: &mut R,
        _order: Endianness,
        _default_order: Endianness,
    ) -> Result<(), Error> {
        *self = read_scalar_byte(stream)? != 0;
        Ok(())
    }
}

macro_rules! impl_for_multibyte_ints {
    {$($type: ty),+} => {
        $(
            impl EndianSerde for $type {
                fn wire_size(&self) -> usize {
                    core::mem::size_of::<Self>()
                }

                fn endian_serialize<W: Write + ?Sized>(
                    &self,
                    stream: &mut W,
                    order: Endianness,
                    _default_order: Endianness,
                ) -> Result<(), Error> {
                    let bytes = match order {
                        Endianness::Big => self.to_be_bytes(),
                        Endianness::Little => self.to_le_bytes(),
                    };
                    write_scalar_bytes(stream, &bytes)
                }

                fn endian_deserialize<R: Read + ?Sized>(
                    &mut self,
                    stream: &mut R,
                    order: Endianness,
                    _default_order: Endianness,
                ) -> Result<(), Error> {
                    let mut buf = [0u8; core::mem::size_of::<Self>()];
                    stream
                        .read_exact(&mut buf)
                        .map_err(|source| Error::TruncatedInput {
                            width: buf.len(),
                            source,
                        })?;
                    *self = match order {
                        Endianness::Big => Self::from_be_bytes(buf),
                        Endianness::Little => Self::from_le_bytes(buf),
                    };
                    Ok(())
                }
            }
        )+
    };
}

impl_for_multibyte_ints! {u16, i16, u32, i32, u64, i64}

// floats are not part of the wire format. the impls exist so that a float field reached
// during a walk fails with a clear runtime error instead of a missing-impl compile error
// pointing into generated code; tag such fields with `#[endian(ignore)]` to leave them
// off the wire.
macro_rules! impl_unsupported_shapes {
    {$($type: ty),+} => {
        $(
            impl EndianSerde for $type {
                fn wire_size(&self) -> usize {
                    0
                }

                fn endian_serialize<W: Write + ?Sized>(
                    &self,
                    _stream: &mut W,
                    _order: Endianness,
                    _default_order: Endianness,
                ) -> Result<(), Error> {
                    Err(Error::UnsupportedShape {
                        type_name: stringify!($type),
                    })
                }

                fn endian_deserialize<R: Read + ?Sized>(
                    &mut self,
                    _stream: &mut R,
                    _order: Endianness,
                    _default_order: Endianness,
                ) -> Result<(), Error> {
                    Err(Error::UnsupportedShape {
                        type_name: stringify!($type),
                    })
                }
            }
        )+
    };
}

impl_unsupported_shapes! {f32, f64}

impl<const N: usize, T: EndianSerde> EndianSerde for [T; N] {
    fn wire_size(&self) -> usize {
        self.iter().map(T::wire_size).sum()
    }

    /// sequence elements always use the stream-wide default order, never the order inherited
    /// from an enclosing struct field.
    fn endian_serialize<W: Write + ?Sized>(
        &self,
        stream: &mut W,
        _order: Endianness,
        default_order: Endianness,
    ) -> Result<(), Error> {
        for item in self.iter() {
            item.endian_serialize(stream, default_order, default_order)?;
        }
        Ok(())
    }

    fn endian_deserialize<R: Read + ?Sized>(
        &mut self,
        stream: &mut R,
        _order: Endianness,
        default_order: Endianness,
    ) -> Result<(), Error> {
        for item in self.iter_mut() {
            item.endian_deserialize(stream, default_order, default_order)?;
        }
        Ok(())
    }
}

impl<T: EndianSerde> EndianSerde for Vec<T> {
    fn wire_size(&self) -> usize {
        self.iter().map(T::wire_size).sum()
    }

    fn endian_serialize<W: Write + ?Sized>(
        &self,
        stream: &mut W,
        _order: Endianness,
        default_order: Endianness,
    ) -> Result<(), Error> {
        for item in self.iter() {
            item.endian_serialize(stream, default_order, default_order)?;
        }
        Ok(())
    }

    /// decodes in place into the vector's existing elements. the length is not read from the
    /// stream, the caller sizes the vector before decoding.
    fn endian_deserialize<R: Read + ?Sized>(
        &mut self,
        stream: &mut R,
        _order: Endianness,
        default_order: Endianness,
    ) -> Result<(), Error> {
        for item in self.iter_mut() {
            item.endian_deserialize(stream, default_order, default_order)?;
        }
        Ok(())
    }
}

impl<T> EndianSerde for PhantomData<T> {
    fn wire_size(&self) -> usize {
        0
    }

    fn endian_serialize<W: Write + ?Sized>(
        &self,
        _stream: &mut W,
        _order: Endianness,
        _default_order: Endianness,
    ) -> Result<(), Error> {
        Ok(())
    }

    fn endian_deserialize<R: Read + ?Sized>(
        &mut self,
        _stream: &mut R,
        _order: Endianness,
        _default_order: Endianness,
    ) -> Result<(), Error> {
        Ok(())
    }
}

impl EndianSerde for () {
    fn wire_size(&self) -> usize {
        0
    }

    fn endian_serialize<W: Write + ?Sized>(
        &self,
        _stream: &mut W,
        _order: Endianness,
        _default_order: Endianness,
    ) -> Result<(), Error> {
        Ok(())
    }

    fn endian_deserialize<R: Read + ?Sized>(
        &mut self,
        _stream: &mut R,
        _order: Endianness,
        _default_order: Endianness,
    ) -> Result<(), Error> {
        Ok(())
    }
}

fn read_scalar_byte<R: Read + ?Sized>(stream: &mut R) -> Result<u8, Error> {
    let mut buf = [0u8; 1];
    stream
        .read_exact(&mut buf)
        .map_err(|source| Error::TruncatedInput { width: 1, source })?;
    Ok(buf[0])
}

fn write_scalar_bytes<W: Write + ?Sized>(stream: &mut W, bytes: &[u8]) -> Result<(), Error> {
    stream
        .write_all(bytes)
        .map_err(|source| Error::WriteFailed {
            width: bytes.len(),
            source,
        })
}
