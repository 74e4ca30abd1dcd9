//! Envelope codec
//!
//! Encodes one value as a marker followed by a length-prefixed payload and
//! decodes the same shape back into a typed value.
//!
//! ## Wire Format
//!
//! ```text
//! ┌──────────────┬──────────────┬─────────────────────────────┐
//! │ Marker (var) │ Len (var)    │         Payload             │
//! └──────────────┴──────────────┴─────────────────────────────┘
//! ```
//!
//! Both integers are unsigned LEB128 varints, one byte for values below 128.
//! The marker goes first so the receiver knows the destination type before
//! it touches the payload.

use std::fmt;
use std::io::{Read, Write};
use std::marker::PhantomData;

use crate::error::{CodecError, FrameError};

use super::marshal::{BincodeMarshaller, Marshaller};
use super::registry::Registry;
use super::types::{Encodable, Marker, TypeSpec};
use super::varint::{self, MAX_VARINT_LEN, MAX_VARINT_LEN_U32};

/// Default payload limit (16 MB)
pub const DEFAULT_MAX_PAYLOAD_LEN: usize = 16 * 1024 * 1024;

/// Which side of the exchange a codec was built for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Generic,
    /// Encodes commands, decodes results
    Client,
    /// Encodes results, decodes commands
    Server,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Generic => "generic",
            Role::Client => "client",
            Role::Server => "server",
        };
        f.write_str(name)
    }
}

/// Encodes values of family `T`, decodes values of family `V`.
///
/// Immutable after construction; share it freely between threads. Each call
/// borrows its own reader or writer, and one stream must not be used by two
/// calls at once.
pub struct Codec<T, V, M = BincodeMarshaller> {
    registry: Registry<V, M>,
    marshaller: M,
    max_payload_len: usize,
    role: Role,
    _encodes: PhantomData<fn(&T)>,
}

impl<T, V, M> Codec<T, V, M>
where
    T: Encodable,
    M: Marshaller,
{
    /// Build a codec from the two agreed type lists.
    ///
    /// `encode_types` lists what this peer sends, `decode_types` what it
    /// receives; a type's marker is its position in the list.
    pub fn new(
        marshaller: M,
        encode_types: Vec<TypeSpec<T, M>>,
        decode_types: Vec<TypeSpec<V, M>>,
    ) -> Result<Self, CodecError> {
        let registry = Registry::build(encode_types.iter().map(TypeSpec::key), decode_types)?;
        Ok(Self {
            registry,
            marshaller,
            max_payload_len: DEFAULT_MAX_PAYLOAD_LEN,
            role: Role::Generic,
            _encodes: PhantomData,
        })
    }

    /// Set the largest payload `decode` accepts
    pub fn with_max_payload_len(mut self, len: usize) -> Self {
        self.max_payload_len = len;
        self
    }

    pub(crate) fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn max_payload_len(&self) -> usize {
        self.max_payload_len
    }

    pub fn registry(&self) -> &Registry<V, M> {
        &self.registry
    }

    pub fn marshaller(&self) -> &M {
        &self.marshaller
    }

    // =========================================================================
    // Encoding
    // =========================================================================

    /// Write one framed value, returning the bytes written.
    ///
    /// An unregistered type fails before anything reaches the writer. Other
    /// failures report the bytes already written in [`FrameError::bytes`].
    pub fn encode<W: Write + ?Sized>(&self, value: &T, writer: &mut W) -> Result<usize, FrameError> {
        let key = value.type_key();
        let marker = self
            .registry
            .marker_for(&key)
            .map_err(|e| FrameError::new(e, 0))?;

        let mut n = varint::write_u64(writer, u64::from(marker.0))
            .map_err(|p| FrameError::new(CodecError::FailedToMarshalMarker(p.error), p.bytes))?;

        let payload = value
            .marshal(&self.marshaller)
            .map_err(|e| FrameError::new(CodecError::FailedToMarshalPayload(e), n))?;

        let written = self.write_frame(&payload, writer).map_err(|p| {
            FrameError::new(CodecError::FailedToMarshalPayloadFrame(p.error), n + p.bytes)
        })?;
        n += written;

        tracing::trace!(
            role = %self.role,
            %marker,
            type_name = key.name(),
            payload = payload.len(),
            bytes = n,
            "Encoded frame"
        );
        Ok(n)
    }

    /// Encode one value into a fresh buffer
    pub fn encode_to_vec(&self, value: &T) -> Result<Vec<u8>, FrameError> {
        let mut buf = Vec::new();
        self.encode(value, &mut buf)?;
        Ok(buf)
    }

    /// Length prefix followed by the payload bytes
    fn write_frame<W: Write + ?Sized>(&self, payload: &[u8], writer: &mut W) -> Result<usize, varint::Partial> {
        let mut header = [0u8; MAX_VARINT_LEN];
        let header_len = varint::encode_u64(payload.len() as u64, &mut header);
        let n = varint::write_all_counted(writer, &header[..header_len])?;
        varint::write_all_counted(writer, payload)
            .map(|m| n + m)
            .map_err(|p| varint::Partial {
                bytes: n + p.bytes,
                error: p.error,
            })
    }

    // =========================================================================
    // Decoding
    // =========================================================================

    /// Read one framed value, returning it with the bytes consumed.
    ///
    /// After `UnrecognizedMarker` the marker is already gone from the
    /// stream; the stream is desynchronized and must not be decoded again.
    pub fn decode<R: Read + ?Sized>(&self, reader: &mut R) -> Result<(V, usize), FrameError> {
        let (raw, mut n) = varint::read_u64(reader, MAX_VARINT_LEN_U32)
            .map_err(|p| FrameError::new(CodecError::FailedToUnmarshalMarker(p.error), p.bytes))?;
        let marker = u32::try_from(raw).map(Marker).map_err(|_| {
            FrameError::new(
                CodecError::FailedToUnmarshalMarker(varint::invalid_data(format!(
                    "marker {} overflows u32",
                    raw
                ))),
                n,
            )
        })?;

        let spec = self
            .registry
            .type_for(marker)
            .map_err(|e| FrameError::new(e, n))?;

        let (payload, read) = self.read_frame(reader).map_err(|p| {
            FrameError::new(CodecError::FailedToUnmarshalPayloadFrame(p.error), n + p.bytes)
        })?;
        n += read;

        let value = spec
            .unmarshal(&self.marshaller, &payload)
            .map_err(|e| FrameError::new(CodecError::FailedToUnmarshalPayload(e), n))?;

        tracing::trace!(
            role = %self.role,
            %marker,
            type_name = spec.key().name(),
            payload = payload.len(),
            bytes = n,
            "Decoded frame"
        );
        Ok((value, n))
    }

    /// Decode one value from the front of `bytes`
    pub fn decode_from_slice(&self, mut bytes: &[u8]) -> Result<(V, usize), FrameError> {
        self.decode(&mut bytes)
    }

    /// Length prefix, checked against the limit, then the payload bytes
    fn read_frame<R: Read + ?Sized>(&self, reader: &mut R) -> Result<(Vec<u8>, usize), varint::Partial> {
        let (len, n) = varint::read_u64(reader, MAX_VARINT_LEN)?;

        let len = match usize::try_from(len) {
            Ok(len) if len <= self.max_payload_len => len,
            _ => {
                return Err(varint::Partial {
                    bytes: n,
                    error: varint::invalid_data(format!(
                        "payload too large: {} bytes (max {})",
                        len, self.max_payload_len
                    )),
                })
            }
        };

        let mut payload = vec![0u8; len];
        let read = varint::read_exact_counted(reader, &mut payload).map_err(|p| varint::Partial {
            bytes: n + p.bytes,
            error: p.error,
        })?;
        Ok((payload, n + read))
    }
}

impl<T, V, M: fmt::Debug> fmt::Debug for Codec<T, V, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Codec")
            .field("role", &self.role)
            .field("encode_types", &self.registry.encode_len())
            .field("decode_types", &self.registry.decode_len())
            .field("marshaller", &self.marshaller)
            .field("max_payload_len", &self.max_payload_len)
            .finish()
    }
}
