//! Error types for typewire
//!
//! `CodecError` is the framing taxonomy, `FrameError` pairs it with the
//! number of bytes that crossed the stream, and `Error` is the crate-wide
//! type used by the network layer and binaries.

use std::io;

use thiserror::Error;

use crate::protocol::{MarshalError, Marker};

/// Result type alias using the crate-wide Error
pub type Result<T> = std::result::Result<T, Error>;

/// Stable identifier prepended to every codec error message
pub const ERROR_PREFIX: &str = "typewire: ";

/// Everything that can go wrong while building a codec or moving a frame
#[derive(Debug, Error)]
pub enum CodecError {
    // -------------------------------------------------------------------------
    // Construction Errors
    // -------------------------------------------------------------------------
    #[error("typewire: {0} type list is empty")]
    EmptyTypeList(&'static str),

    #[error("typewire: {side} type {name} registered twice (positions {first} and {second})")]
    DuplicateType {
        side: &'static str,
        name: &'static str,
        first: usize,
        second: usize,
    },

    #[error("typewire: {side} type list has {len} entries, more than the marker space allows")]
    TooManyTypes { side: &'static str, len: usize },

    // -------------------------------------------------------------------------
    // Dispatch Errors
    // -------------------------------------------------------------------------
    #[error("typewire: unrecognized type: {0}")]
    UnrecognizedType(&'static str),

    #[error("typewire: unrecognized marker: {0}")]
    UnrecognizedMarker(Marker),

    // -------------------------------------------------------------------------
    // Encode Errors
    // -------------------------------------------------------------------------
    #[error("typewire: failed to marshal marker: {0}")]
    FailedToMarshalMarker(#[source] io::Error),

    #[error("typewire: failed to marshal payload: {0}")]
    FailedToMarshalPayload(#[source] MarshalError),

    #[error("typewire: failed to marshal payload frame: {0}")]
    FailedToMarshalPayloadFrame(#[source] io::Error),

    // -------------------------------------------------------------------------
    // Decode Errors
    // -------------------------------------------------------------------------
    #[error("typewire: failed to unmarshal marker: {0}")]
    FailedToUnmarshalMarker(#[source] io::Error),

    #[error("typewire: failed to unmarshal payload frame: {0}")]
    FailedToUnmarshalPayloadFrame(#[source] io::Error),

    #[error("typewire: failed to unmarshal payload: {0}")]
    FailedToUnmarshalPayload(#[source] MarshalError),
}

/// A failed encode or decode, with the bytes already written or consumed
#[derive(Debug, Error)]
#[error("{error} (after {bytes} bytes)")]
pub struct FrameError {
    #[source]
    pub error: CodecError,
    pub bytes: usize,
}

impl FrameError {
    pub(crate) fn new(error: CodecError, bytes: usize) -> Self {
        Self { error, bytes }
    }

    /// Whether the stream now holds (or lost) part of a frame.
    ///
    /// A desynchronized stream cannot carry further frames; the connection
    /// has to be torn down. A payload the marshaller rejected is the one
    /// failure that leaves the stream aligned: its whole frame was consumed.
    pub fn stream_desynchronized(&self) -> bool {
        match self.error {
            CodecError::FailedToUnmarshalPayload(_) => false,
            _ => self.bytes > 0,
        }
    }

    /// The peer closed the stream cleanly between two frames
    pub fn is_clean_eof(&self) -> bool {
        match &self.error {
            CodecError::FailedToUnmarshalMarker(e) => {
                self.bytes == 0 && e.kind() == io::ErrorKind::UnexpectedEof
            }
            _ => false,
        }
    }

    /// The underlying transport error, if the failure came from the stream
    pub fn io_error(&self) -> Option<&io::Error> {
        match &self.error {
            CodecError::FailedToMarshalMarker(e)
            | CodecError::FailedToMarshalPayloadFrame(e)
            | CodecError::FailedToUnmarshalMarker(e)
            | CodecError::FailedToUnmarshalPayloadFrame(e) => Some(e),
            _ => None,
        }
    }
}

/// Unified error type for the network layer and binaries
#[derive(Debug, Error)]
pub enum Error {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    // -------------------------------------------------------------------------
    // Codec Errors
    // -------------------------------------------------------------------------
    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("Frame error: {0}")]
    Frame(#[from] FrameError),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}
