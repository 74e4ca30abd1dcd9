//! # typewire
//!
//! Type-tagged framing for command/result streams:
//! - Bidirectional type <-> marker registry built from agreed type lists
//! - Marker + length-prefixed payload envelope over any `Read`/`Write`
//! - Client and server codecs built from the same lists, mirrored
//! - Pluggable payload marshallers (bincode, JSON)
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │              Application values (Cmd / Result)               │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ Encodable::type_key
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                    Marker Registry                           │
//! │            (type -> marker, marker -> type)                  │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │   Varint    │          │ Marshaller  │
//!   │ (framing)   │          │ (payload)   │
//!   └──────┬──────┘          └──────┬──────┘
//!          └────────────┬───────────┘
//!                       ▼
//!               ┌───────────────┐
//!               │   Transport   │
//!               │ (Read/Write)  │
//!               └───────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use typewire::calc::{self, Add, Command, Reply};
//! use typewire::BincodeMarshaller;
//!
//! let client = calc::client_codec(BincodeMarshaller).unwrap();
//! let server = calc::server_codec(BincodeMarshaller).unwrap();
//!
//! let bytes = client.encode_to_vec(&Command::Add(Add { a: 2, b: 3 })).unwrap();
//! let (command, n) = server.decode_from_slice(&bytes).unwrap();
//! assert_eq!(n, bytes.len());
//! assert_eq!(command, Command::Add(Add { a: 2, b: 3 }));
//!
//! let bytes = server.encode_to_vec(&Reply::value(5)).unwrap();
//! let (reply, _) = client.decode_from_slice(&bytes).unwrap();
//! assert_eq!(reply, Reply::value(5));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod protocol;
pub mod calc;
pub mod network;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use config::{Config, PayloadFormat};
pub use error::{CodecError, Error, FrameError, Result};
pub use protocol::{
    new_client_codec, new_codec, new_server_codec, BincodeMarshaller, ClientCodec, Codec,
    Encodable, JsonMarshaller, MarshalError, Marker, Marshaller, Registry, Role, ServerCodec,
    TypeKey, TypeSpec,
};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of typewire
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
