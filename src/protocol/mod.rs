//! Protocol Module
//!
//! Type-tagged framing for command/result streams.
//!
//! ## Frame Format
//! ```text
//! ┌──────────────┬──────────────┬─────────────────────────────┐
//! │ Marker (var) │ Len (var)    │    Payload (Len bytes)      │
//! └──────────────┴──────────────┴─────────────────────────────┘
//! ```
//!
//! ### Markers
//! A marker is the position of the value's type in the type list both peers
//! agreed on. The client encodes with the command list and decodes with the
//! result list; the server mirrors it.
//!
//! ### Payload
//! Opaque bytes from a [`Marshaller`]: bincode by default, JSON optionally.

mod codec;
mod marshal;
mod registry;
mod roles;
mod types;
pub mod varint;

pub use codec::{Codec, Role, DEFAULT_MAX_PAYLOAD_LEN};
pub use marshal::{BincodeMarshaller, JsonMarshaller, MarshalError, Marshaller};
pub use registry::Registry;
pub use roles::{new_client_codec, new_codec, new_server_codec, ClientCodec, ServerCodec};
pub use types::{Encodable, Marker, TypeKey, TypeSpec, UnmarshalFn};
