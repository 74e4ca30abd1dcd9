//! Calculator Protocol
//!
//! A small command/result protocol served by the bundled binaries.
//!
//! ### Commands (marker = position)
//! - 0: ADD  - Payload: a, b
//! - 1: SUB  - Payload: a, b
//! - 2: MUL  - Payload: a, b
//! - 3: DIV  - Payload: a, b
//! - 4: PING - Payload: empty
//!
//! ### Replies (marker = position)
//! - 0: VALUE
//! - 1: FAILURE
//! - 2: PONG

mod command;
mod engine;
mod reply;

pub use command::{Add, Command, Div, Mul, Ping, Sub};
pub use engine::Calculator;
pub use reply::{Failure, Pong, Reply, Value};

use crate::error::CodecError;
use crate::protocol::{new_client_codec, new_server_codec, ClientCodec, Marshaller, ServerCodec};

/// Client-side codec for the calculator protocol
pub fn client_codec<M: Marshaller>(marshaller: M) -> Result<ClientCodec<Command, Reply, M>, CodecError> {
    new_client_codec(
        marshaller,
        Command::registered_types(),
        Reply::registered_types(),
    )
}

/// Server-side codec for the calculator protocol
pub fn server_codec<M: Marshaller>(marshaller: M) -> Result<ServerCodec<Command, Reply, M>, CodecError> {
    new_server_codec(
        marshaller,
        Command::registered_types(),
        Reply::registered_types(),
    )
}
