//! Directional codec builders
//!
//! Both peers pass the same two lists in the same order. The client encodes
//! with the command list and decodes with the result list; the server does
//! the opposite. Everything goes through [`new_codec`], so a client's decode
//! markers come from exactly the list the server's encode markers come from.
//!
//! There is no negotiation: peers that disagree on list order will decode
//! the wrong types without any error.

use crate::error::CodecError;

use super::codec::{Codec, Role};
use super::marshal::Marshaller;
use super::types::{Encodable, TypeSpec};

/// Encodes commands `C`, decodes results `R`
pub type ClientCodec<C, R, M> = Codec<C, R, M>;

/// Encodes results `R`, decodes commands `C`
pub type ServerCodec<C, R, M> = Codec<R, C, M>;

/// Role-agnostic constructor
pub fn new_codec<T, V, M>(
    marshaller: M,
    encode_types: Vec<TypeSpec<T, M>>,
    decode_types: Vec<TypeSpec<V, M>>,
) -> Result<Codec<T, V, M>, CodecError>
where
    T: Encodable,
    M: Marshaller,
{
    Codec::new(marshaller, encode_types, decode_types)
}

/// Codec for the side that sends commands and receives results
pub fn new_client_codec<C, R, M>(
    marshaller: M,
    commands: Vec<TypeSpec<C, M>>,
    results: Vec<TypeSpec<R, M>>,
) -> Result<ClientCodec<C, R, M>, CodecError>
where
    C: Encodable,
    M: Marshaller,
{
    new_codec(marshaller, commands, results).map(|codec| codec.with_role(Role::Client))
}

/// Codec for the side that receives commands and sends results
pub fn new_server_codec<C, R, M>(
    marshaller: M,
    commands: Vec<TypeSpec<C, M>>,
    results: Vec<TypeSpec<R, M>>,
) -> Result<ServerCodec<C, R, M>, CodecError>
where
    R: Encodable,
    M: Marshaller,
{
    new_codec(marshaller, results, commands).map(|codec| codec.with_role(Role::Server))
}
