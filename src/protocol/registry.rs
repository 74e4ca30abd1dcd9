//! Marker registry
//!
//! Bidirectional mapping between registered types and markers, built once
//! from two ordered lists and never mutated afterwards. A type's marker is
//! its position in the list, so the marker space is dense over `[0, N)`.

use std::collections::HashMap;

use crate::error::CodecError;

use super::types::{Marker, TypeKey, TypeSpec};

const ENCODE_SIDE: &str = "encode";
const DECODE_SIDE: &str = "decode";

/// Type <-> marker tables for one codec
pub struct Registry<V, M> {
    /// Encode side: type -> marker
    markers: HashMap<TypeKey, Marker>,

    /// Decode side: marker -> type, indexed by marker
    types: Vec<TypeSpec<V, M>>,
}

impl<V, M> Registry<V, M> {
    /// Build the tables from the agreed type lists.
    ///
    /// Both lists must be non-empty and free of duplicates.
    pub fn build<I>(encode_types: I, decode_types: Vec<TypeSpec<V, M>>) -> Result<Self, CodecError>
    where
        I: IntoIterator<Item = TypeKey>,
    {
        let encode_types: Vec<TypeKey> = encode_types.into_iter().collect();

        if encode_types.is_empty() {
            return Err(CodecError::EmptyTypeList(ENCODE_SIDE));
        }
        if decode_types.is_empty() {
            return Err(CodecError::EmptyTypeList(DECODE_SIDE));
        }

        let markers = index_types(ENCODE_SIDE, &encode_types)?;
        let decode_keys: Vec<TypeKey> = decode_types.iter().map(TypeSpec::key).collect();
        index_types(DECODE_SIDE, &decode_keys)?;

        tracing::debug!(
            encode = encode_types.len(),
            decode = decode_types.len(),
            "Built marker registry"
        );

        Ok(Self {
            markers,
            types: decode_types,
        })
    }

    /// Marker for an encodable type
    pub fn marker_for(&self, key: &TypeKey) -> Result<Marker, CodecError> {
        self.markers
            .get(key)
            .copied()
            .ok_or(CodecError::UnrecognizedType(key.name()))
    }

    /// Decodable type registered under `marker`
    pub fn type_for(&self, marker: Marker) -> Result<&TypeSpec<V, M>, CodecError> {
        self.types
            .get(marker.index())
            .ok_or(CodecError::UnrecognizedMarker(marker))
    }

    /// Number of encodable types
    pub fn encode_len(&self) -> usize {
        self.markers.len()
    }

    /// Number of decodable types
    pub fn decode_len(&self) -> usize {
        self.types.len()
    }
}

/// Assign markers by position, rejecting duplicates
fn index_types(side: &'static str, keys: &[TypeKey]) -> Result<HashMap<TypeKey, Marker>, CodecError> {
    if u32::try_from(keys.len()).is_err() {
        return Err(CodecError::TooManyTypes {
            side,
            len: keys.len(),
        });
    }

    let mut markers = HashMap::with_capacity(keys.len());
    for (position, key) in keys.iter().enumerate() {
        if let Some(first) = markers.insert(*key, Marker(position as u32)) {
            return Err(CodecError::DuplicateType {
                side,
                name: key.name(),
                first: first.index(),
                second: position,
            });
        }
    }
    Ok(markers)
}
