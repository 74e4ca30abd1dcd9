//! Payload marshallers
//!
//! The codec never looks inside a payload. It hands the concrete value to a
//! [`Marshaller`] and frames whatever bytes come back.

use std::error::Error as StdError;

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

/// Turns one typed value into an opaque byte payload and back
pub trait Marshaller {
    fn marshal<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>, MarshalError>;

    fn unmarshal<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, MarshalError>;
}

/// Failure reported by a marshaller
#[derive(Debug, Error)]
#[error(transparent)]
pub struct MarshalError(Box<dyn StdError + Send + Sync>);

impl MarshalError {
    pub fn new<E>(error: E) -> Self
    where
        E: Into<Box<dyn StdError + Send + Sync>>,
    {
        Self(error.into())
    }
}

impl From<bincode::Error> for MarshalError {
    fn from(error: bincode::Error) -> Self {
        Self::new(error)
    }
}

impl From<serde_json::Error> for MarshalError {
    fn from(error: serde_json::Error) -> Self {
        Self::new(error)
    }
}

/// Compact binary payloads (bincode 1.x default options)
#[derive(Debug, Clone, Copy, Default)]
pub struct BincodeMarshaller;

impl Marshaller for BincodeMarshaller {
    fn marshal<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>, MarshalError> {
        Ok(bincode::serialize(value)?)
    }

    fn unmarshal<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, MarshalError> {
        Ok(bincode::deserialize(bytes)?)
    }
}

/// JSON payloads
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonMarshaller;

impl Marshaller for JsonMarshaller {
    fn marshal<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>, MarshalError> {
        Ok(serde_json::to_vec(value)?)
    }

    fn unmarshal<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, MarshalError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}
