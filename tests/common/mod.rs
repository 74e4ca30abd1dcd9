//! Shared fixtures for integration tests
//!
//! Sample type families plus transport doubles that fail after a fixed
//! number of bytes.

#![allow(dead_code)]

use std::io::{self, Read, Write};

use serde::{Deserialize, Serialize};
use typewire::{wire_enum, MarshalError, Marshaller, TypeSpec};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeA {
    pub x: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeB {
    pub y: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeC {
    pub z: f64,
}

wire_enum! {
    #[derive(Debug, Clone, PartialEq)]
    pub enum Sample {
        A(TypeA),
        B(TypeB),
        C(TypeC),
    }
}

/// `[TypeA, TypeB]`; TypeC is deliberately left out
pub fn ab_types<M: Marshaller>() -> Vec<TypeSpec<Sample, M>> {
    vec![TypeSpec::of::<TypeA>(), TypeSpec::of::<TypeB>()]
}

// =============================================================================
// Transport doubles
// =============================================================================

/// Accepts `budget` bytes, then fails every write
pub struct FailingWriter {
    pub written: Vec<u8>,
    budget: usize,
}

impl FailingWriter {
    pub fn new(budget: usize) -> Self {
        Self {
            written: Vec::new(),
            budget,
        }
    }
}

impl Write for FailingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.budget == 0 {
            return Err(io::Error::new(io::ErrorKind::Other, "write refused"));
        }
        let n = buf.len().min(self.budget);
        self.written.extend_from_slice(&buf[..n]);
        self.budget -= n;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Serves `data`, but fails once `fail_at` bytes have been handed out
pub struct FailingReader {
    data: Vec<u8>,
    pos: usize,
    fail_at: usize,
}

impl FailingReader {
    pub fn new(data: Vec<u8>, fail_at: usize) -> Self {
        Self {
            data,
            pos: 0,
            fail_at,
        }
    }

    pub fn consumed(&self) -> usize {
        self.pos
    }
}

impl Read for FailingReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.pos >= self.fail_at {
            return Err(io::Error::new(io::ErrorKind::Other, "read refused"));
        }
        let end = self.data.len().min(self.fail_at);
        let n = buf.len().min(end - self.pos);
        buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

/// Marshaller whose marshal always fails; unmarshal defers to JSON
#[derive(Debug, Clone, Copy, Default)]
pub struct RefusingMarshaller;

impl Marshaller for RefusingMarshaller {
    fn marshal<T: Serialize + ?Sized>(&self, _value: &T) -> Result<Vec<u8>, MarshalError> {
        Err(MarshalError::new("marshal refused"))
    }

    fn unmarshal<T: serde::de::DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, MarshalError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}
