//! Reply definitions
//!
//! Results returned to calculator clients.

use serde::{Deserialize, Serialize};

use crate::wire_enum;

/// Successful computation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Value {
    pub value: i64,
}

/// The command could not be evaluated
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure {
    pub message: String,
}

/// Answer to PING
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pong;

wire_enum! {
    /// A reply to send to a client
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Reply {
        Value(Value),
        Failure(Failure),
        Pong(Pong),
    }
}

impl Reply {
    /// Create a VALUE reply
    pub fn value(value: i64) -> Self {
        Reply::Value(Value { value })
    }

    /// Create a FAILURE reply
    pub fn failure(message: impl Into<String>) -> Self {
        Reply::Failure(Failure {
            message: message.into(),
        })
    }
}
