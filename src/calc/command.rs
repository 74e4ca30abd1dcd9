//! Command definitions
//!
//! Requests sent by calculator clients.

use serde::{Deserialize, Serialize};

use crate::wire_enum;

/// Add two operands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Add {
    pub a: i64,
    pub b: i64,
}

/// Subtract `b` from `a`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sub {
    pub a: i64,
    pub b: i64,
}

/// Multiply two operands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mul {
    pub a: i64,
    pub b: i64,
}

/// Integer division, truncating toward zero
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Div {
    pub a: i64,
    pub b: i64,
}

/// Health check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ping;

wire_enum! {
    /// A command from a client
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Command {
        Add(Add),
        Sub(Sub),
        Mul(Mul),
        Div(Div),
        Ping(Ping),
    }
}

impl Command {
    /// Short name for logs and the CLI
    pub fn name(&self) -> &'static str {
        match self {
            Command::Add(_) => "ADD",
            Command::Sub(_) => "SUB",
            Command::Mul(_) => "MUL",
            Command::Div(_) => "DIV",
            Command::Ping(_) => "PING",
        }
    }
}
