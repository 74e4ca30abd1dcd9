//! Calculator engine
//!
//! Evaluates commands. Stateless, so one instance serves every connection.

use crate::error::FrameError;
use crate::network::Handler;

use super::{Command, Reply};

/// Evaluates calculator commands
#[derive(Debug, Clone, Copy, Default)]
pub struct Calculator;

impl Calculator {
    pub fn new() -> Self {
        Self
    }

    /// Execute a command
    ///
    /// Overflow and division by zero come back as FAILURE replies.
    pub fn execute(&self, command: Command) -> Reply {
        let result = match command {
            Command::Add(c) => c.a.checked_add(c.b).ok_or("overflow"),
            Command::Sub(c) => c.a.checked_sub(c.b).ok_or("overflow"),
            Command::Mul(c) => c.a.checked_mul(c.b).ok_or("overflow"),
            Command::Div(c) if c.b == 0 => Err("division by zero"),
            Command::Div(c) => c.a.checked_div(c.b).ok_or("overflow"),
            Command::Ping(_) => return Reply::Pong(super::Pong),
        };

        match result {
            Ok(value) => Reply::value(value),
            Err(message) => Reply::failure(message),
        }
    }
}

impl Handler<Command, Reply> for Calculator {
    fn handle(&self, command: Command) -> Reply {
        self.execute(command)
    }

    fn on_malformed(&self, error: &FrameError) -> Option<Reply> {
        Some(Reply::failure(format!("malformed command: {}", error.error)))
    }
}
