//! Network Module
//!
//! Reference TCP transport for typewire codecs.
//!
//! ## Architecture
//! - Single acceptor thread (non-blocking accept, polls the shutdown flag)
//! - Worker thread pool fed over a channel
//! - Each connection: decode command, dispatch to a `Handler`, encode result

mod client;
mod connection;
mod server;

pub use client::Client;
pub use connection::Connection;
pub use server::{Server, ShutdownHandle};

use crate::error::FrameError;

/// Application side of a server: turns one command into one result
pub trait Handler<C, R>: Send + Sync + 'static {
    fn handle(&self, command: C) -> R;

    /// Reply for a frame whose payload could not be unmarshalled.
    ///
    /// The stream is still aligned at this point. Returning `None` closes the
    /// connection instead.
    fn on_malformed(&self, _error: &FrameError) -> Option<R> {
        None
    }
}
