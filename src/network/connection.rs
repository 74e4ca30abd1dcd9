//! Connection Handler
//!
//! Serves one client connection with a server codec.

use std::io::{self, BufReader, BufWriter, Write};
use std::net::TcpStream;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{CodecError, Error, Result};
use crate::protocol::{Encodable, Marshaller, ServerCodec};

use super::Handler;

/// Handles a single client connection
pub struct Connection<C, R, M, H> {
    /// TCP stream reader (buffered for efficiency)
    reader: BufReader<TcpStream>,

    /// TCP stream writer (buffered for efficiency)
    writer: BufWriter<TcpStream>,

    /// Shared server codec
    codec: Arc<ServerCodec<C, R, M>>,

    /// Application handler
    handler: Arc<H>,

    /// Peer address for logging
    peer_addr: String,
}

impl<C, R, M, H> Connection<C, R, M, H>
where
    R: Encodable,
    M: Marshaller,
    H: Handler<C, R>,
{
    /// Create a new connection handler
    ///
    /// Sets up buffered I/O on two handles of the same stream
    pub fn new(stream: TcpStream, codec: Arc<ServerCodec<C, R, M>>, handler: Arc<H>) -> Result<Self> {
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        // Disable Nagle's algorithm for low latency
        stream.set_nodelay(true)?;

        let read_stream = stream.try_clone()?;

        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(stream),
            codec,
            handler,
            peer_addr,
        })
    }

    /// Configure connection timeouts (0 = none)
    pub fn set_timeouts(&mut self, read_ms: u64, write_ms: u64) -> Result<()> {
        if read_ms > 0 {
            self.reader
                .get_ref()
                .set_read_timeout(Some(Duration::from_millis(read_ms)))?;
        }
        if write_ms > 0 {
            self.writer
                .get_ref()
                .set_write_timeout(Some(Duration::from_millis(write_ms)))?;
        }
        Ok(())
    }

    /// Handle the connection (blocking until closed)
    ///
    /// Returns Ok when the client goes away, Err when the stream had to be
    /// abandoned. A payload the marshaller rejects consumed its whole frame,
    /// so the handler may answer it and the loop keeps going.
    pub fn handle(&mut self) -> Result<()> {
        tracing::debug!("Connection established from {}", self.peer_addr);

        loop {
            let reply = match self.codec.decode(&mut self.reader) {
                Ok((command, _)) => self.handler.handle(command),
                Err(e) if e.is_clean_eof() => {
                    tracing::debug!("Client {} disconnected", self.peer_addr);
                    return Ok(());
                }
                Err(e) if is_disconnect(e.io_error()) => {
                    tracing::debug!("Client {} went away: {}", self.peer_addr, e);
                    return Ok(());
                }
                Err(e) if matches!(e.error, CodecError::FailedToUnmarshalPayload(_)) => {
                    match self.handler.on_malformed(&e) {
                        Some(reply) => {
                            tracing::warn!("Malformed payload from {}: {}", self.peer_addr, e);
                            reply
                        }
                        None => return Err(Error::Frame(e)),
                    }
                }
                Err(e) => {
                    tracing::warn!("Dropping {} after unrecoverable frame: {}", self.peer_addr, e);
                    return Err(Error::Frame(e));
                }
            };

            if let Err(e) = self.send(&reply) {
                let cause = match &e {
                    Error::Io(io_err) => Some(io_err),
                    Error::Frame(frame) => frame.io_error(),
                    _ => None,
                };
                if is_disconnect(cause) {
                    tracing::debug!(
                        "Client {} disconnected before reply could be sent: {}",
                        self.peer_addr,
                        e
                    );
                    return Ok(());
                }
                tracing::warn!("Error writing to {}: {}", self.peer_addr, e);
                return Err(e);
            }
        }
    }

    /// Encode and flush one reply
    fn send(&mut self, reply: &R) -> Result<()> {
        self.codec.encode(reply, &mut self.writer)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }
}

/// Transport-level endings that are not worth reporting as errors
fn is_disconnect(cause: Option<&io::Error>) -> bool {
    matches!(
        cause.map(io::Error::kind),
        Some(
            io::ErrorKind::ConnectionReset
                | io::ErrorKind::ConnectionAborted
                | io::ErrorKind::BrokenPipe
                | io::ErrorKind::WouldBlock
                | io::ErrorKind::TimedOut
        )
    )
}
