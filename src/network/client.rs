//! TCP Client
//!
//! Sends commands and waits for results, one at a time.

use std::io::{BufReader, BufWriter, Write};
use std::net::TcpStream;
use std::time::Duration;

use crate::config::Config;
use crate::error::Result;
use crate::protocol::{ClientCodec, Encodable, Marshaller};

/// Blocking request/response client
pub struct Client<C, R, M> {
    reader: BufReader<TcpStream>,
    writer: BufWriter<TcpStream>,
    codec: ClientCodec<C, R, M>,
}

impl<C, R, M> Client<C, R, M>
where
    C: Encodable,
    M: Marshaller,
{
    /// Connect to `config.addr`
    pub fn connect(config: &Config, codec: ClientCodec<C, R, M>) -> Result<Self> {
        let stream = TcpStream::connect(&config.addr)?;
        stream.set_nodelay(true)?;
        if config.read_timeout_ms > 0 {
            stream.set_read_timeout(Some(Duration::from_millis(config.read_timeout_ms)))?;
        }
        if config.write_timeout_ms > 0 {
            stream.set_write_timeout(Some(Duration::from_millis(config.write_timeout_ms)))?;
        }

        tracing::debug!("Connected to {}", config.addr);

        let read_stream = stream.try_clone()?;
        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(stream),
            codec: codec.with_max_payload_len(config.max_payload_len),
        })
    }

    /// Send one command and wait for its result
    pub fn call(&mut self, command: &C) -> Result<R> {
        self.codec.encode(command, &mut self.writer)?;
        self.writer.flush()?;
        let (result, _) = self.codec.decode(&mut self.reader)?;
        Ok(result)
    }

    pub fn codec(&self) -> &ClientCodec<C, R, M> {
        &self.codec
    }
}
