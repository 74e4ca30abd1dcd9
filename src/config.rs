//! Configuration for typewire endpoints
//!
//! Centralized configuration with sensible defaults.

use std::fmt;
use std::str::FromStr;

use crate::error::Error;
use crate::protocol::DEFAULT_MAX_PAYLOAD_LEN;

/// Configuration for a server or client endpoint
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// TCP listen (server) or connect (client) address
    pub addr: String,

    /// Worker threads serving connections
    pub workers: usize,

    /// Connection read timeout (milliseconds, 0 = none)
    pub read_timeout_ms: u64,

    /// Connection write timeout (milliseconds, 0 = none)
    pub write_timeout_ms: u64,

    // -------------------------------------------------------------------------
    // Codec Configuration
    // -------------------------------------------------------------------------
    /// Largest payload accepted by decode (bytes)
    pub max_payload_len: usize,

    /// Payload format; both peers must use the same one
    pub format: PayloadFormat,
}

/// Marshaller used for payloads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PayloadFormat {
    #[default]
    Bincode,
    Json,
}

impl fmt::Display for PayloadFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PayloadFormat::Bincode => f.write_str("bincode"),
            PayloadFormat::Json => f.write_str("json"),
        }
    }
}

impl FromStr for PayloadFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bincode" => Ok(PayloadFormat::Bincode),
            "json" => Ok(PayloadFormat::Json),
            other => Err(Error::Config(format!("unknown payload format: {}", other))),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:7878".to_string(),
            workers: 4,
            read_timeout_ms: 30_000,
            write_timeout_ms: 5000,
            max_payload_len: DEFAULT_MAX_PAYLOAD_LEN,
            format: PayloadFormat::Bincode,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
    oversized_kb: Option<usize>,
}

impl ConfigBuilder {
    /// Set the TCP address
    pub fn addr(mut self, addr: impl Into<String>) -> Self {
        self.config.addr = addr.into();
        self
    }

    /// Set the number of worker threads
    pub fn workers(mut self, count: usize) -> Self {
        self.config.workers = count;
        self
    }

    /// Set the read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    /// Set the payload limit (in bytes)
    pub fn max_payload_len(mut self, len: usize) -> Self {
        self.config.max_payload_len = len;
        self
    }

    /// Set the payload limit (in KiB)
    pub fn max_payload_kb(mut self, kb: usize) -> Self {
        match kb.checked_mul(1024) {
            Some(len) => {
                self.config.max_payload_len = len;
                self.oversized_kb = None;
            }
            None => self.oversized_kb = Some(kb),
        }
        self
    }

    /// Set the payload format
    pub fn format(mut self, format: PayloadFormat) -> Self {
        self.config.format = format;
        self
    }

    /// Validate and return the config
    pub fn build(self) -> Result<Config, Error> {
        if let Some(kb) = self.oversized_kb {
            return Err(Error::Config(format!("max payload of {} KiB overflows usize", kb)));
        }
        if self.config.workers == 0 {
            return Err(Error::Config("workers must be at least 1".to_string()));
        }
        if self.config.max_payload_len == 0 {
            return Err(Error::Config("max_payload_len must be non-zero".to_string()));
        }
        Ok(self.config)
    }
}
