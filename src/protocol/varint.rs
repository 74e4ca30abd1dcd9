//! Varint and counted I/O helpers
//!
//! Markers and payload lengths are unsigned LEB128: seven data bits per
//! byte, least significant group first, high bit set on every byte but the
//! last. Values below 128 take exactly one byte.
//!
//! The counted helpers behave like `write_all`/`read_exact` but report how
//! many bytes crossed the stream before a failure, which the codec needs for
//! its byte accounting.

use std::io::{self, ErrorKind, Read, Write};

/// Longest encoding of a u64
pub const MAX_VARINT_LEN: usize = 10;

/// Longest encoding of a u32
pub const MAX_VARINT_LEN_U32: usize = 5;

/// An I/O failure plus the bytes transferred before it
#[derive(Debug)]
pub struct Partial {
    pub bytes: usize,
    pub error: io::Error,
}

impl Partial {
    fn new(bytes: usize, error: io::Error) -> Self {
        Self { bytes, error }
    }
}

/// Encode `value` into `buf`, returning the encoded width
pub fn encode_u64(mut value: u64, buf: &mut [u8; MAX_VARINT_LEN]) -> usize {
    let mut i = 0;
    while value >= 0x80 {
        buf[i] = (value as u8) | 0x80;
        value >>= 7;
        i += 1;
    }
    buf[i] = value as u8;
    i + 1
}

/// Number of bytes `value` occupies on the wire
pub fn encoded_len(value: u64) -> usize {
    let bits = 64 - (value | 1).leading_zeros() as usize;
    bits.div_ceil(7)
}

/// Write `value` as a varint
pub fn write_u64<W: Write + ?Sized>(writer: &mut W, value: u64) -> Result<usize, Partial> {
    let mut buf = [0u8; MAX_VARINT_LEN];
    let len = encode_u64(value, &mut buf);
    write_all_counted(writer, &buf[..len])
}

/// Read one varint of at most `max_len` bytes.
///
/// `max_len` is capped at [`MAX_VARINT_LEN`]. Bytes are pulled one at a time
/// so the reader is left positioned right after the varint.
pub fn read_u64<R: Read + ?Sized>(reader: &mut R, max_len: usize) -> Result<(u64, usize), Partial> {
    let max_len = max_len.min(MAX_VARINT_LEN);
    let mut value: u64 = 0;
    let mut shift = 0u32;
    let mut n = 0;

    loop {
        let mut byte = [0u8; 1];
        read_exact_counted(reader, &mut byte).map_err(|p| Partial::new(n, p.error))?;
        n += 1;

        let group = u64::from(byte[0] & 0x7f);
        if shift == 63 && group > 1 {
            return Err(Partial::new(n, invalid_data("varint overflows u64")));
        }
        value |= group << shift;

        if byte[0] & 0x80 == 0 {
            return Ok((value, n));
        }
        if n >= max_len {
            return Err(Partial::new(
                n,
                invalid_data(format!("varint longer than {} bytes", max_len)),
            ));
        }
        shift += 7;
    }
}

/// `write_all` that reports how far it got
pub fn write_all_counted<W: Write + ?Sized>(writer: &mut W, mut buf: &[u8]) -> Result<usize, Partial> {
    let mut written = 0;
    while !buf.is_empty() {
        match writer.write(buf) {
            Ok(0) => {
                return Err(Partial::new(
                    written,
                    io::Error::new(ErrorKind::WriteZero, "failed to write whole buffer"),
                ))
            }
            Ok(n) => {
                written += n;
                buf = &buf[n..];
            }
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => return Err(Partial::new(written, e)),
        }
    }
    Ok(written)
}

/// `read_exact` that reports how far it got
pub fn read_exact_counted<R: Read + ?Sized>(reader: &mut R, buf: &mut [u8]) -> Result<usize, Partial> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => {
                return Err(Partial::new(
                    filled,
                    io::Error::new(ErrorKind::UnexpectedEof, "failed to fill whole buffer"),
                ))
            }
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => return Err(Partial::new(filled, e)),
        }
    }
    Ok(filled)
}

pub(crate) fn invalid_data<E>(msg: E) -> io::Error
where
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    io::Error::new(ErrorKind::InvalidData, msg)
}
