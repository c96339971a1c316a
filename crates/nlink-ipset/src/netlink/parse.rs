//! Scalar extraction from attribute payloads, built on winnow.
//!
//! Every extractor requires the payload to be exactly as wide as the value
//! it reads; anything shorter or longer is reported as
//! [`Error::InvalidAttribute`].

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use winnow::binary::{be_u16, be_u32, be_u64, le_u8};
use winnow::error::{ContextError, ErrMode};
use winnow::prelude::*;
use winnow::token::take;

use super::error::{Error, Result};

/// Parser result type used by the winnow-based parsers in this crate.
pub type PResult<T> = std::result::Result<T, ErrMode<ContextError>>;

fn exact<'a, T>(
    data: &'a [u8],
    what: &'static str,
    mut parser: impl FnMut(&mut &'a [u8]) -> PResult<T>,
) -> Result<T> {
    let mut input = data;
    let value = parser(&mut input).map_err(|_| {
        Error::InvalidAttribute(format!("truncated {} attribute ({} bytes)", what, data.len()))
    })?;
    if !input.is_empty() {
        return Err(Error::InvalidAttribute(format!(
            "oversized {} attribute ({} bytes)",
            what,
            data.len()
        )));
    }
    Ok(value)
}

fn array<const N: usize>(input: &mut &[u8]) -> PResult<[u8; N]> {
    let bytes: &[u8] = take(N).parse_next(input)?;
    let mut out = [0u8; N];
    out.copy_from_slice(bytes);
    Ok(out)
}

/// Extract a u8 value.
pub fn u8(data: &[u8]) -> Result<u8> {
    exact(data, "u8", |i| le_u8.parse_next(i))
}

/// Extract a u16 value (native endian).
pub fn u16_ne(data: &[u8]) -> Result<u16> {
    exact(data, "u16", |i| array::<2>(i).map(u16::from_ne_bytes))
}

/// Extract a u32 value (native endian).
pub fn u32_ne(data: &[u8]) -> Result<u32> {
    exact(data, "u32", |i| array::<4>(i).map(u32::from_ne_bytes))
}

/// Extract a u16 value (big endian / network order).
pub fn u16_be(data: &[u8]) -> Result<u16> {
    exact(data, "u16", |i| be_u16.parse_next(i))
}

/// Extract a u32 value (big endian / network order).
pub fn u32_be(data: &[u8]) -> Result<u32> {
    exact(data, "u32", |i| be_u32.parse_next(i))
}

/// Extract a u64 value (big endian / network order).
pub fn u64_be(data: &[u8]) -> Result<u64> {
    exact(data, "u64", |i| be_u64.parse_next(i))
}

/// Extract a 6-byte hardware address.
pub fn mac(data: &[u8]) -> Result<[u8; 6]> {
    exact(data, "ether", array::<6>)
}

/// Extract a 4-byte IPv4 address in network order.
pub fn ipv4(data: &[u8]) -> Result<Ipv4Addr> {
    exact(data, "ipv4", |i| array::<4>(i).map(Ipv4Addr::from))
}

/// Extract a 16-byte IPv6 address in network order.
pub fn ipv6(data: &[u8]) -> Result<Ipv6Addr> {
    exact(data, "ipv6", |i| array::<16>(i).map(Ipv6Addr::from))
}

/// Extract an address whose family is given by its length.
pub fn ip(data: &[u8]) -> Result<IpAddr> {
    match data.len() {
        4 => ipv4(data).map(IpAddr::V4),
        16 => ipv6(data).map(IpAddr::V6),
        n => Err(Error::InvalidAttribute(format!(
            "address attribute of {} bytes",
            n
        ))),
    }
}

/// Extract a NUL-terminated string.
///
/// Bytes after the first NUL are ignored; a missing terminator is accepted.
pub fn string(data: &[u8]) -> Result<&str> {
    let len = data.iter().position(|&b| b == 0).unwrap_or(data.len());
    std::str::from_utf8(&data[..len])
        .map_err(|e| Error::InvalidAttribute(format!("invalid UTF-8: {}", e)))
}
