//! Unsigned LEB128 and zig-zag signed varints.
//!
//! These are the variable-length integer encodings used both inside the
//! binary [`Cid`](crate::Cid) layout and for number properties on the wire.
//! Decoding is strict: overlong encodings are rejected so that every integer
//! has exactly one byte representation.

use crate::error::TypeError;

/// Maximum encoded length of a 64-bit varint.
pub const MAX_VARINT_LEN: usize = 10;

/// Append the unsigned varint encoding of `value` to `buf`.
pub fn encode_uvarint(mut value: u64, buf: &mut Vec<u8>) {
    while value >= 0x80 {
        buf.push((value as u8) | 0x80);
        value >>= 7;
    }
    buf.push(value as u8);
}

/// Unsigned varint encoding of `value` as a fresh buffer.
pub fn uvarint_bytes(value: u64) -> Vec<u8> {
    let mut buf = Vec::with_capacity(MAX_VARINT_LEN);
    encode_uvarint(value, &mut buf);
    buf
}

/// Decode an unsigned varint from the front of `data`.
///
/// Returns the value and the number of bytes consumed.
pub fn decode_uvarint(data: &[u8]) -> Result<(u64, usize), TypeError> {
    let mut value: u64 = 0;
    for (i, &byte) in data.iter().enumerate() {
        if i == MAX_VARINT_LEN - 1 && byte > 1 {
            return Err(TypeError::VarintOverflow);
        }
        if i >= MAX_VARINT_LEN {
            return Err(TypeError::VarintOverflow);
        }
        value |= u64::from(byte & 0x7f) << (7 * i);
        if byte & 0x80 == 0 {
            if byte == 0 && i > 0 {
                return Err(TypeError::NonMinimalVarint);
            }
            return Ok((value, i + 1));
        }
    }
    Err(TypeError::TruncatedVarint)
}

/// Append the zig-zag signed varint encoding of `value` to `buf`.
pub fn encode_varint(value: i64, buf: &mut Vec<u8>) {
    let zigzag = ((value << 1) ^ (value >> 63)) as u64;
    encode_uvarint(zigzag, buf);
}

/// Zig-zag signed varint encoding of `value` as a fresh buffer.
pub fn varint_bytes(value: i64) -> Vec<u8> {
    let mut buf = Vec::with_capacity(MAX_VARINT_LEN);
    encode_varint(value, &mut buf);
    buf
}

/// Decode a zig-zag signed varint from the front of `data`.
pub fn decode_varint(data: &[u8]) -> Result<(i64, usize), TypeError> {
    let (zigzag, len) = decode_uvarint(data)?;
    let value = ((zigzag >> 1) as i64) ^ -((zigzag & 1) as i64);
    Ok((value, len))
}
