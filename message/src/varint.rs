//! Unsigned LEB128 varints, as used for the version, length, and payload
//! type fields of the wire format.

use crate::errors::{MessageError, MessageResult};

/// A u64 varint occupies at most 10 bytes.
pub const MAX_VARINT_LEN: usize = 10;

/// Decodes a varint from the start of `bytes`, returning the value and the
/// number of bytes consumed.
pub fn read_varint(bytes: &[u8]) -> MessageResult<(u64, usize)> {
    let mut value: u64 = 0;
    let mut shift = 0u32;
    for (i, &byte) in bytes.iter().take(MAX_VARINT_LEN).enumerate() {
        // The tenth byte may only carry the single remaining bit of a u64
        if i == MAX_VARINT_LEN - 1 && byte > 1 {
            return Err(MessageError::InvalidVarint);
        }
        let chunk = (byte & 0x7f) as u64;
        value |= chunk << shift;
        if byte & 0x80 == 0 {
            return Ok((value, i + 1));
        }
        shift += 7;
    }
    if bytes.len() < MAX_VARINT_LEN {
        Err(MessageError::UnexpectedEof)
    } else {
        Err(MessageError::InvalidVarint)
    }
}

pub fn write_varint(mut value: u64, out: &mut Vec<u8>) {
    loop {
        let byte = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            out.push(byte);
            return;
        }
        out.push(byte | 0x80);
    }
}
