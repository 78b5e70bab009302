//! Frame encoding for the ProXR protocol.
//!
//! Commands are unframed byte sequences introduced by a start byte:
//! ```text
//! plain:     ┌──────┬──────────┬──────────────┐
//!            │ 0xFE │  opcode  │ operands...  │
//!            └──────┴──────────┴──────────────┘
//! extended:  ┌──────┬──────┬──────────┬──────────────┐
//!            │ 0xFE │ 0x32 │  opcode  │ operands...  │
//!            └──────┴──────┴──────────┴──────────────┘
//! ```
//! There is no length prefix or checksum; the reply length is implied by the
//! command.

use bytes::{BufMut, Bytes, BytesMut};

/// Command start byte.
pub const STX: u8 = 0xFE;

/// Second start byte for extended (timer/setup) commands.
pub const EXT_STX: u8 = 0x32;

/// Encodes a command with the default start byte.
#[must_use]
pub fn encode(opcode: u8, extended: bool, operands: &[u8]) -> Bytes {
    encode_with_header(STX, opcode, extended, operands)
}

/// Encodes a command using `header` as the start byte.
#[must_use]
pub fn encode_with_header(header: u8, opcode: u8, extended: bool, operands: &[u8]) -> Bytes {
    let mut buf = BytesMut::with_capacity(3 + operands.len());
    buf.put_u8(header);
    if extended {
        buf.put_u8(EXT_STX);
    }
    buf.put_u8(opcode);
    buf.put_slice(operands);
    buf.freeze()
}

/// Splits a 16-bit value into its little-endian operand pair.
#[must_use]
pub const fn u16_operand(value: u16) -> [u8; 2] {
    value.to_le_bytes()
}
