//! Protocol definitions for ProXR communication.
//!
//! This module contains the low-level protocol types including:
//! - Command opcodes and the operation catalog
//! - Frame encoding
//! - Operand validation and opcode offsets
//! - Reply interpretation
//! - Binary data parsing

pub mod addressing;
pub mod command;
pub mod frame;
pub mod parser;
pub mod response;

pub use addressing::{ALL_BANKS, MAX_BANKS, MAX_TIMER_INDEX, PORTS_PER_BANK};
pub use command::{
    AllBanksReply, BankPolicy, CommandOpcode, Expect, ExtendedOpcode, Operation, ReplyShape, ops,
};
pub use frame::{EXT_STX, STX, encode as encode_frame, encode_with_header, u16_operand};
pub use parser::{
    parse_bank_statuses, parse_device_identity, parse_timer_remaining, parse_u8, parse_u16_le,
};
pub use response::{ACK, Outcome, interpret};
