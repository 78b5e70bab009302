//! Binary data parsing utilities for the ProXR protocol.
//!
//! This module turns raw reply bytes into typed values. Reply lengths are
//! fixed by the command, so most parsers only check that the length matches.

use crate::error::{Error, Result};
use crate::types::{BankStatus, DeviceIdentity, TimerDuration};

/// Parses `DeviceIdentity` from the E3C identification reply.
///
/// Format:
/// ```text
/// [id_lo:1] [id_hi:1] [fw_version:1] [fw_year:1]
/// ```
pub fn parse_device_identity(data: &[u8]) -> Result<DeviceIdentity> {
    let [id_lo, id_hi, firmware_version, year] = data else {
        return Err(Error::Protocol {
            message: format!("DeviceIdentity must be 4 bytes, got {}", data.len()),
        });
    };

    Ok(DeviceIdentity {
        device_id: u16::from_le_bytes([*id_lo, *id_hi]),
        firmware_version: *firmware_version,
        firmware_year: DeviceIdentity::decode_year(*year),
    })
}

/// Parses one status byte per bank.
///
/// Bank 1 comes first.
#[must_use]
pub fn parse_bank_statuses(data: &[u8]) -> Vec<BankStatus> {
    data.iter().copied().map(BankStatus::from_byte).collect()
}

/// Parses the remaining time of a timer.
///
/// Format:
/// ```text
/// [hours:1] [minutes:1] [seconds:1]
/// ```
pub fn parse_timer_remaining(data: &[u8]) -> Result<TimerDuration> {
    let [hours, minutes, seconds] = data else {
        return Err(Error::Protocol {
            message: format!("Timer status must be 3 bytes, got {}", data.len()),
        });
    };
    Ok(TimerDuration::new(*hours, *minutes, *seconds))
}

/// Parses a little-endian 16-bit value.
pub fn parse_u16_le(data: &[u8]) -> Result<u16> {
    let [lsb, msb] = data else {
        return Err(Error::Protocol {
            message: format!("expected 2 bytes, got {}", data.len()),
        });
    };
    Ok(u16::from_le_bytes([*lsb, *msb]))
}

/// Parses a single-byte reply.
pub fn parse_u8(data: &[u8]) -> Result<u8> {
    match data {
        [value] => Ok(*value),
        _ => Err(Error::Protocol {
            message: format!("expected 1 byte, got {}", data.len()),
        }),
    }
}
