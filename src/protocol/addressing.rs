//! Operand validation and opcode offsets.
//!
//! Banks are validated against the controller's attached bank count as it is
//! *now*; callers pass it in on every call.

use crate::error::{FrameError, ValidationError};
use crate::protocol::command::BankPolicy;

/// Relays per bank.
pub const PORTS_PER_BANK: u8 = 8;

/// Highest bank number the protocol can address.
pub const MAX_BANKS: u8 = 32;

/// Highest timer index.
pub const MAX_TIMER_INDEX: u8 = 15;

/// Bank value meaning "all banks" where permitted.
pub const ALL_BANKS: u8 = 0;

/// Validates a 1-based port number.
pub fn validate_port(port: u8) -> Result<(), ValidationError> {
    if (1..=PORTS_PER_BANK).contains(&port) {
        Ok(())
    } else {
        Err(ValidationError::out_of_range("port", port, 1, u32::from(PORTS_PER_BANK)))
    }
}

/// Validates a bank number against the current attached bank count.
pub fn validate_bank(
    bank: u8,
    attached_banks: u8,
    policy: BankPolicy,
) -> Result<(), ValidationError> {
    let min = if policy == BankPolicy::WildcardAllowed {
        ALL_BANKS
    } else {
        1
    };
    if (min..=attached_banks).contains(&bank) {
        Ok(())
    } else {
        Err(ValidationError::out_of_range("bank", bank, u32::from(min), u32::from(attached_banks)))
    }
}

/// Validates a timer index.
pub fn validate_timer_index(timer: u8) -> Result<(), ValidationError> {
    if timer <= MAX_TIMER_INDEX {
        Ok(())
    } else {
        Err(ValidationError::out_of_range("timer", timer, 0, u32::from(MAX_TIMER_INDEX)))
    }
}

/// Validates an attached bank count.
pub fn validate_bank_count(banks: u8) -> Result<(), ValidationError> {
    if (1..=MAX_BANKS).contains(&banks) {
        Ok(())
    } else {
        Err(ValidationError::out_of_range("banks", banks, 1, u32::from(MAX_BANKS)))
    }
}

/// Validates the minute and second fields of a timer duration.
pub fn validate_duration(minutes: u8, seconds: u8) -> Result<(), ValidationError> {
    if minutes > 59 {
        return Err(ValidationError::out_of_range("minutes", minutes, 0, 59));
    }
    if seconds > 59 {
        return Err(ValidationError::out_of_range("seconds", seconds, 0, 59));
    }
    Ok(())
}

/// Adds an index to an opcode base.
pub fn offset(base: u8, index: u8) -> Result<u8, FrameError> {
    base.checked_add(index).ok_or(FrameError::OperandOverflow {
        base,
        offset: index,
    })
}

/// Validates a port and returns `base + port - 1`.
pub fn port_offset(base: u8, port: u8) -> crate::error::Result<u8> {
    validate_port(port)?;
    Ok(offset(base, port - 1)?)
}

/// Validates a timer index and returns `base + timer`.
pub fn timer_offset(base: u8, timer: u8) -> crate::error::Result<u8> {
    validate_timer_index(timer)?;
    Ok(offset(base, timer)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::command::ops;

    #[test]
    fn test_port_bounds() {
        assert!(validate_port(0).is_err());
        assert!(validate_port(1).is_ok());
        assert!(validate_port(8).is_ok());
        assert!(validate_port(9).is_err());
    }

    #[test]
    fn test_turn_on_relay_offsets() {
        for port in 1..=8u8 {
            assert_eq!(port_offset(ops::TURN_ON_RELAY.opcode, port).unwrap(), port - 1 + 8);
        }
    }

    #[test]
    fn test_port_offsets_stay_in_band() {
        let families = [
            ops::TURN_OFF_RELAY,
            ops::TURN_ON_RELAY,
            ops::QUERY_RELAY_STATUS,
            ops::TURN_OFF_BANK_RELAY,
            ops::TURN_ON_BANK_RELAY,
            ops::QUERY_BANK_RELAY_STATUS,
        ];
        for op in families {
            for port in 1..=8u8 {
                let opcode = port_offset(op.opcode, port).unwrap();
                assert!(op.band().contains(&opcode), "{} port {port}", op.name);
            }
        }
    }

    #[test]
    fn test_bank_wildcard_policy() {
        assert!(validate_bank(0, 32, BankPolicy::WildcardAllowed).is_ok());
        assert!(validate_bank(0, 32, BankPolicy::Explicit).is_err());
        assert!(validate_bank(32, 32, BankPolicy::Explicit).is_ok());
        assert!(validate_bank(33, 32, BankPolicy::WildcardAllowed).is_err());
    }

    #[test]
    fn test_bank_follows_attached_count() {
        assert!(validate_bank(4, 4, BankPolicy::Explicit).is_ok());
        let err = validate_bank(5, 4, BankPolicy::Explicit).unwrap_err();
        assert_eq!(err, ValidationError::out_of_range("bank", 5u8, 1, 4));
    }

    #[test]
    fn test_timer_index_bounds() {
        assert!(validate_timer_index(0).is_ok());
        assert!(validate_timer_index(15).is_ok());
        assert!(validate_timer_index(16).is_err());
        assert_eq!(timer_offset(ops::PULSE_TIMER.opcode, 15).unwrap(), 85);
    }

    #[test]
    fn test_bank_count_bounds() {
        assert!(validate_bank_count(0).is_err());
        assert!(validate_bank_count(1).is_ok());
        assert!(validate_bank_count(32).is_ok());
        assert!(validate_bank_count(33).is_err());
    }

    #[test]
    fn test_duration_fields() {
        assert!(validate_duration(59, 59).is_ok());
        assert!(validate_duration(60, 0).is_err());
        assert!(validate_duration(0, 60).is_err());
    }

    #[test]
    fn test_offset_overflow() {
        assert_eq!(
            offset(250, 10),
            Err(FrameError::OperandOverflow {
                base: 250,
                offset: 10
            })
        );
    }
}
