//! Relay and bank status types.

use std::fmt;

use crate::protocol::addressing::PORTS_PER_BANK;

/// On/off pattern of the eight relays in one bank.
///
/// Bit `n` is port `n + 1`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct BankStatus(pub u8);

impl BankStatus {
    /// All relays off.
    pub const ALL_OFF: Self = Self(0x00);
    /// All relays on.
    pub const ALL_ON: Self = Self(0xFF);

    /// Creates a status from the raw byte.
    #[must_use]
    pub const fn from_byte(byte: u8) -> Self {
        Self(byte)
    }

    /// Returns the raw byte.
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Returns true if the relay on `port` (1..=8) is on.
    ///
    /// Out-of-range ports read as off.
    #[must_use]
    pub const fn is_on(self, port: u8) -> bool {
        matches!(port, 1..=PORTS_PER_BANK) && self.0 & (1 << (port - 1)) != 0
    }

    /// Returns a copy with `port` switched on or off.
    #[must_use]
    pub const fn with(self, port: u8, on: bool) -> Self {
        if !matches!(port, 1..=PORTS_PER_BANK) {
            return self;
        }
        let mask = 1 << (port - 1);
        if on { Self(self.0 | mask) } else { Self(self.0 & !mask) }
    }

    /// Ports that are on, ascending.
    pub fn ports_on(self) -> impl Iterator<Item = u8> {
        (1..=PORTS_PER_BANK).filter(move |&p| self.is_on(p))
    }
}

impl From<u8> for BankStatus {
    fn from(byte: u8) -> Self {
        Self(byte)
    }
}

impl fmt::Display for BankStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08b}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_on() {
        let status = BankStatus::from_byte(0b1000_0101);
        assert!(status.is_on(1));
        assert!(!status.is_on(2));
        assert!(status.is_on(3));
        assert!(status.is_on(8));
        assert!(!status.is_on(0));
        assert!(!status.is_on(9));
    }

    #[test]
    fn test_ports_on() {
        let status = BankStatus::from_byte(0b0100_0010);
        assert_eq!(status.ports_on().collect::<Vec<_>>(), vec![2, 7]);
        assert_eq!(BankStatus::ALL_ON.ports_on().count(), 8);
    }

    #[test]
    fn test_with() {
        let status = BankStatus::ALL_OFF.with(4, true).with(1, true).with(4, false);
        assert_eq!(status.bits(), 0b0000_0001);
        assert_eq!(status.with(9, true), status);
    }

    #[test]
    fn test_display() {
        assert_eq!(BankStatus::from_byte(5).to_string(), "00000101");
    }
}
