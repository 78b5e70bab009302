//! Device information types.

use std::fmt;

/// Identification block reported by the E3C "recall device identification"
/// command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceIdentity {
    /// Device ID (low byte first on the wire).
    pub device_id: u16,
    /// Firmware version.
    pub firmware_version: u8,
    /// Year of firmware production.
    pub firmware_year: u16,
}

impl DeviceIdentity {
    /// Decodes the encoded firmware year byte.
    ///
    /// The controller encodes the year as `century * 100 + year`, where the
    /// century digit counts millennia: 205 is 2005.
    #[must_use]
    pub const fn decode_year(encoded: u8) -> u16 {
        (encoded % 100) as u16 + (encoded / 100) as u16 * 1000
    }
}

impl fmt::Display for DeviceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ProXR device {} (firmware v{}, {})",
            self.device_id, self.firmware_version, self.firmware_year
        )
    }
}

/// Relay refreshing mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshMode {
    /// Relays only change when refreshed explicitly.
    Manual,
    /// Relays change as soon as a command is received.
    Automatic,
}

impl RefreshMode {
    /// Parses the refresh mode from a status byte.
    #[must_use]
    pub const fn from_byte(byte: u8) -> Self {
        if byte == 0 { Self::Manual } else { Self::Automatic }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_year() {
        assert_eq!(DeviceIdentity::decode_year(205), 2005);
        assert_eq!(DeviceIdentity::decode_year(219), 2019);
        assert_eq!(DeviceIdentity::decode_year(99), 99);
    }

    #[test]
    fn test_refresh_mode() {
        assert_eq!(RefreshMode::from_byte(0), RefreshMode::Manual);
        assert_eq!(RefreshMode::from_byte(1), RefreshMode::Automatic);
    }
}
