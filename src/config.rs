//! Client configuration.

use std::time::Duration;

use crate::protocol::{ACK, MAX_BANKS, STX};

/// Default time to wait for a reply.
pub const DEFAULT_REPLY_TIMEOUT: Duration = Duration::from_millis(500);

/// Protocol settings for a [`RelayController`](crate::RelayController).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Command start byte.
    pub stx: u8,
    /// Acknowledgement byte.
    pub ack: u8,
    /// Attached bank count assumed until the device is queried.
    pub default_banks: u8,
    /// Time to wait for each reply.
    pub reply_timeout: Duration,
    /// Whether the device starts with reporting mode on.
    pub reporting_mode: bool,
    /// Pause after every send.
    pub command_delay: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientConfig {
    /// Creates the default ProXR configuration.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            stx: STX,
            ack: ACK,
            default_banks: MAX_BANKS,
            reply_timeout: DEFAULT_REPLY_TIMEOUT,
            reporting_mode: true,
            command_delay: Duration::ZERO,
        }
    }

    /// Sets the start byte.
    #[must_use]
    pub const fn stx(mut self, stx: u8) -> Self {
        self.stx = stx;
        self
    }

    /// Sets the acknowledgement byte.
    #[must_use]
    pub const fn ack(mut self, ack: u8) -> Self {
        self.ack = ack;
        self
    }

    /// Sets the initial attached bank count.
    ///
    /// Out-of-range values are clamped to 1..=32 when the controller is built.
    #[must_use]
    pub const fn default_banks(mut self, banks: u8) -> Self {
        self.default_banks = banks;
        self
    }

    /// Sets the reply timeout.
    #[must_use]
    pub const fn reply_timeout(mut self, timeout: Duration) -> Self {
        self.reply_timeout = timeout;
        self
    }

    /// Sets the initial reporting mode.
    #[must_use]
    pub const fn reporting_mode(mut self, enabled: bool) -> Self {
        self.reporting_mode = enabled;
        self
    }

    /// Sets the pause after every send.
    #[must_use]
    pub const fn command_delay(mut self, delay: Duration) -> Self {
        self.command_delay = delay;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.stx, 0xFE);
        assert_eq!(config.ack, 0x55);
        assert_eq!(config.default_banks, 32);
        assert_eq!(config.reply_timeout, Duration::from_millis(500));
        assert!(config.reporting_mode);
        assert_eq!(config.command_delay, Duration::ZERO);
    }

    #[test]
    fn test_config_builder() {
        let config = ClientConfig::new()
            .default_banks(4)
            .reply_timeout(Duration::from_secs(2))
            .reporting_mode(false)
            .command_delay(Duration::from_millis(20));

        assert_eq!(config.default_banks, 4);
        assert_eq!(config.reply_timeout, Duration::from_secs(2));
        assert!(!config.reporting_mode);
        assert_eq!(config.command_delay, Duration::from_millis(20));
    }
}
