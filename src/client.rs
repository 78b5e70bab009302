//! Main [`RelayController`] client implementation.
//!
//! This module provides the high-level client that combines transport,
//! operand validation and the command pipeline into one typed interface.
//!
//! Acknowledged commands return `Ok(true)` on ACK and `Ok(false)` when the
//! device answers with anything else or not at all. Queries return `Ok(None)`
//! in the same cases. With reporting mode off no reply is read: commands
//! report `Ok(true)` optimistically and queries report `Ok(None)`.
//! Out-of-range operands are rejected with [`Error::Validation`] before any
//! byte is written.

use bytes::Bytes;

use crate::commands::CommandHandler;
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::protocol::addressing::{
    port_offset, timer_offset, validate_bank, validate_bank_count, validate_duration,
    validate_timer_index,
};
use crate::protocol::{
    MAX_BANKS, Operation, Outcome, ops, parse_bank_statuses, parse_device_identity,
    parse_timer_remaining, parse_u8, parse_u16_le, u16_operand,
};
use crate::transport::{
    DEFAULT_DRAIN_LIMIT, DEFAULT_DRAIN_TIMEOUT, SerialTransport, TcpTransport, Transport,
    serial::SerialConfig, tcp::TcpConfig,
};
use crate::types::{BankStatus, DeviceIdentity, RefreshMode, TimerDuration, TimerKind, TimerMask};

/// Client for a ProXR relay controller.
pub struct RelayController<T> {
    commands: CommandHandler<T>,
    attached_banks: u8,
}

impl RelayController<TcpTransport> {
    /// Creates a new client for a network-attached controller.
    ///
    /// # Arguments
    ///
    /// * `address` - Host name or IP address (port 2101 is used)
    ///
    /// # Returns
    ///
    /// A new client (not yet connected).
    #[must_use]
    pub fn tcp(address: impl Into<String>) -> Self {
        Self::with_tcp_config(TcpConfig::new(address), ClientConfig::default())
    }

    /// Creates a new client with custom TCP and protocol configuration.
    #[must_use]
    pub fn with_tcp_config(tcp: TcpConfig, config: ClientConfig) -> Self {
        Self::new(TcpTransport::new(tcp), config)
    }
}

impl RelayController<SerialTransport> {
    /// Creates a new client for a serial port.
    ///
    /// # Arguments
    ///
    /// * `port` - Serial port path (e.g., "/dev/ttyUSB0")
    ///
    /// # Returns
    ///
    /// A new client (not yet connected).
    #[must_use]
    pub fn serial(port: impl Into<String>) -> Self {
        Self::with_serial_config(SerialConfig::new(port), ClientConfig::default())
    }

    /// Creates a new client with custom serial and protocol configuration.
    #[must_use]
    pub fn with_serial_config(serial: SerialConfig, config: ClientConfig) -> Self {
        Self::new(SerialTransport::new(serial), config)
    }
}

impl<T: Transport> RelayController<T> {
    /// Creates a new client with the given transport.
    #[must_use]
    pub fn new(transport: T, config: ClientConfig) -> Self {
        let attached_banks = config.default_banks.clamp(1, MAX_BANKS);
        Self {
            commands: CommandHandler::new(transport, &config),
            attached_banks,
        }
    }

    /// Connects to the controller.
    ///
    /// This will:
    /// 1. Open the transport connection
    /// 2. Discard any stale bytes the device or an earlier session left behind
    ///
    /// # Errors
    ///
    /// Returns an error if the transport cannot be opened.
    pub async fn connect(&mut self) -> Result<()> {
        self.commands.connect().await?;
        self.clear_input_buffer().await?;
        tracing::info!(
            "relay controller ready ({} banks, reporting mode {})",
            self.attached_banks,
            if self.reporting_mode() { "on" } else { "off" }
        );
        Ok(())
    }

    /// Disconnects from the controller.
    pub async fn disconnect(&mut self) -> Result<()> {
        self.commands.disconnect().await
    }

    /// Returns true if connected.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.commands.is_connected()
    }

    /// Returns the number of banks currently accepted as valid.
    #[must_use]
    pub const fn attached_banks(&self) -> u8 {
        self.attached_banks
    }

    /// Returns true if the client expects a reply to every command.
    #[must_use]
    pub const fn reporting_mode(&self) -> bool {
        self.commands.reporting_mode()
    }

    /// Returns the command handler for direct command access.
    #[must_use]
    pub const fn commands(&self) -> &CommandHandler<T> {
        &self.commands
    }

    /// Returns the command handler mutably.
    pub fn commands_mut(&mut self) -> &mut CommandHandler<T> {
        &mut self.commands
    }

    /// Discards pending input. Returns the number of bytes discarded.
    pub async fn clear_input_buffer(&mut self) -> Result<usize> {
        self.commands
            .drain(DEFAULT_DRAIN_LIMIT, DEFAULT_DRAIN_TIMEOUT)
            .await
    }

    async fn ack(&mut self, op: &Operation, operands: &[u8]) -> Result<bool> {
        self.commands.acknowledge(op, op.opcode, operands).await
    }

    async fn query(&mut self, op: &Operation, operands: &[u8]) -> Result<Option<Bytes>> {
        self.commands
            .query(op, op.opcode, operands, op.reply.single())
            .await
    }

    async fn query_byte(&mut self, op: &Operation, operands: &[u8]) -> Result<Option<u8>> {
        self.query(op, operands)
            .await?
            .map(|data| parse_u8(&data))
            .transpose()
    }

    fn check_bank(&self, op: &Operation, bank: u8) -> Result<()> {
        validate_bank(bank, self.attached_banks, op.bank)?;
        Ok(())
    }

    async fn bank_ack(&mut self, op: &Operation, bank: u8) -> Result<bool> {
        self.check_bank(op, bank)?;
        self.ack(op, &[bank]).await
    }

    // ==================== E3C Device Addressing ====================

    /// Tells all devices to listen.
    pub async fn enable_all_devices(&mut self) -> Result<bool> {
        self.ack(&ops::ENABLE_ALL_DEVICES, &[]).await
    }

    /// Tells all devices to ignore commands.
    pub async fn disable_all_devices(&mut self) -> Result<bool> {
        self.ack(&ops::DISABLE_ALL_DEVICES, &[]).await
    }

    /// Tells the selected device to listen.
    pub async fn enable_selected_device(&mut self) -> Result<bool> {
        self.ack(&ops::ENABLE_SELECTED_DEVICE, &[]).await
    }

    /// Tells the selected device to ignore commands.
    pub async fn disable_selected_device(&mut self) -> Result<bool> {
        self.ack(&ops::DISABLE_SELECTED_DEVICE, &[]).await
    }

    /// Tells the selected device to listen and all others to ignore commands.
    pub async fn enable_selected_device_exclusive(&mut self) -> Result<bool> {
        self.ack(&ops::ENABLE_SELECTED_DEVICE_EXCLUSIVE, &[]).await
    }

    /// Tells the selected device to ignore commands and all others to listen.
    pub async fn disable_selected_device_exclusive(&mut self) -> Result<bool> {
        self.ack(&ops::DISABLE_SELECTED_DEVICE_EXCLUSIVE, &[]).await
    }

    /// Stores the device number. Takes effect immediately.
    pub async fn store_device_number(&mut self) -> Result<bool> {
        self.ack(&ops::STORE_DEVICE_NUMBER, &[]).await
    }

    /// Reads the device identification block.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Protocol`] if the reply cannot be decoded.
    pub async fn recall_device_identification(&mut self) -> Result<Option<DeviceIdentity>> {
        self.query(&ops::RECALL_DEVICE_IDENTIFICATION, &[])
            .await?
            .map(|data| parse_device_identity(&data))
            .transpose()
    }

    /// Reads the stored device number.
    pub async fn recall_device_number(&mut self) -> Result<Option<u8>> {
        self.query_byte(&ops::RECALL_DEVICE_NUMBER, &[]).await
    }

    // ==================== Relay Commands ====================

    /// Turns off a relay in the current bank.
    pub async fn turn_off_relay(&mut self, port: u8) -> Result<bool> {
        let op = &ops::TURN_OFF_RELAY;
        let opcode = port_offset(op.opcode, port)?;
        self.commands.acknowledge(op, opcode, &[]).await
    }

    /// Turns on a relay in the current bank.
    pub async fn turn_on_relay(&mut self, port: u8) -> Result<bool> {
        let op = &ops::TURN_ON_RELAY;
        let opcode = port_offset(op.opcode, port)?;
        self.commands.acknowledge(op, opcode, &[]).await
    }

    /// Turns off a relay in `bank`.
    pub async fn turn_off_bank_relay(&mut self, bank: u8, port: u8) -> Result<bool> {
        let op = &ops::TURN_OFF_BANK_RELAY;
        let opcode = port_offset(op.opcode, port)?;
        self.check_bank(op, bank)?;
        self.commands.acknowledge(op, opcode, &[bank]).await
    }

    /// Turns on a relay in `bank`.
    pub async fn turn_on_bank_relay(&mut self, bank: u8, port: u8) -> Result<bool> {
        let op = &ops::TURN_ON_BANK_RELAY;
        let opcode = port_offset(op.opcode, port)?;
        self.check_bank(op, bank)?;
        self.commands.acknowledge(op, opcode, &[bank]).await
    }

    /// Returns whether a relay in the current bank is on.
    pub async fn query_relay_status(&mut self, port: u8) -> Result<Option<bool>> {
        let op = &ops::QUERY_RELAY_STATUS;
        let opcode = port_offset(op.opcode, port)?;
        let data = self.commands.query(op, opcode, &[], op.reply.single()).await?;
        Ok(data.map(|data| data.iter().any(|&byte| byte != 0)))
    }

    /// Returns whether a relay in `bank` is on.
    pub async fn query_bank_relay_status(&mut self, bank: u8, port: u8) -> Result<Option<bool>> {
        let op = &ops::QUERY_BANK_RELAY_STATUS;
        let opcode = port_offset(op.opcode, port)?;
        self.check_bank(op, bank)?;
        let data = self
            .commands
            .query(op, opcode, &[bank], op.reply.single())
            .await?;
        Ok(data.map(|data| data.iter().any(|&byte| byte != 0)))
    }

    /// Reads the relay pattern of the current bank.
    pub async fn query_status_all(&mut self) -> Result<Option<BankStatus>> {
        Ok(self
            .query_byte(&ops::QUERY_STATUS_ALL, &[])
            .await?
            .map(BankStatus::from_byte))
    }

    /// Reads the relay pattern of `bank`.
    ///
    /// Bank 0 reads every attached bank in one reply, bank 1 first.
    pub async fn query_bank_status(&mut self, bank: u8) -> Result<Option<Vec<BankStatus>>> {
        let op = &ops::QUERY_BANK_STATUS;
        self.check_bank(op, bank)?;
        let expect = op.reply.resolve(bank, self.attached_banks);
        let data = self.commands.query(op, op.opcode, &[bank], expect).await?;
        Ok(data.map(|data| parse_bank_statuses(&data)))
    }

    /// Turns all relays in the current bank on.
    pub async fn all_relays_on(&mut self) -> Result<bool> {
        self.ack(&ops::ALL_RELAYS_ON, &[]).await
    }

    /// Turns all relays in the current bank off.
    pub async fn all_relays_off(&mut self) -> Result<bool> {
        self.ack(&ops::ALL_RELAYS_OFF, &[]).await
    }

    /// Inverts all relays in the current bank.
    pub async fn toggle_all_relays(&mut self) -> Result<bool> {
        self.ack(&ops::TOGGLE_ALL_RELAYS, &[]).await
    }

    /// Reverses the relay order of the current bank.
    pub async fn reverse_all_relays(&mut self) -> Result<bool> {
        self.ack(&ops::REVERSE_ALL_RELAYS, &[]).await
    }

    /// Turns all relays in `bank` on.
    pub async fn bank_relays_on(&mut self, bank: u8) -> Result<bool> {
        self.bank_ack(&ops::BANK_RELAYS_ON, bank).await
    }

    /// Turns all relays in `bank` off.
    pub async fn bank_relays_off(&mut self, bank: u8) -> Result<bool> {
        self.bank_ack(&ops::BANK_RELAYS_OFF, bank).await
    }

    /// Inverts all relays in `bank`.
    pub async fn toggle_bank_relays(&mut self, bank: u8) -> Result<bool> {
        self.bank_ack(&ops::TOGGLE_BANK_RELAYS, bank).await
    }

    /// Reverses the relay order of `bank`.
    pub async fn reverse_bank_relays(&mut self, bank: u8) -> Result<bool> {
        self.bank_ack(&ops::REVERSE_BANK_RELAYS, bank).await
    }

    /// Writes a relay pattern to the current bank.
    pub async fn set_relay_status(&mut self, status: BankStatus) -> Result<bool> {
        self.ack(&ops::SET_RELAY_STATUS, &[status.bits()]).await
    }

    /// Writes a relay pattern to `bank`. Bank 0 writes every bank.
    pub async fn set_bank_relay_status(&mut self, bank: u8, status: BankStatus) -> Result<bool> {
        let op = &ops::SET_BANK_RELAY_STATUS;
        self.check_bank(op, bank)?;
        self.ack(op, &[status.bits(), bank]).await
    }

    /// Enables reporting mode.
    ///
    /// The mirrored flag is switched before the command is sent, so the ACK
    /// is read.
    pub async fn enable_reporting_mode(&mut self) -> Result<bool> {
        self.commands.set_reporting_mode(true);
        self.ack(&ops::ENABLE_REPORTING_MODE, &[]).await
    }

    /// Disables reporting mode.
    ///
    /// The mirrored flag is switched before the command is sent, so no reply
    /// is read and the result is always optimistic.
    pub async fn disable_reporting_mode(&mut self) -> Result<bool> {
        self.commands.set_reporting_mode(false);
        self.ack(&ops::DISABLE_REPORTING_MODE, &[]).await
    }

    /// Stores the current bank's relay pattern as its power-up default.
    pub async fn store_power_up_defaults(&mut self) -> Result<bool> {
        self.ack(&ops::STORE_POWER_UP_DEFAULTS, &[]).await
    }

    /// Reads the current bank's power-up default.
    pub async fn query_power_up_defaults(&mut self) -> Result<Option<BankStatus>> {
        Ok(self
            .query_byte(&ops::QUERY_POWER_UP_DEFAULTS, &[])
            .await?
            .map(BankStatus::from_byte))
    }

    /// Stores the relay pattern of `bank` as its power-up default.
    ///
    /// Bank 0 stores every bank.
    pub async fn store_bank_power_up_defaults(&mut self, bank: u8) -> Result<bool> {
        self.bank_ack(&ops::STORE_BANK_POWER_UP_DEFAULTS, bank).await
    }

    /// Reads the power-up default of `bank`.
    ///
    /// Bank 0 returns the controller's full 26-byte defaults block unchanged.
    pub async fn query_bank_power_up_defaults(&mut self, bank: u8) -> Result<Option<Bytes>> {
        let op = &ops::QUERY_BANK_POWER_UP_DEFAULTS;
        self.check_bank(op, bank)?;
        let expect = op.reply.resolve(bank, self.attached_banks);
        self.commands.query(op, op.opcode, &[bank], expect).await
    }

    /// Selects the bank that current-bank commands act on.
    pub async fn select_bank(&mut self, bank: u8) -> Result<bool> {
        self.bank_ack(&ops::SELECT_BANK, bank).await
    }

    /// Reads the currently selected bank.
    pub async fn query_selected_bank(&mut self) -> Result<Option<u8>> {
        self.query_byte(&ops::QUERY_SELECTED_BANK, &[]).await
    }

    /// Tests two-way communication.
    pub async fn test_comms(&mut self) -> Result<bool> {
        self.ack(&ops::TEST_COMMS, &[]).await
    }

    /// Applies relay commands as soon as they arrive.
    pub async fn enable_automatic_refreshing(&mut self) -> Result<bool> {
        self.ack(&ops::ENABLE_AUTOMATIC_REFRESHING, &[]).await
    }

    /// Holds relay commands until [`refresh_relays`](Self::refresh_relays).
    pub async fn disable_automatic_refreshing(&mut self) -> Result<bool> {
        self.ack(&ops::DISABLE_AUTOMATIC_REFRESHING, &[]).await
    }

    /// Stores the refresh mode as the power-up default.
    pub async fn store_refresh_mode(&mut self) -> Result<bool> {
        self.ack(&ops::STORE_REFRESH_MODE, &[]).await
    }

    /// Reads the refresh mode.
    pub async fn query_refresh_mode(&mut self) -> Result<Option<RefreshMode>> {
        Ok(self
            .query_byte(&ops::QUERY_REFRESH_MODE, &[])
            .await?
            .map(RefreshMode::from_byte))
    }

    /// Applies pending relay commands.
    pub async fn refresh_relays(&mut self) -> Result<bool> {
        self.ack(&ops::REFRESH_RELAYS, &[]).await
    }

    // ==================== Timers ====================

    /// Sets up and starts a timer.
    ///
    /// `relay` is sent as-is in the controller's timer relay-address format.
    pub async fn setup_timer(
        &mut self,
        kind: TimerKind,
        timer: u8,
        duration: TimerDuration,
        relay: u8,
    ) -> Result<bool> {
        let op = match kind {
            TimerKind::Duration => &ops::DURATION_TIMER,
            TimerKind::Pulse => &ops::PULSE_TIMER,
        };
        let opcode = timer_offset(op.opcode, timer)?;
        validate_duration(duration.minutes, duration.seconds)?;
        let operands = [duration.hours, duration.minutes, duration.seconds, relay];
        self.commands.acknowledge(op, opcode, &operands).await
    }

    /// Sets up and starts a duration timer.
    pub async fn duration_timer(
        &mut self,
        timer: u8,
        duration: TimerDuration,
        relay: u8,
    ) -> Result<bool> {
        self.setup_timer(TimerKind::Duration, timer, duration, relay)
            .await
    }

    /// Sets up and starts a pulse timer.
    pub async fn pulse_timer(
        &mut self,
        timer: u8,
        duration: TimerDuration,
        relay: u8,
    ) -> Result<bool> {
        self.setup_timer(TimerKind::Pulse, timer, duration, relay).await
    }

    /// Turns timers on or off; bit `n` of `mask` is timer `n`.
    pub async fn control_active_timers(&mut self, mask: impl Into<TimerMask>) -> Result<bool> {
        let mask = mask.into();
        self.ack(&ops::CONTROL_ACTIVE_TIMERS, &u16_operand(mask.bits()))
            .await
    }

    /// Reads the time remaining on a timer.
    pub async fn query_timer(&mut self, timer: u8) -> Result<Option<TimerDuration>> {
        validate_timer_index(timer)?;
        self.query(&ops::QUERY_TIMER, &[timer])
            .await?
            .map(|data| parse_timer_remaining(&data))
            .transpose()
    }

    /// Sets the timer calibration value.
    pub async fn set_timer_calibration(&mut self, value: u16) -> Result<bool> {
        self.ack(&ops::SET_TIMER_CALIBRATION, &u16_operand(value))
            .await
    }

    /// Reads the timer calibration value.
    pub async fn query_timer_calibration(&mut self) -> Result<Option<u16>> {
        self.query(&ops::QUERY_TIMER_CALIBRATION, &[])
            .await?
            .map(|data| parse_u16_le(&data))
            .transpose()
    }

    // ==================== Device Configuration ====================

    /// Sets REPS.
    pub async fn set_reps(&mut self, reps: u8) -> Result<bool> {
        self.ack(&ops::SET_REPS, &[reps]).await
    }

    /// Reads REPS.
    pub async fn query_reps(&mut self) -> Result<Option<u8>> {
        self.query_byte(&ops::QUERY_REPS, &[]).await
    }

    /// Sets the inter-character delay.
    pub async fn set_character_delay(&mut self, delay: u8) -> Result<bool> {
        self.ack(&ops::SET_CHARACTER_DELAY, &[delay]).await
    }

    /// Reads the inter-character delay.
    pub async fn query_character_delay(&mut self) -> Result<Option<u8>> {
        self.query_byte(&ops::QUERY_CHARACTER_DELAY, &[]).await
    }

    /// Tells the controller how many banks are attached.
    ///
    /// Any reply byte is accepted. On success, and in silent mode, later bank
    /// operands are validated against `banks`.
    pub async fn set_attached_banks(&mut self, banks: u8) -> Result<bool> {
        validate_bank_count(banks)?;
        let op = &ops::SET_ATTACHED_BANKS;
        let outcome = self
            .commands
            .execute(op, op.opcode, &[banks], op.reply.single())
            .await?;

        if let Outcome::Success(reply) = &outcome {
            if reply.first() != Some(&self.commands.ack()) {
                tracing::warn!("attached banks reply 0x{}, accepted", hex::encode(reply));
            }
        }
        if outcome.is_ok() {
            self.update_attached_banks(banks);
        }
        Ok(outcome.is_ok())
    }

    /// Reads the number of attached banks.
    ///
    /// On success later bank operands are validated against the reported
    /// count.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Protocol`] if the reported count is outside 1..=32.
    pub async fn query_attached_banks(&mut self) -> Result<Option<u8>> {
        let Some(banks) = self.query_byte(&ops::QUERY_ATTACHED_BANKS, &[]).await? else {
            return Ok(None);
        };
        if validate_bank_count(banks).is_err() {
            return Err(Error::Protocol {
                message: format!("device reported {banks} attached banks"),
            });
        }
        self.update_attached_banks(banks);
        Ok(Some(banks))
    }

    fn update_attached_banks(&mut self, banks: u8) {
        if self.attached_banks != banks {
            tracing::debug!("attached banks {} -> {}", self.attached_banks, banks);
        }
        self.attached_banks = banks;
    }

    /// Restores factory defaults.
    pub async fn factory_reset(&mut self) -> Result<bool> {
        self.ack(&ops::FACTORY_RESET, &[]).await
    }

    /// Recovers safe communication parameters.
    pub async fn recover_safe_parameters(&mut self) -> Result<bool> {
        self.ack(&ops::RECOVER_SAFE_PARAMETERS, &[]).await
    }
}
