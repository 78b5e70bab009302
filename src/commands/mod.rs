//! Command handler for ProXR operations.
//!
//! The handler owns the transport and runs every operation through the same
//! pipeline: encode, send, optionally pause, then interpret the reply. It
//! also mirrors the device's reporting mode, which decides whether a reply is
//! read at all.

use std::time::Duration;

use bytes::Bytes;

use crate::config::ClientConfig;
use crate::error::Result;
use crate::protocol::{Expect, Operation, Outcome, encode_with_header, interpret};
use crate::transport::Transport;

/// Command handler for ProXR operations.
pub struct CommandHandler<T> {
    transport: T,
    stx: u8,
    ack: u8,
    timeout: Duration,
    command_delay: Duration,
    reporting_mode: bool,
}

impl<T: Transport> CommandHandler<T> {
    /// Creates a new command handler.
    #[must_use]
    pub const fn new(transport: T, config: &ClientConfig) -> Self {
        Self {
            transport,
            stx: config.stx,
            ack: config.ack,
            timeout: config.reply_timeout,
            command_delay: config.command_delay,
            reporting_mode: config.reporting_mode,
        }
    }

    /// Sets the reply timeout.
    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    /// Returns the reply timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Returns the acknowledgement byte.
    #[must_use]
    pub const fn ack(&self) -> u8 {
        self.ack
    }

    /// Returns true if replies are expected.
    #[must_use]
    pub const fn reporting_mode(&self) -> bool {
        self.reporting_mode
    }

    /// Updates the mirrored reporting mode.
    pub fn set_reporting_mode(&mut self, enabled: bool) {
        if self.reporting_mode != enabled {
            tracing::debug!("reporting mode {}", if enabled { "on" } else { "off" });
        }
        self.reporting_mode = enabled;
    }

    /// Returns the underlying transport.
    #[must_use]
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Returns the underlying transport mutably.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Consumes the handler and returns the transport.
    pub fn into_transport(self) -> T {
        self.transport
    }

    /// Opens the transport.
    pub async fn connect(&mut self) -> Result<()> {
        self.transport.connect().await
    }

    /// Closes the transport.
    pub async fn disconnect(&mut self) -> Result<()> {
        self.transport.disconnect().await
    }

    /// Returns true if the transport is open.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.transport.is_connected()
    }

    /// Discards pending input. Returns the number of bytes discarded.
    pub async fn drain(&mut self, max_bytes: usize, timeout: Duration) -> Result<usize> {
        self.transport.drain(max_bytes, timeout).await
    }

    /// Sends one command and interprets its reply.
    ///
    /// `opcode` is the wire opcode, already offset for indexed families.
    pub async fn execute(
        &mut self,
        op: &Operation,
        opcode: u8,
        operands: &[u8],
        expect: Expect,
    ) -> Result<Outcome> {
        debug_assert!(op.band().contains(&opcode), "{} opcode {opcode}", op.name);

        let frame = encode_with_header(self.stx, opcode, op.extended, operands);
        tracing::debug!("{}", op.name);
        tracing::trace!("send: {}", hex::encode(&frame));
        self.transport.send(frame).await?;

        if !self.command_delay.is_zero() {
            tokio::time::sleep(self.command_delay).await;
        }

        let outcome = interpret(
            &mut self.transport,
            expect,
            self.reporting_mode,
            self.ack,
            self.timeout,
        )
        .await?;

        if outcome == Outcome::Failure {
            tracing::warn!("{} failed", op.name);
        }
        Ok(outcome)
    }

    /// Sends a command whose reply is an acknowledgement.
    ///
    /// Returns true on ACK, and in silent mode.
    pub async fn acknowledge(
        &mut self,
        op: &Operation,
        opcode: u8,
        operands: &[u8],
    ) -> Result<bool> {
        let outcome = self.execute(op, opcode, operands, op.reply.single()).await?;
        Ok(outcome.is_ok())
    }

    /// Sends a query and returns the reply bytes.
    ///
    /// Returns `None` on failure, and in silent mode.
    pub async fn query(
        &mut self,
        op: &Operation,
        opcode: u8,
        operands: &[u8],
        expect: Expect,
    ) -> Result<Option<Bytes>> {
        let outcome = self.execute(op, opcode, operands, expect).await?;
        Ok(outcome.into_data())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use super::*;
    use crate::error::Error;
    use crate::protocol::{ACK, ops};
    use crate::transport::TransportFuture;

    #[derive(Default)]
    struct Recorder {
        sent: Vec<Bytes>,
        replies: VecDeque<Bytes>,
        reads: usize,
    }

    impl Transport for Recorder {
        fn connect(&mut self) -> TransportFuture<'_, ()> {
            Box::pin(async { Ok(()) })
        }

        fn disconnect(&mut self) -> TransportFuture<'_, ()> {
            Box::pin(async { Ok(()) })
        }

        fn send(&mut self, data: Bytes) -> TransportFuture<'_, ()> {
            self.sent.push(data);
            Box::pin(async { Ok(()) })
        }

        fn recv_exact(&mut self, _len: usize, timeout: Duration) -> TransportFuture<'_, Bytes> {
            self.reads += 1;
            let next = self.replies.pop_front().ok_or(Error::Timeout {
                timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            });
            Box::pin(async move { next })
        }

        fn drain(&mut self, _max: usize, _timeout: Duration) -> TransportFuture<'_, usize> {
            Box::pin(async { Ok(0) })
        }

        fn is_connected(&self) -> bool {
            true
        }
    }

    fn handler(replies: &[&'static [u8]]) -> CommandHandler<Recorder> {
        let transport = Recorder {
            replies: replies.iter().copied().map(Bytes::from_static).collect(),
            ..Recorder::default()
        };
        let config = ClientConfig::new().reply_timeout(Duration::from_millis(10));
        CommandHandler::new(transport, &config)
    }

    #[tokio::test]
    async fn test_acknowledge_sends_frame() {
        let mut commands = handler(&[&[ACK]]);
        let ok = commands
            .acknowledge(&ops::TEST_COMMS, ops::TEST_COMMS.opcode, &[])
            .await
            .unwrap();
        assert!(ok);
        assert_eq!(&commands.transport().sent[0][..], &[0xFE, 33]);
    }

    #[tokio::test]
    async fn test_extended_frame_has_second_start_byte() {
        let mut commands = handler(&[&[ACK]]);
        commands
            .acknowledge(&ops::FACTORY_RESET, ops::FACTORY_RESET.opcode, &[])
            .await
            .unwrap();
        assert_eq!(&commands.transport().sent[0][..], &[0xFE, 0x32, 140]);
    }

    #[tokio::test]
    async fn test_custom_start_byte() {
        let transport = Recorder {
            replies: VecDeque::from([Bytes::from_static(&[ACK])]),
            ..Recorder::default()
        };
        let mut commands = CommandHandler::new(transport, &ClientConfig::new().stx(0xAA));
        commands
            .acknowledge(&ops::ALL_RELAYS_ON, ops::ALL_RELAYS_ON.opcode, &[])
            .await
            .unwrap();
        assert_eq!(&commands.transport().sent[0][..], &[0xAA, 29]);
    }

    #[tokio::test]
    async fn test_timeout_is_false() {
        let mut commands = handler(&[]);
        let ok = commands
            .acknowledge(&ops::TEST_COMMS, ops::TEST_COMMS.opcode, &[])
            .await
            .unwrap();
        assert!(!ok);
        assert_eq!(commands.transport().reads, 1);
    }

    #[tokio::test]
    async fn test_silent_mode_skips_read() {
        let mut commands = handler(&[&[ACK]]);
        commands.set_reporting_mode(false);

        let ok = commands
            .acknowledge(&ops::TEST_COMMS, ops::TEST_COMMS.opcode, &[])
            .await
            .unwrap();
        assert!(ok);

        let data = commands
            .query(&ops::QUERY_STATUS_ALL, ops::QUERY_STATUS_ALL.opcode, &[], Expect::Bytes(1))
            .await
            .unwrap();
        assert!(data.is_none());
        assert_eq!(commands.transport().reads, 0);
        assert_eq!(commands.transport().sent.len(), 2);
    }

    #[tokio::test]
    async fn test_query_returns_reply() {
        let mut commands = handler(&[&[0x81]]);
        let data = commands
            .query(&ops::QUERY_STATUS_ALL, ops::QUERY_STATUS_ALL.opcode, &[], Expect::Bytes(1))
            .await
            .unwrap();
        assert_eq!(data.as_deref(), Some(&[0x81][..]));
    }

    #[tokio::test(start_paused = true)]
    async fn test_command_delay_pauses_after_send() {
        let transport = Recorder::default();
        let config = ClientConfig::new()
            .reporting_mode(false)
            .command_delay(Duration::from_millis(250));
        let mut commands = CommandHandler::new(transport, &config);

        let start = tokio::time::Instant::now();
        commands
            .acknowledge(&ops::ALL_RELAYS_OFF, ops::ALL_RELAYS_OFF.opcode, &[])
            .await
            .unwrap();
        assert!(start.elapsed() >= Duration::from_millis(250));
    }
}
