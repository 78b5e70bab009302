//! Reply interpretation.
//!
//! With reporting mode on, the controller answers every command with exactly
//! one reply whose length is implied by the command. With reporting mode off
//! it answers nothing and the interpreter must not read.

use std::time::Duration;

use bytes::Bytes;

use crate::error::{Error, FrameError, Result};
use crate::protocol::command::Expect;
use crate::transport::Transport;

/// Acknowledgement byte sent after a successful command.
pub const ACK: u8 = 0x55;

/// Result of waiting for a reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Reply received and accepted.
    Success(Bytes),
    /// Reporting mode is off; nothing was read.
    Ambiguous,
    /// No reply, a short reply, or a negative acknowledgement.
    Failure,
}

impl Outcome {
    /// Returns true unless the outcome is a failure.
    ///
    /// [`Outcome::Ambiguous`] counts as success: silent mode offers no
    /// confirmation, so callers proceed optimistically.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        !matches!(self, Self::Failure)
    }

    /// Returns the reply bytes if a reply was accepted.
    #[must_use]
    pub fn into_data(self) -> Option<Bytes> {
        match self {
            Self::Success(data) => Some(data),
            Self::Ambiguous | Self::Failure => None,
        }
    }
}

/// Reads and judges the reply to a command that was just sent.
///
/// Timeouts and short reads become [`Outcome::Failure`]; any other transport
/// error is returned unchanged.
pub async fn interpret<T>(
    transport: &mut T,
    expect: Expect,
    reporting_mode: bool,
    ack: u8,
    timeout: Duration,
) -> Result<Outcome>
where
    T: Transport + ?Sized,
{
    if !reporting_mode {
        return Ok(Outcome::Ambiguous);
    }

    let reply = match transport.recv_exact(expect.len(), timeout).await {
        Ok(reply) => reply,
        Err(Error::Timeout { timeout_ms }) => {
            tracing::warn!("no reply within {timeout_ms}ms");
            return Ok(Outcome::Failure);
        }
        Err(Error::Frame(FrameError::Incomplete { expected, got })) => {
            tracing::warn!("short reply: expected {expected} bytes, got {got}");
            return Ok(Outcome::Failure);
        }
        Err(e) => return Err(e),
    };

    tracing::trace!("reply: {}", hex::encode(&reply));

    if reply.len() != expect.len() || reply.is_empty() {
        return Ok(Outcome::Failure);
    }

    Ok(match expect {
        Expect::Ack if reply[0] == ack => Outcome::Success(reply),
        Expect::Ack => {
            tracing::warn!("negative acknowledgement: 0x{:02x}", reply[0]);
            Outcome::Failure
        }
        Expect::AnyByte | Expect::Bytes(_) => Outcome::Success(reply),
    })
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use super::*;
    use crate::transport::TransportFuture;

    /// Replays canned replies and counts reads.
    #[derive(Default)]
    struct Scripted {
        replies: VecDeque<Result<Bytes>>,
        reads: usize,
    }

    impl Transport for Scripted {
        fn connect(&mut self) -> TransportFuture<'_, ()> {
            Box::pin(async { Ok(()) })
        }

        fn disconnect(&mut self) -> TransportFuture<'_, ()> {
            Box::pin(async { Ok(()) })
        }

        fn send(&mut self, _data: Bytes) -> TransportFuture<'_, ()> {
            Box::pin(async { Ok(()) })
        }

        fn recv_exact(&mut self, _len: usize, _timeout: Duration) -> TransportFuture<'_, Bytes> {
            self.reads += 1;
            let next = self
                .replies
                .pop_front()
                .unwrap_or(Err(Error::Timeout { timeout_ms: 0 }));
            Box::pin(async move { next })
        }

        fn drain(&mut self, _max: usize, _timeout: Duration) -> TransportFuture<'_, usize> {
            Box::pin(async { Ok(0) })
        }

        fn is_connected(&self) -> bool {
            true
        }
    }

    fn replying(bytes: &'static [u8]) -> Scripted {
        Scripted {
            replies: VecDeque::from([Ok(Bytes::from_static(bytes))]),
            reads: 0,
        }
    }

    const TIMEOUT: Duration = Duration::from_millis(10);

    #[tokio::test]
    async fn test_silent_mode_never_reads() {
        let mut transport = replying(&[ACK]);
        let outcome = interpret(&mut transport, Expect::Ack, false, ACK, TIMEOUT)
            .await
            .unwrap();
        assert_eq!(outcome, Outcome::Ambiguous);
        assert!(outcome.is_ok());
        assert_eq!(transport.reads, 0);
    }

    #[tokio::test]
    async fn test_ack_success() {
        let mut transport = replying(&[0x55]);
        let outcome = interpret(&mut transport, Expect::Ack, true, ACK, TIMEOUT)
            .await
            .unwrap();
        assert_eq!(outcome, Outcome::Success(Bytes::from_static(&[0x55])));
        assert_eq!(transport.reads, 1);
    }

    #[tokio::test]
    async fn test_ack_mismatch_is_failure() {
        for byte in [0x00, 0x54, 0x56, 0xFF] {
            let mut transport = Scripted {
                replies: VecDeque::from([Ok(Bytes::copy_from_slice(&[byte]))]),
                reads: 0,
            };
            let outcome = interpret(&mut transport, Expect::Ack, true, ACK, TIMEOUT)
                .await
                .unwrap();
            assert_eq!(outcome, Outcome::Failure, "byte 0x{byte:02x}");
        }
    }

    #[tokio::test]
    async fn test_timeout_is_failure_not_error() {
        let mut transport = Scripted::default();
        let outcome = interpret(&mut transport, Expect::Ack, true, ACK, TIMEOUT)
            .await
            .unwrap();
        assert_eq!(outcome, Outcome::Failure);
    }

    #[tokio::test]
    async fn test_short_read_is_failure() {
        let mut transport = Scripted {
            replies: VecDeque::from([Err(Error::Frame(FrameError::Incomplete {
                expected: 4,
                got: 2,
            }))]),
            reads: 0,
        };
        let outcome = interpret(&mut transport, Expect::Bytes(4), true, ACK, TIMEOUT)
            .await
            .unwrap();
        assert_eq!(outcome, Outcome::Failure);
    }

    #[tokio::test]
    async fn test_io_error_propagates() {
        let mut transport = Scripted {
            replies: VecDeque::from([Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                "reset",
            )))]),
            reads: 0,
        };
        let result = interpret(&mut transport, Expect::Ack, true, ACK, TIMEOUT).await;
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[tokio::test]
    async fn test_query_reply_any_value() {
        let mut transport = replying(&[0b1010_0001]);
        let outcome = interpret(&mut transport, Expect::Bytes(1), true, ACK, TIMEOUT)
            .await
            .unwrap();
        assert_eq!(outcome.into_data().unwrap()[0], 0b1010_0001);
    }

    #[tokio::test]
    async fn test_custom_ack_byte() {
        let mut transport = replying(&[0x55]);
        let outcome = interpret(&mut transport, Expect::Ack, true, 0xAA, TIMEOUT)
            .await
            .unwrap();
        assert_eq!(outcome, Outcome::Failure);
    }
}
