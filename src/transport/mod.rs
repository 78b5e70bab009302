//! Transport layer for ProXR communication.
//!
//! This module provides the byte-stream abstraction the protocol layer talks
//! to. TCP (the controller's network module, port 2101) and USB/Serial are
//! implemented.

pub mod serial;
pub mod tcp;

use std::future::Future;
use std::io;
use std::pin::Pin;
use std::time::Duration;

use bytes::{Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::error::{Error, FrameError, Result};

/// Boxed future returned by transport methods.
pub type TransportFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// Default upper bound on bytes discarded by a drain.
pub const DEFAULT_DRAIN_LIMIT: usize = 1024;

/// Default time a drain waits for stale bytes.
pub const DEFAULT_DRAIN_TIMEOUT: Duration = Duration::from_millis(100);

/// Trait for transport implementations.
pub trait Transport: Send {
    /// Connects to the device.
    fn connect(&mut self) -> TransportFuture<'_, ()>;

    /// Disconnects from the device.
    fn disconnect(&mut self) -> TransportFuture<'_, ()>;

    /// Sends data to the device.
    fn send(&mut self, data: Bytes) -> TransportFuture<'_, ()>;

    /// Receives exactly `len` bytes.
    ///
    /// Fails with [`Error::Timeout`] if the bytes do not arrive within
    /// `timeout`, and with [`FrameError::Incomplete`] if the stream ends first.
    fn recv_exact(&mut self, len: usize, timeout: Duration) -> TransportFuture<'_, Bytes>;

    /// Discards pending input, reading at most `max_bytes` for at most
    /// `timeout`. Returns the number of bytes discarded.
    fn drain(&mut self, max_bytes: usize, timeout: Duration) -> TransportFuture<'_, usize>;

    /// Returns true if connected.
    fn is_connected(&self) -> bool;
}

fn timeout_error(timeout: Duration) -> Error {
    Error::Timeout {
        timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
    }
}

/// Reads exactly `len` bytes from `reader` within `timeout`.
pub async fn read_exact_timeout<R>(reader: &mut R, len: usize, timeout: Duration) -> Result<Bytes>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let mut buf = BytesMut::zeroed(len);
    let mut filled = 0usize;

    let read = async {
        while filled < len {
            match reader.read(&mut buf[filled..]).await {
                Ok(0) => {
                    return Err(Error::Frame(FrameError::Incomplete {
                        expected: len,
                        got: filled,
                    }));
                }
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(Error::Io(e)),
            }
        }
        Ok(())
    };

    let outcome = tokio::time::timeout(timeout, read).await;
    match outcome {
        Ok(Ok(())) => Ok(buf.freeze()),
        Ok(Err(e)) => Err(e),
        Err(_) => {
            tracing::trace!("read timed out with {filled}/{len} bytes");
            Err(timeout_error(timeout))
        }
    }
}

/// Reads and discards stale input until `max_bytes` were read, the stream goes
/// quiet, or `timeout` expires.
pub async fn drain_reader<R>(reader: &mut R, max_bytes: usize, timeout: Duration) -> Result<usize>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let mut buf = [0u8; 256];
    let mut total = 0usize;
    let deadline = tokio::time::Instant::now() + timeout;

    while total < max_bytes {
        let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
        if remaining.is_zero() {
            break;
        }
        let want = buf.len().min(max_bytes - total);
        match tokio::time::timeout(remaining, reader.read(&mut buf[..want])).await {
            Ok(Ok(0)) | Err(_) => break,
            Ok(Ok(n)) => total += n,
            Ok(Err(e)) if e.kind() == io::ErrorKind::Interrupted => {}
            Ok(Err(e)) => return Err(Error::Io(e)),
        }
    }

    if total > 0 {
        tracing::debug!("drained {} stale bytes from buffer", total);
    }
    Ok(total)
}

pub use serial::SerialTransport;
pub use tcp::TcpTransport;

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_read_exact_across_partial_reads() {
        let (mut client, mut server) = tokio::io::duplex(64);
        let writer = tokio::spawn(async move {
            use tokio::io::AsyncWriteExt;
            server.write_all(&[0x01, 0x00]).await.unwrap();
            tokio::time::sleep(Duration::from_millis(10)).await;
            server.write_all(&[0x11, 0xCD]).await.unwrap();
            server
        });

        let data = read_exact_timeout(&mut client, 4, Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(&data[..], &[0x01, 0x00, 0x11, 0xCD]);
        drop(writer.await.unwrap());
    }

    #[tokio::test]
    async fn test_read_exact_times_out() {
        let (mut client, _server) = tokio::io::duplex(64);
        let err = read_exact_timeout(&mut client, 1, Duration::from_millis(20))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Timeout { timeout_ms: 20 }));
    }

    #[tokio::test]
    async fn test_read_exact_short_stream() {
        let (mut client, server) = tokio::io::duplex(64);
        {
            use tokio::io::AsyncWriteExt;
            let mut server = server;
            server.write_all(&[0x55]).await.unwrap();
        }
        let err = read_exact_timeout(&mut client, 2, Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Frame(FrameError::Incomplete {
                expected: 2,
                got: 1
            })
        ));
    }

    #[tokio::test]
    async fn test_drain_is_bounded() {
        let (mut client, mut server) = tokio::io::duplex(4096);
        {
            use tokio::io::AsyncWriteExt;
            server.write_all(&[0x55; 600]).await.unwrap();
        }
        let drained = drain_reader(&mut client, 100, Duration::from_millis(50))
            .await
            .unwrap();
        assert_eq!(drained, 100);

        let rest = drain_reader(&mut client, 4096, Duration::from_millis(50))
            .await
            .unwrap();
        assert_eq!(rest, 500);
    }

    #[tokio::test]
    async fn test_drain_returns_on_quiet_stream() {
        let (mut client, _server) = tokio::io::duplex(64);
        let drained = drain_reader(&mut client, 100, Duration::from_millis(20))
            .await
            .unwrap();
        assert_eq!(drained, 0);
    }
}
