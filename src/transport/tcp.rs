//! TCP transport implementation.
//!
//! ProXR controllers with a network module expose the same byte protocol on a
//! raw TCP socket, port 2101 by default.

use std::time::Duration;

use bytes::Bytes;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

use crate::error::Error;
use crate::transport::{Transport, TransportFuture, drain_reader, read_exact_timeout};

/// Default TCP port of the controller's network module.
pub const DEFAULT_PORT: u16 = 2101;

/// Default connect timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(3);

/// Configuration for TCP transport.
#[derive(Debug, Clone)]
pub struct TcpConfig {
    /// Host name or IP address of the controller.
    pub address: String,
    /// TCP port.
    pub port: u16,
    /// How long to wait for the connection to be established.
    pub connect_timeout: Duration,
}

impl TcpConfig {
    /// Creates a new TCP configuration with default settings.
    #[must_use]
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            port: DEFAULT_PORT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }

    /// Sets the TCP port.
    #[must_use]
    pub const fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets the connect timeout.
    #[must_use]
    pub const fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }
}

/// TCP transport for ProXR communication.
pub struct TcpTransport {
    config: TcpConfig,
    stream: Option<TcpStream>,
}

impl TcpTransport {
    /// Creates a new TCP transport with the given configuration.
    #[must_use]
    pub const fn new(config: TcpConfig) -> Self {
        Self {
            config,
            stream: None,
        }
    }

    /// Creates a new TCP transport for the given address on the default port.
    #[must_use]
    pub fn with_address(address: impl Into<String>) -> Self {
        Self::new(TcpConfig::new(address))
    }

    /// Returns the transport configuration.
    #[must_use]
    pub const fn config(&self) -> &TcpConfig {
        &self.config
    }
}

impl Transport for TcpTransport {
    fn connect(&mut self) -> TransportFuture<'_, ()> {
        Box::pin(async move {
            if self.stream.is_some() {
                return Ok(());
            }

            let target = (self.config.address.as_str(), self.config.port);
            tracing::info!("connecting to {}:{}", target.0, target.1);

            let connect = TcpStream::connect(target);
            let stream = tokio::time::timeout(self.config.connect_timeout, connect)
                .await
                .map_err(|_| Error::Timeout {
                    timeout_ms: u64::try_from(self.config.connect_timeout.as_millis())
                        .unwrap_or(u64::MAX),
                })??;
            stream.set_nodelay(true)?;

            self.stream = Some(stream);
            tracing::info!("connected to {}:{}", self.config.address, self.config.port);
            Ok(())
        })
    }

    fn disconnect(&mut self) -> TransportFuture<'_, ()> {
        Box::pin(async move {
            if let Some(mut stream) = self.stream.take() {
                tracing::info!("disconnecting from {}:{}", self.config.address, self.config.port);
                if let Err(e) = stream.shutdown().await {
                    tracing::debug!("shutdown failed: {}", e);
                }
            }
            Ok(())
        })
    }

    fn send(&mut self, data: Bytes) -> TransportFuture<'_, ()> {
        Box::pin(async move {
            let stream = self.stream.as_mut().ok_or(Error::NotConnected)?;
            stream.write_all(&data).await.map_err(Error::Io)?;
            stream.flush().await.map_err(Error::Io)?;
            Ok(())
        })
    }

    fn recv_exact(&mut self, len: usize, timeout: Duration) -> TransportFuture<'_, Bytes> {
        Box::pin(async move {
            let stream = self.stream.as_mut().ok_or(Error::NotConnected)?;
            read_exact_timeout(stream, len, timeout).await
        })
    }

    fn drain(&mut self, max_bytes: usize, timeout: Duration) -> TransportFuture<'_, usize> {
        Box::pin(async move {
            let stream = self.stream.as_mut().ok_or(Error::NotConnected)?;
            drain_reader(stream, max_bytes, timeout).await
        })
    }

    fn is_connected(&self) -> bool {
        self.stream.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;

    #[test]
    fn test_tcp_config_defaults() {
        let config = TcpConfig::new("10.0.0.105");
        assert_eq!(config.address, "10.0.0.105");
        assert_eq!(config.port, DEFAULT_PORT);
    }

    #[tokio::test]
    async fn test_round_trip_over_loopback() -> Result<()> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let port = listener.local_addr()?.port();

        let device = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut cmd = [0u8; 2];
            socket.read_exact(&mut cmd).await.unwrap();
            socket.write_all(&[0x55]).await.unwrap();
            cmd
        });

        let mut transport = TcpTransport::new(TcpConfig::new("127.0.0.1").port(port));
        transport.connect().await?;
        assert!(transport.is_connected());

        transport.send(Bytes::from_static(&[0xFE, 33])).await?;
        let reply = transport.recv_exact(1, Duration::from_secs(1)).await?;
        assert_eq!(&reply[..], &[0x55]);
        assert_eq!(device.await.unwrap(), [0xFE, 33]);

        transport.disconnect().await?;
        assert!(!transport.is_connected());
        Ok(())
    }
}
