//! Serial/USB transport implementation.
//!
//! ProXR controllers with a USB or RS-232 interface enumerate as a plain
//! serial port.

use std::time::Duration;

use bytes::Bytes;
use tokio::io::AsyncWriteExt;
use tokio_serial::{SerialPortBuilderExt, SerialStream};

use crate::error::{Error, Result};
use crate::transport::{Transport, TransportFuture, drain_reader, read_exact_timeout};

/// Default baud rate for ProXR controllers.
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// Default delay after opening the port.
pub const DEFAULT_CONNECTION_DELAY: Duration = Duration::from_millis(100);

/// Configuration for serial transport.
#[derive(Debug, Clone)]
pub struct SerialConfig {
    /// Serial port path (e.g., "/dev/ttyUSB0" or "COM3").
    pub port: String,
    /// Baud rate.
    pub baud_rate: u32,
    /// Delay after connection before sending commands.
    pub connection_delay: Duration,
}

impl SerialConfig {
    /// Creates a new serial configuration with default settings.
    #[must_use]
    pub fn new(port: impl Into<String>) -> Self {
        Self {
            port: port.into(),
            baud_rate: DEFAULT_BAUD_RATE,
            connection_delay: DEFAULT_CONNECTION_DELAY,
        }
    }

    /// Sets the baud rate.
    #[must_use]
    pub const fn baud_rate(mut self, rate: u32) -> Self {
        self.baud_rate = rate;
        self
    }

    /// Sets the connection delay.
    #[must_use]
    pub const fn connection_delay(mut self, delay: Duration) -> Self {
        self.connection_delay = delay;
        self
    }
}

/// Serial transport for ProXR communication.
pub struct SerialTransport {
    config: SerialConfig,
    stream: Option<SerialStream>,
}

impl SerialTransport {
    /// Creates a new serial transport with the given configuration.
    #[must_use]
    pub const fn new(config: SerialConfig) -> Self {
        Self {
            config,
            stream: None,
        }
    }

    /// Creates a new serial transport for the given port with default settings.
    #[must_use]
    pub fn with_port(port: impl Into<String>) -> Self {
        Self::new(SerialConfig::new(port))
    }

    /// Returns the transport configuration.
    #[must_use]
    pub const fn config(&self) -> &SerialConfig {
        &self.config
    }
}

impl Transport for SerialTransport {
    fn connect(&mut self) -> TransportFuture<'_, ()> {
        Box::pin(async move {
            if self.stream.is_some() {
                return Ok(());
            }

            tracing::info!("connecting to serial port: {}", self.config.port);

            let stream = tokio_serial::new(&self.config.port, self.config.baud_rate)
                .open_native_async()
                .map_err(Error::Serial)?;

            tokio::time::sleep(self.config.connection_delay).await;

            self.stream = Some(stream);
            tracing::info!("connected to serial port");
            Ok(())
        })
    }

    fn disconnect(&mut self) -> TransportFuture<'_, ()> {
        Box::pin(async move {
            if self.stream.take().is_some() {
                tracing::info!("disconnected from serial port");
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

/// Lists available serial ports.
///
/// # Errors
///
/// Returns an error if the port list cannot be retrieved.
pub fn list_ports() -> Result<Vec<String>> {
    let ports = tokio_serial::available_ports().map_err(Error::Serial)?;
    Ok(ports.into_iter().map(|p| p.port_name).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serial_config_defaults() {
        let config = SerialConfig::new("/dev/ttyUSB0");
        assert_eq!(config.port, "/dev/ttyUSB0");
        assert_eq!(config.baud_rate, DEFAULT_BAUD_RATE);
    }

    #[test]
    fn test_serial_config_builder() {
        let config = SerialConfig::new("/dev/ttyUSB0")
            .baud_rate(9600)
            .connection_delay(Duration::from_secs(1));
        assert_eq!(config.baud_rate, 9600);
        assert_eq!(config.connection_delay, Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_send_requires_connection() {
        let mut transport = SerialTransport::with_port("/dev/null-proxr");
        let err = transport.send(Bytes::from_static(&[0xFE, 33])).await;
        assert!(matches!(err, Err(Error::NotConnected)));
        assert!(!transport.is_connected());
    }

    #[test]
    #[ignore = "Requires /sys/class/tty - not available in sandboxed builds"]
    fn test_list_ports() {
        let _ = list_ports();
    }
}
