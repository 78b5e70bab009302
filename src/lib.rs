//! # proxr
//!
//! A Rust client library for ProXR relay controllers with E3C device
//! addressing.
//!
//! This library provides async communication with ProXR controllers over
//! TCP (network modules, port 2101) and USB/Serial.
//!
//! ## Features
//!
//! - Async/await based API using Tokio
//! - One typed method per controller command
//! - Operand validation before anything is written to the device
//! - Reporting (acknowledged) and silent operation
//!
//! ## Quick Start
//!
//! ```no_run
//! use proxr::RelayController;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), proxr::Error> {
//!     // Connect to a network-attached controller
//!     let mut controller = RelayController::tcp("192.168.1.50");
//!     controller.connect().await?;
//!
//!     if let Some(identity) = controller.recall_device_identification().await? {
//!         println!("Connected to: {identity}");
//!     }
//!
//!     // Learn how many banks are attached, then switch relay 3 of bank 2 on
//!     controller.query_attached_banks().await?;
//!     let acknowledged = controller.turn_on_bank_relay(2, 3).await?;
//!     println!("Relay on: {acknowledged}");
//!
//!     // Read back the whole bank
//!     if let Some(banks) = controller.query_bank_status(2).await? {
//!         println!("Bank 2: {}", banks[0]);
//!     }
//!
//!     controller.disconnect().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`protocol`] - Low-level protocol types (opcodes, frames, validation, replies)
//! - [`types`] - Decoded reply data (identity, bank status, timers)
//! - [`transport`] - Transport implementations (TCP and USB/Serial)
//! - [`config`] - Protocol configuration
//! - [`commands`] - Command pipeline shared by every operation
//! - [`client`] - High-level [`RelayController`] client

pub mod client;
pub mod commands;
pub mod config;
pub mod error;
pub mod protocol;
pub mod transport;
pub mod types;

// Re-exports for convenience
pub use client::RelayController;
pub use commands::CommandHandler;
pub use config::ClientConfig;
pub use error::{Error, FrameError, Result, ValidationError};
pub use protocol::{BankPolicy, CommandOpcode, ExtendedOpcode, Operation, Outcome};
pub use transport::{
    SerialTransport, TcpTransport, Transport, serial::SerialConfig, serial::list_ports,
    tcp::TcpConfig,
};
pub use types::{BankStatus, DeviceIdentity, RefreshMode, TimerDuration, TimerKind, TimerMask};
