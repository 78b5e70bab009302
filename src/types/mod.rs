//! Data types for ProXR entities.
//!
//! This module contains the decoded forms of controller replies:
//! - Device identification
//! - Relay bank status
//! - Timers

pub mod device;
pub mod relay;
pub mod timer;

pub use device::{DeviceIdentity, RefreshMode};
pub use relay::BankStatus;
pub use timer::{TimerDuration, TimerKind, TimerMask};
