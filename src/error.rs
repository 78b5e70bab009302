//! Error types for the proxr library.

use thiserror::Error;

/// The main error type for proxr operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Serial port error.
    #[error("serial port error: {0}")]
    Serial(#[from] tokio_serial::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Frame encoding/decoding error.
    #[error("frame error: {0}")]
    Frame(#[from] FrameError),

    /// Operand rejected before anything was written to the device.
    #[error("invalid operand: {0}")]
    Validation(#[from] ValidationError),

    /// A reply was received but could not be decoded.
    #[error("protocol error: {message}")]
    Protocol { message: String },

    /// Reply did not arrive in time.
    #[error("command timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// Connection is not established.
    #[error("not connected")]
    NotConnected,
}

/// Frame-specific errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FrameError {
    /// An opcode offset does not fit in a single byte.
    #[error("opcode overflow: base {base} + offset {offset} exceeds 255")]
    OperandOverflow { base: u8, offset: u8 },

    /// Incomplete reply data.
    #[error("incomplete frame: expected {expected} bytes, got {got}")]
    Incomplete { expected: usize, got: usize },
}

/// Operand range violations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A numeric operand lies outside its documented range.
    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: u32,
        min: u32,
        max: u32,
    },
}

impl ValidationError {
    /// Builds an out-of-range error for `field`.
    #[must_use]
    pub fn out_of_range(field: &'static str, value: impl Into<u32>, min: u32, max: u32) -> Self {
        Self::OutOfRange {
            field,
            value: value.into(),
            min,
            max,
        }
    }
}

/// Result type alias for proxr operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message_names_field_and_bounds() {
        let err = Error::from(ValidationError::out_of_range("port", 9u8, 1, 8));
        assert_eq!(
            err.to_string(),
            "invalid operand: port must be between 1 and 8, got 9"
        );
    }
}
