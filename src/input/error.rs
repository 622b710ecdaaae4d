//! Input Handling Error Types
//!
//! Error handling for the pointer normalization layer. Only malformed platform
//! events and malformed records can fail; everything else is total.

use thiserror::Error;

/// Result type for input operations
pub type Result<T> = std::result::Result<T, InputError>;

/// Input module error types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    /// Raw button id the platform source is not allowed to send
    #[error("Invalid platform event: unknown button id {0}")]
    InvalidButton(i32),

    /// Raw action id that is neither a press nor a release
    #[error("Invalid platform event: unknown action id {0}")]
    InvalidAction(i32),

    /// Byte slice handed to the decoder is not one full record
    #[error("Invalid event record length: {actual} bytes (expected {expected})")]
    InvalidRecordLength {
        /// Bytes supplied
        actual: usize,
        /// Fixed record size
        expected: usize,
    },
}

/// Error classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorType {
    /// Contract violation by the platform pointer source
    PlatformEvent,
    /// Corrupt or truncated record on the consumer side
    Record,
}

/// Classify an error
pub fn classify_error(error: &InputError) -> ErrorType {
    match error {
        InputError::InvalidButton(_) | InputError::InvalidAction(_) => ErrorType::PlatformEvent,
        InputError::InvalidRecordLength { .. } => ErrorType::Record,
    }
}

impl InputError {
    /// True when the error was caused by a malformed platform callback.
    ///
    /// These are integration faults, never transient, and are not retried.
    pub fn is_platform_fault(&self) -> bool {
        classify_error(self) == ErrorType::PlatformEvent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        assert_eq!(
            classify_error(&InputError::InvalidButton(7)),
            ErrorType::PlatformEvent
        );
        assert_eq!(
            classify_error(&InputError::InvalidAction(503)),
            ErrorType::PlatformEvent
        );
        assert_eq!(
            classify_error(&InputError::InvalidRecordLength {
                actual: 21,
                expected: 22
            }),
            ErrorType::Record
        );
    }

    #[test]
    fn test_platform_fault() {
        assert!(InputError::InvalidButton(4).is_platform_fault());
        assert!(!InputError::InvalidRecordLength {
            actual: 0,
            expected: 22
        }
        .is_platform_fault());
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            InputError::InvalidAction(500).to_string(),
            "Invalid platform event: unknown action id 500"
        );
        assert_eq!(
            InputError::InvalidRecordLength {
                actual: 10,
                expected: 22
            }
            .to_string(),
            "Invalid event record length: 10 bytes (expected 22)"
        );
    }
}
