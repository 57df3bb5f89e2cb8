//! Parse error types.

use alloc::string::{String, ToString};

use thiserror::Error;

/// Parse error with position information.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Parse error at position {position}: {message}")]
pub struct ParseError {
    pub message: String,
    pub position: usize,
}

impl ParseError {
    /// An error that is not tied to a particular input position.
    pub(crate) fn validation(message: String) -> Self {
        Self {
            message,
            position: 0,
        }
    }
}

pub(crate) fn parse_error(original_input: &str, remaining_input: &str, message: &str) -> ParseError {
    ParseError {
        message: message.to_string(),
        position: original_input.len() - remaining_input.len(),
    }
}
