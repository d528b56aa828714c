//! Error codes for runtime diagnostics.

use std::fmt;

/// Error codes for all runtime diagnostics.
///
/// Format: E#### where the first digit indicates the phase:
/// - E6xxx: Runtime / eval errors
/// - E9xxx: Internal errors and limits
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCode {
    /// Wrong number of arguments in a call
    E6001,
    /// Loop without a loop variable
    E6002,
    /// Operand of the wrong type
    E6003,
    /// Loop over something that is neither an array nor a number
    E6004,
    /// Call to an unregistered function
    E6005,
    /// Read of an unbound variable
    E6006,
    /// Error raised by a host function
    E6099,
    /// Error limit reached
    E9002,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E6001 => "E6001",
            ErrorCode::E6002 => "E6002",
            ErrorCode::E6003 => "E6003",
            ErrorCode::E6004 => "E6004",
            ErrorCode::E6005 => "E6005",
            ErrorCode::E6006 => "E6006",
            ErrorCode::E6099 => "E6099",
            ErrorCode::E9002 => "E9002",
        }
    }

    pub fn is_runtime_error(&self) -> bool {
        self.as_str().starts_with("E6")
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
