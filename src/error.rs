//! Error types for the emulation engine and its configuration layer.

use thiserror::Error;

/// Recoverable errors produced while handling a command.
///
/// Every variant maps onto exactly one `ERR:<REASON>` line of the text
/// protocol; none of them leave the session partially modified.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("IC '{0}' is not in the catalog")]
    IcNotFound(String),

    #[error("no IC selected")]
    NoIcSelected,

    #[error("bit string has {actual} characters, expected {expected}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("bit string contains '{0}', only '0' and '1' are allowed")]
    InvalidBinary(char),

    #[error("unrecognised command '{0}'")]
    InvalidCommand(String),

    #[error("IC needs {needed} pins but the board only wires {available}")]
    BoardTooSmall { needed: usize, available: usize },
}

impl EngineError {
    /// Reason code used after `ERR:` on the wire.
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::IcNotFound(_) => "IC_NOT_FOUND",
            EngineError::NoIcSelected => "NO_IC_SELECTED",
            EngineError::InvalidLength { .. } => "INVALID_LENGTH",
            EngineError::InvalidBinary(_) => "INVALID_BINARY",
            EngineError::InvalidCommand(_) => "INVALID_CMD",
            EngineError::BoardTooSmall { .. } => "PIN_COUNT_EXCEEDED",
        }
    }
}

/// Errors raised while loading configuration files or IC catalogs.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("profile '{profile}' is invalid: {reason}")]
    InvalidProfile { profile: String, reason: String },
}
