//! エラー型定義
//!
//! 統一エラー型（thiserror使用）

use thiserror::Error;

/// Feeder error type
#[derive(Debug, Error)]
pub enum FeederError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Decoder process failed to launch
    #[error("Failed to launch decoder process: {0}")]
    Spawn(#[from] std::io::Error),

    /// HTTP client error
    #[error("HTTP client error: {0}")]
    Http(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias
pub type FeederResult<T> = Result<T, FeederError>;
