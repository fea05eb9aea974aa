use thiserror::Error;

/// Errors produced by the core configuration layer.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The config file / env layer could not be read or parsed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A config value is outside its operator-enforced bounds.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;
