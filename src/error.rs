use crate::config::ConfigError;
use crate::connection::PolicyError;
use crate::report::Summary;
use thiserror::Error;

/// Unified error type for the command-line runner.
///
/// The connection itself never fails with an error; these cover everything
/// around it.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid initialization policy: {0}")]
    Policy(#[from] PolicyError),

    #[error("Failed to install logging: {0}")]
    Logging(String),

    #[error("Failed to encode report: {0}")]
    Report(#[from] serde_json::Error),

    /// At least one suite assertion failed.
    #[error("Suite failed: {0}")]
    SuiteFailed(Summary),
}

impl AppError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::SuiteFailed(_) => 1,
            Self::Config(_) | Self::Policy(_) => 2,
            Self::Logging(_) | Self::Report(_) => 3,
        }
    }
}
