use thiserror::Error;

pub type Result<T> = std::result::Result<T, OrchestratorError>;

/// Settings-persistence failures. Host failures never surface here; they
/// are swallowed at the call site and treated as absence.
#[derive(Error, Debug)]
pub enum OrchestratorError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Settings parse error: {0}")]
    SettingsError(#[from] serde_json::Error),
}
