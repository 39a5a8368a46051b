use std::time::Duration;

/// Errors raised by the provisioning driver and its collaborators.
#[derive(Debug, thiserror::Error)]
pub enum ProvisionError {
    /// The credential source failed outright (not a timeout).
    #[error("credential source failed: {0}")]
    SourceFailed(String),

    /// No credentials arrived within the policy's wait, across every
    /// permitted restart.
    #[error("no credentials after {attempts} attempt(s) of {wait:?} each")]
    TimedOut { attempts: u32, wait: Duration },

    /// The received credentials are unusable.
    #[error("invalid credentials: {reason}")]
    InvalidCredentials { reason: &'static str },

    /// The persistence sink rejected the credentials.
    #[error("credential store failed: {0}")]
    StoreFailed(String),
}

pub type Result<T> = std::result::Result<T, ProvisionError>;
