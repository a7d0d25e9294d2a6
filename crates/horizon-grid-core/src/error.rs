//! Error types for Horizon Grid core.

use crate::bean::BeanId;

/// Errors raised by the bean registry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BeanError {
    /// The bean ID is unknown to this registry.
    #[error("Invalid bean ID {0:?}")]
    InvalidBeanId(BeanId),
    /// The bean has already been destroyed.
    #[error("Bean {0:?} has already been destroyed")]
    AlreadyDestroyed(BeanId),
}

/// Signal-specific errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignalError {
    /// The connection ID is invalid or has already been disconnected.
    #[error("Invalid or disconnected connection ID")]
    InvalidConnection,
}

/// Result type for bean registry operations.
pub type BeanResult<T> = std::result::Result<T, BeanError>;
