//! Error types for Overstack.

use thiserror::Error;

use crate::token::ViewToken;

/// Error returned by the future of an overlay `show` call.
///
/// Overlays only fail in two ways: the view rejected its result handler, or
/// every handle to the result handler went away before anyone settled it.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OverlayError<E> {
    /// The view invoked `reject`; the value is passed through unmodified.
    #[error("Overlay was rejected")]
    Rejected(E),

    /// The result handler was dropped without being settled.
    #[error("Overlay {0} was dropped before it settled")]
    Abandoned(ViewToken),
}

impl<E> OverlayError<E> {
    /// Returns the rejection value, if the view rejected.
    pub fn into_rejection(self) -> Option<E> {
        match self {
            OverlayError::Rejected(error) => Some(error),
            OverlayError::Abandoned(_) => None,
        }
    }

    /// Check if the overlay was abandoned rather than rejected.
    pub fn is_abandoned(&self) -> bool {
        matches!(self, OverlayError::Abandoned(_))
    }
}

/// Errors that can occur while building a view table.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// A view is already registered under this name
    #[error("View already registered: {0}")]
    AlreadyRegistered(String),

    /// Invalid view name
    #[error("Invalid view name: {0}")]
    InvalidName(String),
}

/// Errors reported by [`OverlayConfig::validate`](crate::OverlayConfig::validate).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Event buffer must hold at least one event
    #[error("Event buffer size must be greater than 0")]
    ZeroEventBuffer,

    /// Grace delay is longer than any exit transition should take
    #[error("Grace delay of {0}ms exceeds the {1}ms limit")]
    GraceDelayTooLong(u128, u128),
}

/// Errors converting JSON values into props.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PropsError {
    /// Props must be a JSON object
    #[error("Props must be a JSON object, got {0}")]
    NotAnObject(&'static str),
}

/// Result type alias for view table operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Result type alias for the future returned by `show`.
pub type OverlayResult<T, E> = Result<T, OverlayError<E>>;
