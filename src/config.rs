//! Orchestrator configuration.

use std::sync::Arc;
use std::time::Duration;

use crate::error::ConfigError;
use crate::token::{IdentifierFactory, UuidFactory};

/// Default wait between hiding a view and unmounting it.
pub const DEFAULT_GRACE_DELAY: Duration = Duration::from_millis(100);

/// Longest grace delay `validate` accepts.
pub const MAX_GRACE_DELAY: Duration = Duration::from_secs(60);

/// Configuration for an [`Orchestrator`](crate::Orchestrator).
///
/// # Example
///
/// ```rust
/// use overstack::OverlayConfig;
/// use std::time::Duration;
///
/// let config = OverlayConfig::new().with_grace_delay_ms(250).with_event_buffer(16);
///
/// assert_eq!(config.grace_delay, Duration::from_millis(250));
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct OverlayConfig {
    /// Time a hidden view stays mounted so exit transitions can play.
    pub grace_delay: Duration,
    /// Buffer size of each lifecycle event subscription.
    pub event_buffer: usize,
    /// Source of unique suffixes for `bind_unique`.
    pub identifiers: Arc<dyn IdentifierFactory>,
}

impl OverlayConfig {
    /// Create a default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the grace delay in milliseconds.
    pub fn with_grace_delay_ms(mut self, ms: u64) -> Self {
        self.grace_delay = Duration::from_millis(ms);
        self
    }

    /// Set the grace delay.
    pub fn with_grace_delay(mut self, delay: Duration) -> Self {
        self.grace_delay = delay;
        self
    }

    /// Unmount views as soon as they settle.
    pub fn without_grace_delay(mut self) -> Self {
        self.grace_delay = Duration::ZERO;
        self
    }

    /// Set the event buffer size.
    pub fn with_event_buffer(mut self, size: usize) -> Self {
        self.event_buffer = size;
        self
    }

    /// Set the identifier factory.
    pub fn with_identifiers(mut self, factory: impl IdentifierFactory + 'static) -> Self {
        self.identifiers = Arc::new(factory);
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.event_buffer == 0 {
            return Err(ConfigError::ZeroEventBuffer);
        }
        if self.grace_delay > MAX_GRACE_DELAY {
            return Err(ConfigError::GraceDelayTooLong(
                self.grace_delay.as_millis(),
                MAX_GRACE_DELAY.as_millis(),
            ));
        }
        Ok(())
    }
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            grace_delay: DEFAULT_GRACE_DELAY,
            event_buffer: 100,
            identifiers: Arc::new(UuidFactory),
        }
    }
}
