//! View tokens and the identifier factories that mint them.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Separator between the base identifier and the unique suffix of a token.
pub const SUFFIX_SEPARATOR: char = '%';

/// Opaque identifier for one overlay instance.
///
/// Tokens compare by value. A token is usually the name of the view kind
/// (`"alert"`), or a composed `base%suffix` when several call sites mount the
/// same kind of view at once.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewToken(Arc<str>);

impl ViewToken {
    /// Create a token from any string.
    pub fn new(token: impl AsRef<str>) -> Self {
        Self(Arc::from(token.as_ref()))
    }

    /// Compose `base%suffix`.
    pub fn compose(base: impl AsRef<str>, suffix: impl AsRef<str>) -> Self {
        Self::new(format!(
            "{}{}{}",
            base.as_ref(),
            SUFFIX_SEPARATOR,
            suffix.as_ref()
        ))
    }

    /// The full token string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The part before the first separator, or the whole token.
    pub fn base(&self) -> &str {
        self.0
            .split_once(SUFFIX_SEPARATOR)
            .map(|(base, _)| base)
            .unwrap_or(&self.0)
    }

    /// The unique suffix, if the token was composed.
    pub fn suffix(&self) -> Option<&str> {
        self.0.split_once(SUFFIX_SEPARATOR).map(|(_, suffix)| suffix)
    }
}

impl fmt::Display for ViewToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ViewToken {
    fn from(token: &str) -> Self {
        Self::new(token)
    }
}

impl From<String> for ViewToken {
    fn from(token: String) -> Self {
        Self(Arc::from(token))
    }
}

impl From<&ViewToken> for ViewToken {
    fn from(token: &ViewToken) -> Self {
        token.clone()
    }
}

impl AsRef<str> for ViewToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Produces statistically-unique suffixes for composed tokens.
pub trait IdentifierFactory: Send + Sync + fmt::Debug {
    /// Returns a fresh suffix. Must not contain [`SUFFIX_SEPARATOR`].
    fn next_suffix(&self) -> String;
}

/// Random v4 UUID suffixes.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidFactory;

impl IdentifierFactory for UuidFactory {
    fn next_suffix(&self) -> String {
        uuid::Uuid::new_v4().simple().to_string()
    }
}

/// Monotonic counter suffixes; deterministic, handy in tests and logs.
#[derive(Debug, Default)]
pub struct SequentialFactory {
    next: AtomicU64,
}

impl SequentialFactory {
    /// Create a factory whose first suffix is `1`.
    pub fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
        }
    }
}

impl IdentifierFactory for SequentialFactory {
    fn next_suffix(&self) -> String {
        self.next.fetch_add(1, Ordering::Relaxed).to_string()
    }
}
