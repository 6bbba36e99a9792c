//! # Delegate Module
//!
//! The expensive service that the mediator wraps.
//!
//! A delegate is built by a [`DelegateFactory`] the first time an admitted
//! request misses the cache. Any `Fn() -> Result<D, DelegateError>` closure
//! is a factory.

use crate::error::DelegateError;
use tracing::debug;

// =============================================================================
// DELEGATE TRAIT
// =============================================================================

/// The real handler behind the mediator.
pub trait Delegate: Send + Sync {
    /// Process a request key and produce a response body.
    fn process(&self, key: &str) -> Result<String, DelegateError>;
}

/// Builds the delegate. Called lazily, and only until one call succeeds.
pub trait DelegateFactory: Send + Sync {
    /// The delegate type produced.
    type Output: Delegate;

    /// Construct the delegate.
    fn build(&self) -> Result<Self::Output, DelegateError>;
}

impl<D, F> DelegateFactory for F
where
    D: Delegate,
    F: Fn() -> Result<D, DelegateError> + Send + Sync,
{
    type Output = D;

    fn build(&self) -> Result<D, DelegateError> {
        self()
    }
}

// =============================================================================
// ECHO SERVICE
// =============================================================================

/// Reference delegate used by the CLI and in tests.
///
/// Answers `"processed: " + key`.
#[derive(Debug, Clone, Default)]
pub struct EchoService {
    prefix: String,
}

impl EchoService {
    /// Create an echo service with the default `"processed"` prefix.
    #[must_use]
    pub fn new() -> Self {
        Self::with_prefix("processed")
    }

    /// Create an echo service with a custom prefix.
    #[must_use]
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        debug!(prefix = %prefix, "echo service constructed");
        Self { prefix }
    }
}

impl Delegate for EchoService {
    fn process(&self, key: &str) -> Result<String, DelegateError> {
        Ok(format!("{}: {}", self.prefix, key))
    }
}

// =============================================================================
// TESTS
// =============================================================================
