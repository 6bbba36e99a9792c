//! # Wicket Core
//!
//! Access mediation in front of an expensive delegate.
//!
//! An [`AccessMediator`] intercepts every request bound for a delegate and:
//!
//! 1. asks the injected [`AdmissionPolicy`] whether the request may proceed,
//! 2. answers from its memo table when the key has been seen before,
//! 3. constructs the delegate on first use (at most once per mediator),
//! 4. forwards cache misses to the delegate and memoizes the result.
//!
//! ```
//! use wicket_core::{AccessMediator, DelegateError, EchoService, MediatorError};
//!
//! fn build() -> Result<EchoService, DelegateError> {
//!     Ok(EchoService::new())
//! }
//!
//! fn main() -> Result<(), MediatorError> {
//!     let mediator = AccessMediator::new(build);
//!     assert_eq!(mediator.handle_text("alpha")?, "processed: alpha");
//!     assert_eq!(mediator.handle_text("forbidden-x")?, "denied: forbidden-x");
//!     assert!(mediator.is_delegate_constructed());
//!     Ok(())
//! }
//! ```
//!
//! ## Design Principles
//!
//! - Synchronous: no async runtime, no network
//! - Memo tables use BTreeMap for deterministic ordering
//! - Denials are normal responses, never errors

pub mod config;
pub mod delegate;
pub mod error;
pub mod formats;
pub mod mediator;
pub mod policy;
pub mod response;
pub mod stats;
pub mod store;

pub use config::MediatorConfig;
pub use delegate::{Delegate, DelegateFactory, EchoService};
pub use error::{DelegateError, MediatorError, SnapshotError, StoreError};
pub use formats::CacheSnapshot;
pub use mediator::{AccessMediator, MediatorBuilder};
pub use policy::{AdmissionPolicy, AllOf, AllowAll, DenyPrefix, DenySubstring};
pub use response::{Response, ResponseSource};
pub use stats::MediatorStats;
pub use store::{LruStore, MemoStore, MemoryStore, RedbStore};

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// REQUEST KEY
// =============================================================================

/// A validated request key.
///
/// The key identifies the unit of work and doubles as the memo table key.
/// It is never empty.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RequestKey(String);

impl RequestKey {
    /// Validate and wrap a raw key.
    ///
    /// Returns `MediatorError::InvalidArgument` for the empty string.
    pub fn new(raw: impl Into<String>) -> Result<Self, MediatorError> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(MediatorError::InvalidArgument(
                "request key must not be empty".to_string(),
            ));
        }
        Ok(Self(raw))
    }

    /// Borrow the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for RequestKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// TESTS
// =============================================================================
