//! # Error Types
//!
//! Failure taxonomy for the mediator.
//!
//! A denied request is NOT an error: it is returned as
//! [`Response::Denied`](crate::Response::Denied). Everything here is a real
//! failure the caller must handle.

use thiserror::Error;

/// Errors returned by [`AccessMediator`](crate::AccessMediator).
#[derive(Debug, Error)]
pub enum MediatorError {
    /// The request key is missing or malformed.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The delegate could not be constructed or failed while processing.
    #[error("Delegate failure: {0}")]
    DelegateFailure(#[from] DelegateError),

    /// The memo store failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// A thread panicked while holding the memo store lock.
    #[error("Memo store lock poisoned")]
    LockPoisoned,
}

/// Errors raised by a delegate or its factory.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DelegateError {
    /// The factory failed to build the delegate.
    #[error("construction failed: {0}")]
    Construction(String),

    /// The delegate failed to process a key.
    #[error("invocation failed for '{key}': {reason}")]
    Invocation { key: String, reason: String },
}

impl DelegateError {
    /// Convenience constructor for invocation failures.
    #[must_use]
    pub fn invocation(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Invocation {
            key: key.into(),
            reason: reason.into(),
        }
    }
}

/// Errors raised by memo stores.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The redb backend failed.
    #[error("redb error: {0}")]
    Redb(#[from] redb::Error),

    /// A store was configured with an unusable capacity.
    #[error("invalid capacity: {0}")]
    Capacity(usize),
}

/// Errors raised while encoding or decoding cache snapshots.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// The buffer does not start with the snapshot magic bytes.
    #[error("invalid snapshot magic")]
    InvalidMagic,

    /// The snapshot was written by an unknown format version.
    #[error("unsupported snapshot version: {0}")]
    UnsupportedVersion(u8),

    /// The buffer is shorter than the fixed header.
    #[error("snapshot truncated: {0} bytes")]
    Truncated(usize),

    /// The payload checksum does not match the header.
    #[error("snapshot checksum mismatch")]
    ChecksumMismatch,

    /// The payload carries a checksum this build cannot verify.
    #[error("snapshot checksum cannot be verified (built without crypto-hash)")]
    UnverifiableChecksum,

    /// Serialization failed.
    #[error("postcard error: {0}")]
    Postcard(#[from] postcard::Error),
}
