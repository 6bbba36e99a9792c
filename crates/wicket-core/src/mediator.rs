//! # Access Mediator
//!
//! Admission check, memo lookup, lazy delegate construction and forwarding,
//! in that order, behind one `handle` call.
//!
//! ## Concurrency
//!
//! `AccessMediator` is `Send + Sync`:
//! - The delegate lives in a once-cell. At most one construction succeeds
//!   over the mediator's lifetime; concurrent first callers wait for it.
//! - The memo store sits behind a mutex that is never held while the
//!   delegate runs. Two racing first requests for the same key may both
//!   reach the delegate, but only the first write is kept and both callers
//!   return that stored value.

use crate::config::MediatorConfig;
use crate::delegate::{Delegate, DelegateFactory};
use crate::error::{DelegateError, MediatorError};
use crate::formats::CacheSnapshot;
use crate::policy::{AdmissionPolicy, DenySubstring};
use crate::response::{Response, ResponseSource};
use crate::stats::{Counters, MediatorStats};
use crate::store::{MemoStore, MemoryStore};
use crate::RequestKey;
use once_cell::sync::OnceCell;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};

// =============================================================================
// ACCESS MEDIATOR
// =============================================================================

/// Mediates access to a lazily constructed delegate.
pub struct AccessMediator<F: DelegateFactory> {
    factory: F,
    delegate: OnceCell<F::Output>,
    policy: Box<dyn AdmissionPolicy>,
    store: Mutex<Box<dyn MemoStore>>,
    counters: Counters,
}

impl<F: DelegateFactory> AccessMediator<F> {
    /// Create a mediator with the default policy (deny keys containing
    /// `"forbidden"`) and an unbounded in-memory memo table.
    pub fn new(factory: F) -> Self {
        Self::builder(factory).build()
    }

    /// Start building a mediator around `factory`.
    pub fn builder(factory: F) -> MediatorBuilder<F> {
        MediatorBuilder {
            factory,
            policy: None,
            store: None,
        }
    }

    /// Build a mediator from a [`MediatorConfig`].
    pub fn from_config(factory: F, config: &MediatorConfig) -> Result<Self, MediatorError> {
        let store = config.store()?;
        Ok(Self::builder(factory)
            .boxed_policy(config.policy()?)
            .boxed_store(store)
            .build())
    }

    /// Mediate one request.
    ///
    /// Denials come back as `Ok(Response::Denied)`. Errors are reserved for
    /// an empty key, delegate failures and store failures; none of them
    /// leave anything in the memo table.
    pub fn handle(&self, key: &str) -> Result<Response, MediatorError> {
        let key = RequestKey::new(key)?;
        self.handle_key(&key)
    }

    /// Mediate one request and return the textual response
    /// (the body, or `"denied: <key>"`).
    pub fn handle_text(&self, key: &str) -> Result<String, MediatorError> {
        self.handle(key).map(Response::into_text)
    }

    /// Mediate one already-validated request.
    pub fn handle_key(&self, key: &RequestKey) -> Result<Response, MediatorError> {
        let key = key.as_str();

        if !self.policy.admit(key) {
            Counters::bump(&self.counters.denied);
            debug!(key, policy = %self.policy.describe(), "request denied");
            return Ok(Response::denied(key));
        }
        Counters::bump(&self.counters.admitted);

        if let Some(body) = self.lock_store()?.get(key)? {
            Counters::bump(&self.counters.hits);
            debug!(key, "cache hit");
            return Ok(Response::served(body, ResponseSource::Cache));
        }
        Counters::bump(&self.counters.misses);
        debug!(key, "cache miss");

        let delegate = self.delegate()?;
        let body = delegate.process(key).map_err(|err| {
            Counters::bump(&self.counters.failures);
            warn!(key, error = %err, "delegate invocation failed");
            err
        })?;
        Counters::bump(&self.counters.invocations);

        let stored = self.lock_store()?.insert_if_absent(key, body)?;
        Ok(Response::served(stored, ResponseSource::Delegate))
    }

    /// Get the delegate, constructing it on first use.
    fn delegate(&self) -> Result<&F::Output, DelegateError> {
        self.delegate.get_or_try_init(|| {
            info!("constructing delegate");
            match self.factory.build() {
                Ok(delegate) => {
                    Counters::bump(&self.counters.constructions);
                    Ok(delegate)
                }
                Err(err) => {
                    Counters::bump(&self.counters.failures);
                    warn!(error = %err, "delegate construction failed");
                    Err(err)
                }
            }
        })
    }

    fn lock_store(&self) -> Result<MutexGuard<'_, Box<dyn MemoStore>>, MediatorError> {
        self.store.lock().map_err(|_| MediatorError::LockPoisoned)
    }

    /// Check whether the delegate has been constructed.
    pub fn is_delegate_constructed(&self) -> bool {
        self.delegate.get().is_some()
    }

    /// Look up a memoized response without touching statistics or recency.
    pub fn cached(&self, key: &str) -> Result<Option<String>, MediatorError> {
        Ok(self.lock_store()?.peek(key)?)
    }

    /// Number of memoized responses.
    pub fn cache_len(&self) -> Result<usize, MediatorError> {
        Ok(self.lock_store()?.len()?)
    }

    /// Name of the memo store backend.
    pub fn store_backend(&self) -> Result<&'static str, MediatorError> {
        Ok(self.lock_store()?.backend())
    }

    /// Current counters.
    pub fn stats(&self) -> Result<MediatorStats, MediatorError> {
        let cached_entries = self.cache_len()?;
        Ok(self.counters.snapshot(cached_entries))
    }

    /// Copy the memo table into a portable snapshot.
    pub fn snapshot(&self) -> Result<CacheSnapshot, MediatorError> {
        let entries = self.lock_store()?.entries()?;
        Ok(CacheSnapshot::from_pairs(entries))
    }

    /// Pre-load memoized responses from a snapshot.
    ///
    /// Existing entries win over snapshot entries. Entries whose key the
    /// admission policy rejects are skipped, so a warm start never makes a
    /// denied key answerable. Returns the number of entries inserted.
    pub fn warm(&self, snapshot: &CacheSnapshot) -> Result<usize, MediatorError> {
        let mut store = self.lock_store()?;
        let mut loaded = 0;
        for entry in snapshot.entries() {
            if entry.key.is_empty() || !self.policy.admit(&entry.key) {
                continue;
            }
            if store.peek(&entry.key)?.is_some() {
                continue;
            }
            store.insert_if_absent(&entry.key, entry.response.clone())?;
            loaded += 1;
        }
        info!(loaded, offered = snapshot.len(), "memo table warmed");
        Ok(loaded)
    }
}

impl<F: DelegateFactory> std::fmt::Debug for AccessMediator<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessMediator")
            .field("policy", &self.policy.describe())
            .field("delegate_constructed", &self.is_delegate_constructed())
            .finish()
    }
}

// =============================================================================
// BUILDER
// =============================================================================

/// Builder for [`AccessMediator`].
pub struct MediatorBuilder<F: DelegateFactory> {
    factory: F,
    policy: Option<Box<dyn AdmissionPolicy>>,
    store: Option<Box<dyn MemoStore>>,
}

impl<F: DelegateFactory> MediatorBuilder<F> {
    /// Use `policy` for admission.
    #[must_use]
    pub fn policy(self, policy: impl AdmissionPolicy + 'static) -> Self {
        self.boxed_policy(Box::new(policy))
    }

    /// Use an already boxed admission policy.
    #[must_use]
    pub fn boxed_policy(mut self, policy: Box<dyn AdmissionPolicy>) -> Self {
        self.policy = Some(policy);
        self
    }

    /// Use `store` as the memo table.
    #[must_use]
    pub fn store(self, store: impl MemoStore + 'static) -> Self {
        self.boxed_store(Box::new(store))
    }

    /// Use an already boxed memo store.
    #[must_use]
    pub fn boxed_store(mut self, store: Box<dyn MemoStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Finish building. The delegate is NOT constructed here.
    pub fn build(self) -> AccessMediator<F> {
        AccessMediator {
            factory: self.factory,
            delegate: OnceCell::new(),
            policy: self
                .policy
                .unwrap_or_else(|| Box::new(DenySubstring::default())),
            store: Mutex::new(
                self.store
                    .unwrap_or_else(|| Box::new(MemoryStore::new())),
            ),
            counters: Counters::default(),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
