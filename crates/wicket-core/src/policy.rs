//! # Admission Policy
//!
//! Pure predicates deciding whether a request may reach the cache and
//! delegate. Policies are stateless and evaluated before anything else.
//!
//! The default, [`DenySubstring::default`], rejects any key containing
//! `"forbidden"`. It is a placeholder rule; real deployments inject their own.

use std::fmt;

/// The default denied substring.
pub const DEFAULT_DENIED_SUBSTRING: &str = "forbidden";

// =============================================================================
// ADMISSION POLICY TRAIT
// =============================================================================

/// Decides whether a request key is admitted.
pub trait AdmissionPolicy: Send + Sync {
    /// Return `true` to admit the key.
    fn admit(&self, key: &str) -> bool;

    /// Human-readable description, used in logs.
    fn describe(&self) -> String {
        String::from("custom")
    }
}

impl<F> AdmissionPolicy for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn admit(&self, key: &str) -> bool {
        self(key)
    }
}

// =============================================================================
// BUILT-IN POLICIES
// =============================================================================

/// Admits every key.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl AdmissionPolicy for AllowAll {
    fn admit(&self, _key: &str) -> bool {
        true
    }

    fn describe(&self) -> String {
        String::from("allow-all")
    }
}

/// Rejects keys containing any of the listed substrings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DenySubstring {
    needles: Vec<String>,
}

impl DenySubstring {
    /// Deny keys containing `needle`.
    #[must_use]
    pub fn new(needle: impl Into<String>) -> Self {
        Self {
            needles: vec![needle.into()],
        }
    }

    /// Deny keys containing any of `needles`.
    ///
    /// Needles are kept as given, like [`DenySubstring::new`]: an empty
    /// needle matches (and so denies) every key. Callers building a policy
    /// from untrusted input should go through
    /// [`MediatorConfig::policy`](crate::MediatorConfig::policy), which
    /// rejects empty needles.
    #[must_use]
    pub fn any_of<I, S>(needles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            needles: needles.into_iter().map(Into::into).collect(),
        }
    }

    /// The denied substrings.
    #[must_use]
    pub fn needles(&self) -> &[String] {
        &self.needles
    }
}

impl Default for DenySubstring {
    fn default() -> Self {
        Self::new(DEFAULT_DENIED_SUBSTRING)
    }
}

impl AdmissionPolicy for DenySubstring {
    fn admit(&self, key: &str) -> bool {
        !self.needles.iter().any(|n| key.contains(n.as_str()))
    }

    fn describe(&self) -> String {
        format!("deny-substring{:?}", self.needles)
    }
}

/// Rejects keys starting with a prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DenyPrefix(pub String);

impl AdmissionPolicy for DenyPrefix {
    fn admit(&self, key: &str) -> bool {
        !key.starts_with(self.0.as_str())
    }

    fn describe(&self) -> String {
        format!("deny-prefix({})", self.0)
    }
}

/// Admits a key only when every inner policy admits it.
///
/// An empty `AllOf` admits everything.
#[derive(Default)]
pub struct AllOf {
    policies: Vec<Box<dyn AdmissionPolicy>>,
}

impl AllOf {
    /// Create an empty conjunction.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a policy to the conjunction.
    #[must_use]
    pub fn and(mut self, policy: impl AdmissionPolicy + 'static) -> Self {
        self.policies.push(Box::new(policy));
        self
    }

    /// Number of inner policies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.policies.len()
    }

    /// Check if the conjunction has no inner policies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }
}

impl AdmissionPolicy for AllOf {
    fn admit(&self, key: &str) -> bool {
        self.policies.iter().all(|p| p.admit(key))
    }

    fn describe(&self) -> String {
        let inner: Vec<String> = self.policies.iter().map(|p| p.describe()).collect();
        format!("all-of[{}]", inner.join(", "))
    }
}

impl fmt::Debug for AllOf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AllOf")
            .field("policies", &self.describe())
            .finish()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_denies_forbidden() {
        let policy = DenySubstring::default();
        assert!(!policy.admit("forbidden-x"));
        assert!(!policy.admit("x-forbidden-y"));
        assert!(policy.admit("alpha"));
    }

    #[test]
    fn substring_match_is_case_sensitive() {
        let policy = DenySubstring::default();
        assert!(policy.admit("FORBIDDEN"));
    }

    #[test]
    fn any_of_matches_any_needle() {
        let policy = DenySubstring::any_of(["internal", "secret"]);
        assert_eq!(policy.needles().len(), 2);
        assert!(policy.admit("alpha"));
        assert!(!policy.admit("top-secret"));
        assert!(!policy.admit("internal-x"));
    }

    #[test]
    fn empty_needle_denies_everything_either_way() {
        let single = DenySubstring::new("");
        let many = DenySubstring::any_of(["", "secret"]);
        for key in ["alpha", "forbidden-x"] {
            assert!(!single.admit(key));
            assert!(!many.admit(key));
        }
    }

    #[test]
    fn deny_prefix() {
        let policy = DenyPrefix("admin/".to_string());
        assert!(!policy.admit("admin/users"));
        assert!(policy.admit("public/admin/"));
    }

    #[test]
    fn all_of_requires_every_policy() {
        let policy = AllOf::new()
            .and(DenySubstring::default())
            .and(DenyPrefix("internal:".to_string()));

        assert_eq!(policy.len(), 2);
        assert!(policy.admit("alpha"));
        assert!(!policy.admit("forbidden"));
        assert!(!policy.admit("internal:alpha"));
    }

    #[test]
    fn empty_all_of_admits() {
        assert!(AllOf::new().admit("anything"));
    }

    #[test]
    fn closure_policy() {
        let short_only = |key: &str| key.len() <= 4;
        assert!(short_only.admit("abcd"));
        assert!(!short_only.admit("abcde"));
        assert_eq!(AdmissionPolicy::describe(&short_only), "custom");
    }
}
