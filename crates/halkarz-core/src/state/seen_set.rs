//! The set of listing identities already observed

use std::collections::HashSet;

/// Identities already notified about or registered in the baseline
///
/// Owned by the engine. Order carries no meaning.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeenSet {
    identities: HashSet<String>,
}

impl SeenSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the identity has been seen
    pub fn contains(&self, identity: &str) -> bool {
        self.identities.contains(identity)
    }

    /// Record an identity as seen
    ///
    /// Idempotent. Returns `true` when the identity was not present before.
    pub fn mark_seen(&mut self, identity: impl Into<String>) -> bool {
        self.identities.insert(identity.into())
    }

    /// Number of identities
    pub fn len(&self) -> usize {
        self.identities.len()
    }

    /// Whether the set is empty
    pub fn is_empty(&self) -> bool {
        self.identities.is_empty()
    }

    /// Iterate over the identities (arbitrary order)
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.identities.iter().map(String::as_str)
    }

    /// Identities in sorted order, for stable serialization
    pub fn sorted(&self) -> Vec<&str> {
        let mut identities: Vec<&str> = self.iter().collect();
        identities.sort_unstable();
        identities
    }
}

impl<S: Into<String>> FromIterator<S> for SeenSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            identities: iter.into_iter().map(Into::into).collect(),
        }
    }
}
