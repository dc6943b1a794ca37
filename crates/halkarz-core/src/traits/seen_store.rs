// # Seen Store Trait
//
// Defines the interface for persisting the set of seen identities.
//
// ## Purpose
//
// The seen set is what makes notification at-most-once across restarts: an
// identity found in the store is never notified again.
//
// ## Implementations
//
// - File-based: pretty-printed JSON array of strings
// - Memory: for tests and dry runs

use async_trait::async_trait;

use crate::state::SeenSet;

/// Trait for seen-store implementations
///
/// The engine is the only caller. It loads once at startup and hands the full
/// set back on every persist; stores keep no state of their own beyond what
/// they wrote.
#[async_trait]
pub trait SeenStore: Send + Sync {
    /// Load the persisted identities
    ///
    /// Never fails: a missing or unreadable store yields an empty set (after
    /// logging), so a corrupt file can only reset state, not stop startup.
    async fn load(&self) -> SeenSet;

    /// Replace the stored identities with `set`
    ///
    /// # Returns
    ///
    /// - `Ok(())`: Written
    /// - `Err(Error::Storage)`: The in-memory set stays valid; the next
    ///   successful persist restores durability
    async fn persist(&self, set: &SeenSet) -> Result<(), crate::Error>;
}
