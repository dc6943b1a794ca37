//! Core traits for the watcher
//!
//! This module defines the seams between the engine and its collaborators.
//!
//! - [`PageSource`]: Fetch the watched page
//! - [`Notifier`]: Deliver a message about a new listing to one sink
//! - [`SeenStore`]: Persist the set of already-seen identities

pub mod page_source;
pub mod notifier;
pub mod seen_store;

pub use page_source::PageSource;
pub use notifier::Notifier;
pub use seen_store::SeenStore;
