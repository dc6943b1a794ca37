// # halkarz-core
//
// Core library for the halka arz listing watcher.
//
// ## Architecture Overview
//
// This library provides the change-detection pipeline:
// - **PageSource**: Trait for fetching the listings page
// - **ListingExtractor**: Pure markup → listing records parser
// - **SeenStore**: Trait for persisting already-seen identities
// - **Notifier**: Trait for notification sinks (console sink included)
// - **PollEngine**: Drives fetch → extract → diff → persist → notify
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Transports live in plugin crates
// 2. **Single Flow**: One task, no overlapping cycles, no locks on the seen set
// 3. **At-Most-Once**: A listing is marked seen before any sink is called
// 4. **Library-First**: The daemon is a thin wiring layer over this crate

pub mod config;
pub mod engine;
pub mod error;
pub mod extract;
pub mod model;
pub mod notify;
pub mod state;
pub mod traits;

// Re-export core types for convenience
pub use config::{EngineSettings, SelectorConfig, WatcherConfig};
pub use engine::{EngineEvent, EngineState, EngineStats, PollEngine, TickOutcome};
pub use error::{Error, Result};
pub use extract::ListingExtractor;
pub use model::{ListingRecord, ReportLine};
pub use notify::ConsoleNotifier;
pub use state::{FileSeenStore, MemorySeenStore, SeenSet};
pub use traits::{Notifier, PageSource, SeenStore};
