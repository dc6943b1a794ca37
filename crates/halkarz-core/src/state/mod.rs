// # Seen State
//
// The in-memory seen set and the SeenStore implementations that persist it.

pub mod file;
pub mod memory;
pub mod seen_set;

pub use file::FileSeenStore;
pub use memory::MemorySeenStore;
pub use seen_set::SeenSet;
