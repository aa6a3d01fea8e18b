//! Debian changelog records and the file-level version-transition engine.

pub mod entry;
pub mod file;

pub use entry::Entry;
pub use file::{AddOptions, ChangelogFile};
