//! Service context bundling all port trait objects.

use crate::adapters::live::{LiveClock, LiveFileSystem};
use crate::ports::clock::Clock;
use crate::ports::filesystem::FileSystem;

/// Bundles all port trait objects into a single context.
///
/// Each field provides access to one external boundary. `live()` wires up the
/// real adapters; tests build their own with [`ServiceContext::new`].
pub struct ServiceContext {
    /// Clock used to stamp backups.
    pub clock: Box<dyn Clock>,
    /// Filesystem for router source and page I/O.
    pub fs: Box<dyn FileSystem>,
}

impl ServiceContext {
    /// Creates a live context with real adapters for filesystem and clock.
    #[must_use]
    pub fn live() -> Self {
        Self { clock: Box::new(LiveClock), fs: Box::new(LiveFileSystem) }
    }

    /// Creates a context from explicit adapters.
    #[must_use]
    pub fn new(clock: Box<dyn Clock>, fs: Box<dyn FileSystem>) -> Self {
        Self { clock, fs }
    }
}
