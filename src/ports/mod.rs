//! Port traits defining external boundaries.
//!
//! The pipeline itself is pure; the applier touches the outside world only
//! through these traits. Implementations live in `src/adapters/`.

pub mod clock;
pub mod filesystem;

pub use clock::Clock;
pub use filesystem::{FileSystem, PortError};
