//! Version store implementations
//!
//! | Store | Description |
//! |-------|-------------|
//! | [`FilesystemVersionStore`] | Per-repository directories, staged writes, atomic rename publish |
//! | [`InMemoryVersionStore`] | Process-local store for tests and dry runs |

/// Filesystem store
pub mod filesystem;
/// In-memory store
pub mod memory;

pub use filesystem::FilesystemVersionStore;
pub use memory::InMemoryVersionStore;
