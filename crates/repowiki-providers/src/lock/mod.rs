//! Advisory lock implementations

/// Lock files created with `create_new`
pub mod file;

pub use file::FileLockProvider;
