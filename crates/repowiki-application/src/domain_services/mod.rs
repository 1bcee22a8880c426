//! Domain Services
//!
//! Stateless building blocks of a run. Diffing and impact mapping are pure
//! in-memory functions; capture and validation suspend only on port calls.
//!
//! | Service | Description |
//! |---------|-------------|
//! | [`SnapshotCapture`] | All-or-nothing concurrent repository capture |
//! | [`diff_snapshots`] | Classifies every path as added/removed/modified/unchanged |
//! | [`map_impact`] | Maps changed paths to the base pages they affect |
//! | [`GenerationValidator`] | Generates a page and runs the bounded repair loop |

/// Repository snapshot capture
pub mod capture;
/// Snapshot differ
pub mod differ;
/// Page impact mapper
pub mod impact;
/// Prompt construction for page and repair requests
pub mod prompt;
/// Diagram validation and repair loop
pub mod validator;

pub use capture::SnapshotCapture;
pub use differ::diff_snapshots;
pub use impact::map_impact;
pub use validator::{GenerationValidator, PageDraft, ValidationState};
