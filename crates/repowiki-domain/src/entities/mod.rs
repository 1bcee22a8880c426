//! Domain Entities
//!
//! Core entities of the incremental wiki cache. Snapshots describe a
//! repository at one point in time; wiki versions bundle a snapshot with the
//! pages generated against it.
//!
//! ## Entities
//!
//! | Entity | Description |
//! |--------|-------------|
//! | [`FileRecord`] | One tracked repository file (path, size, content hash) |
//! | [`Snapshot`] | Content-addressed manifest of a repository |
//! | [`WikiPage`] | One generated page with dependencies and diagram status |
//! | [`WikiVersion`] | Immutable numbered bundle of a snapshot and its pages |

/// Repository snapshot entities
pub mod snapshot;
/// Wiki page and version entities
pub mod wiki;

pub use snapshot::{FileRecord, RepositoryIdentity, Snapshot};
pub use wiki::{
    DiagramBlock, DiagramStatus, GenerationMetadata, RunMetadata, WikiPage, WikiVersion,
};
