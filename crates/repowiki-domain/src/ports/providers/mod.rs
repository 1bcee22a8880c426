//! External Provider Ports
//!
//! | Port | Description |
//! |------|-------------|
//! | RepositorySource | Enumerates and reads repository files |
//! | GenerationProvider | Streams generated page text |
//! | RetrievalProvider | Ranked passages used to ground prompts |
//! | DiagramParser | Structural validation of diagram blocks |

/// Diagram parser port
pub mod diagram;
/// Generation provider port
pub mod generation;
/// Repository source port
pub mod repository;
/// Retrieval provider port
pub mod retrieval;

pub use diagram::DiagramParser;
pub use generation::{GenerationProvider, TextStream, collect_text};
pub use repository::{RepositorySource, SourceEntry};
pub use retrieval::RetrievalProvider;
