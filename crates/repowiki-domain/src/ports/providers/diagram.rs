//! Diagram Parser Port

use crate::error::DiagramParseError;
use crate::value_objects::Diagram;

/// Diagram Parser Interface
///
/// Parsing is synchronous and pure; a failure is a recoverable
/// [`DiagramParseError`] that drives the repair loop.
pub trait DiagramParser: Send + Sync {
    /// Parse one diagram source (the text between the fences)
    fn parse(&self, source: &str) -> std::result::Result<Diagram, DiagramParseError>;

    /// Fence language this parser handles (e.g. "mermaid")
    fn language(&self) -> &str;
}
