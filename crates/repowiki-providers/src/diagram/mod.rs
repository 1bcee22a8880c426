//! Diagram parser implementations

/// Mermaid structural parser
pub mod mermaid;

pub use mermaid::MermaidParser;
