//! Outline files
//!
//! An outline lists the wiki pages in order:
//!
//! ```toml
//! [[pages]]
//! id = "overview"
//! title = "Overview"
//! description = "What the project is for"
//! dependencies = ["README.md", "src/lib.rs"]
//! ```
//!
//! `.json` files hold the same structure; any other extension is read as TOML.

use std::path::Path;

use anyhow::{Context, bail};
use repowiki_domain::WikiOutline;

/// Read and parse an outline file
pub fn load_outline(path: &Path) -> anyhow::Result<WikiOutline> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read outline {}", path.display()))?;

    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let outline: WikiOutline = if is_json {
        serde_json::from_str(&text)
            .with_context(|| format!("Invalid JSON outline {}", path.display()))?
    } else {
        toml::from_str(&text).with_context(|| format!("Invalid TOML outline {}", path.display()))?
    };

    if outline.is_empty() {
        bail!("Outline {} has no pages", path.display());
    }
    Ok(outline)
}
