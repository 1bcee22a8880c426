//! Include/exclude glob matching shared by repository sources

use globset::{Glob, GlobSet, GlobSetBuilder};
use repowiki_domain::error::{Error, Result};
use repowiki_domain::value_objects::PathFilters;

/// Compiled form of [`PathFilters`]
#[derive(Debug, Clone)]
pub struct PathFilter {
    include: Option<GlobSet>,
    exclude: GlobSet,
}

impl PathFilter {
    /// Compile the filters; an invalid pattern is an invalid argument
    pub fn new(filters: &PathFilters) -> Result<Self> {
        let include = if filters.include.is_empty() {
            None
        } else {
            Some(build_set(&filters.include)?)
        };
        Ok(Self {
            include,
            exclude: build_set(&filters.exclude)?,
        })
    }

    /// Whether a `/`-separated relative path is tracked
    pub fn matches(&self, path: &str) -> bool {
        if self.exclude.is_match(path) {
            return false;
        }
        self.include.as_ref().is_none_or(|set| set.is_match(path))
    }
}

fn build_set(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|e| {
            Error::invalid_argument(format!("invalid glob pattern '{pattern}': {e}"))
        })?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|e| Error::invalid_argument(format!("invalid glob set: {e}")))
}
