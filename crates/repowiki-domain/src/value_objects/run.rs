//! Run modes and caller decisions

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// What the caller chose after seeing the impact report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    /// Regenerate every page
    RegenerateAll,
    /// Regenerate impacted pages and copy the rest forward
    RegenerateImpacted,
    /// Stop without writing anything
    Abort,
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::RegenerateAll => "all",
            Self::RegenerateImpacted => "impacted",
            Self::Abort => "abort",
        };
        f.write_str(name)
    }
}

impl FromStr for RunMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" | "regenerate_all" => Ok(Self::RegenerateAll),
            "impacted" | "regenerate_impacted" => Ok(Self::RegenerateImpacted),
            "abort" => Ok(Self::Abort),
            other => Err(Error::invalid_argument(format!("unknown run mode: {other}"))),
        }
    }
}

/// Caller decision for one run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunDecision {
    /// Selected mode
    pub mode: RunMode,
    /// Drop orphaned pages instead of regenerating them
    pub drop_orphans: bool,
}

impl RunDecision {
    /// Regenerate every page
    pub fn regenerate_all() -> Self {
        Self {
            mode: RunMode::RegenerateAll,
            drop_orphans: false,
        }
    }

    /// Regenerate impacted pages only
    pub fn regenerate_impacted() -> Self {
        Self {
            mode: RunMode::RegenerateImpacted,
            drop_orphans: false,
        }
    }

    /// Abort the run
    pub fn abort() -> Self {
        Self {
            mode: RunMode::Abort,
            drop_orphans: false,
        }
    }

    /// Drop orphaned pages from the new version
    #[must_use]
    pub fn dropping_orphans(mut self) -> Self {
        self.drop_orphans = true;
        self
    }
}

impl From<RunMode> for RunDecision {
    fn from(mode: RunMode) -> Self {
        Self {
            mode,
            drop_orphans: false,
        }
    }
}
