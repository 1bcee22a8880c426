//! Wiki outline: the declared page structure

use serde::{Deserialize, Serialize};

use crate::entities::wiki::WikiPage;

/// One planned page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageOutline {
    /// Stable page id
    pub id: String,
    /// Page title
    pub title: String,
    /// What the page should cover; used for retrieval and prompting
    #[serde(default)]
    pub description: String,
    /// Source files the page is built from
    #[serde(default)]
    pub dependencies: Vec<String>,
}

impl PageOutline {
    /// Create an outline entry
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            dependencies: Vec::new(),
        }
    }

    /// Set the description
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the dependency list
    #[must_use]
    pub fn with_dependencies<I, S>(mut self, dependencies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies = dependencies.into_iter().map(Into::into).collect();
        self
    }
}

impl From<&WikiPage> for PageOutline {
    fn from(page: &WikiPage) -> Self {
        Self {
            id: page.id.clone(),
            title: page.title.clone(),
            description: String::new(),
            dependencies: page.dependencies.clone(),
        }
    }
}

/// Ordered page structure of a wiki
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WikiOutline {
    /// Pages in presentation order
    pub pages: Vec<PageOutline>,
}

impl WikiOutline {
    /// Create an outline from page entries
    pub fn new(pages: Vec<PageOutline>) -> Self {
        Self { pages }
    }

    /// Look up an entry by page id
    pub fn get(&self, id: &str) -> Option<&PageOutline> {
        self.pages.iter().find(|p| p.id == id)
    }

    /// Whether the outline has no pages
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}
