//! Durable file helpers

use std::path::Path;

use repowiki_domain::error::{Error, Result};
use serde::de::DeserializeOwned;
use tokio::io::AsyncWriteExt;

/// Read and parse a JSON file
pub async fn read_json<T: DeserializeOwned>(path: &Path, description: &str) -> Result<T> {
    let content = tokio::fs::read(path)
        .await
        .map_err(|e| Error::io_with_source(format!("Failed to read {description}"), e))?;
    serde_json::from_slice(&content).map_err(|e| {
        Error::store_with_source(
            format!("Failed to parse {description} at {}", path.display()),
            e,
        )
    })
}

/// Write bytes and flush them to disk before returning
pub async fn write_durable(path: &Path, data: &[u8], description: &str) -> Result<()> {
    let mut file = tokio::fs::File::create(path)
        .await
        .map_err(|e| Error::io_with_source(format!("Failed to create {description}"), e))?;
    file.write_all(data)
        .await
        .map_err(|e| Error::io_with_source(format!("Failed to write {description}"), e))?;
    file.sync_all()
        .await
        .map_err(|e| Error::io_with_source(format!("Failed to flush {description}"), e))
}

/// Flush a directory entry table so renames inside it survive a crash
pub async fn sync_dir(path: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        let dir = tokio::fs::File::open(path).await.map_err(|e| {
            Error::io_with_source(format!("Failed to open {}", path.display()), e)
        })?;
        dir.sync_all().await.map_err(|e| {
            Error::io_with_source(format!("Failed to flush {}", path.display()), e)
        })?;
    }
    #[cfg(not(unix))]
    let _ = path;
    Ok(())
}
