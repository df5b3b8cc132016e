//! Whole-file JSON documents.
//!
//! A document is always read and written in full. Writes go to a temporary
//! sibling first and are renamed over the target, so a reader sees either the
//! old document or the new one, never a truncated file.

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::fs;

use super::error::StorageError;

/// Load the document at `path`, or return `default` if the file does not exist.
pub async fn load<T: DeserializeOwned>(path: &Path, default: T) -> Result<T, StorageError> {
    match fs::read(path).await {
        Ok(bytes) => serde_json::from_slice(&bytes).map_err(|source| StorageError::Json {
            path: path.display().to_string(),
            source,
        }),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(default),
        Err(e) => Err(e.into()),
    }
}

/// Serialize `data` and replace the document at `path`.
pub async fn save<T: Serialize + ?Sized>(path: &Path, data: &T) -> Result<(), StorageError> {
    let bytes = serde_json::to_vec_pretty(data).map_err(|source| StorageError::Json {
        path: path.display().to_string(),
        source,
    })?;

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).await?;
    }

    let temp_path = temp_sibling(path);
    if let Err(e) = fs::write(&temp_path, &bytes).await {
        let _ = fs::remove_file(&temp_path).await;
        return Err(e.into());
    }

    if let Err(e) = fs::rename(&temp_path, path).await {
        let _ = fs::remove_file(&temp_path).await;
        return Err(e.into());
    }

    Ok(())
}

fn temp_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.{}.tmp", uuid::Uuid::new_v4()))
}
