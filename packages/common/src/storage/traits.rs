use std::io::Cursor;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt};

use super::error::StorageError;

/// Type alias for a boxed async reader.
pub type BoxReader = Box<dyn AsyncRead + Unpin + Send>;

/// A file held by an [`UploadStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub name: String,
    pub size: u64,
}

/// Name-addressed storage for uploaded files.
///
/// Names are flat: no directory components, no leading dot. Storing under an
/// existing name replaces the previous content.
#[async_trait]
pub trait UploadStore: Send + Sync {
    /// Store bytes under `name` and return the stored size.
    async fn put(&self, name: &str, data: &[u8], max_size: u64) -> Result<u64, StorageError> {
        let reader: BoxReader = Box::new(Cursor::new(data.to_vec()));
        self.put_stream(name, reader, max_size).await
    }

    /// Store data from an async reader under `name` and return the stored size.
    ///
    /// Fails with [`StorageError::SizeLimitExceeded`] once more than `max_size`
    /// bytes have been read; nothing is stored in that case.
    async fn put_stream(
        &self,
        name: &str,
        reader: BoxReader,
        max_size: u64,
    ) -> Result<u64, StorageError>;

    /// Retrieve all bytes of a file.
    async fn get(&self, name: &str) -> Result<Vec<u8>, StorageError> {
        let mut reader = self.get_stream(name).await?;
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf).await?;
        Ok(buf)
    }

    /// Retrieve a file as a streaming async reader.
    async fn get_stream(&self, name: &str) -> Result<BoxReader, StorageError>;

    /// Check whether a file exists.
    async fn exists(&self, name: &str) -> Result<bool, StorageError>;

    /// Delete a file.
    ///
    /// Returns `true` if the file was deleted, `false` if it did not exist.
    async fn delete(&self, name: &str) -> Result<bool, StorageError>;

    /// Get the size of a file in bytes.
    async fn size(&self, name: &str) -> Result<u64, StorageError>;

    /// List all stored files, ordered by name.
    async fn list(&self) -> Result<Vec<StoredFile>, StorageError>;
}
