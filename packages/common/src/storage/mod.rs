mod error;
mod traits;

pub mod filesystem;
pub mod json;

pub use error::StorageError;
pub use traits::{BoxReader, StoredFile, UploadStore};
