use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Upper bound on the length of a saved link, in characters.
const MAX_LINK_CHARS: usize = 2048;

/// Plain acknowledgement.
#[derive(Serialize, utoipa::ToSchema)]
pub struct SuccessResponse {
    #[schema(example = true)]
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

/// Response to a successful upload.
#[derive(Serialize, utoipa::ToSchema)]
pub struct UploadResponse {
    #[schema(example = true)]
    pub success: bool,
    /// Name the file was stored under.
    #[schema(example = "report.pdf")]
    pub filename: String,
    /// Stored size in bytes.
    #[schema(example = 142857)]
    pub size: u64,
}

/// Form body naming a link.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct LinkForm {
    #[schema(example = "https://example.com/article")]
    pub link: Option<String>,
}

/// Validate a link field, returning the trimmed link.
pub fn validate_link(link: Option<&str>) -> Result<&str, AppError> {
    let link = link.map(str::trim).unwrap_or_default();
    if link.is_empty() {
        return Err(AppError::Validation("Ссылка не указана".into()));
    }
    if link.chars().count() > MAX_LINK_CHARS {
        return Err(AppError::Validation("Слишком длинная ссылка".into()));
    }
    Ok(link)
}
