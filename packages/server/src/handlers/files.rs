use axum::body::Body;
use axum::extract::{DefaultBodyLimit, Multipart, Path, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Local;
use common::storage::BoxReader;
use tokio::io::AsyncWriteExt;
use tokio_util::io::ReaderStream;
use tracing::instrument;
use uuid::Uuid;

use crate::error::{AppError, ErrorBody};
use crate::extractors::session::SessionUser;
use crate::identity::RECORD_TIME_FORMAT;
use crate::models::record::OwnershipRecord;
use crate::models::shared::{SuccessResponse, UploadResponse};
use crate::state::AppState;
use crate::utils::filename::{
    content_disposition_value, has_allowed_extension, secure_filename, validate_flat_filename,
};

/// Settings allow at most 1 GiB per file; the rest is multipart framing.
pub fn upload_body_limit() -> DefaultBodyLimit {
    DefaultBodyLimit::max(1024 * 1024 * 1024 + 1024 * 1024)
}

#[utoipa::path(
    post,
    path = "/upload",
    tag = "Files",
    operation_id = "uploadFile",
    summary = "Upload a file",
    description = "Stores the `file` multipart field under its sanitized name. Only the extensions \
        txt, pdf, png, jpg, jpeg, gif, mp3, mp4 and zip are accepted. Uploading under an existing \
        name replaces the file and makes the caller its uploader; this needs the same rights as \
        deleting it.",
    request_body(content_type = "multipart/form-data", description = "Multipart body with a `file` field"),
    responses(
        (status = 201, description = "File stored", body = UploadResponse),
        (status = 400, description = "Missing file or rejected name (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Not logged in (LOGIN_REQUIRED)", body = ErrorBody),
        (status = 403, description = "Existing file belongs to someone else (PERMISSION_DENIED)", body = ErrorBody),
        (status = 413, description = "File exceeds the size limit (PAYLOAD_TOO_LARGE)", body = ErrorBody),
    ),
    security(("session" = [])),
)]
#[instrument(skip(state, session, multipart), fields(user = %session.username))]
pub async fn upload_file(
    session: SessionUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let max_size = state
        .db
        .read(|docs| docs.settings.max_upload_bytes())
        .await;

    let mut stored: Option<(String, u64)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Ошибка чтения формы: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let original = field.file_name().unwrap_or_default().to_string();
        let filename = stored_name(&original)?;
        ensure_can_replace(&state, &session, &filename).await?;
        let size = stream_field_to_store(field, &state, &filename, max_size).await?;
        stored = Some((filename, size));
        break;
    }

    let (filename, size) = stored.ok_or_else(|| AppError::Validation("Файл не выбран".into()))?;

    let record = OwnershipRecord::created_by(
        session.account_id,
        Local::now().format(RECORD_TIME_FORMAT).to_string(),
    );
    state
        .db
        .transaction(|docs| {
            docs.file_owners.insert(filename.clone(), record);
            Ok::<_, AppError>(())
        })
        .await?;

    tracing::info!(%filename, size, "File uploaded");

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            success: true,
            filename,
            size,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/download/{filename}",
    tag = "Files",
    operation_id = "downloadFile",
    summary = "Download a file",
    description = "Streams the stored file with its content type, length and an attachment disposition.",
    params(("filename" = String, Path, description = "Stored filename")),
    responses(
        (status = 200, description = "File content"),
        (status = 400, description = "Invalid filename (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Not logged in (LOGIN_REQUIRED)", body = ErrorBody),
        (status = 404, description = "File not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("session" = [])),
)]
#[instrument(skip(state, _session), fields(filename))]
pub async fn download_file(
    _session: SessionUser,
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response, AppError> {
    let filename = validate_flat_filename(&filename)
        .map_err(|e| AppError::Validation(e.message().into()))?;

    let size = state.uploads.size(filename).await?;
    let reader = state.uploads.get_stream(filename).await?;
    let body = Body::from_stream(ReaderStream::new(reader));

    let content_type = mime_guess::from_path(filename).first_or_octet_stream();

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type.as_ref())
        .header(header::CONTENT_LENGTH, size.to_string())
        .header(
            header::CONTENT_DISPOSITION,
            content_disposition_value(filename),
        )
        .body(body)
        .map_err(|e| AppError::Internal(format!("Failed to build response: {e}")))
}

#[utoipa::path(
    post,
    path = "/delete_file/{filename}",
    tag = "Files",
    operation_id = "deleteFile",
    summary = "Delete a file",
    description = "Removes the file and its record. The owner may delete any file; other users only \
        files they uploaded.",
    params(("filename" = String, Path, description = "Stored filename")),
    responses(
        (status = 200, description = "File deleted", body = SuccessResponse),
        (status = 401, description = "Not logged in (LOGIN_REQUIRED)", body = ErrorBody),
        (status = 403, description = "Not allowed to delete (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "File not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("session" = [])),
)]
#[instrument(skip(state, session), fields(user = %session.username, filename))]
pub async fn delete_file(
    session: SessionUser,
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Json<SuccessResponse>, AppError> {
    let filename = validate_flat_filename(&filename)
        .map_err(|e| AppError::Validation(e.message().into()))?
        .to_string();

    let removed_record = state
        .db
        .transaction(|docs| {
            if !docs.can_delete_file(&session, &filename) {
                tracing::debug!("File deletion denied");
                return Err(AppError::PermissionDenied(
                    "Недостаточно прав для удаления файла".into(),
                ));
            }
            Ok(docs.file_owners.remove(&filename).is_some())
        })
        .await?;
    let removed_file = state.uploads.delete(&filename).await?;

    if !removed_file && !removed_record {
        return Err(AppError::NotFound("Файл не найден".into()));
    }

    tracing::info!(%filename, "File deleted");
    Ok(Json(SuccessResponse::ok()))
}

/// Name an upload is stored under, or a validation error.
///
/// The extension is checked on the client-supplied name and again after
/// sanitizing.
fn stored_name(original: &str) -> Result<String, AppError> {
    if original.trim().is_empty() {
        return Err(AppError::Validation("Файл не выбран".into()));
    }
    if !has_allowed_extension(original) {
        return Err(AppError::Validation("Недопустимый тип файла".into()));
    }
    secure_filename(original)
        .filter(|name| has_allowed_extension(name))
        .ok_or_else(|| AppError::Validation("Недопустимое имя файла".into()))
}

/// Reject an upload that would replace a file the caller may not delete.
async fn ensure_can_replace(
    state: &AppState,
    session: &SessionUser,
    filename: &str,
) -> Result<(), AppError> {
    let (tracked, allowed) = state
        .db
        .read(|docs| {
            (
                docs.file_owners.contains_key(filename),
                docs.can_delete_file(session, filename),
            )
        })
        .await;
    if allowed {
        return Ok(());
    }
    if tracked || state.uploads.exists(filename).await? {
        tracing::debug!(%filename, "File replacement denied");
        return Err(AppError::PermissionDenied(
            "Недостаточно прав для замены файла".into(),
        ));
    }
    Ok(())
}

/// Stream a multipart field into the upload store via a temp file.
async fn stream_field_to_store(
    mut field: axum::extract::multipart::Field<'_>,
    state: &AppState,
    filename: &str,
    max_size: u64,
) -> Result<u64, AppError> {
    let temp_path = std::env::temp_dir().join(format!("filechanger-upload-{}", Uuid::new_v4()));

    let result = async {
        let mut temp_file = tokio::fs::File::create(&temp_path)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to create temp file: {e}")))?;

        let mut total_size: u64 = 0;

        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|e| AppError::Validation(format!("Ошибка чтения файла: {e}")))?
        {
            total_size += chunk.len() as u64;
            if total_size > max_size {
                return Err(AppError::PayloadTooLarge { limit: max_size });
            }
            temp_file
                .write_all(&chunk)
                .await
                .map_err(|e| AppError::Internal(format!("Temp file write failed: {e}")))?;
        }

        temp_file
            .flush()
            .await
            .map_err(|e| AppError::Internal(format!("Temp file flush failed: {e}")))?;
        drop(temp_file);

        let file = tokio::fs::File::open(&temp_path)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to reopen temp file: {e}")))?;
        let reader: BoxReader = Box::new(file);
        Ok(state.uploads.put_stream(filename, reader, max_size).await?)
    }
    .await;

    // Best effort.
    let _ = tokio::fs::remove_file(&temp_path).await;

    result
}
