use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use chrono::Local;
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::form::AppForm;
use crate::extractors::session::SessionUser;
use crate::identity::RECORD_TIME_FORMAT;
use crate::models::record::OwnershipRecord;
use crate::models::shared::{LinkForm, SuccessResponse, validate_link};
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/save_link",
    tag = "Links",
    operation_id = "saveLink",
    summary = "Save a link",
    description = "Appends the link to the shared list and records the caller as its uploader.",
    request_body(content = LinkForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 201, description = "Link saved", body = SuccessResponse),
        (status = 400, description = "Missing link (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Not logged in (LOGIN_REQUIRED)", body = ErrorBody),
        (status = 409, description = "Link already saved (CONFLICT)", body = ErrorBody),
    ),
    security(("session" = [])),
)]
#[instrument(skip(state, session, form), fields(user = %session.username))]
pub async fn save_link(
    session: SessionUser,
    State(state): State<AppState>,
    AppForm(form): AppForm<LinkForm>,
) -> Result<impl IntoResponse, AppError> {
    let link = validate_link(form.link.as_deref())?.to_string();
    let upload_time = Local::now().format(RECORD_TIME_FORMAT).to_string();

    state
        .db
        .transaction(|docs| {
            if docs.links.contains(&link) {
                return Err(AppError::Conflict("Эта ссылка уже сохранена".into()));
            }
            docs.links.push(link.clone());
            docs.link_owners.insert(
                link.clone(),
                OwnershipRecord::created_by(session.account_id, upload_time),
            );
            Ok(())
        })
        .await?;

    tracing::info!(%link, "Link saved");
    Ok((StatusCode::CREATED, Json(SuccessResponse::ok())))
}

#[utoipa::path(
    post,
    path = "/delete_link",
    tag = "Links",
    operation_id = "deleteLink",
    summary = "Delete a link",
    description = "Removes the link and its record. The owner may delete any link; other users only \
        links they saved.",
    request_body(content = LinkForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Link deleted", body = SuccessResponse),
        (status = 400, description = "Missing link (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Not logged in (LOGIN_REQUIRED)", body = ErrorBody),
        (status = 403, description = "Not allowed to delete (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Link not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("session" = [])),
)]
#[instrument(skip(state, session, form), fields(user = %session.username))]
pub async fn delete_link(
    session: SessionUser,
    State(state): State<AppState>,
    AppForm(form): AppForm<LinkForm>,
) -> Result<Json<SuccessResponse>, AppError> {
    let link = validate_link(form.link.as_deref())?.to_string();

    state
        .db
        .transaction(|docs| {
            if !docs.can_delete_link(&session, &link) {
                tracing::debug!(%link, "Link deletion denied");
                return Err(AppError::PermissionDenied(
                    "Недостаточно прав для удаления ссылки".into(),
                ));
            }
            let before = docs.links.len();
            docs.links.retain(|l| l != &link);
            let removed_record = docs.link_owners.remove(&link).is_some();
            if docs.links.len() == before && !removed_record {
                return Err(AppError::NotFound("Ссылка не найдена".into()));
            }
            Ok(())
        })
        .await?;

    tracing::info!(%link, "Link deleted");
    Ok(Json(SuccessResponse::ok()))
}
