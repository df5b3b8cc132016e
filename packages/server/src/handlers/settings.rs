use axum::{Json, extract::State};
use axum_extra::extract::CookieJar;
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::json::AppJson;
use crate::extractors::session::{SessionUser, session_cookie};
use crate::models::settings::{SaveSettingsRequest, validate_size_limit};
use crate::models::shared::SuccessResponse;
use crate::state::AppState;
use crate::utils::{hash, jwt};

#[utoipa::path(
    post,
    path = "/save_settings",
    tag = "Settings",
    operation_id = "saveSettings",
    summary = "Update settings",
    description = "Owner only. Sets the upload size limit (at most 1 GiB). A `password` replaces the \
        access password and a `secret_key` the session signing key; an empty string removes \
        either, an absent field leaves it unchanged. When the signing key changes the caller \
        receives a fresh session cookie, other sessions have to log in again.",
    request_body = SaveSettingsRequest,
    responses(
        (status = 200, description = "Settings saved", body = SuccessResponse),
        (status = 400, description = "Invalid limit (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Not logged in (LOGIN_REQUIRED)", body = ErrorBody),
        (status = 403, description = "Caller is not the owner (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("session" = [])),
)]
#[instrument(skip(state, session, jar, payload), fields(user = %session.username))]
pub async fn save_settings(
    session: SessionUser,
    State(state): State<AppState>,
    jar: CookieJar,
    AppJson(payload): AppJson<SaveSettingsRequest>,
) -> Result<(CookieJar, Json<SuccessResponse>), AppError> {
    let owner = state.db.get_owner().await;
    if owner.as_deref() != Some(session.username.as_str()) {
        tracing::debug!("Settings update denied");
        return Err(AppError::PermissionDenied("Недостаточно прав".into()));
    }

    let (max_file_size, file_size_unit) = validate_size_limit(&payload)?;

    let password_hash = match payload.password.as_deref() {
        None => None,
        Some("") => Some(None),
        Some(password) => Some(Some(hash::hash_password(password).map_err(|e| {
            AppError::Internal(format!("Password hash error: {e}"))
        })?)),
    };
    let secret_key = payload
        .secret_key
        .as_deref()
        .map(|key| (!key.is_empty()).then(|| key.to_string()));

    let secret_changed = state
        .db
        .transaction(|docs| {
            let settings = &mut docs.settings;
            settings.max_file_size = max_file_size;
            settings.file_size_unit = file_size_unit;
            if let Some(password_hash) = password_hash {
                settings.password_hash = password_hash;
            }
            let mut changed = false;
            if let Some(secret_key) = secret_key {
                changed = settings.secret_key != secret_key;
                settings.secret_key = secret_key;
            }
            Ok::<_, AppError>(changed)
        })
        .await?;

    tracing::info!(
        max_file_size,
        unit = file_size_unit.as_str(),
        secret_changed,
        "Settings saved"
    );

    let jar = if secret_changed {
        let secret = state.session_secret().await;
        let token = jwt::sign(
            session.account_id,
            &session.username,
            &secret,
            state.config.auth.session_ttl_days,
        )
        .map_err(|e| AppError::Internal(format!("JWT sign error: {e}")))?;
        jar.add(session_cookie(token, state.config.auth.session_ttl_days))
    } else {
        jar
    };

    Ok((jar, Json(SuccessResponse::ok())))
}
