use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Redirect},
};
use axum_extra::extract::CookieJar;
use chrono::Local;
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::client::ClientAddr;
use crate::extractors::form::AppForm;
use crate::extractors::session::{SessionUser, removal_cookie, session_cookie};
use crate::identity::{RECORD_TIME_FORMAT, register_login};
use crate::models::auth::{
    LoginPageResponse, SetUsernameRequest, SetUsernameResponse, validate_set_username_request,
};
use crate::state::AppState;
use crate::utils::{hash, jwt};

const LOGIN_FIELDS: &[&str] = &["lastname", "firstname", "patronymic"];

#[utoipa::path(
    get,
    path = "/login",
    tag = "Auth",
    operation_id = "loginPage",
    summary = "Describe the login form",
    description = "Lists the fields `POST /set_username` accepts and reports whether an owner \
        exists, whether the access password is required and who the caller is logged in as.",
    responses(
        (status = 200, description = "Login form descriptor", body = LoginPageResponse),
    ),
)]
#[instrument(skip(state, session))]
pub async fn login_page(
    State(state): State<AppState>,
    session: Option<SessionUser>,
) -> Json<LoginPageResponse> {
    let (owner_exists, password_required) = state
        .db
        .read(|docs| (docs.owner.is_some(), docs.settings.password_hash.is_some()))
        .await;

    let mut fields = LOGIN_FIELDS.to_vec();
    if password_required {
        fields.push("password");
    }

    Json(LoginPageResponse {
        fields,
        owner_exists,
        password_required,
        logged_in_as: session.map(|s| s.username),
    })
}

#[utoipa::path(
    post,
    path = "/set_username",
    tag = "Auth",
    operation_id = "setUsername",
    summary = "Log in under a display name",
    description = "Records the user, issues a stable account id on the first login under a name \
        and sets the session cookie. The first user ever to log in becomes the owner. \
        `password` is checked only when an access password is configured.",
    request_body(content = SetUsernameRequest, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Logged in", body = SetUsernameResponse),
        (status = 400, description = "Missing name fields (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Wrong access password (INVALID_PASSWORD)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, jar, client, payload), fields(ip = %client.to_display()))]
pub async fn set_username(
    State(state): State<AppState>,
    client: ClientAddr,
    jar: CookieJar,
    AppForm(payload): AppForm<SetUsernameRequest>,
) -> Result<(CookieJar, Json<SetUsernameResponse>), AppError> {
    let fields = validate_set_username_request(&payload)?;

    let password_hash = state
        .db
        .read(|docs| docs.settings.password_hash.clone())
        .await;
    if let Some(password_hash) = password_hash {
        let supplied = payload.password.as_deref().unwrap_or_default();
        let is_valid = hash::verify_password(supplied, &password_hash)
            .map_err(|e| AppError::Internal(format!("Password verify error: {e}")))?;
        if !is_valid {
            tracing::debug!("Rejected login with wrong access password");
            return Err(AppError::InvalidPassword);
        }
    }

    let ip = client.to_display();
    let login_time = Local::now().format(RECORD_TIME_FORMAT).to_string();
    let outcome = state
        .db
        .transaction(|docs| Ok::<_, AppError>(register_login(docs, &fields, &ip, login_time)))
        .await?;

    if outcome.first_login {
        tracing::info!(username = %outcome.display_name, owner = outcome.is_owner, "New user");
    }

    let secret = state.session_secret().await;
    let token = jwt::sign(
        outcome.account_id,
        &outcome.display_name,
        &secret,
        state.config.auth.session_ttl_days,
    )
    .map_err(|e| AppError::Internal(format!("JWT sign error: {e}")))?;

    let jar = jar.add(session_cookie(token, state.config.auth.session_ttl_days));

    Ok((
        jar,
        Json(SetUsernameResponse {
            success: true,
            username: outcome.display_name,
            formatted_name: outcome.formatted_name,
            is_owner: outcome.is_owner,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/logout",
    tag = "Auth",
    operation_id = "logout",
    summary = "End the session",
    description = "Clears the session cookie and redirects to `/login`.",
    responses(
        (status = 303, description = "Redirect to the login page"),
    ),
)]
#[instrument(skip(jar))]
pub async fn logout(jar: CookieJar) -> impl IntoResponse {
    (jar.remove(removal_cookie()), Redirect::to("/login"))
}
