use std::convert::Infallible;

use axum::extract::{FromRequestParts, OptionalFromRequestParts};
use axum::http::HeaderMap;
use axum::http::request::Parts;
use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;
use crate::utils::jwt;

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "filechanger_session";

/// Logged-in user extracted from the session cookie.
///
/// Add this as a handler parameter to require a login; use
/// `Option<SessionUser>` where anonymous access is fine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionUser {
    pub account_id: Uuid,
    /// Display name the session was issued for.
    pub username: String,
}

impl SessionUser {
    /// Decode the session cookie in `headers`, if present and valid.
    pub async fn from_headers(headers: &HeaderMap, state: &AppState) -> Option<Self> {
        let jar = CookieJar::from_headers(headers);
        let token = jar.get(SESSION_COOKIE)?.value().to_owned();
        let secret = state.session_secret().await;

        match jwt::verify(&token, &secret) {
            Ok(claims) => Some(Self {
                account_id: claims.uid,
                username: claims.sub,
            }),
            Err(e) => {
                tracing::debug!(error = %e, "Ignoring invalid session cookie");
                None
            }
        }
    }
}

impl FromRequestParts<AppState> for SessionUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Self::from_headers(&parts.headers, state)
            .await
            .ok_or(AppError::LoginRequired)
    }
}

impl OptionalFromRequestParts<AppState> for SessionUser {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Option<Self>, Self::Rejection> {
        Ok(Self::from_headers(&parts.headers, state).await)
    }
}

/// Cookie carrying a freshly signed session token.
pub fn session_cookie(token: String, ttl_days: i64) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::days(ttl_days))
        .build()
}

/// Cookie that clears the session on the client.
pub fn removal_cookie() -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE).path("/").build()
}
