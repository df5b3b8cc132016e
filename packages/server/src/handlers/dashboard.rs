use axum::{Json, extract::State};
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::session::SessionUser;
use crate::models::dashboard::{
    DashboardResponse, FileInfo, LinkInfo, SettingsSummary, current_user_name,
};
use crate::models::device::ConnectedDevices;
use crate::state::AppState;
use crate::utils::net::local_ip;

#[utoipa::path(
    get,
    path = "/",
    tag = "Dashboard",
    operation_id = "dashboard",
    summary = "Main page data",
    description = "Returns the current user, stored files, saved links, recently seen devices, \
        the server's local address and the upload limits. Files and links carry their uploader \
        and whether the caller may delete them.",
    responses(
        (status = 200, description = "Dashboard", body = DashboardResponse),
        (status = 401, description = "Not logged in (LOGIN_REQUIRED)", body = ErrorBody),
    ),
    security(("session" = [])),
)]
#[instrument(skip(state, session), fields(user = %session.username))]
pub async fn index(
    session: SessionUser,
    State(state): State<AppState>,
) -> Result<Json<DashboardResponse>, AppError> {
    let stored = state.uploads.list().await?;
    let snapshot = state.presence.snapshot();
    let local_ip = local_ip().await;

    let response = state
        .db
        .read(|docs| DashboardResponse {
            username: current_user_name(docs, &session),
            is_owner: docs.is_owner(&session.username),
            files: stored
                .into_iter()
                .map(|f| FileInfo::new(docs, &session, f.name, f.size))
                .collect(),
            links: docs
                .links
                .iter()
                .map(|url| LinkInfo::new(docs, &session, url))
                .collect(),
            connected_devices: ConnectedDevices::new(snapshot, docs),
            local_ip,
            settings: SettingsSummary::new(docs),
        })
        .await;

    Ok(Json(response))
}
