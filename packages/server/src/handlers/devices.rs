use std::net::IpAddr;

use axum::{
    Json,
    extract::{Path, State},
};
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::session::SessionUser;
use crate::models::device::{ConnectedDevices, DeviceInfoResponse, DeviceView};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/get_connected_devices",
    tag = "Devices",
    operation_id = "getConnectedDevices",
    summary = "List recently seen devices",
    description = "Returns every device that made a logged-in request within the presence window \
        (five minutes by default), keyed by address.",
    responses(
        (status = 200, description = "Presence snapshot", body = ConnectedDevices),
        (status = 401, description = "Not logged in (LOGIN_REQUIRED)", body = ErrorBody),
    ),
    security(("session" = [])),
)]
#[instrument(skip(state, _session))]
pub async fn get_connected_devices(
    _session: SessionUser,
    State(state): State<AppState>,
) -> Json<ConnectedDevices> {
    let snapshot = state.presence.snapshot();
    Json(
        state
            .db
            .read(|docs| ConnectedDevices::new(snapshot, docs))
            .await,
    )
}

#[utoipa::path(
    get,
    path = "/get_device_info/{ip}",
    tag = "Devices",
    operation_id = "getDeviceInfo",
    summary = "Describe one device",
    description = "Returns the presence entry for the address together with the host names a \
        reverse lookup finds for it (`Неизвестно` when none).",
    params(("ip" = String, Path, description = "Device address")),
    responses(
        (status = 200, description = "Device details", body = DeviceInfoResponse),
        (status = 400, description = "Malformed address (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Not logged in (LOGIN_REQUIRED)", body = ErrorBody),
        (status = 404, description = "Device not seen recently (NOT_FOUND)", body = ErrorBody),
    ),
    security(("session" = [])),
)]
#[instrument(skip(state, _session), fields(ip))]
pub async fn get_device_info(
    _session: SessionUser,
    State(state): State<AppState>,
    Path(ip): Path<String>,
) -> Result<Json<DeviceInfoResponse>, AppError> {
    let addr: IpAddr = ip
        .parse()
        .map_err(|_| AppError::Validation("Некорректный IP-адрес".into()))?;

    let entry = state
        .presence
        .get(addr)
        .ok_or_else(|| AppError::NotFound("Устройство не найдено".into()))?;
    let device = state.db.read(|docs| DeviceView::new(entry, docs)).await;
    let names = state.resolver.lookup(addr).await;

    Ok(Json(DeviceInfoResponse {
        device,
        hostname: names.hostname,
        fqdn: names.fqdn,
        ip: addr.to_string(),
    }))
}
