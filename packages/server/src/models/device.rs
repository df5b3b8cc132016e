use std::collections::BTreeMap;
use std::net::IpAddr;

use serde::Serialize;

use crate::db::Documents;
use crate::identity::formatted_name_for_user;
use crate::presence::{DeviceClass, DeviceEntry, LAST_SEEN_FORMAT};

/// A recently seen device.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct DeviceView {
    /// Display name of the session the device used.
    #[schema(example = "Иванов Иван Иванович")]
    pub username: String,
    #[schema(example = "Компьютер")]
    pub device_type: DeviceClass,
    pub user_agent: String,
    /// Local time of the last request, `%d.%m.%Y %H:%M:%S`.
    #[schema(example = "01.05.2024 10:15:42")]
    pub last_seen: String,
    #[schema(example = "Иванов И.И.")]
    pub formatted_name: String,
}

impl DeviceView {
    pub fn new(entry: DeviceEntry, docs: &Documents) -> Self {
        Self {
            formatted_name: formatted_name_for_user(docs, &entry.username),
            last_seen: entry.last_seen.format(LAST_SEEN_FORMAT).to_string(),
            username: entry.username,
            device_type: entry.device_type,
            user_agent: entry.user_agent,
        }
    }
}

/// Devices seen within the presence window, keyed by address.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(transparent)]
pub struct ConnectedDevices(pub BTreeMap<String, DeviceView>);

impl ConnectedDevices {
    pub fn new(snapshot: BTreeMap<IpAddr, DeviceEntry>, docs: &Documents) -> Self {
        Self(
            snapshot
                .into_iter()
                .map(|(ip, entry)| (ip.to_string(), DeviceView::new(entry, docs)))
                .collect(),
        )
    }
}

/// A device with the names its address resolves to.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct DeviceInfoResponse {
    #[serde(flatten)]
    pub device: DeviceView,
    #[schema(example = "laptop")]
    pub hostname: String,
    #[schema(example = "laptop.home.lan")]
    pub fqdn: String,
    #[schema(example = "192.168.1.20")]
    pub ip: String,
}
