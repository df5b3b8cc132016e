//! Device presence tracking.
//!
//! Every request from a logged-in session overwrites the entry for its
//! source address. Reads sweep entries that have been idle for the
//! configured TTL (five minutes by default).

use std::collections::BTreeMap;
use std::net::IpAddr;
use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::header::USER_AGENT;
use axum::middleware::Next;
use axum::response::Response;
use chrono::{DateTime, Duration, Local};
use dashmap::DashMap;
use serde::Serialize;
use tracing::debug;

use crate::extractors::client::ClientAddr;
use crate::extractors::session::SessionUser;
use crate::state::AppState;

/// Format of `last_seen` in responses.
pub const LAST_SEEN_FORMAT: &str = "%d.%m.%Y %H:%M:%S";

/// Recorded when a request carries no user agent.
pub const UNKNOWN_USER_AGENT: &str = "Unknown";

/// User-agent fragments that mark a mobile device.
const MOBILE_MARKERS: &[&str] = &[
    "Mobile",
    "Android",
    "iPhone",
    "iPad",
    "iPod",
    "Windows Phone",
    "BlackBerry",
    "Opera Mini",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub enum DeviceClass {
    #[serde(rename = "Мобильное устройство")]
    Mobile,
    #[serde(rename = "Компьютер")]
    Desktop,
}

impl DeviceClass {
    pub fn from_user_agent(user_agent: &str) -> Self {
        if MOBILE_MARKERS.iter().any(|m| user_agent.contains(m)) {
            Self::Mobile
        } else {
            Self::Desktop
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceEntry {
    /// Display name of the session that made the request.
    pub username: String,
    pub device_type: DeviceClass,
    pub user_agent: String,
    pub last_seen: DateTime<Local>,
}

/// Process-scoped map of recently seen devices. Cheap to clone.
#[derive(Clone)]
pub struct PresenceTracker {
    devices: Arc<DashMap<IpAddr, DeviceEntry>>,
    ttl: Duration,
}

impl PresenceTracker {
    pub fn new(ttl_secs: u64) -> Self {
        Self {
            devices: Arc::new(DashMap::new()),
            ttl: Duration::seconds(i64::try_from(ttl_secs).unwrap_or(i64::MAX)),
        }
    }

    /// Record a request from `addr` made now.
    pub fn record(&self, addr: IpAddr, username: &str, user_agent: Option<&str>) {
        self.record_at(addr, username, user_agent, Local::now());
    }

    pub fn record_at(
        &self,
        addr: IpAddr,
        username: &str,
        user_agent: Option<&str>,
        seen_at: DateTime<Local>,
    ) {
        let user_agent = user_agent.unwrap_or(UNKNOWN_USER_AGENT);
        self.devices.insert(
            addr,
            DeviceEntry {
                username: username.to_string(),
                device_type: DeviceClass::from_user_agent(user_agent),
                user_agent: user_agent.to_string(),
                last_seen: seen_at,
            },
        );
    }

    /// Devices seen within the TTL, ordered by address.
    pub fn snapshot(&self) -> BTreeMap<IpAddr, DeviceEntry> {
        self.snapshot_at(Local::now())
    }

    pub fn snapshot_at(&self, now: DateTime<Local>) -> BTreeMap<IpAddr, DeviceEntry> {
        self.prune(now);
        self.devices
            .iter()
            .map(|e| (*e.key(), e.value().clone()))
            .collect()
    }

    /// The entry for `addr`, if seen within the TTL.
    pub fn get(&self, addr: IpAddr) -> Option<DeviceEntry> {
        self.get_at(addr, Local::now())
    }

    pub fn get_at(&self, addr: IpAddr, now: DateTime<Local>) -> Option<DeviceEntry> {
        self.devices
            .get(&addr)
            .map(|e| e.value().clone())
            .filter(|e| self.is_fresh(e, now))
    }

    fn is_fresh(&self, entry: &DeviceEntry, now: DateTime<Local>) -> bool {
        now.signed_duration_since(entry.last_seen) < self.ttl
    }

    fn prune(&self, now: DateTime<Local>) {
        let before = self.devices.len();
        self.devices.retain(|_, e| self.is_fresh(e, now));
        let removed = before.saturating_sub(self.devices.len());
        if removed > 0 {
            debug!(removed, "Pruned idle devices");
        }
    }
}

/// Middleware recording the device behind every logged-in request.
pub async fn track_presence(State(state): State<AppState>, req: Request, next: Next) -> Response {
    if let ClientAddr(Some(ip)) = ClientAddr::from_extensions(req.extensions())
        && (state.config.presence.track_loopback || !ip.is_loopback())
        && let Some(session) = SessionUser::from_headers(req.headers(), &state).await
    {
        let user_agent = req.headers().get(USER_AGENT).and_then(|v| v.to_str().ok());
        state.presence.record(ip, &session.username, user_agent);
    }

    next.run(req).await
}
