use serde::Serialize;

use crate::db::Documents;
use crate::extractors::session::SessionUser;
use crate::identity::{UNKNOWN_NAME, formatted_name_for_account, formatted_name_for_user};
use crate::models::device::ConnectedDevices;
use crate::models::record::OwnershipRecord;
use crate::models::settings::SizeUnit;

/// An uploaded file as shown on the dashboard.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct FileInfo {
    #[schema(example = "report.pdf")]
    pub name: String,
    #[schema(example = 142857)]
    pub size: u64,
    /// Formatted name of the uploader.
    #[schema(example = "Иванов И.И.")]
    pub uploader: String,
    #[schema(example = "2024-05-01 10:00:00")]
    pub upload_time: String,
    /// Whether the current session may delete the file.
    pub can_delete: bool,
}

/// A saved link as shown on the dashboard.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct LinkInfo {
    #[schema(example = "https://example.com/article")]
    pub url: String,
    #[schema(example = "Иванов И.И.")]
    pub uploader: String,
    #[schema(example = "2024-05-01 10:00:00")]
    pub upload_time: String,
    pub can_delete: bool,
}

/// Current upload limits.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct SettingsSummary {
    #[schema(example = 16)]
    pub max_file_size: u64,
    pub file_size_unit: SizeUnit,
    /// Limit in bytes.
    #[schema(example = 16777216)]
    pub max_upload_bytes: u64,
    /// Whether logging in requires the access password.
    pub password_required: bool,
}

/// Everything the main page shows.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct DashboardResponse {
    /// Formatted name of the current user.
    #[schema(example = "Иванов И.И.")]
    pub username: String,
    pub is_owner: bool,
    pub files: Vec<FileInfo>,
    /// Links in the order they were saved.
    pub links: Vec<LinkInfo>,
    pub connected_devices: ConnectedDevices,
    /// Address other devices can reach this server at.
    #[schema(example = "192.168.1.10")]
    pub local_ip: String,
    pub settings: SettingsSummary,
}

fn uploader_and_time(docs: &Documents, record: Option<&OwnershipRecord>) -> (String, String) {
    match record {
        Some(r) => (
            formatted_name_for_account(docs, r.uploader),
            r.upload_time.clone(),
        ),
        None => (UNKNOWN_NAME.to_string(), UNKNOWN_NAME.to_string()),
    }
}

impl FileInfo {
    pub fn new(docs: &Documents, session: &SessionUser, name: String, size: u64) -> Self {
        let (uploader, upload_time) = uploader_and_time(docs, docs.file_owners.get(&name));
        Self {
            can_delete: docs.can_delete_file(session, &name),
            name,
            size,
            uploader,
            upload_time,
        }
    }
}

impl LinkInfo {
    pub fn new(docs: &Documents, session: &SessionUser, url: &str) -> Self {
        let (uploader, upload_time) = uploader_and_time(docs, docs.link_owners.get(url));
        Self {
            url: url.to_string(),
            uploader,
            upload_time,
            can_delete: docs.can_delete_link(session, url),
        }
    }
}

impl SettingsSummary {
    pub fn new(docs: &Documents) -> Self {
        let settings = &docs.settings;
        Self {
            max_file_size: settings.max_file_size,
            file_size_unit: settings.file_size_unit,
            max_upload_bytes: settings.max_upload_bytes(),
            password_required: settings.password_hash.is_some(),
        }
    }
}

/// Formatted name of the session's user, falling back to the raw display name.
pub fn current_user_name(docs: &Documents, session: &SessionUser) -> String {
    let name = formatted_name_for_user(docs, &session.username);
    if name == UNKNOWN_NAME {
        session.username.clone()
    } else {
        name
    }
}
