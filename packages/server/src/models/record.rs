use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who created an uploaded file or saved link, and when.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnershipRecord {
    pub owner: Uuid,
    pub uploader: Uuid,
    /// Local time of creation, `%Y-%m-%d %H:%M:%S`.
    pub upload_time: String,
}

impl OwnershipRecord {
    /// Record for an item created by `account_id`, who is both owner and uploader.
    pub fn created_by(account_id: Uuid, upload_time: String) -> Self {
        Self {
            owner: account_id,
            uploader: account_id,
            upload_time,
        }
    }

    pub fn involves(&self, account_id: Uuid) -> bool {
        self.owner == account_id || self.uploader == account_id
    }
}
