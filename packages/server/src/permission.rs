use crate::db::Documents;
use crate::extractors::session::SessionUser;
use crate::models::record::OwnershipRecord;

/// Whether `session` may delete an item guarded by `record`.
///
/// The owner may delete anything. Other users may delete only items whose
/// record names their account as owner or uploader.
pub fn can_delete(
    session: Option<&SessionUser>,
    owner: Option<&str>,
    record: Option<&OwnershipRecord>,
) -> bool {
    let Some(session) = session else {
        return false;
    };
    if owner == Some(session.username.as_str()) {
        return true;
    }
    record.is_some_and(|r| r.involves(session.account_id))
}

impl Documents {
    pub fn can_delete_file(&self, session: &SessionUser, filename: &str) -> bool {
        can_delete(Some(session), self.owner(), self.file_owners.get(filename))
    }

    pub fn can_delete_link(&self, session: &SessionUser, link: &str) -> bool {
        can_delete(Some(session), self.owner(), self.link_owners.get(link))
    }
}
