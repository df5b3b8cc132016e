//! Transactional state store.
//!
//! All persistent bookkeeping (users, owner, file and link records, settings)
//! lives in one JSON document. The document is cached in memory; every
//! mutation runs on a copy that is persisted before it replaces the cached
//! version, so a failed write leaves both disk and memory unchanged and the
//! link list can never drift from the link records.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use common::storage::{StorageError, json};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::record::OwnershipRecord;
use crate::models::settings::Settings;
use crate::models::user::User;

/// The persisted state document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Documents {
    /// Display name of the designated owner.
    #[serde(default)]
    pub owner: Option<String>,
    /// Users keyed by display name.
    #[serde(default)]
    pub users: BTreeMap<String, User>,
    /// File records keyed by stored filename.
    #[serde(default)]
    pub file_owners: BTreeMap<String, OwnershipRecord>,
    /// Saved links in insertion order, without duplicates.
    #[serde(default)]
    pub links: Vec<String>,
    /// Link records keyed by URL.
    #[serde(default)]
    pub link_owners: BTreeMap<String, OwnershipRecord>,
    #[serde(default)]
    pub settings: Settings,
}

impl Documents {
    pub fn owner(&self) -> Option<&str> {
        self.owner.as_deref()
    }

    /// Designate `username` as owner unless an owner already exists.
    ///
    /// Returns `true` if the owner was set by this call.
    pub fn set_owner_if_absent(&mut self, username: &str) -> bool {
        if self.owner.is_some() {
            return false;
        }
        self.owner = Some(username.to_string());
        true
    }

    pub fn is_owner(&self, username: &str) -> bool {
        self.owner() == Some(username)
    }

    pub fn find_user_by_account(&self, account_id: Uuid) -> Option<&User> {
        self.users.values().find(|u| u.account_id == account_id)
    }
}

/// Handle to the state document. Cheap to clone.
#[derive(Clone)]
pub struct Database {
    path: Arc<PathBuf>,
    docs: Arc<RwLock<Documents>>,
}

impl Database {
    /// Open the document at `path`, starting empty if it does not exist.
    pub async fn open(path: PathBuf) -> Result<Self, StorageError> {
        let docs = json::load(&path, Documents::default()).await?;
        Ok(Self {
            path: Arc::new(path),
            docs: Arc::new(RwLock::new(docs)),
        })
    }

    /// Run `f` against the current document.
    pub async fn read<R>(&self, f: impl FnOnce(&Documents) -> R) -> R {
        let docs = self.docs.read().await;
        f(&docs)
    }

    /// Apply `f` to a copy of the document and commit it.
    ///
    /// If `f` fails nothing is written. Writers are serialized; readers see
    /// either the previous or the committed document.
    pub async fn transaction<R, E>(
        &self,
        f: impl FnOnce(&mut Documents) -> Result<R, E>,
    ) -> Result<R, E>
    where
        E: From<StorageError>,
    {
        let mut docs = self.docs.write().await;
        let mut draft = docs.clone();
        let out = f(&mut draft)?;
        if draft != *docs {
            json::save(&self.path, &draft).await?;
            *docs = draft;
        }
        Ok(out)
    }

    /// Display name of the designated owner.
    pub async fn get_owner(&self) -> Option<String> {
        self.read(|docs| docs.owner.clone()).await
    }
}
