use std::sync::Arc;

use anyhow::Context;
use common::storage::UploadStore;
use common::storage::filesystem::FilesystemUploadStore;

use crate::config::AppConfig;
use crate::db::Database;
use crate::presence::PresenceTracker;
use crate::utils::net::HostResolver;

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub db: Database,
    pub uploads: Arc<dyn UploadStore>,
    /// Devices seen by this process. Empty after every restart.
    pub presence: PresenceTracker,
    pub resolver: HostResolver,
}

impl AppState {
    /// Open the state document and upload directory named by `config`.
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let state_path = config.storage.state_path();
        let db = Database::open(state_path.clone())
            .await
            .with_context(|| format!("Failed to open state document {}", state_path.display()))?;

        let uploads = FilesystemUploadStore::new(config.storage.upload_dir.clone())
            .await
            .with_context(|| {
                format!(
                    "Failed to prepare upload directory {}",
                    config.storage.upload_dir.display()
                )
            })?;

        let presence = PresenceTracker::new(config.presence.ttl_secs);
        let resolver = if config.presence.resolve_hostnames {
            HostResolver::system()
        } else {
            HostResolver::disabled()
        };

        Ok(Self {
            config,
            db,
            uploads: Arc::new(uploads),
            presence,
            resolver,
        })
    }

    /// Key used to sign and verify session tokens.
    pub async fn session_secret(&self) -> String {
        self.db
            .read(|docs| docs.settings.secret_key.clone())
            .await
            .unwrap_or_else(|| self.config.auth.jwt_secret.clone())
    }
}
