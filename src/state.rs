use sea_orm::{DatabaseConnection, DatabaseTransaction};
use std::sync::Arc;

use crate::auth::JwtManager;
use crate::config::Config;
use crate::database::begin_scoped;
use crate::errors::ServiceResult;
use crate::policy::Actor;
use crate::redis_service::JwtBlacklist;
use crate::storage::FileStorage;

/// Shared handles cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub jwt: Arc<JwtManager>,
    pub blacklist: JwtBlacklist,
    pub storage: Arc<FileStorage>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(
        db: DatabaseConnection,
        blacklist: JwtBlacklist,
        storage: FileStorage,
        config: Config,
    ) -> Self {
        Self {
            db,
            jwt: Arc::new(JwtManager::new(&config.jwt_secret)),
            blacklist,
            storage: Arc::new(storage),
            config: Arc::new(config),
        }
    }

    pub fn session_role(&self) -> Option<&str> {
        self.config.db_session_role.as_deref()
    }

    /// Opens a transaction bound to `actor` for row-level security.
    pub async fn scoped(&self, actor: &Actor) -> ServiceResult<DatabaseTransaction> {
        Ok(begin_scoped(&self.db, actor, self.session_role()).await?)
    }
}
