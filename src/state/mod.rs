use std::sync::Arc;

use tracing::{info, warn};

use crate::config::Config;
use crate::db::{connection::init_db, MemoryStore, PgStore, PollStore, UserStore};
use crate::services::poll_service::PollService;
use crate::utils::auth::AuthProvider;
use crate::utils::error::AppResult;
use crate::utils::session::SessionKeys;

#[derive(Clone)]
pub struct AppState {
    pub polls: Arc<PollService>,
    pub auth: Arc<AuthProvider>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(
        poll_store: Arc<dyn PollStore>,
        user_store: Arc<dyn UserStore>,
        config: Config,
    ) -> AppResult<Self> {
        config.validate()?;
        let keys = SessionKeys::new(&config.session_secret, config.token_ttl_minutes)?;

        Ok(Self {
            polls: Arc::new(PollService::new(poll_store)),
            auth: Arc::new(AuthProvider::new(user_store, keys, config.bcrypt_cost)),
            config: Arc::new(config),
        })
    }

    pub fn in_memory(config: Config) -> AppResult<Self> {
        let store = Arc::new(MemoryStore::new());
        Self::new(store.clone(), store, config)
    }

    /// PostgreSQL when `DATABASE_URL` is configured, the in-memory store otherwise.
    pub async fn from_config(config: Config) -> AppResult<Self> {
        if config.database_url.is_none() {
            warn!("DATABASE_URL not set, using in-memory store; data is lost on shutdown");
            return Self::in_memory(config);
        }

        let pool = init_db(&config).await?;
        info!("Using PostgreSQL store");

        let store = Arc::new(PgStore::new(pool));
        Self::new(store.clone(), store, config)
    }
}
