use std::sync::Arc;

use crate::auth::jwt::JwtKeys;
use crate::auth::repo::{PgUserRepository, UserRepository};
use crate::config::AppConfig;
use crate::contact::repo::{ContactRepository, PgContactRepository};
use crate::db;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub jwt: JwtKeys,
    pub users: Arc<dyn UserRepository>,
    pub contacts: Arc<dyn ContactRepository>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let db = db::connect(&config).await?;

        let users = Arc::new(PgUserRepository::new(db.clone())) as Arc<dyn UserRepository>;
        let contacts = Arc::new(PgContactRepository::new(db)) as Arc<dyn ContactRepository>;

        Ok(Self::from_parts(config, users, contacts))
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        users: Arc<dyn UserRepository>,
        contacts: Arc<dyn ContactRepository>,
    ) -> Self {
        let jwt = JwtKeys::from(&config.jwt);
        Self {
            config,
            jwt,
            users,
            contacts,
        }
    }
}
