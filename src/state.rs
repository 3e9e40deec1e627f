use std::sync::Arc;

use crate::config::Config;
use crate::db::Store;
use crate::services::{
    Argon2Hasher, ArticleService, AuthService, ImageService, PasswordHasher,
    SeaOrmArticleService, SeaOrmAuthService,
};

/// Services shared by the HTTP layer, the scheduler and the CLI.
#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<Config>,

    pub store: Store,

    pub article_service: Arc<dyn ArticleService>,

    pub auth_service: Arc<dyn AuthService>,

    pub image_service: Arc<ImageService>,
}

impl SharedState {
    /// Opens the configured database and wires the services to it.
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        Self::with_store(config, store)
    }

    /// Wires the services to an already opened store.
    pub fn with_store(config: Config, store: Store) -> anyhow::Result<Self> {
        let hasher: Arc<dyn PasswordHasher> = Arc::new(Argon2Hasher::new(&config.security)?);

        let article_service = Arc::new(SeaOrmArticleService::new(store.clone()))
            as Arc<dyn ArticleService>;

        let auth_service = Arc::new(SeaOrmAuthService::new(
            store.clone(),
            hasher,
            &config.security,
        )) as Arc<dyn AuthService>;

        let image_service = Arc::new(ImageService::new(config.uploads.clone()));

        Ok(Self {
            config: Arc::new(config),
            store,
            article_service,
            auth_service,
            image_service,
        })
    }

    /// Seeds the admin account if the admin table is empty.
    pub async fn ensure_bootstrap_admin(&self) -> anyhow::Result<()> {
        let (email, password) = self.config.security.bootstrap_credentials();
        if let Some(user) = self
            .auth_service
            .ensure_bootstrap_admin(&email, &password)
            .await?
        {
            tracing::warn!(
                email = %user.email,
                "Created bootstrap admin account; change its password"
            );
        }
        Ok(())
    }
}
