use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};

use crate::analysis::services::Analyzer;
use crate::cache::{NoopCache, RedisCache, UserCache};
use crate::config::AppConfig;
use crate::users::repo::{InMemoryUserStore, PgUserStore, UserStore};
use crate::users::services::UserService;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: UserService,
    pub analyzer: Analyzer,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let cache: Arc<dyn UserCache> = match &config.redis_url {
            Some(url) => match RedisCache::connect(url).await {
                Ok(cache) => {
                    info!("redis cache connected");
                    Arc::new(cache)
                }
                Err(e) => {
                    warn!(error = %e, "redis unavailable; cache invalidation disabled");
                    Arc::new(NoopCache)
                }
            },
            None => {
                info!("REDIS_URL not set; cache invalidation disabled");
                Arc::new(NoopCache)
            }
        };

        let store: Arc<dyn UserStore> = match &config.database {
            Some(db_config) => {
                let db = sqlx::postgres::PgPoolOptions::new()
                    .max_connections(db_config.max_connections)
                    .connect(&db_config.url)
                    .await
                    .context("connect to database")?;

                if let Err(e) = sqlx::migrate!("./migrations").run(&db).await {
                    warn!(error = %e, "migration failed; continuing");
                }
                Arc::new(PgUserStore::new(db, cache))
            }
            None => {
                warn!("DATABASE_URL not set; users are kept in memory only");
                Arc::new(InMemoryUserStore::new(cache))
            }
        };

        let analyzer = Analyzer::new(config.analyzer.url.clone(), config.analyzer.timeout)?;

        Ok(Self::from_parts(config, UserService::new(store), analyzer))
    }

    pub fn from_parts(config: Arc<AppConfig>, users: UserService, analyzer: Analyzer) -> Self {
        Self {
            config,
            users,
            analyzer,
        }
    }

    /// In-memory users, no cache, analyzer pointed at the default endpoint.
    #[cfg(test)]
    pub fn fake() -> Self {
        Self::fake_with_analyzer(crate::config::DEFAULT_ANALYZER_URL)
    }

    #[cfg(test)]
    pub fn fake_with_analyzer(url: &str) -> Self {
        let store = Arc::new(InMemoryUserStore::new(Arc::new(NoopCache)));
        Self::fake_with(store, url)
    }

    /// Like `fake`, but backed by the given store.
    #[cfg(test)]
    pub fn fake_with_store(store: Arc<dyn UserStore>) -> Self {
        Self::fake_with(store, crate::config::DEFAULT_ANALYZER_URL)
    }

    #[cfg(test)]
    fn fake_with(store: Arc<dyn UserStore>, analyzer_url: &str) -> Self {
        let config = Arc::new(AppConfig::from_lookup(|_| None).expect("default config"));
        let analyzer = Analyzer::new(analyzer_url, std::time::Duration::from_secs(5))
            .expect("analyzer client");
        Self::from_parts(config, UserService::new(store), analyzer)
    }
}
