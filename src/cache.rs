use anyhow::Context;
use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands};
use uuid::Uuid;

/// Delete-by-key side channel used to drop cached user projections.
#[async_trait]
pub trait UserCache: Send + Sync {
    async fn delete(&self, key: &str) -> anyhow::Result<()>;
}

/// Cache key for a user projection.
pub fn user_key(id: Uuid) -> String {
    format!("user:{}", id)
}

#[derive(Clone)]
pub struct RedisCache {
    conn: ConnectionManager,
}

impl RedisCache {
    pub async fn connect(url: &str) -> anyhow::Result<Self> {
        let client = redis::Client::open(url).context("open redis client")?;
        let conn = ConnectionManager::new(client)
            .await
            .context("connect to redis")?;
        Ok(Self { conn })
    }
}

#[async_trait]
impl UserCache for RedisCache {
    async fn delete(&self, key: &str) -> anyhow::Result<()> {
        let mut conn = self.conn.clone();
        let _: () = conn
            .del(key)
            .await
            .with_context(|| format!("redis del {}", key))?;
        Ok(())
    }
}

/// Used when no cache is configured.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopCache;

#[async_trait]
impl UserCache for NoopCache {
    async fn delete(&self, _key: &str) -> anyhow::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::UserCache;

    /// Remembers every deleted key.
    #[derive(Default)]
    pub struct RecordingCache {
        deleted: Mutex<Vec<String>>,
    }

    impl RecordingCache {
        pub fn deleted(&self) -> Vec<String> {
            self.deleted.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl UserCache for RecordingCache {
        async fn delete(&self, key: &str) -> anyhow::Result<()> {
            self.deleted.lock().unwrap().push(key.to_string());
            Ok(())
        }
    }

    /// Fails every call, like an unreachable cache server.
    pub struct FailingCache;

    #[async_trait]
    impl UserCache for FailingCache {
        async fn delete(&self, key: &str) -> anyhow::Result<()> {
            anyhow::bail!("cache down while deleting {}", key)
        }
    }
}
