use anyhow::{Context, Result};
use chrono::Utc;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Revoked session tokens, kept until they would have expired anyway.
///
/// Backed by Redis when it is reachable at startup. Otherwise revocations are
/// kept in process memory, which is enough for a single instance and tests.
#[derive(Clone)]
pub struct JwtBlacklist {
    backend: Backend,
}

#[derive(Clone)]
enum Backend {
    Redis(ConnectionManager),
    Memory(Arc<Mutex<HashMap<String, i64>>>),
}

fn blacklist_key(user_id: &str, jwt: &str) -> String {
    format!("jwt:blacklist:{}:{}", user_id, jwt)
}

impl JwtBlacklist {
    pub async fn connect(redis_url: &str) -> Result<Self> {
        let client = redis::Client::open(redis_url).context("Failed to create Redis client")?;
        let mut conn = client
            .get_connection_manager()
            .await
            .context("Failed to get Redis connection")?;

        let _: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .context("Failed to ping Redis")?;

        Ok(Self {
            backend: Backend::Redis(conn),
        })
    }

    pub fn in_memory() -> Self {
        Self {
            backend: Backend::Memory(Arc::new(Mutex::new(HashMap::new()))),
        }
    }

    /// Blacklist `jwt` for `ttl_seconds`, at least one second.
    pub async fn add_jwt_to_blacklist(&self, user_id: &str, jwt: &str, ttl_seconds: u64) -> Result<()> {
        let key = blacklist_key(user_id, jwt);
        let now = Utc::now().timestamp();
        let ttl_seconds = ttl_seconds.max(1);

        match &self.backend {
            Backend::Redis(conn) => {
                let mut redis = conn.clone();
                let _: () = redis.set_ex(&key, now, ttl_seconds).await?;
            }
            Backend::Memory(entries) => {
                let mut entries = entries
                    .lock()
                    .map_err(|_| anyhow::anyhow!("Blacklist lock poisoned"))?;
                entries.retain(|_, expires_at| *expires_at >= now);
                entries.insert(key, now + ttl_seconds as i64);
            }
        }
        Ok(())
    }

    pub async fn check_jwt_in_blacklist(&self, user_id: &str, jwt: &str) -> Result<bool> {
        let key = blacklist_key(user_id, jwt);

        match &self.backend {
            Backend::Redis(conn) => {
                let mut redis = conn.clone();
                let exists: bool = redis.exists(&key).await?;
                Ok(exists)
            }
            Backend::Memory(entries) => {
                let entries = entries
                    .lock()
                    .map_err(|_| anyhow::anyhow!("Blacklist lock poisoned"))?;
                let now = Utc::now().timestamp();
                Ok(entries
                    .get(&key)
                    .is_some_and(|expires_at| *expires_at >= now))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_backend_remembers_revoked_tokens() {
        let blacklist = JwtBlacklist::in_memory();

        assert!(!blacklist.check_jwt_in_blacklist("u1", "token-a").await.unwrap());

        blacklist.add_jwt_to_blacklist("u1", "token-a", 60).await.unwrap();

        assert!(blacklist.check_jwt_in_blacklist("u1", "token-a").await.unwrap());
        assert!(!blacklist.check_jwt_in_blacklist("u1", "token-b").await.unwrap());
        assert!(!blacklist.check_jwt_in_blacklist("u2", "token-a").await.unwrap());
    }

    #[tokio::test]
    async fn zero_ttl_still_revokes_for_a_second() {
        let blacklist = JwtBlacklist::in_memory();

        blacklist.add_jwt_to_blacklist("u1", "token-a", 0).await.unwrap();

        assert!(blacklist.check_jwt_in_blacklist("u1", "token-a").await.unwrap());
    }

    #[tokio::test]
    async fn memory_backend_forgets_expired_entries() {
        let blacklist = JwtBlacklist::in_memory();

        blacklist.add_jwt_to_blacklist("u1", "token-a", 1).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(2100)).await;

        assert!(!blacklist.check_jwt_in_blacklist("u1", "token-a").await.unwrap());
    }
}
