//! # Counters
//!
//! Statistics for the bot (`bot:rt`, `bot:ily`, ...). Redis support is compiled in with the
//! `redis` cargo feature; without it, or without a `services.redis` config section,
//! every increment is a no-op. The choice is made once, at startup.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::config::RedisConfig;
use crate::domain::traits::Counters;
use crate::domain::types::Counter;
use crate::strings::logs;

/// Used when no counters store is available.
pub struct NoopCounters;

#[async_trait]
impl Counters for NoopCounters {
    async fn increment(&self, _counter: Counter) {}
}

#[cfg(feature = "redis")]
pub struct RedisCounters {
    connection: redis::aio::ConnectionManager,
}

#[cfg(feature = "redis")]
impl RedisCounters {
    pub async fn connect(config: &RedisConfig) -> redis::RedisResult<Self> {
        let client = redis::Client::open(config.url())?;
        let connection = client.get_connection_manager().await?;
        Ok(Self { connection })
    }
}

#[cfg(feature = "redis")]
#[async_trait]
impl Counters for RedisCounters {
    async fn increment(&self, counter: Counter) {
        use redis::AsyncCommands;

        let key = counter.key();
        let mut connection = self.connection.clone();
        if let Err(e) = connection.incr::<_, _, i64>(&key, 1).await {
            tracing::warn!("{}", logs::counter_incr_fail(&key, &e.to_string()));
        }
    }
}

/// Picks the counters implementation for this run.
pub async fn connect(config: Option<&RedisConfig>) -> Arc<dyn Counters> {
    let Some(config) = config else {
        tracing::warn!("{}", logs::REDIS_NOT_CONFIGURED);
        return Arc::new(NoopCounters);
    };

    connect_redis(config).await
}

#[cfg(feature = "redis")]
async fn connect_redis(config: &RedisConfig) -> Arc<dyn Counters> {
    match RedisCounters::connect(config).await {
        Ok(counters) => {
            tracing::debug!("{}", logs::redis_connected(&config.url()));
            Arc::new(counters)
        }
        Err(e) => {
            tracing::warn!("{}", logs::redis_connect_fail(&config.url(), &e.to_string()));
            Arc::new(NoopCounters)
        }
    }
}

#[cfg(not(feature = "redis"))]
async fn connect_redis(_config: &RedisConfig) -> Arc<dyn Counters> {
    tracing::warn!("{}", logs::REDIS_NOT_COMPILED);
    Arc::new(NoopCounters)
}
