use async_trait::async_trait;
use redis::RedisResult;

use quoter_core::repository::RateLimiter;
use quoter_core::BoxError;

/// Shared rate-limit counters, so several service instances enforce one budget
#[derive(Clone)]
pub struct RedisClient {
    client: redis::Client,
}

impl RedisClient {
    pub async fn new(connection_string: &str) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(connection_string)?;
        Ok(Self { client })
    }

    pub async fn ping(&self) -> RedisResult<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        redis::cmd("PING").query_async(&mut conn).await
    }

    pub async fn check_rate_limit(&self, key: &str, limit: u64, window_seconds: u64) -> RedisResult<bool> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let key = format!("ratelimit:{}", key);

        // Fixed window: only the first hit sets the expiry
        let script = redis::Script::new(r#"
            local count = redis.call("INCR", KEYS[1])
            if count == 1 then
                redis.call("EXPIRE", KEYS[1], ARGV[1])
            end
            return count
        "#);

        let count: u64 = script.key(&key).arg(window_seconds).invoke_async(&mut conn).await?;

        Ok(count <= limit)
    }
}

#[async_trait]
impl RateLimiter for RedisClient {
    async fn check(
        &self,
        key: &str,
        limit: u64,
        window_seconds: u64,
    ) -> Result<bool, BoxError> {
        Ok(self.check_rate_limit(key, limit, window_seconds).await?)
    }
}
