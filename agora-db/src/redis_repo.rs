use redis::AsyncCommands;

#[derive(Clone)]
pub struct RedisClient {
    client: redis::Client,
}

impl RedisClient {
    pub async fn new(connection_string: &str) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(connection_string)?;
        Ok(Self { client })
    }

    /// Fixed-window rate limit: INCR the key, give it a TTL on first use,
    /// allow while the count stays at or under the limit.
    pub async fn check_rate_limit(
        &self,
        key: &str,
        max_requests: u32,
        window_seconds: i64,
    ) -> Result<bool, redis::RedisError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let count: u32 = conn.incr(key, 1).await?;
        if count == 1 {
            conn.expire::<_, i64>(key, window_seconds).await?;
        }

        Ok(count <= max_requests)
    }
}
