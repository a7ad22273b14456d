use redis::{aio::MultiplexedConnection, AsyncCommands, Client};

#[derive(Clone)]
pub struct RedisClient {
    pub conn: MultiplexedConnection,
}

impl RedisClient {
    pub async fn new(redis_url: &str) -> redis::RedisResult<Self> {
        let client = Client::open(redis_url)?;
        let conn = client.get_multiplexed_tokio_connection().await?;
        Ok(RedisClient { conn })
    }

    /// JSON пользователя, который провайдер входа положил под `session:<token>`.
    pub async fn get_session(&self, token: &str) -> redis::RedisResult<Option<String>> {
        let key = format!("session:{}", token);
        let mut conn = self.conn.clone();
        conn.get(key).await
    }
}
