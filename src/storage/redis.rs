// src/storage/redis.rs

use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands, Client};
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use crate::config::RedisConfig;
use crate::error::{StorageError, StorageResult};
use crate::storage::StorageBackend;
use crate::storage_op;

#[derive(Clone)]
pub struct RedisStorage {
    connection: Arc<tokio::sync::Mutex<ConnectionManager>>,
    config: RedisConfig,
}

// ConnectionManager has no useful Debug output
impl fmt::Debug for RedisStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisStorage")
            .field("url", &self.config.url)
            .finish()
    }
}

impl RedisStorage {
    /// Creates a new Redis storage with the given configuration
    pub async fn new(config: RedisConfig) -> StorageResult<Self> {
        // Open the client - this doesn't actually connect to Redis yet
        let client = Client::open(config.url.as_str())
            .map_err(|e| StorageError::RedisConnection(e.to_string()))?;

        let connection_future = ConnectionManager::new(client);

        let connection_manager =
            match tokio::time::timeout(config.connection_timeout, connection_future).await {
                Ok(result) => result.map_err(|e| StorageError::RedisConnection(e.to_string()))?,
                Err(_) => {
                    return Err(StorageError::RedisConnection(format!(
                        "Connection to Redis at {} timed out after {:?}",
                        config.url, config.connection_timeout
                    )));
                }
            };

        Ok(Self {
            connection: Arc::new(tokio::sync::Mutex::new(connection_manager)),
            config,
        })
    }

    /// Ping Redis to check health with timeout
    pub async fn ping(&self) -> StorageResult<()> {
        let mut conn = self.connection.lock().await;
        let ping_future = redis::AsyncCommands::ping::<String>(&mut *conn);

        let result = match tokio::time::timeout(self.config.connection_timeout, ping_future).await {
            Ok(inner_result) => inner_result?,
            Err(_) => {
                return Err(StorageError::RedisCommand(format!(
                    "Redis PING operation timed out after {:?}",
                    self.config.connection_timeout
                )));
            }
        };

        if result == "PONG" {
            Ok(())
        } else {
            Err(StorageError::RedisCommand(format!(
                "Unexpected response from Redis PING: {}",
                result
            )))
        }
    }
}

#[async_trait]
impl StorageBackend for RedisStorage {
    type Config = RedisConfig;

    async fn new(config: Self::Config) -> StorageResult<Self> {
        Self::new(config).await
    }

    async fn get(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
        let started = Instant::now();
        let mut conn = self.connection.lock().await;
        let result: StorageResult<Option<Vec<u8>>> =
            conn.get(key).await.map_err(StorageError::from);

        storage_op!("get", key, result, started.elapsed().as_millis() as u64);
        result
    }

    async fn set(&self, key: &str, value: &[u8]) -> StorageResult<()> {
        let started = Instant::now();
        let mut conn = self.connection.lock().await;
        let result: StorageResult<()> = conn.set(key, value).await.map_err(StorageError::from);

        storage_op!("set", key, result, started.elapsed().as_millis() as u64);
        result
    }

    async fn delete(&self, key: &str) -> StorageResult<bool> {
        let started = Instant::now();
        let mut conn = self.connection.lock().await;
        let result: StorageResult<i64> = conn.del(key).await.map_err(StorageError::from);

        storage_op!("delete", key, result, started.elapsed().as_millis() as u64);
        Ok(result? > 0)
    }
}
