use super::RemoteBitOperate;
use crate::error::{BloomError, Result};
use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::{Client, Connection};
use std::future::Future;
use std::sync::{Mutex, MutexGuard};
use tokio::sync::Mutex as AsyncMutex;
use tracing::warn;

/// Redis-backed bitmap. Batches go out as one pipeline of `SETBIT`/`GETBIT`
/// commands; replies come back in command order.
///
/// Connections are opened lazily, one blocking and one multiplexed. A failed
/// call drops the connection it used so the next call reconnects.
pub struct RedisBitmap {
    client: Client,
    conn: Mutex<Option<Connection>>,
    async_conn: AsyncMutex<Option<MultiplexedConnection>>,
}

impl RedisBitmap {
    pub fn open(redis_url: &str) -> Result<Self> {
        let client = Client::open(redis_url).map_err(|e| {
            BloomError::Backend(format!("Redis connection error: {e}"))
        })?;
        Ok(Self {
            client,
            conn: Mutex::new(None),
            async_conn: AsyncMutex::new(None),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Option<Connection>>> {
        self.conn
            .lock()
            .map_err(|e| BloomError::LockError(format!("Redis lock error: {e}")))
    }

    fn with_conn<T>(
        &self,
        op: impl FnOnce(&mut Connection) -> redis::RedisResult<T>,
    ) -> Result<T> {
        let mut guard = self.lock()?;
        if guard.is_none() {
            *guard = Some(self.client.get_connection()?);
        }
        let Some(conn) = guard.as_mut() else {
            return Err(BloomError::Backend("Redis connection unavailable".into()));
        };
        match op(conn) {
            Ok(value) => Ok(value),
            Err(e) => {
                warn!(error = %e, "redis call failed, dropping connection");
                *guard = None;
                Err(e.into())
            }
        }
    }

    async fn async_conn(&self) -> Result<MultiplexedConnection> {
        let mut guard = self.async_conn.lock().await;
        if let Some(conn) = guard.as_ref() {
            return Ok(conn.clone());
        }
        let conn = self.client.get_multiplexed_async_connection().await?;
        *guard = Some(conn.clone());
        Ok(conn)
    }

    async fn with_async_conn<T, F, Fut>(&self, op: F) -> Result<T>
    where
        F: FnOnce(MultiplexedConnection) -> Fut + Send,
        Fut: Future<Output = redis::RedisResult<T>> + Send,
        T: Send,
    {
        let conn = self.async_conn().await?;
        match op(conn).await {
            Ok(value) => Ok(value),
            Err(e) => {
                warn!(error = %e, "async redis call failed, dropping connection");
                *self.async_conn.lock().await = None;
                Err(e.into())
            }
        }
    }
}

fn setbit_pipeline(key: &str, positions: &[u64]) -> redis::Pipeline {
    let mut pipe = redis::pipe();
    for &position in positions {
        pipe.cmd("SETBIT").arg(key).arg(position).arg(1);
    }
    pipe
}

fn getbit_pipeline(key: &str, positions: &[u64]) -> redis::Pipeline {
    let mut pipe = redis::pipe();
    for &position in positions {
        pipe.cmd("GETBIT").arg(key).arg(position);
    }
    pipe
}

fn to_bits(replies: Vec<i64>) -> Vec<bool> {
    replies.into_iter().map(|bit| bit == 1).collect()
}

#[async_trait]
impl RemoteBitOperate for RedisBitmap {
    fn set_bit(&self, key: &str, position: u64) -> Result<bool> {
        let prior: i64 = self.with_conn(|conn| {
            redis::cmd("SETBIT").arg(key).arg(position).arg(1).query(conn)
        })?;
        Ok(prior == 1)
    }

    fn get_bit(&self, key: &str, position: u64) -> Result<bool> {
        let bit: i64 = self
            .with_conn(|conn| redis::cmd("GETBIT").arg(key).arg(position).query(conn))?;
        Ok(bit == 1)
    }

    fn set_bits(&self, key: &str, positions: &[u64]) -> Result<Vec<bool>> {
        if positions.is_empty() {
            return Ok(Vec::new());
        }
        let pipe = setbit_pipeline(key, positions);
        let replies: Vec<i64> = self.with_conn(|conn| pipe.query(conn))?;
        Ok(to_bits(replies))
    }

    fn get_bits(&self, key: &str, positions: &[u64]) -> Result<Vec<bool>> {
        if positions.is_empty() {
            return Ok(Vec::new());
        }
        let pipe = getbit_pipeline(key, positions);
        let replies: Vec<i64> = self.with_conn(|conn| pipe.query(conn))?;
        Ok(to_bits(replies))
    }

    fn clear(&self, key: &str) -> Result<()> {
        let _: i64 = self.with_conn(|conn| redis::cmd("DEL").arg(key).query(conn))?;
        Ok(())
    }

    async fn set_bit_async(&self, key: &str, position: u64) -> Result<bool> {
        let prior: i64 = self
            .with_async_conn(|mut conn| async move {
                redis::cmd("SETBIT")
                    .arg(key)
                    .arg(position)
                    .arg(1)
                    .query_async(&mut conn)
                    .await
            })
            .await?;
        Ok(prior == 1)
    }

    async fn get_bit_async(&self, key: &str, position: u64) -> Result<bool> {
        let bit: i64 = self
            .with_async_conn(|mut conn| async move {
                redis::cmd("GETBIT").arg(key).arg(position).query_async(&mut conn).await
            })
            .await?;
        Ok(bit == 1)
    }

    async fn set_bits_async(&self, key: &str, positions: &[u64]) -> Result<Vec<bool>> {
        if positions.is_empty() {
            return Ok(Vec::new());
        }
        let pipe = setbit_pipeline(key, positions);
        let replies: Vec<i64> = self
            .with_async_conn(|mut conn| async move { pipe.query_async(&mut conn).await })
            .await?;
        Ok(to_bits(replies))
    }

    async fn get_bits_async(&self, key: &str, positions: &[u64]) -> Result<Vec<bool>> {
        if positions.is_empty() {
            return Ok(Vec::new());
        }
        let pipe = getbit_pipeline(key, positions);
        let replies: Vec<i64> = self
            .with_async_conn(|mut conn| async move { pipe.query_async(&mut conn).await })
            .await?;
        Ok(to_bits(replies))
    }

    async fn clear_async(&self, key: &str) -> Result<()> {
        let _: i64 = self
            .with_async_conn(|mut conn| async move {
                redis::cmd("DEL").arg(key).query_async(&mut conn).await
            })
            .await?;
        Ok(())
    }
}
