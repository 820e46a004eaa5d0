//! Redis coordination store implementation.
//!
//! Claims use `SADD`, which is atomic on its own. The bounded increment
//! and floored decrement need a read and a write to happen together, so
//! they run as Lua scripts.

use async_trait::async_trait;
use redis::{AsyncCommands, Script};
use tracing::debug;

use coupon_core::error::{AppError, ErrorKind};
use coupon_core::result::AppResult;
use coupon_core::traits::CoordinationStore;

use super::client::RedisClient;

/// Lua script for the bounded increment.
///
/// KEYS[1] = counter
/// ARGV[1] = bound
///
/// Returns the new value, or -1 if the counter is already at the bound.
const INCREMENT_BOUNDED_SCRIPT: &str = r#"
    local current = tonumber(redis.call('GET', KEYS[1]) or '0')
    local bound = tonumber(ARGV[1])
    if current >= bound then
        return -1
    end
    return redis.call('INCR', KEYS[1])
"#;

/// Lua script for the floored decrement.
///
/// KEYS[1] = counter
///
/// Returns the new value, or -1 if the counter is already zero.
const DECREMENT_FLOORED_SCRIPT: &str = r#"
    local current = tonumber(redis.call('GET', KEYS[1]) or '0')
    if current <= 0 then
        return -1
    end
    return redis.call('DECR', KEYS[1])
"#;

/// Redis-backed coordination store.
#[derive(Debug, Clone)]
pub struct RedisStore {
    /// Redis client.
    client: RedisClient,
    /// Compiled bounded increment script.
    increment_bounded: Script,
    /// Compiled floored decrement script.
    decrement_floored: Script,
}

impl RedisStore {
    /// Create a new Redis store.
    pub fn new(client: RedisClient) -> Self {
        Self {
            client,
            increment_bounded: Script::new(INCREMENT_BOUNDED_SCRIPT),
            decrement_floored: Script::new(DECREMENT_FLOORED_SCRIPT),
        }
    }

    /// Map a Redis error to an AppError.
    fn map_err(e: redis::RedisError) -> AppError {
        AppError::with_source(ErrorKind::Coordination, format!("Redis error: {e}"), e)
    }
}

/// Convert a script reply into `Some(value)` or `None` for the -1 sentinel.
fn script_reply(reply: i64) -> AppResult<Option<u64>> {
    match reply {
        -1 => Ok(None),
        n if n >= 0 => Ok(Some(n as u64)),
        other => Err(AppError::coordination(format!(
            "Unexpected counter script result: {other}"
        ))),
    }
}

#[async_trait]
impl CoordinationStore for RedisStore {
    async fn insert_if_absent(&self, key: &str, member: &str) -> AppResult<bool> {
        let full_key = self.client.prefixed_key(key);
        let mut conn = self.client.conn();
        let added: i64 = conn.sadd(&full_key, member).await.map_err(Self::map_err)?;
        Ok(added == 1)
    }

    async fn remove_member(&self, key: &str, member: &str) -> AppResult<bool> {
        let full_key = self.client.prefixed_key(key);
        let mut conn = self.client.conn();
        let removed: i64 = conn.srem(&full_key, member).await.map_err(Self::map_err)?;
        Ok(removed == 1)
    }

    async fn is_member(&self, key: &str, member: &str) -> AppResult<bool> {
        let full_key = self.client.prefixed_key(key);
        let mut conn = self.client.conn();
        let present: bool = conn
            .sismember(&full_key, member)
            .await
            .map_err(Self::map_err)?;
        Ok(present)
    }

    async fn cardinality(&self, key: &str) -> AppResult<u64> {
        let full_key = self.client.prefixed_key(key);
        let mut conn = self.client.conn();
        let count: u64 = conn.scard(&full_key).await.map_err(Self::map_err)?;
        Ok(count)
    }

    async fn increment_bounded(&self, key: &str, bound: u64) -> AppResult<Option<u64>> {
        let full_key = self.client.prefixed_key(key);
        let mut conn = self.client.conn();
        let reply: i64 = self
            .increment_bounded
            .key(&full_key)
            .arg(bound)
            .invoke_async(&mut conn)
            .await
            .map_err(Self::map_err)?;

        let result = script_reply(reply)?;
        debug!(key = %full_key, bound, ?result, "Bounded increment");
        Ok(result)
    }

    async fn decrement_floored(&self, key: &str) -> AppResult<Option<u64>> {
        let full_key = self.client.prefixed_key(key);
        let mut conn = self.client.conn();
        let reply: i64 = self
            .decrement_floored
            .key(&full_key)
            .invoke_async(&mut conn)
            .await
            .map_err(Self::map_err)?;
        script_reply(reply)
    }

    async fn counter_value(&self, key: &str) -> AppResult<u64> {
        let full_key = self.client.prefixed_key(key);
        let mut conn = self.client.conn();
        let value: Option<u64> = conn.get(&full_key).await.map_err(Self::map_err)?;
        Ok(value.unwrap_or(0))
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        let full_key = self.client.prefixed_key(key);
        let mut conn = self.client.conn();
        let _: () = conn.del(&full_key).await.map_err(Self::map_err)?;
        Ok(())
    }

    async fn health_check(&self) -> AppResult<bool> {
        let mut conn = self.client.conn();
        let pong: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(Self::map_err)?;
        Ok(pong == "PONG")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_reply_sentinel() {
        assert_eq!(script_reply(-1).unwrap(), None);
        assert_eq!(script_reply(0).unwrap(), Some(0));
        assert_eq!(script_reply(17).unwrap(), Some(17));
        assert!(script_reply(-5).is_err());
    }
}
