//! The store seam: every route talks to the database through [`KvStore`].
//!
//! [`redis::RedisStore`] is the real backend, [`memory::MemoryStore`] an in-process stand-in
//! used by the tests and by `--in-memory` mode.

pub mod memory;
pub mod redis;

use ::redis::{InfoDict, RedisResult};
use async_trait::async_trait;

pub use self::memory::MemoryStore;
pub use self::redis::RedisStore;

#[async_trait]
pub trait KvStore: Send + Sync {
    async fn ping(&self) -> RedisResult<()>;

    /// SET `key` `value`
    async fn set_string(&self, key: &str, value: &str) -> RedisResult<()>;

    /// HSET `key` with every field/value pair.
    async fn set_hash(&self, key: &str, fields: &[(&str, String)]) -> RedisResult<()>;

    /// SADD `key` with every member.
    async fn add_to_set(&self, key: &str, members: &[String]) -> RedisResult<()>;

    /// LPUSH `key` with every item, so the last item ends up at the head of the list.
    async fn push_to_list(&self, key: &str, items: &[String]) -> RedisResult<()>;

    /// ZADD `key` with every `(score, member)` pair.
    async fn add_to_sorted_set(&self, key: &str, members: &[(u32, String)]) -> RedisResult<()>;

    async fn info(&self) -> RedisResult<InfoDict>;

    async fn db_size(&self) -> RedisResult<u64>;

    /// FLUSHDB: removes every key of the selected database.
    async fn flush_db(&self) -> RedisResult<()>;
}
