use ::redis::{ErrorKind, InfoDict, RedisError, RedisResult};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};
use std::ops::Deref;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

use crate::store::KvStore;

const VERSION: &str = "7.2.4";

/// An in-process keyspace holding the same five data types as Redis.
///
/// It is cheap to clone: clones share the same state through reference counting, so a test can
/// keep a handle to inspect what the routes wrote. Failures can be injected with
/// [`MemoryStore::fail_after`].
#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<InnerStore>,
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        let state = State {
            keys: HashMap::new(),
            commands: 0,
            fail_after: None,
        };

        let inner = Arc::new(InnerStore {
            state: Mutex::new(state),
            started_at: Instant::now(),
        });

        Self { inner }
    }

    /// Lets the next `commands` commands succeed and fails every command after them.
    pub fn fail_after(self, commands: usize) -> MemoryStore {
        self.lock().state.fail_after = Some(commands);
        self
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Deref for MemoryStore {
    type Target = InnerStore;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

pub struct InnerStore {
    state: Mutex<State>,
    started_at: Instant,
}

impl InnerStore {
    pub fn lock(&self) -> InnerStoreLocked<'_> {
        // A panicking test thread must not hide the keyspace from the others.
        let state = self
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        InnerStoreLocked {
            state,
            started_at: self.started_at,
        }
    }
}

pub struct InnerStoreLocked<'a> {
    state: MutexGuard<'a, State>,
    started_at: Instant,
}

impl<'a> InnerStoreLocked<'a> {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.state.keys.get(key)
    }

    pub fn exists(&self, key: &str) -> bool {
        self.state.keys.contains_key(key)
    }

    pub fn size(&self) -> usize {
        self.state.keys.len()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.state.keys.keys()
    }

    /// Number of commands received so far, failed ones included.
    pub fn commands(&self) -> usize {
        self.state.commands
    }

    fn begin(&mut self) -> RedisResult<()> {
        self.state.commands += 1;

        match self.state.fail_after {
            Some(limit) if self.state.commands > limit => Err(RedisError::from((
                ErrorKind::IoError,
                "injected failure",
                format!("command #{} refused", self.state.commands),
            ))),
            _ => Ok(()),
        }
    }

    /// Returns the value at `key`, creating it with `empty` when missing. Fails with WRONGTYPE
    /// when the key holds another data type.
    fn entry(&mut self, key: &str, empty: fn() -> Value) -> RedisResult<&mut Value> {
        let value = self
            .state
            .keys
            .entry(key.to_string())
            .or_insert_with(empty);

        if std::mem::discriminant(value) != std::mem::discriminant(&empty()) {
            return Err(wrong_type());
        }

        Ok(value)
    }

    fn info(&self) -> String {
        format!(
            "# Server\r\nredis_version:{}\r\nuptime_in_seconds:{}\r\n\r\n\
             # Clients\r\nconnected_clients:1\r\n\r\n\
             # Memory\r\nused_memory_human:{}\r\n",
            VERSION,
            self.started_at.elapsed().as_secs(),
            human_bytes(self.used_memory()),
        )
    }

    /// Rough payload size in bytes.
    fn used_memory(&self) -> usize {
        self.state
            .keys
            .iter()
            .map(|(key, value)| key.len() + value.len())
            .sum()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Hash(HashMap<String, String>),
    Set(HashSet<String>),
    List(VecDeque<String>),
    SortedSet(HashMap<String, f64>),
}

impl Value {
    fn len(&self) -> usize {
        match self {
            Value::String(s) => s.len(),
            Value::Hash(fields) => fields.iter().map(|(k, v)| k.len() + v.len()).sum(),
            Value::Set(members) => members.iter().map(String::len).sum(),
            Value::List(items) => items.iter().map(String::len).sum(),
            Value::SortedSet(members) => members.keys().map(|m| m.len() + 8).sum(),
        }
    }
}

struct State {
    keys: HashMap<String, Value>,
    commands: usize,
    fail_after: Option<usize>,
}

fn wrong_type() -> RedisError {
    RedisError::from((
        ErrorKind::TypeError,
        "WRONGTYPE",
        "Operation against a key holding the wrong kind of value".to_string(),
    ))
}

fn human_bytes(bytes: usize) -> String {
    const UNITS: [&str; 4] = ["B", "K", "M", "G"];

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    format!("{:.2}{}", value, UNITS[unit])
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn ping(&self) -> RedisResult<()> {
        self.lock().begin()
    }

    async fn set_string(&self, key: &str, value: &str) -> RedisResult<()> {
        let mut store = self.lock();
        store.begin()?;

        // SET overwrites whatever the key held.
        store
            .state
            .keys
            .insert(key.to_string(), Value::String(value.to_string()));
        Ok(())
    }

    async fn set_hash(&self, key: &str, fields: &[(&str, String)]) -> RedisResult<()> {
        let mut store = self.lock();
        store.begin()?;

        if let Value::Hash(hash) = store.entry(key, || Value::Hash(HashMap::new()))? {
            for (field, value) in fields {
                hash.insert(field.to_string(), value.clone());
            }
        }
        Ok(())
    }

    async fn add_to_set(&self, key: &str, members: &[String]) -> RedisResult<()> {
        let mut store = self.lock();
        store.begin()?;

        if let Value::Set(set) = store.entry(key, || Value::Set(HashSet::new()))? {
            set.extend(members.iter().cloned());
        }
        Ok(())
    }

    async fn push_to_list(&self, key: &str, items: &[String]) -> RedisResult<()> {
        let mut store = self.lock();
        store.begin()?;

        if let Value::List(list) = store.entry(key, || Value::List(VecDeque::new()))? {
            for item in items {
                list.push_front(item.clone());
            }
        }
        Ok(())
    }

    async fn add_to_sorted_set(&self, key: &str, members: &[(u32, String)]) -> RedisResult<()> {
        let mut store = self.lock();
        store.begin()?;

        if let Value::SortedSet(zset) = store.entry(key, || Value::SortedSet(HashMap::new()))? {
            for (score, member) in members {
                zset.insert(member.clone(), f64::from(*score));
            }
        }
        Ok(())
    }

    async fn info(&self) -> RedisResult<InfoDict> {
        let mut store = self.lock();
        store.begin()?;

        Ok(InfoDict::new(&store.info()))
    }

    async fn db_size(&self) -> RedisResult<u64> {
        let mut store = self.lock();
        store.begin()?;

        Ok(store.size() as u64)
    }

    async fn flush_db(&self) -> RedisResult<()> {
        let mut store = self.lock();
        store.begin()?;

        store.state.keys.clear();
        Ok(())
    }
}
