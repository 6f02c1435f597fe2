use redis::InfoDict;
use serde::{Serialize, Serializer};

/// Reported in place of a field the server's INFO reply does not contain.
pub const NOT_AVAILABLE: &str = "N/A";

/// A statistic that may be missing from the INFO reply.
#[derive(Debug, Clone, PartialEq)]
pub enum Stat<T> {
    Value(T),
    NotAvailable,
}

impl<T> From<Option<T>> for Stat<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Stat::NotAvailable, Stat::Value)
    }
}

impl<T: Serialize> Serialize for Stat<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Stat::Value(value) => value.serialize(serializer),
            Stat::NotAvailable => serializer.serialize_str(NOT_AVAILABLE),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsSnapshot {
    pub total_keys: u64,
    pub used_memory: Stat<String>,
    pub connected_clients: Stat<u64>,
    pub redis_version: Stat<String>,
    pub uptime_in_seconds: Stat<u64>,
}

impl StatsSnapshot {
    /// Projects the INFO reply and the DBSIZE count into a snapshot.
    pub fn new(info: &InfoDict, total_keys: u64) -> StatsSnapshot {
        StatsSnapshot {
            total_keys,
            used_memory: info.get::<String>("used_memory_human").into(),
            connected_clients: number(info, "connected_clients").into(),
            redis_version: info.get::<String>("redis_version").into(),
            uptime_in_seconds: number(info, "uptime_in_seconds").into(),
        }
    }
}

fn number(info: &InfoDict, field: &str) -> Option<u64> {
    info.get::<String>(field)
        .and_then(|value| value.trim().parse().ok())
}
