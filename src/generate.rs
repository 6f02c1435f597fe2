use chrono::Local;
use rand::distributions::Alphanumeric;
use rand::rngs::ThreadRng;
use rand::Rng;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::ops::RangeInclusive;
use uuid::Uuid;

use crate::kind::DataKind;

/// Number of keys every generate route writes.
pub const BATCH_SIZE: usize = 10;

pub const NAMES: [&str; 8] = [
    "Alice", "Bob", "Charlie", "Diana", "Eve", "Frank", "Grace", "Henry",
];
pub const CITIES: [&str; 7] = [
    "New York", "London", "Tokyo", "Paris", "Sydney", "Mumbai", "Berlin",
];

pub const AGES: RangeInclusive<u8> = 18..=80;
pub const SCORES: RangeInclusive<u8> = 1..=100;

pub const STRING_LEN: usize = 20;
pub const MEMBER_LEN: usize = 8;
pub const ITEM_LEN: usize = 10;

pub const SET_MEMBERS: RangeInclusive<usize> = 3..=8;
pub const LIST_ITEMS: RangeInclusive<usize> = 3..=7;
pub const SORTED_SET_MEMBERS: RangeInclusive<usize> = 3..=6;
pub const SORTED_SET_SCORES: RangeInclusive<u32> = 1..=100;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// A generated key and the value written under it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record<V> {
    pub key: String,
    pub value: V,
}

/// The fixed shape stored in every generated hash.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Person {
    pub name: String,
    pub age: u8,
    pub city: String,
    pub score: u8,
    pub timestamp: String,
}

impl Person {
    /// Field/value pairs in the order they are written with HSET.
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("name", self.name.clone()),
            ("age", self.age.to_string()),
            ("city", self.city.clone()),
            ("score", self.score.to_string()),
            ("timestamp", self.timestamp.clone()),
        ]
    }
}

/// Builds a key such as `zset:1f0c9e2a`: the kind's prefix followed by the first 8 hex
/// characters of a random v4 UUID.
pub fn key(kind: DataKind) -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!("{}:{}", kind.prefix(), &id[..8])
}

/// Returns `len` characters drawn uniformly from `[A-Za-z0-9]`.
pub fn random_string<R: Rng>(rng: &mut R, len: usize) -> String {
    (0..len)
        .map(|_| char::from(rng.sample(Alphanumeric)))
        .collect()
}

pub fn random_person<R: Rng>(rng: &mut R) -> Person {
    Person {
        name: NAMES[rng.gen_range(0..NAMES.len())].to_string(),
        age: rng.gen_range(AGES),
        city: CITIES[rng.gen_range(0..CITIES.len())].to_string(),
        score: rng.gen_range(SCORES),
        timestamp: Local::now().format(TIMESTAMP_FORMAT).to_string(),
    }
}

pub fn string_value<R: Rng>(rng: &mut R) -> String {
    random_string(rng, STRING_LEN)
}

pub fn set_value<R: Rng>(rng: &mut R) -> Vec<String> {
    let count = rng.gen_range(SET_MEMBERS);
    distinct_strings(rng, count, MEMBER_LEN)
}

/// Items in generation order. They are written with LPUSH, so reading the list back yields
/// them reversed.
pub fn list_value<R: Rng>(rng: &mut R) -> Vec<String> {
    let count = rng.gen_range(LIST_ITEMS);
    (0..count).map(|_| random_string(rng, ITEM_LEN)).collect()
}

pub fn sorted_set_value<R: Rng>(rng: &mut R) -> BTreeMap<String, u32> {
    let count = rng.gen_range(SORTED_SET_MEMBERS);
    let mut members = BTreeMap::new();

    while members.len() < count {
        let member = random_string(rng, MEMBER_LEN);
        let score = rng.gen_range(SORTED_SET_SCORES);
        members.insert(member, score);
    }

    members
}

/// Generates [`BATCH_SIZE`] records of the given kind. Values come from `value`, keys from
/// [`key`].
pub fn batch<V, F>(kind: DataKind, mut value: F) -> Vec<Record<V>>
where
    F: FnMut(&mut ThreadRng) -> V,
{
    let mut rng = rand::thread_rng();

    (0..BATCH_SIZE)
        .map(|_| Record {
            key: key(kind),
            value: value(&mut rng),
        })
        .collect()
}

fn distinct_strings<R: Rng>(rng: &mut R, count: usize, len: usize) -> Vec<String> {
    let mut seen = HashSet::with_capacity(count);
    let mut strings = Vec::with_capacity(count);

    while strings.len() < count {
        let s = random_string(rng, len);
        if seen.insert(s.clone()) {
            strings.push(s);
        }
    }

    strings
}
