use axum::extract::State;
use axum::response::Html;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, instrument};

use crate::error::{ApiError, ApiResult};
use crate::generate::{self, Person, Record};
use crate::kind::DataKind;
use crate::stats::StatsSnapshot;
use crate::store::KvStore;

const INDEX: &str = include_str!("../static/index.html");

/// State shared by every route: the store handle, if bootstrap managed to connect.
///
/// The handle is set once when the state is built and never replaced, so routes only need a
/// cheap clone of it.
#[derive(Clone)]
pub struct AppState {
    store: Option<Arc<dyn KvStore>>,
}

impl AppState {
    pub fn connected(store: Arc<dyn KvStore>) -> AppState {
        AppState { store: Some(store) }
    }

    /// Every data route answers with [`ApiError::ConnectionUnavailable`].
    pub fn unavailable() -> AppState {
        AppState { store: None }
    }

    pub fn is_available(&self) -> bool {
        self.store.is_some()
    }

    fn store(&self) -> ApiResult<&dyn KvStore> {
        self.store.as_deref().ok_or(ApiError::ConnectionUnavailable)
    }
}

#[derive(Debug, Serialize)]
pub struct Generated<V> {
    pub success: bool,
    pub data: Vec<Record<V>>,
    #[serde(rename = "type")]
    pub kind: DataKind,
}

impl<V> Generated<V> {
    fn new(kind: DataKind, data: Vec<Record<V>>) -> Json<Self> {
        info!("Wrote {} {} keys", data.len(), kind);

        Json(Generated {
            success: true,
            data,
            kind,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct Stats {
    pub success: bool,
    pub stats: StatsSnapshot,
}

#[derive(Debug, Serialize)]
pub struct Cleared {
    pub success: bool,
    pub message: &'static str,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route(&DataKind::Strings.route(), post(generate_strings))
        .route(&DataKind::Hashes.route(), post(generate_hashes))
        .route(&DataKind::Sets.route(), post(generate_sets))
        .route(&DataKind::Lists.route(), post(generate_lists))
        .route(&DataKind::SortedSets.route(), post(generate_sorted_sets))
        .route("/get_stats", get(get_stats))
        .route("/clear_all", post(clear_all))
        .with_state(state)
}

async fn index() -> Html<&'static str> {
    Html(INDEX)
}

// Each generate route writes its records one by one and stops at the first failure. Keys
// written before the failure stay in the store.

#[instrument(skip(state))]
async fn generate_strings(State(state): State<AppState>) -> ApiResult<Json<Generated<String>>> {
    let store = state.store()?;

    let records = generate::batch(DataKind::Strings, generate::string_value);
    for record in &records {
        store.set_string(&record.key, &record.value).await?;
    }

    Ok(Generated::new(DataKind::Strings, records))
}

#[instrument(skip(state))]
async fn generate_hashes(State(state): State<AppState>) -> ApiResult<Json<Generated<Person>>> {
    let store = state.store()?;

    let records = generate::batch(DataKind::Hashes, generate::random_person);
    for record in &records {
        store.set_hash(&record.key, &record.value.fields()).await?;
    }

    Ok(Generated::new(DataKind::Hashes, records))
}

#[instrument(skip(state))]
async fn generate_sets(State(state): State<AppState>) -> ApiResult<Json<Generated<Vec<String>>>> {
    let store = state.store()?;

    let records = generate::batch(DataKind::Sets, generate::set_value);
    for record in &records {
        store.add_to_set(&record.key, &record.value).await?;
    }

    Ok(Generated::new(DataKind::Sets, records))
}

#[instrument(skip(state))]
async fn generate_lists(State(state): State<AppState>) -> ApiResult<Json<Generated<Vec<String>>>> {
    let store = state.store()?;

    let records = generate::batch(DataKind::Lists, generate::list_value);
    for record in &records {
        store.push_to_list(&record.key, &record.value).await?;
    }

    Ok(Generated::new(DataKind::Lists, records))
}

#[instrument(skip(state))]
async fn generate_sorted_sets(
    State(state): State<AppState>,
) -> ApiResult<Json<Generated<BTreeMap<String, u32>>>> {
    let store = state.store()?;

    let records = generate::batch(DataKind::SortedSets, generate::sorted_set_value);
    for record in &records {
        let members: Vec<(u32, String)> = record
            .value
            .iter()
            .map(|(member, score)| (*score, member.clone()))
            .collect();
        store.add_to_sorted_set(&record.key, &members).await?;
    }

    Ok(Generated::new(DataKind::SortedSets, records))
}

#[instrument(skip(state))]
async fn get_stats(State(state): State<AppState>) -> ApiResult<Json<Stats>> {
    let store = state.store()?;

    let info = store.info().await?;
    let total_keys = store.db_size().await?;

    Ok(Json(Stats {
        success: true,
        stats: StatsSnapshot::new(&info, total_keys),
    }))
}

#[instrument(skip(state))]
async fn clear_all(State(state): State<AppState>) -> ApiResult<Json<Cleared>> {
    let store = state.store()?;

    store.flush_db().await?;
    info!("Flushed database");

    Ok(Json(Cleared {
        success: true,
        message: "All keys cleared from database",
    }))
}
