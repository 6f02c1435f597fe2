//! End to end checks against a real server. They expect a plaintext Redis on 127.0.0.1:6379
//! that may be flushed, so they are ignored by default:
//!
//! ```text
//! cargo test --test live -- --ignored
//! ```

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use redis::AsyncCommands;
use serde_json::Value;
use serial_test::serial;
use std::sync::Arc;
use tower::ServiceExt;

use redis_demo::config::RedisConfig;
use redis_demo::routes::{router, AppState};
use redis_demo::store::{KvStore, RedisStore};

async fn connect() -> (RedisStore, Router) {
    let store = RedisStore::connect(&RedisConfig::local(6379)).await.unwrap();

    // Since we use the same Redis instance for all tests, we flush it to start fresh.
    store.flush_db().await.unwrap();

    let app = router(AppState::connected(Arc::new(store.clone())));
    (store, app)
}

async fn send(app: &Router, method: &str, path: &str) -> (StatusCode, Value) {
    let req = Request::builder()
        .method(method)
        .uri(path)
        .body(Body::empty())
        .unwrap();

    let res = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let body = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .unwrap();

    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
#[serial]
#[ignore = "requires a Redis server on 127.0.0.1:6379"]
async fn generate_then_stats() {
    let (_, app) = connect().await;

    let (status, body) = send(&app, "POST", "/generate_strings").await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["success"], true);
    assert_eq!(body["type"], "strings");
    assert_eq!(body["data"].as_array().unwrap().len(), 10);

    let (status, stats) = send(&app, "GET", "/get_stats").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["stats"]["total_keys"], 10);
    assert!(stats["stats"]["redis_version"].is_string());
    assert!(stats["stats"]["connected_clients"].is_u64());
}

#[tokio::test]
#[serial]
#[ignore = "requires a Redis server on 127.0.0.1:6379"]
async fn written_values_match_response() {
    let (store, app) = connect().await;
    let client = redis::Client::open("redis://127.0.0.1:6379/").unwrap();
    let mut conn = client.get_multiplexed_async_connection().await.unwrap();

    let (_, body) = send(&app, "POST", "/generate_lists").await;
    for record in body["data"].as_array().unwrap() {
        let key = record["key"].as_str().unwrap();
        let mut expected: Vec<String> = record["value"]
            .as_array()
            .unwrap()
            .iter()
            .map(|item| item.as_str().unwrap().to_string())
            .collect();
        expected.reverse();

        let stored: Vec<String> = conn.lrange(key, 0, -1).await.unwrap();
        assert_eq!(stored, expected);
    }

    let (_, body) = send(&app, "POST", "/generate_sorted_sets").await;
    for record in body["data"].as_array().unwrap() {
        let key = record["key"].as_str().unwrap();
        for (member, score) in record["value"].as_object().unwrap() {
            let stored: f64 = conn.zscore(key, member).await.unwrap();
            assert_eq!(stored, score.as_f64().unwrap());
        }
    }

    assert_eq!(store.db_size().await.unwrap(), 20);
}

#[tokio::test]
#[serial]
#[ignore = "requires a Redis server on 127.0.0.1:6379"]
async fn clear_all_empties_database() {
    let (store, app) = connect().await;

    send(&app, "POST", "/generate_hashes").await;
    send(&app, "POST", "/generate_sets").await;
    assert_eq!(store.db_size().await.unwrap(), 20);

    let (status, body) = send(&app, "POST", "/clear_all").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "All keys cleared from database");

    let (_, stats) = send(&app, "GET", "/get_stats").await;
    assert_eq!(stats["stats"]["total_keys"], 0);
}
