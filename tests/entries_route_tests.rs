use axum::{
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use medlex::config::SourcesConfig;
use medlex::server::router::{MedlexState, medlex_router};
use serde_json::Value;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::time::SystemTime;
use tokio::fs;
use tower::ServiceExt;
use url::Url;

fn dead_sources() -> SourcesConfig {
    let dead = Url::parse("http://127.0.0.1:9").unwrap();
    SourcesConfig {
        clinical_tables_base: dead.clone(),
        medlineplus_base: dead.clone(),
        rxnorm_base: dead.clone(),
        openfda_url: dead.clone(),
        umls_base: dead,
        umls_api_key: None,
        request_timeout_secs: 2,
    }
}

async fn temp_app() -> (axum::Router, sqlx::SqlitePool, std::path::PathBuf) {
    let tmp_dir = std::env::temp_dir();
    let mut hasher = DefaultHasher::new();
    SystemTime::now().hash(&mut hasher);
    std::process::id().hash(&mut hasher);
    let db_path = tmp_dir.join(format!("medlex_entries_{}.sqlite", hasher.finish()));
    let database_url = format!("sqlite:{}", db_path.to_str().unwrap());

    let pool = medlex::db::connect(&database_url).await.unwrap();
    let state = MedlexState::new(pool.clone(), dead_sources());
    (medlex_router(state), pool, db_path)
}

async fn cleanup(pool: sqlx::SqlitePool, db_path: std::path::PathBuf) {
    pool.close().await;
    let wal_path = std::path::PathBuf::from(format!("{}-wal", db_path.to_string_lossy()));
    let shm_path = std::path::PathBuf::from(format!("{}-shm", db_path.to_string_lossy()));
    let _ = fs::remove_file(&wal_path).await;
    let _ = fs::remove_file(&shm_path).await;
    fs::remove_file(&db_path).await.unwrap();
}

async fn send(app: &axum::Router, method: &str, uri: &str, body: &str) -> (StatusCode, Value) {
    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .expect("failed to build request"),
        )
        .await
        .expect("request failed");
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    let value = serde_json::from_slice(&bytes).expect("response body was not json");
    (status, value)
}

#[tokio::test]
async fn add_then_duplicate_then_remove_roundtrip() {
    let (app, pool, db_path) = temp_app().await;

    let entry = r#"{"entry_type": "abbreviation", "keyword": "ROSC", "definition": "Return of Spontaneous Circulation"}"#;

    // 1. First add succeeds.
    let (status, body) = send(&app, "POST", "/v1/entries", entry).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["entry_type"], "abbreviation");
    assert_eq!(
        body["message"],
        "Added abbreviation: ROSC -> Return of Spontaneous Circulation"
    );

    // 2. Identical add is rejected with a conflict.
    let (status, body) = send(&app, "POST", "/v1/entries", entry).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);
    assert_eq!(
        body["message"],
        "Entry already exists: ROSC -> Return of Spontaneous Circulation"
    );

    // 3. The added entry shows up in lookups.
    let (status, body) = send(&app, "POST", "/v1/lookup", r#"{"keywords": ["ROSC"]}"#).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body[0]["abbreviations"],
        serde_json::json!(["Return of Spontaneous Circulation"])
    );

    // 4. Remove with a differing definition -> 404.
    let (status, body) = send(
        &app,
        "DELETE",
        "/v1/entries",
        r#"{"entry_type": "abbreviation", "keyword": "ROSC", "definition": "Return of Circulation"}"#,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);

    // 5. Exact remove succeeds (case-insensitively).
    let (status, body) = send(
        &app,
        "DELETE",
        "/v1/entries",
        r#"{"entry_type": "abbreviation", "keyword": "rosc", "definition": "return of spontaneous circulation"}"#,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    // 6. Removing again -> 404.
    let (status, _) = send(&app, "DELETE", "/v1/entries", entry).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    cleanup(pool, db_path).await;
}

#[tokio::test]
async fn add_rejects_blank_fields() {
    let (app, pool, db_path) = temp_app().await;

    let (status, body) = send(
        &app,
        "POST",
        "/v1/entries",
        r#"{"entry_type": "term", "keyword": "  ", "definition": "something"}"#,
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Both keyword and definition must be non-empty.");

    cleanup(pool, db_path).await;
}

#[tokio::test]
async fn seeded_rows_are_protected_from_removal() {
    let (app, pool, db_path) = temp_app().await;

    sqlx::query("INSERT INTO abbreviations (abbreviation, meaning, source) VALUES (?1, ?2, 'csv')")
        .bind("ABG")
        .bind("Arterial Blood Gas")
        .execute(&pool)
        .await
        .unwrap();

    let (status, body) = send(
        &app,
        "DELETE",
        "/v1/entries",
        r#"{"entry_type": "abbreviation", "keyword": "ABG", "definition": "Arterial Blood Gas"}"#,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["success"], false);
    assert_eq!(
        body["message"],
        "Cannot remove built-in entries. Only custom-added entries can be removed."
    );

    cleanup(pool, db_path).await;
}

#[tokio::test]
async fn custom_terms_are_added_to_their_own_table() {
    let (app, pool, db_path) = temp_app().await;

    let (status, body) = send(
        &app,
        "POST",
        "/v1/entries",
        r#"{"entry_type": "term", "keyword": "Troponin I", "definition": "Cardiac muscle protein used as an infarction marker."}"#,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["entry_type"], "term");

    // Substring lookup via the lookup route.
    let (status, body) = send(&app, "POST", "/v1/lookup", r#"{"keywords": ["troponin"]}"#).await;
    assert_eq!(status, StatusCode::OK);
    let defs = body[0]["custom_definitions"]
        .as_array()
        .expect("custom_definitions present");
    assert_eq!(defs.len(), 1);

    cleanup(pool, db_path).await;
}
