use medlex::StoreError;
use medlex::db::{EntryType, TermStore};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::time::SystemTime;
use tokio::fs;

async fn temp_store() -> (TermStore, sqlx::SqlitePool, std::path::PathBuf) {
    let tmp_dir = std::env::temp_dir();
    let mut hasher = DefaultHasher::new();
    SystemTime::now().hash(&mut hasher);
    std::process::id().hash(&mut hasher);
    let db_file_name = format!("medlex_store_{}.sqlite", hasher.finish());
    let db_path = tmp_dir.join(db_file_name);
    let database_url = format!("sqlite:{}", db_path.to_str().unwrap());

    let pool = medlex::db::connect(&database_url).await.unwrap();
    (TermStore::new(pool.clone()), pool, db_path)
}

async fn cleanup(pool: sqlx::SqlitePool, db_path: std::path::PathBuf) {
    pool.close().await;
    let wal_path = std::path::PathBuf::from(format!("{}-wal", db_path.to_string_lossy()));
    let shm_path = std::path::PathBuf::from(format!("{}-shm", db_path.to_string_lossy()));
    let _ = fs::remove_file(&wal_path).await;
    let _ = fs::remove_file(&shm_path).await;
    fs::remove_file(&db_path).await.unwrap();
}

#[tokio::test]
async fn add_is_rejected_on_second_identical_call() {
    let (store, pool, db_path) = temp_store().await;

    // 1. First add succeeds and returns the trimmed pair.
    let (keyword, definition) = store
        .add(
            EntryType::Abbreviation,
            "  ROSC ",
            " Return of Spontaneous Circulation ",
        )
        .await
        .unwrap();
    assert_eq!(keyword, "ROSC");
    assert_eq!(definition, "Return of Spontaneous Circulation");

    // 2. Identical add fails, case-insensitively.
    let err = store
        .add(
            EntryType::Abbreviation,
            "rosc",
            "return of spontaneous circulation",
        )
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Duplicate { .. }));

    // 3. Exactly one row was stored.
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM abbreviations")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 1);

    // 4. A different meaning for the same abbreviation is a synonym, not a duplicate.
    store
        .add(EntryType::Abbreviation, "ROSC", "Some other expansion")
        .await
        .unwrap();
    let meanings = store.lookup_abbreviation("rosc").await.unwrap();
    assert_eq!(meanings.len(), 2);

    cleanup(pool, db_path).await;
}

#[tokio::test]
async fn add_rejects_empty_fields_after_trim() {
    let (store, pool, db_path) = temp_store().await;

    let err = store
        .add(EntryType::Term, "   ", "definition")
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Validation));

    let err = store
        .add(EntryType::Term, "keyword", " \t ")
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Validation));

    cleanup(pool, db_path).await;
}

#[tokio::test]
async fn remove_requires_exact_pair_and_custom_source() {
    let (store, pool, db_path) = temp_store().await;

    store
        .add(
            EntryType::Abbreviation,
            "ROSC",
            "Return of Spontaneous Circulation",
        )
        .await
        .unwrap();

    // Definition differing beyond case-insensitivity -> not found.
    let err = store
        .remove(
            EntryType::Abbreviation,
            "ROSC",
            "Return of Spontaneous  Circulation",
        )
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound { .. }));

    // Exact pair (any case) -> removed.
    store
        .remove(
            EntryType::Abbreviation,
            "rosc",
            "RETURN OF SPONTANEOUS CIRCULATION",
        )
        .await
        .unwrap();
    assert!(store.lookup_abbreviation("ROSC").await.unwrap().is_empty());

    // Second remove of the same pair -> not found.
    let err = store
        .remove(
            EntryType::Abbreviation,
            "ROSC",
            "Return of Spontaneous Circulation",
        )
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound { .. }));

    cleanup(pool, db_path).await;
}

#[tokio::test]
async fn seeded_rows_cannot_be_removed() {
    let (store, pool, db_path) = temp_store().await;

    sqlx::query("INSERT INTO abbreviations (abbreviation, meaning, source) VALUES (?1, ?2, 'csv')")
        .bind("ABG")
        .bind("Arterial Blood Gas")
        .execute(&pool)
        .await
        .unwrap();

    let err = store
        .remove(EntryType::Abbreviation, "ABG", "Arterial Blood Gas")
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Forbidden));

    // The row is still there.
    let meanings = store.lookup_abbreviation("ABG").await.unwrap();
    assert_eq!(meanings, vec!["Arterial Blood Gas"]);

    cleanup(pool, db_path).await;
}

#[tokio::test]
async fn custom_term_lookup_is_substring_and_case_insensitive() {
    let (store, pool, db_path) = temp_store().await;

    store
        .add(
            EntryType::Term,
            "Metabolic Acidosis",
            "A condition of excess acid in body fluids.",
        )
        .await
        .unwrap();

    let hits = store.lookup_custom_term("acidosis").await.unwrap();
    assert_eq!(hits.len(), 1);
    assert!(hits[0].starts_with("A condition"));

    let hits = store.lookup_custom_term("METABOLIC").await.unwrap();
    assert_eq!(hits.len(), 1);

    assert!(store.lookup_custom_term("alkalosis").await.unwrap().is_empty());

    // Abbreviation lookup stays exact: a substring of the key does not match.
    store
        .add(EntryType::Abbreviation, "NPO", "Nil per os")
        .await
        .unwrap();
    assert!(store.lookup_abbreviation("NP").await.unwrap().is_empty());

    cleanup(pool, db_path).await;
}
