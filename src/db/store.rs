use crate::error::StoreError;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use std::fmt;
use tracing::info;

/// Which of the two local tables a mutation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    /// Medical acronyms and shorthand (e.g. ROSC, NPO, TID).
    Abbreviation,
    /// Medical terms, conditions, or definitions (e.g. Troponin I).
    Term,
}

impl EntryType {
    /// (table, key column, value column) for SQL assembly. Identifiers cannot
    /// be bound as parameters, so they are interpolated from this closed set.
    fn columns(self) -> (&'static str, &'static str, &'static str) {
        match self {
            EntryType::Abbreviation => ("abbreviations", "abbreviation", "meaning"),
            EntryType::Term => ("custom_terms", "term", "definition"),
        }
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryType::Abbreviation => write!(f, "abbreviation"),
            EntryType::Term => write!(f, "term"),
        }
    }
}

/// Local store over the two append-only tables.
///
/// Every operation acquires a connection from the pool and releases it on all
/// exit paths. Rows are never updated in place: inserts and deletes only.
#[derive(Clone)]
pub struct TermStore {
    pool: SqlitePool,
}

impl TermStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Exact case-insensitive abbreviation lookup; distinct meanings.
    pub async fn lookup_abbreviation(&self, term: &str) -> Result<Vec<String>, StoreError> {
        let meanings = sqlx::query_scalar(
            "SELECT DISTINCT meaning FROM abbreviations WHERE abbreviation = ?1 COLLATE NOCASE",
        )
        .bind(term)
        .fetch_all(&self.pool)
        .await?;
        Ok(meanings)
    }

    /// Case-insensitive substring lookup over custom terms.
    pub async fn lookup_custom_term(&self, term: &str) -> Result<Vec<String>, StoreError> {
        let definitions =
            sqlx::query_scalar("SELECT definition FROM custom_terms WHERE term LIKE ?1 COLLATE NOCASE")
                .bind(format!("%{term}%"))
                .fetch_all(&self.pool)
                .await?;
        Ok(definitions)
    }

    /// Inserts a custom entry. Rejects empty fields and case-insensitive
    /// (keyword, definition) duplicates regardless of the existing row's
    /// source. Returns the trimmed pair on success.
    pub async fn add(
        &self,
        entry_type: EntryType,
        keyword: &str,
        definition: &str,
    ) -> Result<(String, String), StoreError> {
        let keyword = keyword.trim();
        let definition = definition.trim();
        if keyword.is_empty() || definition.is_empty() {
            return Err(StoreError::Validation);
        }

        let (table, key_col, val_col) = entry_type.columns();

        let existing: Option<i64> = sqlx::query_scalar(&format!(
            "SELECT id FROM {table} WHERE {key_col} = ?1 COLLATE NOCASE AND {val_col} = ?2 COLLATE NOCASE"
        ))
        .bind(keyword)
        .bind(definition)
        .fetch_optional(&self.pool)
        .await?;

        if existing.is_some() {
            return Err(StoreError::Duplicate {
                keyword: keyword.to_string(),
                definition: definition.to_string(),
            });
        }

        sqlx::query(&format!(
            "INSERT INTO {table} ({key_col}, {val_col}, source, created_at) VALUES (?1, ?2, 'custom', ?3)"
        ))
        .bind(keyword)
        .bind(definition)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        info!(%entry_type, keyword, "stored custom entry");
        Ok((keyword.to_string(), definition.to_string()))
    }

    /// Deletes one custom entry matching (keyword, definition) exactly,
    /// case-insensitively. Seeded ('csv') rows are never deletable here.
    pub async fn remove(
        &self,
        entry_type: EntryType,
        keyword: &str,
        definition: &str,
    ) -> Result<(String, String), StoreError> {
        let keyword = keyword.trim();
        let definition = definition.trim();
        if keyword.is_empty() || definition.is_empty() {
            return Err(StoreError::Validation);
        }

        let (table, key_col, val_col) = entry_type.columns();

        let row: Option<(i64, String)> = sqlx::query_as(&format!(
            "SELECT id, source FROM {table} WHERE {key_col} = ?1 COLLATE NOCASE AND {val_col} = ?2 COLLATE NOCASE"
        ))
        .bind(keyword)
        .bind(definition)
        .fetch_optional(&self.pool)
        .await?;

        let Some((id, source)) = row else {
            return Err(StoreError::NotFound {
                keyword: keyword.to_string(),
                definition: definition.to_string(),
            });
        };

        if source != "custom" {
            return Err(StoreError::Forbidden);
        }

        sqlx::query(&format!("DELETE FROM {table} WHERE id = ?1"))
            .bind(id)
            .execute(&self.pool)
            .await?;

        info!(%entry_type, keyword, "removed custom entry");
        Ok((keyword.to_string(), definition.to_string()))
    }
}
