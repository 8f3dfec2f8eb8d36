use crate::db::EntryType;
use crate::error::StoreError;
use crate::server::router::MedlexState;
use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct EntryRequest {
    /// `abbreviation` for acronyms and shorthand, `term` for conditions and
    /// longer definitions.
    pub entry_type: EntryType,
    pub keyword: String,
    pub definition: String,
}

#[derive(Debug, Serialize)]
pub struct MutationResponse {
    pub success: bool,
    pub entry_type: EntryType,
    pub keyword: String,
    pub definition: String,
    pub message: String,
}

/// Saves a new custom abbreviation or term definition.
pub async fn add_entry_handler(
    State(state): State<MedlexState>,
    Json(req): Json<EntryRequest>,
) -> Result<Json<MutationResponse>, StoreError> {
    let (keyword, definition) = state
        .store
        .add(req.entry_type, &req.keyword, &req.definition)
        .await?;

    let message = format!("Added {}: {keyword} -> {definition}", req.entry_type);
    Ok(Json(MutationResponse {
        success: true,
        entry_type: req.entry_type,
        keyword,
        definition,
        message,
    }))
}

/// Removes a previously custom-added entry; seeded rows are protected.
pub async fn remove_entry_handler(
    State(state): State<MedlexState>,
    Json(req): Json<EntryRequest>,
) -> Result<Json<MutationResponse>, StoreError> {
    let (keyword, definition) = state
        .store
        .remove(req.entry_type, &req.keyword, &req.definition)
        .await?;

    let message = format!("Removed {}: {keyword} -> {definition}", req.entry_type);
    Ok(Json(MutationResponse {
        success: true,
        entry_type: req.entry_type,
        keyword,
        definition,
        message,
    }))
}
