use crate::aggregate::{self, KeywordReport};
use crate::server::router::MedlexState;
use axum::{Json, extract::State};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct LookupRequest {
    /// One or more medical keywords, searched across all sources in order.
    pub keywords: Vec<String>,
}

/// Looks up each keyword across the local store and every external source.
///
/// Infallible by design: external outages degrade to absent sections, never
/// to an error response.
pub async fn lookup_handler(
    State(state): State<MedlexState>,
    Json(req): Json<LookupRequest>,
) -> Json<Vec<KeywordReport>> {
    let reports =
        aggregate::lookup_keywords(&state.store, &state.client, &state.sources, &req.keywords)
            .await;
    Json(reports)
}
