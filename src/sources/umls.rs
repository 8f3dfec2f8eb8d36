//! UMLS UTS concept search and definitions.
//!
//! A no-op without a configured API key. Definitions are fetched per concept
//! for the first few search hits; one definition fetch failing skips only
//! that concept's definitions.

use super::{Findings, endpoint, get_json};
use crate::config::SourcesConfig;
use crate::error::SourceError;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

const MAX_CONCEPTS: usize = 3;
const MAX_DEFINITIONS: usize = 2;

#[derive(Debug, Default, Clone, Serialize)]
pub struct UmlsFindings {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub concepts: Vec<UmlsConcept>,
}

impl Findings for UmlsFindings {
    fn is_empty(&self) -> bool {
        self.concepts.is_empty()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UmlsConcept {
    pub cui: String,
    pub name: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub definitions: Vec<String>,
}

pub async fn query_umls(
    client: &reqwest::Client,
    cfg: &SourcesConfig,
    term: &str,
) -> Result<UmlsFindings, SourceError> {
    let Some(api_key) = cfg.umls_api_key.as_deref().filter(|key| !key.is_empty()) else {
        return Ok(UmlsFindings::default());
    };

    let url = endpoint(&cfg.umls_base, "rest/search/current");
    let data = get_json(
        client,
        &url,
        &[
            ("string", term),
            ("apiKey", api_key),
            ("pageSize", "5"),
            ("searchType", "words"),
        ],
    )
    .await?;

    let mut concepts = Vec::new();
    if let Some(results) = data.pointer("/result/results").and_then(Value::as_array) {
        for result in results.iter().take(MAX_CONCEPTS) {
            let cui = result
                .get("ui")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            let name = result
                .get("name")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();

            let definitions = match fetch_definitions(client, cfg, api_key, &cui).await {
                Ok(values) => values,
                Err(err) => {
                    debug!(cui, error = %err, "umls definition fetch failed, concept kept");
                    Vec::new()
                }
            };
            concepts.push(UmlsConcept {
                cui,
                name,
                definitions,
            });
        }
    }

    Ok(UmlsFindings { concepts })
}

async fn fetch_definitions(
    client: &reqwest::Client,
    cfg: &SourcesConfig,
    api_key: &str,
    cui: &str,
) -> Result<Vec<String>, SourceError> {
    let url = endpoint(
        &cfg.umls_base,
        &format!("rest/content/current/CUI/{cui}/definitions"),
    );
    let data = get_json(client, &url, &[("apiKey", api_key)]).await?;

    Ok(data
        .get("result")
        .and_then(Value::as_array)
        .map(|defs| {
            defs.iter()
                .take(MAX_DEFINITIONS)
                .map(|def| {
                    def.get("value")
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_string()
                })
                .collect()
        })
        .unwrap_or_default())
}
