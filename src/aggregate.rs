//! Per-keyword aggregation across the local store and the external sources.
//!
//! Each source family contributes its section only when it found something;
//! failures are logged and contribute nothing, so the lookup response is
//! always normal-shaped even under total external unavailability. Results
//! from different families are never merged or reconciled against each
//! other.

use crate::config::SourcesConfig;
use crate::db::TermStore;
use crate::error::SourceError;
use crate::sources::{
    ConditionFindings, DrugFindings, Findings, TopicFindings, UmlsFindings, query_conditions,
    query_drugs, query_health_topics, query_umls,
};
use serde::Serialize;
use tracing::debug;

/// Combined lookup result for one keyword. Absent sections are omitted from
/// the serialized object entirely.
#[derive(Debug, Serialize)]
pub struct KeywordReport {
    pub keyword: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub abbreviations: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_definitions: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conditions: Option<ConditionFindings>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub definitions: Option<TopicFindings>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drugs: Option<DrugFindings>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub umls: Option<UmlsFindings>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl KeywordReport {
    fn new(keyword: &str) -> Self {
        Self {
            keyword: keyword.to_string(),
            abbreviations: None,
            custom_definitions: None,
            conditions: None,
            definitions: None,
            drugs: None,
            umls: None,
            message: None,
        }
    }

    fn has_results(&self) -> bool {
        self.abbreviations.is_some()
            || self.custom_definitions.is_some()
            || self.conditions.is_some()
            || self.definitions.is_some()
            || self.drugs.is_some()
            || self.umls.is_some()
    }
}

/// Reduces a source family's outcome to an optional contribution: errors and
/// empty findings both contribute nothing.
fn contribution<T: Findings>(
    source: &'static str,
    keyword: &str,
    outcome: Result<T, SourceError>,
) -> Option<T> {
    match outcome {
        Ok(findings) if !findings.is_empty() => Some(findings),
        Ok(_) => None,
        Err(err) => {
            debug!(source, keyword, error = %err, "source contributed nothing");
            None
        }
    }
}

/// Searches all sources for a single keyword and returns combined results.
pub async fn lookup_single(
    store: &TermStore,
    client: &reqwest::Client,
    cfg: &SourcesConfig,
    keyword: &str,
) -> KeywordReport {
    let mut report = KeywordReport::new(keyword);

    // Local store first; read failures degrade like external ones.
    match store.lookup_abbreviation(keyword).await {
        Ok(meanings) if !meanings.is_empty() => report.abbreviations = Some(meanings),
        Ok(_) => {}
        Err(err) => debug!(keyword, error = %err, "abbreviation lookup failed"),
    }
    match store.lookup_custom_term(keyword).await {
        Ok(definitions) if !definitions.is_empty() => {
            report.custom_definitions = Some(definitions);
        }
        Ok(_) => {}
        Err(err) => debug!(keyword, error = %err, "custom term lookup failed"),
    }

    // The four external families are independent; run them concurrently and
    // assemble once all have completed.
    let (conditions, topics, drugs, umls) = tokio::join!(
        query_conditions(client, cfg, keyword),
        query_health_topics(client, cfg, keyword),
        query_drugs(client, cfg, keyword),
        query_umls(client, cfg, keyword),
    );

    report.conditions = contribution("conditions", keyword, conditions);
    report.definitions = contribution("health_topics", keyword, topics);
    report.drugs = contribution("drugs", keyword, drugs);
    report.umls = contribution("umls", keyword, umls);

    if !report.has_results() {
        report.message = Some(format!("No data found for '{keyword}'."));
    }

    report
}

/// Looks up each keyword in order. Whitespace-only keywords are skipped
/// entirely (no entry in the output); repeats are not deduplicated.
pub async fn lookup_keywords(
    store: &TermStore,
    client: &reqwest::Client,
    cfg: &SourcesConfig,
    keywords: &[String],
) -> Vec<KeywordReport> {
    let mut reports = Vec::new();
    for keyword in keywords {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            continue;
        }
        reports.push(lookup_single(store, client, cfg, keyword).await);
    }
    reports
}
