//! Per-source query functions for the external terminology providers.
//!
//! Each family takes the shared `reqwest::Client` plus the sources config and
//! returns `Result<Findings, SourceError>`. The aggregator treats an error
//! exactly like empty findings: failures never propagate past this boundary,
//! and there is no retry anywhere.

pub mod conditions;
pub mod drugs;
pub mod medline;
pub mod umls;

pub use conditions::{ConditionFindings, query_conditions};
pub use drugs::{DrugFindings, query_drugs};
pub use medline::{TopicFindings, query_health_topics};
pub use umls::{UmlsFindings, query_umls};

use crate::error::SourceError;
use serde_json::Value;
use std::time::Duration;
use url::Url;

/// Long clinical text fields are cut here, with an ellipsis marker appended.
pub const MAX_FIELD_CHARS: usize = 2000;

/// One partial result map contributed by a source family.
pub trait Findings {
    /// True when the family found nothing; empty findings are omitted from
    /// the per-keyword report.
    fn is_empty(&self) -> bool;
}

/// Builds the outbound HTTP client shared by all query functions.
///
/// One explicitly constructed client owned by the server state; no global
/// singleton. Every call carries the same fixed timeout.
pub fn build_client(timeout_secs: u64) -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .connect_timeout(Duration::from_secs(10))
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .expect("failed to build reqwest client for sources")
}

/// Joins a configured base URL with an endpoint path.
pub(crate) fn endpoint(base: &Url, path: &str) -> String {
    format!(
        "{}/{}",
        base.as_str().trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// GET with query parameters, decoding a JSON body. Non-2xx statuses are
/// source failures like any transport error.
pub(crate) async fn get_json(
    client: &reqwest::Client,
    url: &str,
    params: &[(&str, &str)],
) -> Result<Value, SourceError> {
    let resp = client.get(url).query(params).send().await?;
    if !resp.status().is_success() {
        return Err(SourceError::UpstreamStatus(resp.status()));
    }
    let bytes = resp.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Truncates long provider text to [`MAX_FIELD_CHARS`], marking the cut.
pub(crate) fn truncate_text(text: &str) -> String {
    let mut chars = text.char_indices();
    match chars.nth(MAX_FIELD_CHARS) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_without_doubled_slashes() {
        let base = Url::parse("https://clinicaltables.nlm.nih.gov").unwrap();
        assert_eq!(
            endpoint(&base, "api/conditions/v3/search"),
            "https://clinicaltables.nlm.nih.gov/api/conditions/v3/search"
        );
        let base = Url::parse("https://rxnav.nlm.nih.gov/REST/").unwrap();
        assert_eq!(
            endpoint(&base, "/drugs.json"),
            "https://rxnav.nlm.nih.gov/REST/drugs.json"
        );
    }

    #[test]
    fn truncate_marks_only_long_text() {
        assert_eq!(truncate_text("short"), "short");
        let long = "x".repeat(MAX_FIELD_CHARS + 1);
        let cut = truncate_text(&long);
        assert_eq!(cut.chars().count(), MAX_FIELD_CHARS + 3);
        assert!(cut.ends_with("..."));
        let exact = "y".repeat(MAX_FIELD_CHARS);
        assert_eq!(truncate_text(&exact), exact);
    }
}
