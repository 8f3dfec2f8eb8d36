use thiserror::Error as ThisError;

/// Failure of one external terminology source call.
///
/// Never crosses the aggregator boundary: the aggregator logs it and treats
/// the source as having contributed nothing, so a provider outage is
/// indistinguishable from "no matching data" in the response.
#[derive(Debug, ThisError)]
pub enum SourceError {
    #[error("HTTP request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Upstream error with status: {0}")]
    UpstreamStatus(reqwest::StatusCode),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("XML error: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("Unexpected payload shape: {0}")]
    Shape(String),
}
