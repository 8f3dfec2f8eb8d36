//! MedlinePlus health topic search (consumer-friendly definitions).
//!
//! Single call per keyword; the payload is a document-oriented XML body. The
//! `full-summary` text carries embedded markup which is stripped before the
//! summary is collapsed and truncated.

use super::{Findings, endpoint, truncate_text};
use crate::config::SourcesConfig;
use crate::error::SourceError;
use crate::relevance;
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

const MAX_TOPICS: &str = "3";

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("static regex"));
static WS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("static regex"));

#[derive(Debug, Default, Clone, Serialize)]
pub struct TopicFindings {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub topics: Vec<HealthTopic>,
}

impl Findings for TopicFindings {
    fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthTopic {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub also_called: Vec<String>,
}

pub async fn query_health_topics(
    client: &reqwest::Client,
    cfg: &SourcesConfig,
    term: &str,
) -> Result<TopicFindings, SourceError> {
    let url = endpoint(&cfg.medlineplus_base, "ws/query");
    let resp = client
        .get(&url)
        .query(&[
            ("db", "healthTopics"),
            ("term", term),
            ("rettype", "topic"),
            ("retmax", MAX_TOPICS),
        ])
        .send()
        .await?;
    if !resp.status().is_success() {
        return Err(SourceError::UpstreamStatus(resp.status()));
    }
    let body = resp.text().await?;
    reshape_topics(term, &body)
}

pub(crate) fn reshape_topics(term: &str, xml: &str) -> Result<TopicFindings, SourceError> {
    let doc = roxmltree::Document::parse(xml)?;

    let mut topics = Vec::new();
    for document in doc.descendants().filter(|n| n.has_tag_name("document")) {
        let Some(topic) = document
            .descendants()
            .find(|n| n.has_tag_name("health-topic"))
        else {
            continue;
        };
        let title = topic.attribute("title").unwrap_or_default();
        if !relevance::matches(term, Some(title)) {
            continue;
        }

        let summary = topic
            .children()
            .find(|n| n.has_tag_name("full-summary"))
            .map(|el| clean_summary(&node_text(&el)))
            .filter(|s| !s.is_empty());

        let also_called = topic
            .children()
            .filter(|n| n.has_tag_name("also-called"))
            .map(|el| node_text(&el))
            .filter(|text| !text.is_empty())
            .collect();

        topics.push(HealthTopic {
            title: title.to_string(),
            summary,
            also_called,
        });
    }

    Ok(TopicFindings { topics })
}

/// Concatenated text content of a node (the summary arrives as raw HTML
/// inside the element's text).
fn node_text(node: &roxmltree::Node<'_, '_>) -> String {
    node.descendants()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect()
}

/// Strips embedded markup, collapses whitespace, truncates long summaries.
fn clean_summary(raw: &str) -> String {
    let stripped = TAG_RE.replace_all(raw, "");
    let collapsed = WS_RE.replace_all(stripped.trim(), " ");
    truncate_text(&collapsed)
}
