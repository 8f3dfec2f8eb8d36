//! NLM Clinical Tables: condition search and ICD-10 code search.
//!
//! Both endpoints return the positional 4-element array payload
//! `[total, codes, extra_fields, display_strings]`. Candidates are gated by
//! the relevance filter before inclusion; ICD-10 codes attach to a condition
//! by index alignment between `display_strings` and
//! `extra_fields.icd10cm_codes`, as the provider aligns them.

use super::{Findings, endpoint, get_json};
use crate::config::SourcesConfig;
use crate::error::SourceError;
use crate::relevance;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

#[derive(Debug, Default, Clone, Serialize)]
pub struct ConditionFindings {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<ConditionEntry>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub icd10_codes: Vec<Icd10Code>,
}

impl Findings for ConditionFindings {
    fn is_empty(&self) -> bool {
        self.conditions.is_empty() && self.icd10_codes.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConditionEntry {
    pub consumer_name: Option<String>,
    pub primary_name: Option<String>,
    /// Attached positionally from the same response; shape is provider-defined.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icd10cm_codes: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Icd10Code {
    pub code: String,
    pub name: Option<String>,
}

/// Queries the condition and ICD-10 search endpoints. The two calls fail
/// independently; an error surfaces only when neither contributed anything.
pub async fn query_conditions(
    client: &reqwest::Client,
    cfg: &SourcesConfig,
    term: &str,
) -> Result<ConditionFindings, SourceError> {
    let (cond, icd) = tokio::join!(
        search_conditions(client, cfg, term),
        search_icd10(client, cfg, term)
    );

    let mut findings = ConditionFindings::default();
    let mut first_err = None;

    match cond {
        Ok(entries) => findings.conditions = entries,
        Err(err) => {
            debug!(term, error = %err, "condition search contributed nothing");
            first_err = Some(err);
        }
    }
    match icd {
        Ok(codes) => findings.icd10_codes = codes,
        Err(err) => {
            debug!(term, error = %err, "icd10 search contributed nothing");
            first_err.get_or_insert(err);
        }
    }

    if findings.is_empty()
        && let Some(err) = first_err
    {
        return Err(err);
    }
    Ok(findings)
}

async fn search_conditions(
    client: &reqwest::Client,
    cfg: &SourcesConfig,
    term: &str,
) -> Result<Vec<ConditionEntry>, SourceError> {
    let url = endpoint(&cfg.clinical_tables_base, "api/conditions/v3/search");
    let data = get_json(
        client,
        &url,
        &[
            ("terms", term),
            ("maxList", "5"),
            ("df", "consumer_name,primary_name"),
            ("ef", "icd10cm_codes,info_link_data"),
        ],
    )
    .await?;
    Ok(reshape_conditions(term, &data))
}

async fn search_icd10(
    client: &reqwest::Client,
    cfg: &SourcesConfig,
    term: &str,
) -> Result<Vec<Icd10Code>, SourceError> {
    let url = endpoint(&cfg.clinical_tables_base, "api/icd10cm/v3/search");
    let data = get_json(
        client,
        &url,
        &[("sf", "code,name"), ("terms", term), ("maxList", "5")],
    )
    .await?;
    Ok(reshape_icd10(term, &data))
}

fn display_rows(data: &Value) -> Option<&Vec<Value>> {
    let arr = data.as_array()?;
    if arr.len() != 4 {
        return None;
    }
    arr[3].as_array().filter(|rows| !rows.is_empty())
}

pub(crate) fn reshape_conditions(term: &str, data: &Value) -> Vec<ConditionEntry> {
    let Some(rows) = display_rows(data) else {
        return Vec::new();
    };
    let icd_codes = data
        .get(2)
        .and_then(|extra| extra.get("icd10cm_codes"))
        .and_then(Value::as_array);

    let mut entries = Vec::new();
    for (i, row) in rows.iter().enumerate() {
        let display = row.as_array();
        let consumer = display
            .and_then(|d| d.first())
            .and_then(Value::as_str);
        let primary = display.and_then(|d| d.get(1)).and_then(Value::as_str);
        // Filter out irrelevant fuzzy matches.
        if !(relevance::matches(term, consumer) || relevance::matches(term, primary)) {
            continue;
        }
        entries.push(ConditionEntry {
            consumer_name: consumer.map(str::to_string),
            primary_name: primary.map(str::to_string),
            icd10cm_codes: icd_codes.and_then(|codes| codes.get(i)).cloned(),
        });
    }
    entries
}

pub(crate) fn reshape_icd10(term: &str, data: &Value) -> Vec<Icd10Code> {
    let Some(rows) = display_rows(data) else {
        return Vec::new();
    };

    let mut codes = Vec::new();
    for row in rows {
        let display = row.as_array();
        let Some(code) = display.and_then(|d| d.first()).and_then(Value::as_str) else {
            continue;
        };
        let name = display.and_then(|d| d.get(1)).and_then(Value::as_str);
        if !relevance::matches(term, name) && !relevance::matches(term, Some(code)) {
            continue;
        }
        codes.push(Icd10Code {
            code: code.to_string(),
            name: name.map(str::to_string),
        });
    }
    codes
}
