//! RxNorm, RxClass and OpenFDA drug lookups.
//!
//! Formulation resolution tries an exact RxNorm name match first and falls
//! back to the approximate-match search for a best-candidate rxcui. The drug
//! class query and the OpenFDA label query run independently; each sub-query
//! failing only drops its own section.

use super::{Findings, endpoint, get_json, truncate_text};
use crate::config::SourcesConfig;
use crate::error::SourceError;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

const MAX_FORMULATIONS: usize = 10;

#[derive(Debug, Default, Clone, Serialize)]
pub struct DrugFindings {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub formulations: Vec<String>,
    /// Best approximate-match name, recorded only when it differs from the query.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_name: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub drug_classes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fda_label: Option<FdaLabel>,
}

impl Findings for DrugFindings {
    fn is_empty(&self) -> bool {
        self.formulations.is_empty()
            && self.matched_name.is_none()
            && self.drug_classes.is_empty()
            && self.fda_label.is_none()
    }
}

/// Key clinical fields extracted from an OpenFDA label, long text truncated.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct FdaLabel {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indications: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mechanism_of_action: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dosage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warnings: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub boxed_warning: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contraindications: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adverse_reactions: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drug_interactions: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub brand_names: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub generic_names: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub routes: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub pharmacologic_class: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub manufacturer: Vec<String>,
}

impl FdaLabel {
    fn is_empty(&self) -> bool {
        *self == FdaLabel::default()
    }
}

/// Queries the three drug sub-sources. An error surfaces only when every
/// sub-query failed; otherwise the partial findings win.
pub async fn query_drugs(
    client: &reqwest::Client,
    cfg: &SourcesConfig,
    term: &str,
) -> Result<DrugFindings, SourceError> {
    let (resolution, classes, label) = tokio::join!(
        resolve_formulations(client, cfg, term),
        fetch_drug_classes(client, cfg, term),
        fetch_label(client, cfg, term)
    );

    let mut findings = DrugFindings::default();
    let mut first_err = None;

    match resolution {
        Ok((formulations, matched_name)) => {
            findings.formulations = formulations;
            findings.matched_name = matched_name;
        }
        Err(err) => {
            debug!(term, error = %err, "rxnorm formulation lookup contributed nothing");
            first_err = Some(err);
        }
    }
    match classes {
        Ok(names) => findings.drug_classes = names,
        Err(err) => {
            debug!(term, error = %err, "rxclass lookup contributed nothing");
            first_err.get_or_insert(err);
        }
    }
    match label {
        Ok(label) => findings.fda_label = label,
        Err(err) => {
            debug!(term, error = %err, "openfda label lookup contributed nothing");
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

/// Exact RxNorm name resolution, with the approximate-match fallback when the
/// exact search yields nothing (or fails).
async fn resolve_formulations(
    client: &reqwest::Client,
    cfg: &SourcesConfig,
    term: &str,
) -> Result<(Vec<String>, Option<String>), SourceError> {
    match exact_formulations(client, cfg, term).await {
        Ok(formulations) if !formulations.is_empty() => return Ok((formulations, None)),
        Ok(_) => {}
        Err(err) => debug!(term, error = %err, "rxnorm exact search failed, trying approximate"),
    }
    approximate_formulations(client, cfg, term).await
}

async fn exact_formulations(
    client: &reqwest::Client,
    cfg: &SourcesConfig,
    term: &str,
) -> Result<Vec<String>, SourceError> {
    let url = endpoint(&cfg.rxnorm_base, "drugs.json");
    let data = get_json(client, &url, &[("name", term)]).await?;
    Ok(concept_names(
        data.pointer("/drugGroup/conceptGroup").unwrap_or(&Value::Null),
    ))
}

async fn approximate_formulations(
    client: &reqwest::Client,
    cfg: &SourcesConfig,
    term: &str,
) -> Result<(Vec<String>, Option<String>), SourceError> {
    let url = endpoint(&cfg.rxnorm_base, "approximateTerm.json");
    let data = get_json(client, &url, &[("term", term), ("maxEntries", "1")]).await?;

    let Some(candidate) = data
        .pointer("/approximateGroup/candidate")
        .and_then(Value::as_array)
        .and_then(|c| c.first())
    else {
        return Ok((Vec::new(), None));
    };
    let Some(rxcui) = candidate.get("rxcui").and_then(Value::as_str) else {
        return Ok((Vec::new(), None));
    };
    let matched_name = candidate
        .get("name")
        .and_then(Value::as_str)
        .filter(|name| !name.eq_ignore_ascii_case(term))
        .map(str::to_string);

    let related_url = endpoint(&cfg.rxnorm_base, &format!("rxcui/{rxcui}/related.json"));
    let related = get_json(client, &related_url, &[("tty", "SCD+SBD")]).await?;
    let formulations = concept_names(
        related
            .pointer("/relatedGroup/conceptGroup")
            .unwrap_or(&Value::Null),
    );
    Ok((formulations, matched_name))
}

/// Flattens `conceptGroup[].conceptProperties[].name`, capped at ten entries.
fn concept_names(groups: &Value) -> Vec<String> {
    let Some(groups) = groups.as_array() else {
        return Vec::new();
    };
    groups
        .iter()
        .filter_map(|group| group.get("conceptProperties").and_then(Value::as_array))
        .flatten()
        .filter_map(|concept| concept.get("name").and_then(Value::as_str))
        .map(str::to_string)
        .take(MAX_FORMULATIONS)
        .collect()
}

async fn fetch_drug_classes(
    client: &reqwest::Client,
    cfg: &SourcesConfig,
    term: &str,
) -> Result<Vec<String>, SourceError> {
    let url = endpoint(&cfg.rxnorm_base, "rxclass/class/byDrugName.json");
    let data = get_json(client, &url, &[("drugName", term), ("relaSource", "ATC")]).await?;

    let mut classes: Vec<String> = Vec::new();
    if let Some(infos) = data
        .pointer("/rxclassDrugInfoList/rxclassDrugInfo")
        .and_then(Value::as_array)
    {
        for info in infos {
            if let Some(name) = info
                .pointer("/rxclassMinConceptItem/className")
                .and_then(Value::as_str)
            {
                if !classes.iter().any(|c| c == name) {
                    classes.push(name.to_string());
                }
            }
        }
    }
    Ok(classes)
}

async fn fetch_label(
    client: &reqwest::Client,
    cfg: &SourcesConfig,
    term: &str,
) -> Result<Option<FdaLabel>, SourceError> {
    let search = format!("openfda.generic_name:\"{term}\"+openfda.brand_name:\"{term}\"");
    let data = get_json(
        client,
        cfg.openfda_url.as_str(),
        &[("search", search.as_str()), ("limit", "1")],
    )
    .await?;

    let Some(label) = data
        .get("results")
        .and_then(Value::as_array)
        .and_then(|r| r.first())
    else {
        return Ok(None);
    };
    Ok(reshape_label(term, label))
}

/// Accepts a label only when the term matches its generic name (substring) or
/// exactly equals one comma-separated token of its brand-name list. OpenFDA
/// brand names can be comma-lists like "Scrub, Scrub-Stat"; a bare substring
/// test would attach the wrong product's label.
pub(crate) fn label_matches_term(term: &str, generic_names: &[String], brand_names: &[String]) -> bool {
    let t = term.to_lowercase();
    let generic_match = generic_names.iter().any(|n| n.to_lowercase().contains(&t));
    let brand_match = brand_names
        .iter()
        .flat_map(|raw| raw.split(','))
        .any(|token| token.to_lowercase().trim() == t);
    generic_match || brand_match
}

pub(crate) fn reshape_label(term: &str, label: &Value) -> Option<FdaLabel> {
    let openfda = label.get("openfda").unwrap_or(&Value::Null);
    let generic_names = string_list(openfda.get("generic_name"));
    let brand_names = string_list(openfda.get("brand_name"));

    if !label_matches_term(term, &generic_names, &brand_names) {
        debug!(term, "openfda label did not match search term, discarded");
        return None;
    }

    let clinical = |field: &str| -> Option<String> {
        label
            .get(field)
            .and_then(Value::as_array)
            .and_then(|v| v.first())
            .and_then(Value::as_str)
            .filter(|text| !text.is_empty())
            .map(truncate_text)
    };

    let reshaped = FdaLabel {
        indications: clinical("indications_and_usage"),
        mechanism_of_action: clinical("mechanism_of_action"),
        dosage: clinical("dosage_and_administration"),
        warnings: clinical("warnings_and_cautions"),
        boxed_warning: clinical("boxed_warning"),
        contraindications: clinical("contraindications"),
        adverse_reactions: clinical("adverse_reactions"),
        drug_interactions: clinical("drug_interactions"),
        brand_names,
        generic_names,
        routes: string_list(openfda.get("route")),
        pharmacologic_class: string_list(openfda.get("pharm_class_epc")),
        manufacturer: string_list(openfda.get("manufacturer_name")),
    };

    if reshaped.is_empty() {
        None
    } else {
        Some(reshaped)
    }
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
