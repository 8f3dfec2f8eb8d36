use serde::{Deserialize, Serialize};
use url::Url;

/// External terminology source endpoints and credentials.
///
/// All upstreams are public NLM/FDA services except UMLS, which is a no-op
/// without an API key. Base URLs are overridable so tests can point a source
/// at an unroutable address and exercise the silent-degradation path.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SourcesConfig {
    /// NLM Clinical Tables base (conditions + ICD-10 search).
    /// TOML: `sources.clinical_tables_base`.
    #[serde(default = "default_clinical_tables_base")]
    pub clinical_tables_base: Url,

    /// MedlinePlus web service base (health topic search, XML payload).
    /// TOML: `sources.medlineplus_base`.
    #[serde(default = "default_medlineplus_base")]
    pub medlineplus_base: Url,

    /// RxNav/RxNorm REST base (drug name resolution, formulations, classes).
    /// TOML: `sources.rxnorm_base`.
    #[serde(default = "default_rxnorm_base")]
    pub rxnorm_base: Url,

    /// OpenFDA drug label search endpoint (full URL, not a base).
    /// TOML: `sources.openfda_url`.
    #[serde(default = "default_openfda_url")]
    pub openfda_url: Url,

    /// UMLS UTS REST base (concept search + definitions).
    /// TOML: `sources.umls_base`.
    #[serde(default = "default_umls_base")]
    pub umls_base: Url,

    /// UMLS API key. Absent => the UMLS source contributes nothing.
    /// TOML: `sources.umls_api_key` or env `MEDLEX_SOURCES__UMLS_API_KEY`.
    #[serde(default)]
    pub umls_api_key: Option<String>,

    /// Per-request timeout for every outbound call, in seconds.
    /// TOML: `sources.request_timeout_secs`. Default: `45`.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            clinical_tables_base: default_clinical_tables_base(),
            medlineplus_base: default_medlineplus_base(),
            rxnorm_base: default_rxnorm_base(),
            openfda_url: default_openfda_url(),
            umls_base: default_umls_base(),
            umls_api_key: None,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_clinical_tables_base() -> Url {
    Url::parse("https://clinicaltables.nlm.nih.gov").expect("static url")
}

fn default_medlineplus_base() -> Url {
    Url::parse("https://wsearch.nlm.nih.gov").expect("static url")
}

fn default_rxnorm_base() -> Url {
    Url::parse("https://rxnav.nlm.nih.gov/REST").expect("static url")
}

fn default_openfda_url() -> Url {
    Url::parse("https://api.fda.gov/drug/label.json").expect("static url")
}

fn default_umls_base() -> Url {
    Url::parse("https://uts-ws.nlm.nih.gov").expect("static url")
}

fn default_request_timeout_secs() -> u64 {
    45
}
