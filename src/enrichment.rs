use serde::{Deserialize, Serialize};

/// A named due-diligence indicator, e.g. "Careers page".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signal {
    pub signal: String,
    pub detected: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Structured company intelligence extracted from a website.
///
/// Every field is required on the way in; a payload missing any of them,
/// or carrying extra top-level fields, fails to deserialize.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnrichmentResult {
    pub summary: String,
    pub what_they_do: Vec<String>,
    pub keywords: Vec<String>,
    pub signals: Vec<Signal>,
    pub sources: Vec<String>,
}
