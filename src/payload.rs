//! Typed boundary for the analysis service's loosely-shaped response.
//!
//! Nothing past this module looks at raw JSON: every metadata field leaves
//! here as `Option<String>`.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::field::{field_text, scalar_text, truthy};

/// The response body as received. Any field may be missing, null, blank or empty.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawAnalysisResponse {
    pub title: Option<Value>,
    pub raw_meta_tags: Option<Value>,
    pub results: Option<Value>,
    pub content: Option<Value>,
    pub analysis_id: Option<Value>,
    pub processed_at: Option<Value>,
    pub ip_address: Option<Value>,
    pub ip: Option<Value>,
}

/// The metadata keys read out of `raw_meta_tags`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct MetaTags {
    title: Option<Value>,
    publication_date: Option<Value>,
    last_modification_date: Option<Value>,
    author: Option<Value>,
    authors: Option<Value>,
    description: Option<Value>,
    keywords: Option<Value>,
    publisher: Option<Value>,
    url: Option<Value>,
    doi: Option<Value>,
    ip_address: Option<Value>,
}

/// Canonical display record. `None` renders as "not available".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedMetadata {
    pub publication_date: Option<String>,
    pub last_modification_date: Option<String>,
    pub author: Option<String>,
    pub authors: Option<String>,
    pub description: Option<String>,
    pub keywords: Option<String>,
    pub publisher: Option<String>,
    pub url: Option<String>,
    pub doi: Option<String>,
    pub ip_address: Option<String>,
}

/// Envelope fields describing the analysis run rather than the page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestInfo {
    pub analysis_id: Option<String>,
    pub processed_at: Option<String>,
}

/// Everything the reconciler needs from one successful response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalysisView {
    pub title: Option<String>,
    pub metadata: NormalizedMetadata,
    pub body_text: Option<String>,
    pub raw_payload: String,
    pub info: RequestInfo,
}

impl RawAnalysisResponse {
    /// Non-object JSON is accepted and simply has no fields.
    pub fn from_value(value: &Value) -> Self {
        // Only mappings: serde would otherwise fill the fields of a JSON array by position.
        match value {
            Value::Object(_) => serde_json::from_value(value.clone()).unwrap_or_default(),
            _ => Self::default(),
        }
    }

    fn meta_tags(&self) -> MetaTags {
        let map = match &self.raw_meta_tags {
            Some(Value::Object(map)) => map.clone(),
            // Some backends send the mapping JSON-encoded.
            Some(Value::String(s)) if !s.trim().is_empty() => {
                match serde_json::from_str::<Value>(s) {
                    Ok(Value::Object(map)) => map,
                    _ => Map::new(),
                }
            }
            _ => Map::new(),
        };
        serde_json::from_value(Value::Object(map)).unwrap_or_default()
    }
}

impl AnalysisView {
    pub fn from_value(value: &Value) -> Self {
        let raw = RawAnalysisResponse::from_value(value);
        let meta = raw.meta_tags();

        let title = meta
            .title
            .as_ref()
            .filter(|v| truthy(v))
            .or(raw.title.as_ref().filter(|v| truthy(v)));

        let ip_address = present(meta.ip_address.as_ref())
            .or(present(raw.ip_address.as_ref()))
            .or(present(raw.ip.as_ref()));

        let metadata = NormalizedMetadata {
            publication_date: field_text(meta.publication_date.as_ref()),
            last_modification_date: field_text(meta.last_modification_date.as_ref()),
            author: field_text(meta.author.as_ref()),
            authors: field_text(meta.authors.as_ref()),
            description: field_text(meta.description.as_ref()),
            keywords: field_text(meta.keywords.as_ref()),
            publisher: field_text(meta.publisher.as_ref()),
            url: scalar_text(meta.url.as_ref()),
            doi: scalar_text(meta.doi.as_ref()),
            ip_address: field_text(ip_address),
        };

        let body_text = match (&raw.results, &raw.content) {
            (Some(results @ Value::Object(map)), _) if !map.is_empty() => {
                serde_json::to_string_pretty(results).ok()
            }
            (Some(results @ Value::Array(items)), _) if !items.is_empty() => {
                serde_json::to_string_pretty(results).ok()
            }
            (_, Some(content)) if truthy(content) => field_text(Some(content)),
            _ => None,
        };

        AnalysisView {
            title: field_text(title),
            metadata,
            body_text,
            raw_payload: serde_json::to_string_pretty(value).unwrap_or_default(),
            info: RequestInfo {
                analysis_id: field_text(raw.analysis_id.as_ref()),
                processed_at: field_text(raw.processed_at.as_ref()),
            },
        }
    }
}

/// Null-coalescing: only `null` and missing fall through.
fn present(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| !v.is_null())
}
