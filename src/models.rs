//! Data models for normalized IOCs and tool responses

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// A MISP attribute projected onto the stable output schema.
///
/// `tags` and `event` are always plain strings after normalization, whatever
/// shape the platform returned them in; downstream consumers rely on this.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedIoc {
    /// Indicator content; records without one are discarded upstream
    pub value: String,
    /// Indicator category (ip-dst, domain, url, ...)
    #[serde(rename = "type", default = "unknown_type")]
    pub ioc_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<Value>,
    /// Pipe-joined tag names; empty when the attribute carried no tags
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub tags: String,
    /// Owning event's info line; empty when absent
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub event: String,
}

fn unknown_type() -> String {
    "unknown".to_string()
}

/// Summary statistics over a normalized IOC sequence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IocSummary {
    pub total_count: usize,
    pub type_counts: HashMap<String, usize>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sample_iocs: Vec<SampleIoc>,
    pub message: String,
}

/// Bounded sample entry carrying type, value and owning event only
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleIoc {
    #[serde(rename = "type")]
    pub ioc_type: String,
    pub value: String,
    #[serde(default)]
    pub event: String,
}

/// Outcome of a file export; failures are captured here, never raised
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveReport {
    pub status: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
}

impl SaveReport {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
            filename: None,
            count: None,
        }
    }
}

/// Result of the configuration-only connection check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionStatus {
    pub status: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub misp_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key_configured: Option<bool>,
}

impl ConnectionStatus {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
            misp_url: None,
            api_key_configured: None,
        }
    }
}

/// Static descriptive document served by the informational endpoint
#[derive(Debug, Clone, Serialize)]
pub struct ServerInfo {
    pub name: &'static str,
    pub description: &'static str,
    pub version: &'static str,
    pub available_tools: Vec<&'static str>,
}
