//! Retrieval adapter for the MISP REST API
//!
//! MISP answers an attribute search in one of several shapes depending on
//! version and response mode. The adapter resolves the shape once, right at
//! the boundary, and hands everything downstream a flat attribute sequence;
//! the shape distinction never leaves this module.

use crate::config::Config;
use crate::error::{IocError, Result};
use reqwest::header::{ACCEPT, AUTHORIZATION};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::info;

pub struct MispClient {
    http: reqwest::Client,
    config: Arc<Config>,
}

impl MispClient {
    pub fn new(config: Arc<Config>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .danger_accept_invalid_certs(!config.misp.verify_tls)
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self { http, config })
    }

    /// Query MISP for attributes inside the configured window and return a
    /// flat sequence of raw records. A failed query is an explicit error; it
    /// is never collapsed into an empty result. No retries, no caching.
    pub async fn search_attributes(&self) -> Result<Vec<Value>> {
        let creds = self.config.misp.credentials()?;
        let endpoint = format!(
            "{}/attributes/restSearch",
            creds.url.as_str().trim_end_matches('/')
        );

        info!(
            "Querying MISP at {} for IOCs in window {}",
            creds.url, self.config.misp.search_window
        );

        let response = self
            .http
            .post(&endpoint)
            .header(AUTHORIZATION, creds.api_key.as_str())
            .header(ACCEPT, "application/json")
            .json(&json!({
                "returnFormat": "json",
                "timestamp": self.config.misp.search_window,
            }))
            .send()
            .await
            .map_err(|e| IocError::Retrieval(e.to_string()))?
            .error_for_status()
            .map_err(|e| IocError::Retrieval(e.to_string()))?;

        let payload: Value = response
            .json()
            .await
            .map_err(|e| IocError::Retrieval(e.to_string()))?;

        let attributes = flatten_search_response(payload);
        info!("Got {} IOCs from MISP", attributes.len());
        Ok(attributes)
    }
}

/// The shapes a search response is known to arrive in.
enum SearchResponse {
    /// Mapping with the attribute list under the `Attribute` key
    Keyed(Vec<Value>),
    /// Sequence of event-like objects, each carrying its own attributes
    Events(Vec<Value>),
    /// Already a flat attribute sequence
    Bare(Vec<Value>),
    /// Null, absent, or unrecognized
    Empty,
}

/// Normalize any known response shape into a flat attribute sequence.
pub fn flatten_search_response(payload: Value) -> Vec<Value> {
    match classify(payload) {
        SearchResponse::Keyed(attrs) | SearchResponse::Bare(attrs) => attrs,
        SearchResponse::Events(events) => {
            events.iter().flat_map(event_attributes).collect()
        }
        SearchResponse::Empty => Vec::new(),
    }
}

fn classify(payload: Value) -> SearchResponse {
    match payload {
        Value::Object(mut map) => {
            // The REST API wraps results in a `response` envelope
            if let Some(inner) = map.remove("response") {
                return classify(inner);
            }
            match map.remove("Attribute") {
                Some(Value::Array(attrs)) => SearchResponse::Keyed(attrs),
                _ => SearchResponse::Empty,
            }
        }
        Value::Array(items) => {
            let event_like = items
                .first()
                .map(|item| item.get("Attribute").is_some() || item.get("Event").is_some())
                .unwrap_or(false);
            if event_like {
                SearchResponse::Events(items)
            } else {
                SearchResponse::Bare(items)
            }
        }
        _ => SearchResponse::Empty,
    }
}

/// Attributes of one event-like object: a list under `Attribute`, possibly a
/// singular mapping instead of a list, possibly behind an `Event` wrapper.
fn event_attributes(event: &Value) -> Vec<Value> {
    let container = event.get("Event").unwrap_or(event);
    match container.get("Attribute") {
        Some(Value::Array(attrs)) => attrs.clone(),
        Some(single @ Value::Object(_)) => vec![single.clone()],
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn keyed_mapping_uses_attribute_list_directly() {
        let payload = json!({"Attribute": [{"value": "1.2.3.4"}, {"value": "evil.example"}]});
        let attrs = flatten_search_response(payload);
        assert_eq!(attrs.len(), 2);
        assert_eq!(attrs[0]["value"], "1.2.3.4");
    }

    #[test]
    fn response_envelope_is_unwrapped() {
        let payload = json!({"response": {"Attribute": [{"value": "1.2.3.4"}]}});
        let attrs = flatten_search_response(payload);
        assert_eq!(attrs.len(), 1);
    }

    #[test]
    fn bare_list_is_used_as_is() {
        let payload = json!([{"value": "1.2.3.4"}, {"value": "evil.example"}]);
        let attrs = flatten_search_response(payload);
        assert_eq!(attrs.len(), 2);
    }

    #[test]
    fn event_list_flattens_all_attribute_forms() {
        let payload = json!([
            // list form
            {"Attribute": [{"value": "1.2.3.4"}, {"value": "5.6.7.8"}]},
            // singular mapping form
            {"Attribute": {"value": "evil.example"}},
            // wrapped form
            {"Event": {"info": "campaign", "Attribute": [{"value": "http://bad.example"}]}},
            // nothing usable
            {"Event": {"info": "empty"}}
        ]);
        let attrs = flatten_search_response(payload);
        let values: Vec<_> = attrs.iter().map(|a| a["value"].as_str().unwrap()).collect();
        assert_eq!(
            values,
            vec!["1.2.3.4", "5.6.7.8", "evil.example", "http://bad.example"]
        );
    }

    #[test]
    fn null_and_unrecognized_payloads_are_empty() {
        assert!(flatten_search_response(Value::Null).is_empty());
        assert!(flatten_search_response(json!("unexpected")).is_empty());
        assert!(flatten_search_response(json!({"something": "else"})).is_empty());
        assert!(flatten_search_response(json!([])).is_empty());
    }
}
