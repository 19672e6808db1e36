//! Normalization engine: projects raw MISP attributes onto the stable
//! output schema.
//!
//! This is the one place where platform response quirks get special-cased.
//! Each quirky field has its own conversion strategy (`flatten_tags`,
//! `event_info`); everything else is a verbatim copy of allow-listed keys.
//! The projection is total: malformed fields degrade to defaults instead of
//! failing.

use crate::models::NormalizedIoc;
use serde_json::Value;

/// Source keys that survive projection; all others are dropped silently.
pub const OUTPUT_FIELDS: [&str; 7] = [
    "value", "type", "timestamp", "category", "comment", "Tag", "Event",
];

/// Project a sequence of raw attributes, keeping only records with a usable
/// value.
pub fn filter_results(raw: &[Value]) -> Vec<NormalizedIoc> {
    raw.iter().filter_map(normalize_attribute).collect()
}

/// Case-insensitive exact-match filter over the normalized type.
pub fn filter_by_type(iocs: &[NormalizedIoc], ioc_type: &str) -> Vec<NormalizedIoc> {
    let wanted = ioc_type.to_lowercase();
    iocs.iter()
        .filter(|ioc| ioc.ioc_type.to_lowercase() == wanted)
        .cloned()
        .collect()
}

fn normalize_attribute(attr: &Value) -> Option<NormalizedIoc> {
    let obj = attr.as_object()?;

    // Records without a usable value carry no indicator; drop them.
    let value = match obj.get("value") {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        _ => return None,
    };

    let ioc_type = obj
        .get("type")
        .and_then(Value::as_str)
        .unwrap_or("unknown")
        .to_string();

    Some(NormalizedIoc {
        value,
        ioc_type,
        timestamp: obj.get("timestamp").cloned(),
        category: obj.get("category").cloned(),
        comment: obj.get("comment").cloned(),
        tags: obj.get("Tag").map(flatten_tags).unwrap_or_default(),
        event: obj.get("Event").map(event_info).unwrap_or_default(),
    })
}

/// Tag collections arrive as a list of name-bearing records, a list of plain
/// strings, or a single scalar. The first element's shape picks the strategy
/// for the whole list; downstream consumers depend on that, so it stays.
/// Elements of a name-bearing list that lack a `name` (or are not mappings at
/// all) fall back to their string form.
fn flatten_tags(tag: &Value) -> String {
    match tag {
        Value::Array(items) => match items.first() {
            Some(Value::Object(_)) => items
                .iter()
                .map(|item| match item.get("name") {
                    Some(name) => scalar_string(name),
                    None => scalar_string(item),
                })
                .collect::<Vec<_>>()
                .join("|"),
            Some(_) => items
                .iter()
                .map(scalar_string)
                .collect::<Vec<_>>()
                .join("|"),
            None => String::new(),
        },
        other => scalar_string_or_empty(other),
    }
}

/// Event descriptors carry a human-readable `info` field; fall back to the
/// descriptor's JSON form when it is missing.
fn event_info(event: &Value) -> String {
    if let Some(map) = event.as_object() {
        match map.get("info") {
            Some(info) => scalar_string(info),
            None => event.to_string(),
        }
    } else {
        scalar_string_or_empty(event)
    }
}

/// String form of a JSON value: strings unquoted, everything else JSON-encoded.
fn scalar_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Like `scalar_string`, but null degrades to the empty string.
fn scalar_string_or_empty(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        other => scalar_string(other),
    }
}
