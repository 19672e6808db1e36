//! End-to-end pipeline tests: response shapes through normalization,
//! summary, and file export.

use misp_ioc_server::client::flatten_search_response;
use misp_ioc_server::export::save_iocs_to_file;
use misp_ioc_server::filter::{filter_by_type, filter_results};
use misp_ioc_server::models::NormalizedIoc;
use misp_ioc_server::summary::summarize;
use serde_json::{json, Value};

fn sample_attributes() -> Vec<Value> {
    vec![
        json!({
            "value": "1.2.3.4",
            "type": "ip-dst",
            "timestamp": "1722945600",
            "category": "Network activity",
            "Tag": [{"name": "malware"}, {"name": "botnet"}],
            "Event": {"id": "7", "info": "Botnet C2 tracking"}
        }),
        json!({
            "value": "evil.example",
            "type": "domain",
            "Tag": ["tlp:amber"],
            "Event": {"id": "9"}
        }),
        json!({
            "value": "http://bad.example/payload",
            "type": "url",
            "comment": "seen in honeypot"
        }),
        // no value: dropped during normalization
        json!({"type": "sha256", "Tag": []}),
    ]
}

#[test]
fn keyed_and_bare_shapes_normalize_identically() {
    let attrs = sample_attributes();

    let keyed = flatten_search_response(json!({ "Attribute": attrs.clone() }));
    let bare = flatten_search_response(Value::Array(attrs));

    assert_eq!(filter_results(&keyed), filter_results(&bare));
}

#[test]
fn event_shapes_flatten_to_the_same_records() {
    let attrs = sample_attributes();

    let keyed = flatten_search_response(json!({ "Attribute": attrs.clone() }));
    let events = flatten_search_response(json!([
        {"Attribute": [attrs[0], attrs[1]]},
        {"Event": {"info": "drop zone", "Attribute": [attrs[2]]}},
        {"Attribute": attrs[3]}
    ]));

    assert_eq!(filter_results(&keyed), filter_results(&events));
}

#[test]
fn pipeline_end_to_end() {
    let raw = flatten_search_response(json!({
        "response": { "Attribute": sample_attributes() }
    }));
    let iocs = filter_results(&raw);

    // the record without a value is gone, the rest keep their order
    assert_eq!(iocs.len(), 3);
    assert_eq!(iocs[0].tags, "malware|botnet");
    assert_eq!(iocs[0].event, "Botnet C2 tracking");
    assert_eq!(iocs[1].event, "{\"id\":\"9\"}");
    assert_eq!(iocs[2].comment, Some(json!("seen in honeypot")));

    let summary = summarize(&iocs);
    assert_eq!(summary.total_count, 3);
    assert_eq!(summary.type_counts.len(), 3);
    assert_eq!(summary.type_counts["ip-dst"], 1);
    assert_eq!(summary.sample_iocs.len(), 3);
    assert_eq!(summary.sample_iocs[0].value, "1.2.3.4");
    assert_eq!(summary.sample_iocs[0].event, "Botnet C2 tracking");

    // export round-trip: reading the file back yields the saved sequence
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("iocs.json").to_string_lossy().to_string();
    let report = save_iocs_to_file(&iocs, Some(path.clone()));
    assert_eq!(report.status, "success");
    assert_eq!(report.count, Some(3));

    let restored: Vec<NormalizedIoc> =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(restored, iocs);
}

#[test]
fn type_filter_matches_case_insensitively() {
    let raw = flatten_search_response(json!({ "Attribute": sample_attributes() }));
    let iocs = filter_results(&raw);

    assert_eq!(
        filter_by_type(&iocs, "IP-DST"),
        filter_by_type(&iocs, "ip-dst")
    );
    assert_eq!(filter_by_type(&iocs, "Domain").len(), 1);
    assert!(filter_by_type(&iocs, "md5").is_empty());
}
