//! Summary statistics over normalized IOC sequences

use crate::models::{IocSummary, NormalizedIoc, SampleIoc};
use std::collections::HashMap;

/// Number of records included in the summary sample
const SAMPLE_SIZE: usize = 5;

/// Derive counts by type and a bounded sample. Pure; empty input yields an
/// empty summary, never an error.
pub fn summarize(iocs: &[NormalizedIoc]) -> IocSummary {
    if iocs.is_empty() {
        return IocSummary {
            total_count: 0,
            type_counts: HashMap::new(),
            sample_iocs: Vec::new(),
            message: "No IOCs found in last 24 hours".to_string(),
        };
    }

    let mut type_counts: HashMap<String, usize> = HashMap::new();
    for ioc in iocs {
        *type_counts.entry(ioc.ioc_type.clone()).or_insert(0) += 1;
    }

    let sample_iocs = iocs
        .iter()
        .take(SAMPLE_SIZE)
        .map(|ioc| SampleIoc {
            ioc_type: ioc.ioc_type.clone(),
            value: ioc.value.clone(),
            event: ioc.event.clone(),
        })
        .collect();

    IocSummary {
        total_count: iocs.len(),
        type_counts,
        sample_iocs,
        message: format!("Found {} IOCs in last 24 hours", iocs.len()),
    }
}
