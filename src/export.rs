//! File export for normalized IOC sequences

use crate::models::{NormalizedIoc, SaveReport};
use tracing::{error, info};

/// Write the sequence to a 2-space-indented JSON file. Failures are captured
/// in the returned report; this function never errors.
pub fn save_iocs_to_file(iocs: &[NormalizedIoc], filename: Option<String>) -> SaveReport {
    if iocs.is_empty() {
        return SaveReport::error("No IOCs found to save");
    }

    let filename = filename
        .filter(|f| !f.is_empty())
        .unwrap_or_else(default_export_filename);

    let payload = match serde_json::to_string_pretty(iocs) {
        Ok(payload) => payload,
        Err(e) => return SaveReport::error(format!("Failed to save IOCs: {}", e)),
    };

    if let Err(e) = std::fs::write(&filename, payload) {
        error!("Failed to write IOC export {}: {}", filename, e);
        return SaveReport::error(format!("Failed to save IOCs: {}", e));
    }

    info!("Wrote {} IOCs to {}", iocs.len(), filename);
    SaveReport {
        status: "success".to_string(),
        message: format!("Saved {} IOCs to {}", iocs.len(), filename),
        filename: Some(filename),
        count: Some(iocs.len()),
    }
}

/// Timestamp-based default name, e.g. `misp_iocs_last24h_20260806T120000.json`
pub fn default_export_filename() -> String {
    format!(
        "misp_iocs_last24h_{}.json",
        chrono::Local::now().format("%Y%m%dT%H%M%S")
    )
}
