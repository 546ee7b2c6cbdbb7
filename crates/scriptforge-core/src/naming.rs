//! File naming conventions followed by generated scripts when they run
//! standalone. The pipeline renders these into the code-generation guidelines.

use serde::{Deserialize, Serialize};

/// strftime format of the timestamp in payload and error-capture names
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// `{run_id}_{timestamp}_{script}_input.json`
pub fn payload_input_name(run_id: &str, timestamp: &str, script: &str) -> String {
    format!("{}_{}_{}_input.json", run_id, timestamp, script)
}

/// `{run_id}_{timestamp}_{script}_output.json`
pub fn payload_output_name(run_id: &str, timestamp: &str, script: &str) -> String {
    format!("{}_{}_{}_output.json", run_id, timestamp, script)
}

/// `{run_id}_{timestamp}_error.json`
pub fn error_capture_name(run_id: &str, timestamp: &str) -> String {
    format!("{}_{}_error.json", run_id, timestamp)
}

/// Document a generated script writes when it fails
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorCapture {
    pub script_name: String,
    pub input_data: serde_json::Value,
    pub error_message: String,
    pub file_location: String,
}
