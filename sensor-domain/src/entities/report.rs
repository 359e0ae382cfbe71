// Diagnostic report entity
// Built once per detection run, never mutated afterwards

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const REPORT_FILENAME: &str = "AI_Sensor_Analyzer_Full_Report.csv";
pub const REPORT_MIME: &str = "text/csv";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticReport {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub filename: String,
    pub total_rows: usize,
    pub anomaly_count: usize,
    pub content: String,
}

impl DiagnosticReport {
    pub fn new(total_rows: usize, anomaly_count: usize, content: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            filename: REPORT_FILENAME.to_string(),
            total_rows,
            anomaly_count,
            content,
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.content.as_bytes().to_vec()
    }
}
