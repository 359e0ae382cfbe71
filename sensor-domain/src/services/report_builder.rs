// Diagnostic report assembly

use crate::entities::SensorTable;
use crate::error::DomainError;

pub const REPORT_TITLE: &str = "AI Sensor Analyzer Report";
pub const NOTES_HEADING: &str = "AI DIAGNOSTIC NOTES:";
pub const DATASET_HEADING: &str = "DATASET WITH ANOMALY LABELS:";

/// Unrounded share of anomalous rows in percent. An empty dataset yields zero.
fn raw_percentage(anomaly_rows: usize, total_rows: usize) -> f64 {
    if total_rows == 0 {
        return 0.0;
    }
    anomaly_rows as f64 / total_rows as f64 * 100.0
}

/// Share of anomalous rows in percent, rounded to two decimals for the view.
pub fn anomaly_percentage(anomaly_rows: usize, total_rows: usize) -> f64 {
    (raw_percentage(anomaly_rows, total_rows) * 100.0).round() / 100.0
}

/// Header with counts, the optional notes block, then the labeled table as CSV.
pub fn build_report(
    total_rows: usize,
    anomaly_rows: usize,
    ai_notes: Option<&str>,
    table: &SensorTable,
) -> Result<String, DomainError> {
    let mut report = format!(
        "{title}\n--------------------\n\
Total Records: {total}\n\
Detected Anomalies: {anomalies}\n\
Anomaly Percentage: {percentage:.2}%\n",
        title = REPORT_TITLE,
        total = total_rows,
        anomalies = anomaly_rows,
        percentage = raw_percentage(anomaly_rows, total_rows),
    );

    if let Some(notes) = ai_notes.filter(|notes| !notes.trim().is_empty()) {
        report.push_str(&format!("\n\n{}\n{}\n", NOTES_HEADING, notes));
    }

    report.push_str(&format!("\n\n{}\n", DATASET_HEADING));
    report.push_str(&table.to_csv_string()?);
    Ok(report)
}
