//! Analysis pipeline stages.
//!
//! Each stage either hands its output to the next one or halts the run with a
//! notice for the page. The explanation stage needs I/O and lives in the
//! application layer; everything here is pure.

use crate::entities::{
    DatasetOverview, DetectionSummary, Notice, NumericSelection, SensorTable, TableSnapshot,
    TrendChart, TrendSeries,
};
use crate::error::DomainError;
use crate::services::detector::IsolationForest;
use crate::services::report_builder::anomaly_percentage;
use crate::services::statistics::{describe, render_describe};
use crate::value_objects::AnomalyLabel;

pub const NO_ROWS_MESSAGE: &str = "Uploaded dataset has no rows";
pub const NO_NUMERIC_COLUMNS_MESSAGE: &str = "No numeric sensor columns found in dataset";
pub const MISSING_READINGS_MESSAGE: &str =
    "Numeric sensor columns contain missing values; anomaly detection requires complete readings";
pub const NO_ANOMALIES_MESSAGE: &str = "No major anomalies detected";
pub const ANOMALIES_DETECTED_MESSAGE: &str = "Abnormal readings detected";
pub const MISSING_CREDENTIAL_MESSAGE: &str =
    "Add OPENROUTER_API_KEY in .env to enable AI explanations";
pub const EXPLANATION_FAILED_MESSAGE: &str = "AI explanation request failed";

#[derive(Debug, Clone, PartialEq)]
pub enum StageOutcome<T> {
    Continue(T),
    Halt(Notice),
}

impl<T> StageOutcome<T> {
    pub fn is_halt(&self) -> bool {
        matches!(self, StageOutcome::Halt(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DetectionResult {
    pub labels: Vec<AnomalyLabel>,
    pub anomaly_rows: Vec<usize>,
}

impl DetectionResult {
    pub fn from_labels(labels: Vec<AnomalyLabel>) -> Self {
        let anomaly_rows = labels
            .iter()
            .enumerate()
            .filter(|(_, label)| label.is_anomaly())
            .map(|(row, _)| row)
            .collect();
        Self {
            labels,
            anomaly_rows,
        }
    }

    pub fn anomaly_count(&self) -> usize {
        self.anomaly_rows.len()
    }

    pub fn total_rows(&self) -> usize {
        self.labels.len()
    }

    pub fn summary(&self, table: &SensorTable) -> DetectionSummary {
        DetectionSummary {
            total_rows: self.total_rows(),
            anomaly_count: self.anomaly_count(),
            anomaly_percentage: anomaly_percentage(self.anomaly_count(), self.total_rows()),
            anomalies: table.snapshot(&self.anomaly_rows),
        }
    }
}

pub fn summarize(table: &SensorTable, preview_rows: usize) -> (DatasetOverview, TableSnapshot) {
    let overview = DatasetOverview {
        rows: table.row_count(),
        columns: table.column_count(),
        missing_values: table.missing_values(),
    };
    (overview, table.head(preview_rows))
}

pub fn require_rows(table: &SensorTable) -> StageOutcome<()> {
    if table.row_count() == 0 {
        StageOutcome::Halt(Notice::warning(NO_ROWS_MESSAGE))
    } else {
        StageOutcome::Continue(())
    }
}

pub fn select_numeric(table: &SensorTable) -> StageOutcome<NumericSelection> {
    let selection = table.numeric_columns();
    if selection.is_empty() {
        StageOutcome::Halt(Notice::warning(NO_NUMERIC_COLUMNS_MESSAGE))
    } else {
        StageOutcome::Continue(selection)
    }
}

pub fn trend_chart(table: &SensorTable, selection: &NumericSelection) -> TrendChart {
    let series = selection
        .indices
        .iter()
        .filter_map(|&index| table.columns().get(index))
        .map(|column| TrendSeries {
            name: column.name.clone(),
            values: column.numeric_values().to_vec(),
        })
        .collect();
    TrendChart {
        points: table.row_count(),
        series,
    }
}

/// Fits the fixed isolation forest on the numeric columns and writes the label
/// column into `table`.
pub fn detect_anomalies(
    table: &mut SensorTable,
    selection: &NumericSelection,
) -> Result<StageOutcome<DetectionResult>, DomainError> {
    let matrix = match table.numeric_matrix(selection) {
        Ok(matrix) => matrix,
        Err(DomainError::MissingReadings { .. }) => {
            return Ok(StageOutcome::Halt(Notice::warning(MISSING_READINGS_MESSAGE)))
        }
        Err(err) => return Err(err),
    };

    let labels = IsolationForest::standard().fit_predict(&matrix);
    table.apply_labels(&labels)?;
    let detection = DetectionResult::from_labels(labels);
    if detection.anomaly_count() == 0 {
        return Ok(StageOutcome::Halt(Notice::success(NO_ANOMALIES_MESSAGE)));
    }
    Ok(StageOutcome::Continue(detection))
}

/// Text summary of the anomalous rows for the explanation prompt.
pub fn describe_anomalies(
    table: &SensorTable,
    selection: &NumericSelection,
    detection: &DetectionResult,
) -> String {
    render_describe(&describe(table, selection, &detection.anomaly_rows))
}
