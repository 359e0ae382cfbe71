// Anomaly label value object
// Written to the label column as -1 (outlier) and 1 (inlier)

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnomalyLabel {
    Normal,
    Anomaly,
}

impl AnomalyLabel {
    pub fn csv_value(&self) -> &'static str {
        match self {
            AnomalyLabel::Normal => "1",
            AnomalyLabel::Anomaly => "-1",
        }
    }

    pub fn is_anomaly(&self) -> bool {
        matches!(self, AnomalyLabel::Anomaly)
    }
}
