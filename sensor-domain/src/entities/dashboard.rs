// Dashboard view entities
// Everything one pipeline run hands back to the page

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::TableSnapshot;
use crate::value_objects::NoticeLevel;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Info, message)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Success, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Error, message)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetOverview {
    pub rows: usize,
    pub columns: usize,
    pub missing_values: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendSeries {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

/// Line-chart data; row order stands in for time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrendChart {
    pub points: usize,
    pub series: Vec<TrendSeries>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionSummary {
    pub total_rows: usize,
    pub anomaly_count: usize,
    pub anomaly_percentage: f64,
    pub anomalies: TableSnapshot,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportLink {
    pub id: Uuid,
    pub filename: String,
    pub download_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardView {
    pub overview: DatasetOverview,
    pub preview: TableSnapshot,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trend: Option<TrendChart>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detection: Option<DetectionSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    pub notices: Vec<Notice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report: Option<ReportLink>,
}

impl DashboardView {
    pub fn push_notice(&mut self, notice: Notice) {
        self.notices.push(notice);
    }

    pub fn has_notice(&self, level: NoticeLevel) -> bool {
        self.notices.iter().any(|notice| notice.level == level)
    }
}
