use std::sync::Arc;

use sensor_domain::ports::{ExplanationService, ReportRepository};
use sensor_domain::RuntimeConfig;

use crate::Metrics;

#[derive(Clone)]
pub struct AppState {
    pub config: RuntimeConfig,
    pub report_repo: Arc<dyn ReportRepository>,
    /// Absent when no credential is configured.
    pub explainer: Option<Arc<dyn ExplanationService>>,
    pub metrics: Arc<Metrics>,
}
