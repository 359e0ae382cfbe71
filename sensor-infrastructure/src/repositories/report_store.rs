use std::collections::VecDeque;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use sensor_domain::{DiagnosticReport, ReportRepository};

/// Bounded in-memory report store; the oldest report is evicted first.
pub struct InMemoryReportRepository {
    capacity: usize,
    reports: RwLock<VecDeque<DiagnosticReport>>,
}

impl InMemoryReportRepository {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            reports: RwLock::new(VecDeque::with_capacity(capacity)),
        }
    }
}

#[async_trait]
impl ReportRepository for InMemoryReportRepository {
    async fn save_report(&self, report: DiagnosticReport) -> anyhow::Result<()> {
        let mut reports = self.reports.write().await;
        while reports.len() >= self.capacity {
            if let Some(evicted) = reports.pop_front() {
                debug!("evicting report {}", evicted.id);
            }
        }
        reports.push_back(report);
        Ok(())
    }

    async fn fetch_report(&self, id: Uuid) -> anyhow::Result<Option<DiagnosticReport>> {
        let reports = self.reports.read().await;
        Ok(reports.iter().find(|report| report.id == id).cloned())
    }

    async fn report_count(&self) -> usize {
        self.reports.read().await.len()
    }
}
