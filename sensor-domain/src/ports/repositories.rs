use async_trait::async_trait;
use uuid::Uuid;

use crate::entities::DiagnosticReport;

#[async_trait]
pub trait ReportRepository: Send + Sync {
    async fn save_report(&self, report: DiagnosticReport) -> anyhow::Result<()>;
    async fn fetch_report(&self, id: Uuid) -> anyhow::Result<Option<DiagnosticReport>>;
    async fn report_count(&self) -> usize;
}
