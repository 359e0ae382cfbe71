use tracing::error;
use uuid::Uuid;

use crate::AppError;
use crate::AppState;
use sensor_domain::DiagnosticReport;

pub async fn fetch_report(state: &AppState, id: Uuid) -> Result<DiagnosticReport, AppError> {
    let report = state
        .report_repo
        .fetch_report(id)
        .await
        .map_err(|err| {
            error!("failed to fetch report {}: {}", id, err);
            AppError::Internal(err)
        })?
        .ok_or_else(|| AppError::NotFound(format!("report {}", id)))?;
    state.metrics.record_report_download();
    Ok(report)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use tokio::sync::Mutex;

    use sensor_domain::{ReportRepository, RuntimeConfig};

    use super::*;
    use crate::Metrics;

    #[derive(Default)]
    struct SingleReport {
        slot: Mutex<Option<DiagnosticReport>>,
    }

    #[async_trait]
    impl ReportRepository for SingleReport {
        async fn save_report(&self, report: DiagnosticReport) -> anyhow::Result<()> {
            *self.slot.lock().await = Some(report);
            Ok(())
        }

        async fn fetch_report(&self, id: Uuid) -> anyhow::Result<Option<DiagnosticReport>> {
            Ok(self.slot.lock().await.clone().filter(|report| report.id == id))
        }

        async fn report_count(&self) -> usize {
            usize::from(self.slot.lock().await.is_some())
        }
    }

    fn state(repo: Arc<SingleReport>) -> AppState {
        AppState {
            config: RuntimeConfig::default(),
            report_repo: repo,
            explainer: None,
            metrics: Arc::new(Metrics::default()),
        }
    }

    #[tokio::test]
    async fn stored_report_is_returned_and_counted() {
        let repo = Arc::new(SingleReport::default());
        let report = DiagnosticReport::new(10, 1, "body".to_string());
        let id = report.id;
        repo.save_report(report).await.expect("save");
        let state = state(repo);

        let fetched = fetch_report(&state, id).await.expect("report");
        assert_eq!(fetched.content, "body");
        assert!(state
            .metrics
            .render_prometheus()
            .contains("sensor_reports_downloaded_total 1\n"));
    }

    #[tokio::test]
    async fn unknown_report_is_not_found() {
        let state = state(Arc::new(SingleReport::default()));
        let err = fetch_report(&state, Uuid::new_v4()).await.expect_err("missing");
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
