use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct Metrics {
    analyses: AtomicU64,
    analysis_errors: AtomicU64,
    rows: AtomicU64,
    anomalies: AtomicU64,
    explanations: AtomicU64,
    explanation_failures: AtomicU64,
    reports_downloaded: AtomicU64,
}

impl Metrics {
    pub fn record_analysis(&self, row_count: usize) {
        self.analyses.fetch_add(1, Ordering::Relaxed);
        self.rows.fetch_add(row_count as u64, Ordering::Relaxed);
    }

    pub fn record_analysis_error(&self) {
        self.analysis_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_anomalies(&self, count: usize) {
        self.anomalies.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn record_explanation(&self) {
        self.explanations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_explanation_failure(&self) {
        self.explanation_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_report_download(&self) {
        self.reports_downloaded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn render_prometheus(&self) -> String {
        let analyses = self.analyses.load(Ordering::Relaxed);
        let errors = self.analysis_errors.load(Ordering::Relaxed);
        let rows = self.rows.load(Ordering::Relaxed);
        let anomalies = self.anomalies.load(Ordering::Relaxed);
        let explanations = self.explanations.load(Ordering::Relaxed);
        let explanation_failures = self.explanation_failures.load(Ordering::Relaxed);
        let downloads = self.reports_downloaded.load(Ordering::Relaxed);

        format!(
            "# TYPE sensor_analyses_total counter\n\
sensor_analyses_total {}\n\
# TYPE sensor_analysis_errors_total counter\n\
sensor_analysis_errors_total {}\n\
# TYPE sensor_rows_total counter\n\
sensor_rows_total {}\n\
# TYPE sensor_anomalies_total counter\n\
sensor_anomalies_total {}\n\
# TYPE sensor_explanations_total counter\n\
sensor_explanations_total {}\n\
# TYPE sensor_explanation_failures_total counter\n\
sensor_explanation_failures_total {}\n\
# TYPE sensor_reports_downloaded_total counter\n\
sensor_reports_downloaded_total {}\n",
            analyses, errors, rows, anomalies, explanations, explanation_failures, downloads
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prometheus_output_reflects_counters() {
        let metrics = Metrics::default();
        metrics.record_analysis(100);
        metrics.record_analysis(20);
        metrics.record_anomalies(5);
        metrics.record_explanation_failure();
        let text = metrics.render_prometheus();
        assert!(text.contains("sensor_analyses_total 2\n"));
        assert!(text.contains("sensor_rows_total 120\n"));
        assert!(text.contains("sensor_anomalies_total 5\n"));
        assert!(text.contains("sensor_explanation_failures_total 1\n"));
        assert!(text.contains("sensor_reports_downloaded_total 0\n"));
    }
}
