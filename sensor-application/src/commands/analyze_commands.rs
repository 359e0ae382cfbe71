use std::time::Instant;

use tracing::{info, warn};

use sensor_domain::services::pipeline::{
    self, DetectionResult, StageOutcome, ANOMALIES_DETECTED_MESSAGE, EXPLANATION_FAILED_MESSAGE,
    MISSING_CREDENTIAL_MESSAGE,
};
use sensor_domain::{
    build_explanation_prompt, build_report, DashboardView, DiagnosticReport, Notice,
    NumericSelection, ReportLink, SensorTable,
};

use crate::AppError;
use crate::AppState;

enum ExplanationOutcome {
    Notes(String),
    Skipped(Notice),
}

/// Runs every stage against one uploaded CSV body and folds the outcomes into
/// the dashboard view. Only a malformed upload is an error; every other early
/// stop is a notice on an otherwise successful view.
pub async fn run_analysis(state: &AppState, body: &[u8]) -> Result<DashboardView, AppError> {
    let started = Instant::now();
    let upload = body.to_vec();
    let table = run_blocking(move || SensorTable::from_csv_bytes(&upload))
        .await?
        .map_err(|err| {
            state.metrics.record_analysis_error();
            warn!("rejected upload: {}", err);
            AppError::BadRequest(err.to_string())
        })?;
    state.metrics.record_analysis(table.row_count());
    info!(
        rows = table.row_count(),
        columns = table.column_count(),
        "dataset parsed"
    );

    let (overview, preview) = pipeline::summarize(&table, state.config.preview_rows);
    let mut view = DashboardView {
        overview,
        preview,
        ..DashboardView::default()
    };

    if let StageOutcome::Halt(notice) = pipeline::require_rows(&table) {
        view.push_notice(notice);
        return Ok(view);
    }

    let selection = match pipeline::select_numeric(&table) {
        StageOutcome::Continue(selection) => selection,
        StageOutcome::Halt(notice) => {
            warn!("no numeric columns in upload");
            view.push_notice(notice);
            return Ok(view);
        }
    };
    view.trend = Some(pipeline::trend_chart(&table, &selection));

    let detect_selection = selection.clone();
    let (table, outcome) = run_blocking(move || {
        let mut table = table;
        let outcome = pipeline::detect_anomalies(&mut table, &detect_selection);
        (table, outcome)
    })
    .await?;
    let detection = match outcome.map_err(|err| AppError::Internal(err.into()))? {
        StageOutcome::Continue(detection) => detection,
        StageOutcome::Halt(notice) => {
            info!(level = notice.level.as_str(), "detection stopped: {}", notice.message);
            view.push_notice(notice);
            return Ok(view);
        }
    };
    state.metrics.record_anomalies(detection.anomaly_count());
    info!(
        anomalies = detection.anomaly_count(),
        rows = detection.total_rows(),
        "anomalies detected"
    );
    view.push_notice(Notice::error(ANOMALIES_DETECTED_MESSAGE));
    view.detection = Some(detection.summary(&table));

    let notes = match request_explanation(state, &table, &selection, &detection).await {
        ExplanationOutcome::Notes(notes) => Some(notes),
        ExplanationOutcome::Skipped(notice) => {
            view.push_notice(notice);
            None
        }
    };
    view.explanation = notes.clone();

    let (total_rows, anomaly_count) = (detection.total_rows(), detection.anomaly_count());
    let content = run_blocking(move || {
        build_report(total_rows, anomaly_count, notes.as_deref(), &table)
    })
    .await?
    .map_err(|err| AppError::Internal(err.into()))?;
    let report = DiagnosticReport::new(total_rows, anomaly_count, content);
    let link = ReportLink {
        id: report.id,
        filename: report.filename.clone(),
        download_url: format!("/v2/reports/{}", report.id),
    };
    state
        .report_repo
        .save_report(report)
        .await
        .map_err(AppError::Internal)?;
    view.report = Some(link);

    info!(
        elapsed_ms = started.elapsed().as_millis() as u64,
        "analysis finished"
    );
    Ok(view)
}

/// Runs CPU-bound table work on the blocking pool.
async fn run_blocking<T, F>(task: F) -> Result<T, AppError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|err| AppError::Internal(err.into()))
}

async fn request_explanation(
    state: &AppState,
    table: &SensorTable,
    selection: &NumericSelection,
    detection: &DetectionResult,
) -> ExplanationOutcome {
    let Some(explainer) = &state.explainer else {
        return ExplanationOutcome::Skipped(Notice::info(MISSING_CREDENTIAL_MESSAGE));
    };

    let summary = pipeline::describe_anomalies(table, selection, detection);
    let prompt = build_explanation_prompt(&summary);
    state.metrics.record_explanation();
    match explainer.explain(&prompt).await {
        Ok(notes) => ExplanationOutcome::Notes(notes),
        Err(err) => {
            state.metrics.record_explanation_failure();
            warn!("explanation request failed: {}", err);
            ExplanationOutcome::Skipped(Notice::warning(EXPLANATION_FAILED_MESSAGE))
        }
    }
}
