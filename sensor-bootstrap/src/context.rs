use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use sensor_application::{AppState, Metrics};
use sensor_domain::ExplanationService;
use sensor_infrastructure::{AppConfig, InMemoryReportRepository, OpenRouterExplanationService};

pub struct AppContext {
    pub state: AppState,
}

impl AppContext {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let runtime_config = config.to_runtime_config();
        let explanation_config = config.to_explanation_config();

        let explainer: Option<Arc<dyn ExplanationService>> = if explanation_config.api_key.is_some() {
            info!(
                model = %explanation_config.model,
                "AI explanations enabled via {}",
                explanation_config.endpoint
            );
            Some(Arc::new(OpenRouterExplanationService::new(&explanation_config)?))
        } else {
            info!("no explanation credential configured, AI explanations disabled");
            None
        };

        let report_repo = Arc::new(InMemoryReportRepository::new(
            runtime_config.report_cache_capacity,
        ));

        let state = AppState {
            config: runtime_config,
            report_repo,
            explainer,
            metrics: Arc::new(Metrics::default()),
        };

        Ok(Self { state })
    }
}
