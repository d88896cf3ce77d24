//! Application state and router assembly.

use crate::config::ServerConfig;
use crate::error::StartupError;
use crate::routes;
use axum::{
    Router,
    routing::{get, post},
};
use rootcause::prelude::{Report, ResultExt};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use triage_agents::{FaqDatabase, Generator, StageDeps, support_workflow};
use triage_ai::{
    LlmBackend, LlmBackendConfig, LlmError, LlmProvider, OpenAiCompatibleBackend, ScriptedBackend,
};
use triage_core::TicketState;
use triage_metrics::MetricsAggregator;
use triage_workflow::CompiledGraph;

/// State shared by every request handler.
pub struct AppState {
    /// The compiled support workflow.
    pub workflow: CompiledGraph<TicketState>,
    /// Process-wide ticket metrics.
    pub metrics: MetricsAggregator,
    /// Server configuration.
    pub config: ServerConfig,
}

impl AppState {
    /// Creates application state around an already compiled workflow.
    pub fn new(workflow: CompiledGraph<TicketState>, config: ServerConfig) -> Self {
        Self {
            workflow,
            metrics: MetricsAggregator::new(),
            config,
        }
    }

    /// Builds the backend, knowledge base and workflow described by `config`.
    ///
    /// # Errors
    ///
    /// Returns a [`StartupError`] naming the piece that could not be built.
    pub fn from_config(config: ServerConfig) -> Result<Self, Report<StartupError>> {
        let faqs =
            FaqDatabase::load(&config.faq_database_path).context(StartupError::KnowledgeBase)?;
        info!(
            path = %config.faq_database_path.display(),
            entries = faqs.len(),
            "loaded FAQ knowledge base"
        );

        let backend = build_backend(&config.llm).context(StartupError::Backend)?;
        info!(
            provider = %backend.provider(),
            model = backend.model(),
            "text-generation backend ready"
        );

        let generator = Generator::new(backend, config.llm.timeout())
            .with_default_temperature(config.llm.temperature);
        let deps = StageDeps::new(generator, Arc::new(faqs))
            .with_escalation_keywords(config.escalation_keywords.iter().cloned());
        let workflow = support_workflow(deps).context(StartupError::Workflow)?;

        Ok(Self::new(workflow, config))
    }
}

/// Creates the backend selected by `config.provider`.
///
/// The scripted provider answers every stage with fixed text so the
/// service can run without network access.
///
/// # Errors
///
/// Returns [`LlmError::InvalidConfig`] if an HTTP backend cannot be built.
pub fn build_backend(config: &LlmBackendConfig) -> Result<Arc<dyn LlmBackend>, LlmError> {
    match config.provider {
        LlmProvider::Scripted => Ok(Arc::new(offline_backend())),
        LlmProvider::Groq | LlmProvider::OpenAi | LlmProvider::OpenAiCompatible => {
            Ok(Arc::new(OpenAiCompatibleBackend::new(config.clone())?))
        }
    }
}

fn offline_backend() -> ScriptedBackend {
    ScriptedBackend::new(
        "Thank you for contacting support. We have reviewed your request and \
         will follow up if anything else is needed.",
    )
    .reply_when("FAQ matching specialist", "NO_MATCH")
    .reply_when("ticket classifier", "GENERAL")
    .reply_when("escalation evaluation", "RESOLVE")
}

/// Builds the HTTP router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(routes::root))
        .route("/health", get(routes::health))
        .route("/api/v1/tickets/process", post(routes::process_ticket))
        .route("/api/v1/metrics", get(routes::metrics))
        .route("/api/v1/metrics/reset", post(routes::reset_metrics))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
