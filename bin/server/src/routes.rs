//! HTTP handlers.

use crate::app::AppState;
use crate::error::ApiError;
use axum::{Json, extract::State};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value as JsonValue, json};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, instrument};
use triage_core::{Priority, TicketId, TicketState};
use triage_metrics::MetricsSnapshot;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Body of `POST /api/v1/tickets/process`.
#[derive(Debug, Deserialize)]
pub struct TicketRequest {
    pub customer_query: String,
    pub customer_email: Option<String>,
    /// Caller-chosen id; a blank value is treated as absent.
    pub ticket_id: Option<String>,
}

/// A processed ticket.
#[derive(Debug, Serialize, Deserialize)]
pub struct TicketResponse {
    pub ticket_id: String,
    pub category: String,
    pub final_response: String,
    pub needs_escalation: bool,
    pub priority: Priority,
    pub timestamp: DateTime<Utc>,
    pub conversation_history: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub timestamp: DateTime<Utc>,
}

/// Service information.
pub async fn root() -> Json<JsonValue> {
    Json(json!({
        "message": "Customer Support Ticket Triage API",
        "version": VERSION,
        "endpoints": {
            "process_ticket": "/api/v1/tickets/process",
            "health": "/health",
            "metrics": "/api/v1/metrics",
        },
    }))
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: VERSION,
        timestamp: Utc::now(),
    })
}

/// Runs a ticket through the support workflow.
#[instrument(skip_all)]
pub async fn process_ticket(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TicketRequest>,
) -> Result<Json<TicketResponse>, ApiError> {
    let ticket_id = match request.ticket_id.as_deref().map(str::trim) {
        Some(id) if !id.is_empty() => id
            .parse::<TicketId>()
            .map_err(|e| ApiError::InvalidTicketId {
                reason: e.to_string(),
            })?,
        _ => TicketId::generate(&state.config.ticket_id_prefix),
    };

    let mut ticket = TicketState::try_new(ticket_id.clone(), request.customer_query)?;
    if let Some(email) = request.customer_email {
        ticket = ticket.with_customer_email(email);
    }

    info!(ticket = %ticket_id, "processing ticket");
    let started = Instant::now();

    let result = match state.workflow.invoke(ticket).await {
        Ok(result) => result,
        Err(report) => {
            let failure = report.current_context();
            error!(
                ticket = %ticket_id,
                stage = failure.stage().unwrap_or("unknown"),
                error = %report,
                "ticket processing failed"
            );
            return Err(ApiError::Processing {
                detail: failure.to_string(),
            });
        }
    };

    let elapsed = started.elapsed();
    state
        .metrics
        .record(result.category_label(), result.needs_escalation, elapsed);
    info!(
        ticket = %ticket_id,
        category = result.category_label(),
        escalated = result.needs_escalation,
        seconds = format_args!("{:.2}", elapsed.as_secs_f64()),
        "ticket processed"
    );

    Ok(Json(TicketResponse {
        ticket_id: result.ticket_id().to_string(),
        category: result.category_label().to_string(),
        final_response: result.final_response.clone().unwrap_or_default(),
        needs_escalation: result.needs_escalation,
        priority: result.priority,
        timestamp: result.timestamp,
        conversation_history: result
            .recent_history(state.config.max_history_display)
            .to_vec(),
    }))
}

pub async fn metrics(State(state): State<Arc<AppState>>) -> Json<MetricsSnapshot> {
    Json(state.metrics.snapshot())
}

pub async fn reset_metrics(State(state): State<Arc<AppState>>) -> Json<JsonValue> {
    state.metrics.reset();
    Json(json!({ "message": "Metrics reset successfully" }))
}
