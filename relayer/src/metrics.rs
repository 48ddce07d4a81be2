//! Metrics: one registry shared by the scanner, both loops and
//! the periodic collector; served over HTTP as Prometheus text format.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use prometheus::{Counter, Encoder, Gauge, IntGauge, Registry, TextEncoder};

use crate::error::{RelayerError, Result};

#[derive(Clone)]
pub struct RelayerMetrics {
    pub registry: Registry,
    pub loop_a_evidences_submitted: Counter,
    pub loop_a_errors: Counter,
    pub loop_b_signatures_uploaded: Counter,
    pub loop_b_submissions: Counter,
    pub loop_b_errors: Counter,
    pub pending_operations: IntGauge,
    pub xrpl_account_reserve_drops: Gauge,
    pub task_restarts: Counter,
}

impl RelayerMetrics {
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();
        let loop_a_evidences_submitted = Counter::new("relayer_loop_a_evidences_submitted_total", "Evidences submitted by the XRPL-to-Coreum loop")?;
        let loop_a_errors = Counter::new("relayer_loop_a_errors_total", "Errors encountered by the XRPL-to-Coreum loop")?;
        let loop_b_signatures_uploaded = Counter::new("relayer_loop_b_signatures_uploaded_total", "Signatures uploaded by the Coreum-to-XRPL loop")?;
        let loop_b_submissions = Counter::new("relayer_loop_b_submissions_total", "Multi-signed transactions broadcast by this relayer")?;
        let loop_b_errors = Counter::new("relayer_loop_b_errors_total", "Errors encountered by the Coreum-to-XRPL loop")?;
        let pending_operations = IntGauge::new("relayer_pending_operations", "Pending operations last observed on the contract")?;
        let xrpl_account_reserve_drops = Gauge::new("relayer_xrpl_account_reserve_drops", "Bridge account's XRPL reserve requirement, in drops")?;
        let task_restarts = Counter::new("relayer_task_restarts_total", "Supervised task restarts across all tasks")?;

        for metric in [&loop_a_evidences_submitted, &loop_a_errors, &loop_b_signatures_uploaded, &loop_b_submissions, &loop_b_errors] {
            registry.register(Box::new(metric.clone()))?;
        }
        registry.register(Box::new(pending_operations.clone()))?;
        registry.register(Box::new(xrpl_account_reserve_drops.clone()))?;
        registry.register(Box::new(task_restarts.clone()))?;

        Ok(Self {
            registry,
            loop_a_evidences_submitted,
            loop_a_errors,
            loop_b_signatures_uploaded,
            loop_b_submissions,
            loop_b_errors,
            pending_operations,
            xrpl_account_reserve_drops,
            task_restarts,
        })
    }
}

async fn metrics_handler(State(metrics): State<Arc<RelayerMetrics>>) -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let families = metrics.registry.gather();
    let mut buffer = vec![];
    if let Err(err) = encoder.encode(&families, &mut buffer) {
        tracing::error!(error = %err, "failed to encode metrics");
        return (StatusCode::INTERNAL_SERVER_ERROR, "encoding failure".to_string()).into_response();
    }
    ([(header::CONTENT_TYPE, encoder.format_type())], buffer).into_response()
}

/// Serves `/metrics` until cancelled by the caller dropping the returned
/// task (the supervisor owns restart policy for this like any other task).
pub async fn serve(listen_address: &str, metrics: Arc<RelayerMetrics>) -> Result<()> {
    let addr: SocketAddr = listen_address
        .parse()
        .map_err(|e| RelayerError::Config(format!("invalid metrics.server.listen_address {listen_address}: {e}")))?;
    let app = Router::new().route("/metrics", get(metrics_handler)).with_state(metrics);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| RelayerError::Config(format!("binding metrics listener on {addr}: {e}")))?;
    axum::serve(listener, app).await.map_err(|e| RelayerError::Config(e.to_string()))
}
