//! Business metrics for the competition-day engine.
//!
//! # Exported Metrics
//!
//! ## Counters
//! - `competition_schedule_rebuilds_total` - Running orders rebuilt from a dance configuration
//! - `competition_heats_confirmed_total{phase}` - Heat sets confirmed
//! - `competition_tandas_persisted_total{phase}` - Tandas written by confirmations
//! - `competition_cells_finished_total` - Cells finished explicitly
//! - `competition_confirm_failures_total{reason}` - Rejected or failed confirmations
//!
//! ## Gauges
//! - `competition_schedule_items` - Rows in the most recently built running order

use metrics::{describe_counter, describe_gauge};
use tanda_core::error::CompetitionError;
use tanda_core::types::Phase;

/// Initialize and register all business metrics descriptions.
///
/// This should be called once at application startup, before any metrics are recorded.
pub fn register_metrics() {
    describe_counter!(
        "competition_schedule_rebuilds_total",
        "Total number of running orders rebuilt from a dance configuration"
    );
    describe_gauge!(
        "competition_schedule_items",
        "Rows in the most recently built running order"
    );
    describe_counter!(
        "competition_heats_confirmed_total",
        "Total number of heat sets confirmed, by phase"
    );
    describe_counter!(
        "competition_tandas_persisted_total",
        "Total number of tandas written by confirmations, by phase"
    );
    describe_counter!(
        "competition_cells_finished_total",
        "Total number of cells finished explicitly"
    );
    describe_counter!(
        "competition_confirm_failures_total",
        "Total number of confirmations that wrote nothing, by reason"
    );

    tracing::info!("Competition metrics registered");
}

// ============================================================================
// Metric Recording Functions
// ============================================================================

/// Record a running-order rebuild.
#[allow(clippy::cast_precision_loss)] // Running orders are far below 2^52 rows
pub fn record_schedule_rebuilt(items: usize) {
    metrics::counter!("competition_schedule_rebuilds_total").increment(1);
    metrics::gauge!("competition_schedule_items").set(items as f64);
    tracing::debug!(items, "Recorded schedule_rebuilt metric");
}

/// Record a confirmed heat set.
pub fn record_heats_confirmed(phase: Phase, tandas: u32) {
    metrics::counter!("competition_heats_confirmed_total", "phase" => phase.as_str()).increment(1);
    metrics::counter!("competition_tandas_persisted_total", "phase" => phase.as_str())
        .increment(u64::from(tandas));
    tracing::debug!(%phase, tandas, "Recorded heats_confirmed metric");
}

/// Record an explicit finish.
pub fn record_cell_finished() {
    metrics::counter!("competition_cells_finished_total").increment(1);
    tracing::debug!("Recorded cell_finished metric");
}

/// Record a confirmation that wrote nothing.
pub fn record_confirm_failure(error: &CompetitionError) {
    let reason = failure_reason(error);
    metrics::counter!("competition_confirm_failures_total", "reason" => reason).increment(1);
    tracing::debug!(reason, "Recorded confirm_failure metric");
}

const fn failure_reason(error: &CompetitionError) -> &'static str {
    match error {
        CompetitionError::Validation(_) => "validation",
        CompetitionError::NotFound { .. } => "not_found",
        CompetitionError::Persistence(_) => "persistence",
        CompetitionError::Directory(_) => "directory",
        CompetitionError::Conflict(_) => "conflict",
    }
}
