//! Configuration management for the competition-day engine.
//!
//! Loads configuration from environment variables with sensible defaults.

use serde::{Deserialize, Serialize};
use std::env;
use tanda_core::schedule::PhaseDurations;

/// Engine configuration loaded from environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Log level filter (trace, debug, info, warn, error)
    pub log_level: String,
    /// Reject `confirm` while another cell holds the floor
    ///
    /// Off by default: the active-cell pointer is advisory and an overlap is
    /// only logged.
    pub enforce_single_active_cell: bool,
    /// Default round durations used when building a running order
    pub durations: PhaseDurations,
    /// Record business metrics
    pub metrics_enabled: bool,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Unset or unparsable variables fall back to their defaults.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = PhaseDurations::default();

        Self {
            log_level: env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            enforce_single_active_cell: env::var("COMPETITION_ENFORCE_SINGLE_ACTIVE_CELL")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(false),
            durations: PhaseDurations {
                eliminatoria: env::var("COMPETITION_ELIMINATORIA_MINUTES")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .filter(|minutes| *minutes > 0)
                    .unwrap_or(defaults.eliminatoria),
                semifinal: env::var("COMPETITION_SEMIFINAL_MINUTES")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .filter(|minutes| *minutes > 0)
                    .unwrap_or(defaults.semifinal),
                final_round: env::var("COMPETITION_FINAL_MINUTES")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .filter(|minutes| *minutes > 0)
                    .unwrap_or(defaults.final_round),
            },
            metrics_enabled: env::var("COMPETITION_METRICS_ENABLED")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(true),
        }
    }

    /// Builder-style toggle of the single-active-cell guard
    #[must_use]
    pub const fn with_single_active_cell(mut self, enforce: bool) -> Self {
        self.enforce_single_active_cell = enforce;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            enforce_single_active_cell: false,
            durations: PhaseDurations::default(),
            metrics_enabled: true,
        }
    }
}
