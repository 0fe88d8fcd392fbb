//! Competition Day - running orders, stage layouts and judged heats
//!
//! The engine behind the operator's screen on the day of a dance competition.
//! An event is danced as a running order of *cells* (level × category ×
//! gender). For each cell the operator configures the stage, previews how the
//! registered participants split into heats ("tandas"), confirms them, and
//! finally marks the cell finished.
//!
//! # Architecture
//!
//! ```text
//!                    ┌──────────────────────┐
//!                    │    CompetitionDay    │  facade + per-event sessions
//!                    └──────────────────────┘
//!                               │
//!        ┌──────────────────────┼──────────────────────┐
//!        ▼                      ▼                      ▼
//! ┌──────────────┐  ┌──────────────────────┐  ┌──────────────────┐
//! │   Schedule   │  │ LiveCompetition      │  │ HeatConfirmation │
//! │   Service    │  │ Registry             │  │ Flow             │
//! └──────────────┘  └──────────────────────┘  └──────────────────┘
//!        │                      │                      │
//!        └──────────────────────┼──────────────────────┘
//!                               ▼
//!                   ┌──────────────────────┐
//!                   │ CompetitionRepository│──▶ DocumentStore (dyn)
//!                   └──────────────────────┘
//! ```
//!
//! Pure decisions (building and reordering the running order, stage bounds,
//! heat packing, status derivation) live in `tanda-core`. This crate loads
//! documents, runs those decisions and writes the result back.
//!
//! # Key Guarantees
//!
//! - **All-or-nothing confirmation**: heats, cell counters and the event's
//!   active pointer are committed in one batch. A failed commit leaves no
//!   heats behind.
//! - **Heats are never regenerated**: once a round has persisted heats,
//!   generation returns them instead of a new preview.
//! - **Unsaved edits survive failures**: a running-order save that is not
//!   acknowledged keeps the working copy dirty so it can be retried.
//!
//! # Usage
//!
//! See [`CompetitionDay`] for the operations, and `src/bin/demo.rs` for a
//! walkthrough against the in-memory collaborators.

pub mod app;
pub mod config;
pub mod metrics;
pub mod repository;
pub mod services;
pub mod session;

pub use app::CompetitionDay;
pub use config::Config;
pub use repository::CompetitionRepository;
pub use services::{CellOverview, HeatConfirmationFlow, HeatGeneration, LiveCompetitionRegistry, ScheduleService};
pub use session::{EventSession, SessionMap};
