//! Deterministic exposure hedging.
//!
//! Each evaluation cycle:
//! - Aggregates open exposures per symbol (request rows or the trade ledger)
//! - Fires at most one trigger per symbol: ATR spike, drawdown, or news
//! - Selects the hedge instrument and sizes the hedge under a basket cap
//! - Closes open hedges whose trigger has cleared, with hysteresis
//! - Persists decisions and publishes a signal for each
//!
//! Planning is pure; only the emitter touches collaborators.

pub mod aggregator;
pub mod emitter;
pub mod error;
pub mod lifecycle;
pub mod memory;
pub mod planner;
pub mod selector;
pub mod service;
pub mod sizing;
pub mod triggers;
pub mod types;
pub mod validation;

pub use error::{HedgeError, Result};
pub use memory::{InMemoryHedgeStore, RecordingPublisher, StaticLedger};
pub use planner::plan_cycle;
pub use service::HedgeEngine;
pub use triggers::{Trigger, TriggerEvaluator, TriggerRule};
pub use types::{
    AggregatedExposure, CycleContext, HedgeAction, HedgeDecision, HedgePlan, HedgeRequest,
    HedgeResponse, HedgeSummary, NewsEvent, NewsSeverity, VolatilitySnapshot,
};
