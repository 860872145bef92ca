//! Hedge evaluation service: one request in, one cycle of decisions out.

use std::sync::Arc;

use hedgebot_core::{ExposureInput, HedgeConfig, HedgeStore, SignalPublisher, TradeLedger};
use tracing::{debug, info, warn};

use crate::aggregator::aggregate_exposures;
use crate::emitter::DecisionEmitter;
use crate::error::{HedgeError, Result};
use crate::planner::plan_cycle;
use crate::triggers::TriggerEvaluator;
use crate::types::{HedgePlan, HedgeRequest, HedgeResponse};
use crate::validation::{validate_request, ValidatedRequest};

/// Runs evaluation cycles against injected collaborators.
///
/// Each call builds its own context from the request, so concurrent cycles
/// share nothing but the collaborators. Duplicate opens across overlapping
/// cycles are left to the registry's uniqueness constraint.
pub struct HedgeEngine {
    store: Arc<dyn HedgeStore>,
    ledger: Arc<dyn TradeLedger>,
    publisher: Arc<dyn SignalPublisher>,
    defaults: HedgeConfig,
    evaluator: TriggerEvaluator,
}

impl HedgeEngine {
    pub fn new(
        store: Arc<dyn HedgeStore>,
        ledger: Arc<dyn TradeLedger>,
        publisher: Arc<dyn SignalPublisher>,
        defaults: HedgeConfig,
    ) -> Self {
        Self {
            store,
            ledger,
            publisher,
            defaults,
            evaluator: TriggerEvaluator::default(),
        }
    }

    /// Replaces the trigger rule order.
    #[must_use]
    pub fn with_evaluator(mut self, evaluator: TriggerEvaluator) -> Self {
        self.evaluator = evaluator;
        self
    }

    #[must_use]
    pub fn store(&self) -> &Arc<dyn HedgeStore> {
        &self.store
    }

    #[must_use]
    pub fn defaults(&self) -> &HedgeConfig {
        &self.defaults
    }

    /// Computes the plan for a request without writing or publishing anything.
    pub async fn plan(&self, request: HedgeRequest) -> Result<HedgePlan> {
        let validated = validate_request(request, &self.defaults)?;
        self.plan_validated(validated).await
    }

    /// Runs a full cycle: plan, persist, publish.
    pub async fn evaluate(&self, request: HedgeRequest) -> Result<HedgeResponse> {
        let validated = validate_request(request, &self.defaults)?;
        let plan = self.plan_validated(validated).await?;

        let response = DecisionEmitter::new(self.store.as_ref(), self.publisher.as_ref())
            .emit(&plan)
            .await;

        info!(
            requested_opens = response.summary.requested_opens,
            requested_closes = response.summary.requested_closes,
            opened = response.opened.len(),
            closed = response.closed.len(),
            failed = response.summary.failed,
            "Hedge cycle complete"
        );
        Ok(response)
    }

    async fn plan_validated(&self, validated: ValidatedRequest) -> Result<HedgePlan> {
        let ValidatedRequest { exposures, context } = validated;

        let exposures = match exposures {
            Some(exposures) => exposures,
            None => normalize_ledger(
                self.ledger
                    .open_exposures()
                    .await
                    .map_err(|e| HedgeError::collaborator(&e))?,
            ),
        };
        let active = self
            .store
            .active_hedges()
            .await
            .map_err(|e| HedgeError::collaborator(&e))?;

        let aggregates = aggregate_exposures(&exposures);
        debug!(
            symbols = aggregates.len(),
            active = active.len(),
            mode = ?context.mode,
            "Planning hedge cycle"
        );

        Ok(plan_cycle(&aggregates, &active, &context, &self.evaluator))
    }
}

/// Ledger rows get the same symbol normalization as request rows. Blank symbols are dropped.
fn normalize_ledger(exposures: Vec<ExposureInput>) -> Vec<ExposureInput> {
    exposures
        .into_iter()
        .filter_map(|mut exposure| {
            let symbol = exposure.symbol.trim().to_ascii_uppercase();
            if symbol.is_empty() {
                warn!("Skipping ledger exposure with blank symbol");
                return None;
            }
            exposure.symbol = symbol;
            Some(exposure)
        })
        .collect()
}
