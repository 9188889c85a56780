use std::sync::Arc;

use common::{Context, DecisionRequest};
use demand_model::grid::{distinct_prices, is_usable_grid};
use demand_model::{
    context_dispersion, ContextEncoder, DemandPredictor, LoadedArtifacts, PriceGridStore,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::types::{BlockReason, CandidateScore, Decision, DecisionResult, Rejection, Score};

/// Weight on the context dispersion when exploration is on.
pub const EXPLORATION_ALPHA: f64 = 0.8;

/// What to do when the guardrail blocks every grid price.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FullBlockPolicy {
    /// Reject with [`Rejection::NoEligiblePrice`].
    #[default]
    Reject,
    /// Price at the first blocked candidate in grid order.
    FirstBlocked,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub exploration_alpha: f64,
    pub full_block_policy: FullBlockPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            exploration_alpha: EXPLORATION_ALPHA,
            full_block_policy: FullBlockPolicy::default(),
        }
    }
}

/// Parse the optional min-margin input.
///
/// Absent, empty and whitespace-only inputs mean "no guardrail".
pub fn parse_min_margin(raw: Option<&str>) -> Result<Option<f64>, Rejection> {
    let Some(trimmed) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(Some(value)),
        _ => Err(Rejection::InvalidGuardrail {
            raw: trimmed.to_string(),
        }),
    }
}

/// Stateless across requests; safe to share between threads.
pub struct DecisionEngine {
    predictor: Arc<dyn DemandPredictor>,
    encoder: Arc<dyn ContextEncoder>,
    grids: Arc<PriceGridStore>,
    config: EngineConfig,
}

impl DecisionEngine {
    pub fn new(artifacts: LoadedArtifacts, config: EngineConfig) -> Self {
        Self::from_parts(artifacts.predictor, artifacts.encoder, artifacts.grids, config)
    }

    pub fn from_parts(
        predictor: Arc<dyn DemandPredictor>,
        encoder: Arc<dyn ContextEncoder>,
        grids: Arc<PriceGridStore>,
        config: EngineConfig,
    ) -> Self {
        Self {
            predictor,
            encoder,
            grids,
            config,
        }
    }

    pub fn grids(&self) -> &PriceGridStore {
        &self.grids
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn choose(&self, request: &DecisionRequest) -> Decision {
        self.choose_price(
            request.item_id.as_deref(),
            &request.context,
            request.min_margin.as_deref(),
            request.explore,
        )
    }

    /// Score every grid price for `item_id` under `context` and pick one.
    pub fn choose_price(
        &self,
        item_id: Option<&str>,
        context: &Context,
        min_margin: Option<&str>,
        explore: bool,
    ) -> Decision {
        match self.try_choose_price(item_id, context, min_margin, explore) {
            Ok(result) => {
                info!(
                    "{}: chose {:.2} (index {}, guardrail_applied={}, explore={})",
                    result.item_id,
                    result.chosen_price,
                    result.chosen_index,
                    result.guardrail_applied,
                    result.exploration_enabled
                );
                Decision::Priced(result)
            }
            Err(rejection) => {
                warn!("rejected: {}", rejection.message());
                Decision::Rejected(rejection)
            }
        }
    }

    fn try_choose_price(
        &self,
        item_id: Option<&str>,
        context: &Context,
        min_margin: Option<&str>,
        explore: bool,
    ) -> Result<DecisionResult, Rejection> {
        let item_id = item_id
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(Rejection::NoItemSelected)?;

        let grid = match self.grids.grid(item_id) {
            Some(grid) if is_usable_grid(grid) => grid,
            other => {
                return Err(Rejection::NoUsableGrid {
                    item_id: item_id.to_string(),
                    distinct_prices: other.map_or(0, distinct_prices),
                })
            }
        };

        let min_margin = parse_min_margin(min_margin)?;

        let sigma = context_dispersion(self.encoder.as_ref(), context).map_err(|e| {
            Rejection::PredictionUnavailable {
                item_id: item_id.to_string(),
                price: None,
                detail: e.to_string(),
            }
        })?;
        let alpha = if explore {
            self.config.exploration_alpha
        } else {
            0.0
        };
        let bonus = alpha * sigma;

        let mut guardrail_applied = false;
        let mut candidates = Vec::with_capacity(grid.len());
        for (idx, &price) in grid.iter().enumerate() {
            if !price.is_finite() || price <= 0.0 {
                warn!("{}: skipping invalid grid price {} at index {}", item_id, price, idx);
                candidates.push(CandidateScore::blocked(idx, price, BlockReason::InvalidPrice));
                continue;
            }
            if min_margin.is_some_and(|mm| price < mm) {
                guardrail_applied = true;
                debug!("{}: {:.2} blocked by min margin", item_id, price);
                candidates.push(CandidateScore::blocked(idx, price, BlockReason::BelowMinMargin));
                continue;
            }

            let estimate = self.predictor.estimate(item_id, context, price).map_err(|e| {
                Rejection::PredictionUnavailable {
                    item_id: item_id.to_string(),
                    price: Some(price),
                    detail: e.to_string(),
                }
            })?;
            let score = estimate.expected_revenue + bonus;
            debug!(
                "{}: price={:.2} qty={:.3} rev={:.3} score={:.3}",
                item_id, price, estimate.expected_qty, estimate.expected_revenue, score
            );
            candidates.push(CandidateScore {
                grid_index: idx,
                price,
                expected_qty: estimate.expected_qty,
                expected_revenue: Score::Scored(estimate.expected_revenue),
                exploration_bonus: bonus,
                score: Score::Scored(score),
                blocked: None,
            });
        }

        let mut best = select_best(&candidates);

        if candidates[best].score.is_blocked() {
            match (min_margin, guardrail_applied, self.config.full_block_policy) {
                (Some(mm), true, FullBlockPolicy::Reject) => {
                    return Err(Rejection::NoEligiblePrice {
                        item_id: item_id.to_string(),
                        min_margin: mm,
                        candidates: sorted_by_price(&candidates),
                        guardrail_applied,
                    });
                }
                (_, true, FullBlockPolicy::FirstBlocked) => {
                    // Invalid prices are never offered, even as a fallback.
                    if let Some(idx) = candidates
                        .iter()
                        .position(|c| c.blocked == Some(BlockReason::BelowMinMargin))
                    {
                        best = idx;
                    }
                }
                // Every price was invalid; nothing on the grid is searchable.
                _ => {
                    return Err(Rejection::NoUsableGrid {
                        item_id: item_id.to_string(),
                        distinct_prices: 0,
                    });
                }
            }
        }
        let chosen = candidates[best].clone();

        Ok(DecisionResult {
            item_id: item_id.to_string(),
            context: *context,
            grid: grid.to_vec(),
            chosen_price: chosen.price,
            chosen_index: best,
            scores: candidates.iter().map(|c| c.score).collect(),
            candidates: sorted_by_price(&candidates),
            chosen,
            min_margin,
            guardrail_applied,
            exploration_enabled: explore,
            exploration_alpha: alpha,
            sigma,
        })
    }
}

/// Arg-max over scores; the earliest candidate wins ties.
fn select_best(candidates: &[CandidateScore]) -> usize {
    let mut best = 0;
    for (idx, candidate) in candidates.iter().enumerate().skip(1) {
        if candidate.score.beats(&candidates[best].score) {
            best = idx;
        }
    }
    best
}

fn sorted_by_price(candidates: &[CandidateScore]) -> Vec<CandidateScore> {
    let mut sorted = candidates.to_vec();
    sorted.sort_by(|a, b| a.price.total_cmp(&b.price));
    sorted
}
