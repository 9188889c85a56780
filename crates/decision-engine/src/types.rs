use common::Context;
use serde::{Deserialize, Serialize};

/// Candidate score. `Blocked` loses to every `Scored` value.
///
/// Serializes as a number, or `null` when blocked.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "Option<f64>", into = "Option<f64>")]
pub enum Score {
    Scored(f64),
    Blocked,
}

impl Score {
    pub fn value(&self) -> Option<f64> {
        match self {
            Score::Scored(v) => Some(*v),
            Score::Blocked => None,
        }
    }

    pub fn is_blocked(&self) -> bool {
        matches!(self, Score::Blocked)
    }

    /// Strictly better than `other`. Ties never beat, so an arg-max that
    /// only replaces on `beats` keeps the earliest candidate.
    pub fn beats(&self, other: &Score) -> bool {
        match (self, other) {
            (Score::Scored(a), Score::Scored(b)) => a > b,
            (Score::Scored(_), Score::Blocked) => true,
            (Score::Blocked, _) => false,
        }
    }
}

impl From<Score> for Option<f64> {
    fn from(score: Score) -> Self {
        score.value()
    }
}

impl From<Option<f64>> for Score {
    fn from(value: Option<f64>) -> Self {
        value.map_or(Score::Blocked, Score::Scored)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockReason {
    /// Price below the requested min margin.
    BelowMinMargin,
    /// Price is non-positive or non-finite; never sent to the predictor.
    InvalidPrice,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateScore {
    /// Position on the original grid.
    pub grid_index: usize,
    pub price: f64,
    pub expected_qty: f64,
    pub expected_revenue: Score,
    pub exploration_bonus: f64,
    pub score: Score,
    pub blocked: Option<BlockReason>,
}

impl CandidateScore {
    pub(crate) fn blocked(grid_index: usize, price: f64, reason: BlockReason) -> Self {
        Self {
            grid_index,
            price,
            expected_qty: 0.0,
            expected_revenue: Score::Blocked,
            exploration_bonus: 0.0,
            score: Score::Blocked,
            blocked: Some(reason),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionResult {
    pub item_id: String,
    pub context: Context,
    /// Grid as searched, in stored order.
    pub grid: Vec<f64>,
    pub chosen_price: f64,
    pub chosen_index: usize,
    pub chosen: CandidateScore,
    /// Sorted by price ascending; ties keep grid order.
    pub candidates: Vec<CandidateScore>,
    /// Scores in grid order, aligned with `grid`.
    pub scores: Vec<Score>,
    pub min_margin: Option<f64>,
    pub guardrail_applied: bool,
    pub exploration_enabled: bool,
    pub exploration_alpha: f64,
    pub sigma: f64,
}

impl DecisionResult {
    /// Prices excluded by the guardrail, ascending.
    pub fn blocked_prices(&self) -> Vec<f64> {
        self.candidates
            .iter()
            .filter(|c| c.blocked == Some(BlockReason::BelowMinMargin))
            .map(|c| c.price)
            .collect()
    }

    /// Bonus added to every scored candidate.
    pub fn exploration_bonus(&self) -> f64 {
        self.exploration_alpha * self.sigma
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionKind {
    /// Caller input is wrong (no item, non-numeric guardrail).
    Validation,
    /// The item has no searchable grid.
    UnusableGrid,
    /// Predictor or encoder could not produce an estimate.
    Predictor,
    /// The guardrail excluded every candidate.
    Guardrail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Rejection {
    NoItemSelected,
    NoUsableGrid {
        item_id: String,
        distinct_prices: usize,
    },
    InvalidGuardrail {
        raw: String,
    },
    PredictionUnavailable {
        item_id: String,
        price: Option<f64>,
        detail: String,
    },
    NoEligiblePrice {
        item_id: String,
        min_margin: f64,
        candidates: Vec<CandidateScore>,
        guardrail_applied: bool,
    },
}

impl Rejection {
    pub fn kind(&self) -> RejectionKind {
        match self {
            Rejection::NoItemSelected | Rejection::InvalidGuardrail { .. } => {
                RejectionKind::Validation
            }
            Rejection::NoUsableGrid { .. } => RejectionKind::UnusableGrid,
            Rejection::PredictionUnavailable { .. } => RejectionKind::Predictor,
            Rejection::NoEligiblePrice { .. } => RejectionKind::Guardrail,
        }
    }

    pub fn message(&self) -> String {
        match self {
            Rejection::NoItemSelected => "Pick an item_id.".to_string(),
            Rejection::NoUsableGrid { item_id, .. } => {
                format!("No usable price grid for {}.", item_id)
            }
            Rejection::InvalidGuardrail { raw } => {
                format!("min_margin must be numeric (got '{}').", raw)
            }
            Rejection::PredictionUnavailable {
                item_id,
                price: Some(price),
                detail,
            } => format!(
                "Prediction unavailable for {} at {:.2}: {}",
                item_id, price, detail
            ),
            Rejection::PredictionUnavailable {
                item_id, detail, ..
            } => format!("Prediction unavailable for {}: {}", item_id, detail),
            Rejection::NoEligiblePrice {
                item_id,
                min_margin,
                ..
            } => format!(
                "Min margin {:.2} blocks every price on the grid for {}.",
                min_margin, item_id
            ),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Decision {
    Priced(DecisionResult),
    Rejected(Rejection),
}

impl Decision {
    pub fn priced(&self) -> Option<&DecisionResult> {
        match self {
            Decision::Priced(result) => Some(result),
            Decision::Rejected(_) => None,
        }
    }

    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            Decision::Priced(_) => None,
            Decision::Rejected(rejection) => Some(rejection),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scored_beats_blocked() {
        assert!(Score::Scored(-1e12).beats(&Score::Blocked));
        assert!(!Score::Blocked.beats(&Score::Scored(-1e12)));
        assert!(!Score::Blocked.beats(&Score::Blocked));
    }

    #[test]
    fn test_equal_scores_do_not_beat() {
        assert!(!Score::Scored(20.0).beats(&Score::Scored(20.0)));
        assert!(Score::Scored(20.5).beats(&Score::Scored(20.0)));
    }

    #[test]
    fn test_score_serializes_blocked_as_null() {
        let raw = serde_json::to_string(&vec![Score::Scored(1.5), Score::Blocked]).unwrap();
        assert_eq!(raw, "[1.5,null]");
        let back: Vec<Score> = serde_json::from_str(&raw).unwrap();
        assert_eq!(back, vec![Score::Scored(1.5), Score::Blocked]);
    }

    #[test]
    fn test_rejection_kinds() {
        assert_eq!(Rejection::NoItemSelected.kind(), RejectionKind::Validation);
        assert_eq!(
            Rejection::InvalidGuardrail { raw: "abc".into() }.kind(),
            RejectionKind::Validation
        );
        assert_eq!(
            Rejection::NoUsableGrid {
                item_id: "X".into(),
                distinct_prices: 1
            }
            .kind(),
            RejectionKind::UnusableGrid
        );
        assert_eq!(Rejection::NoItemSelected.message(), "Pick an item_id.");
    }
}
