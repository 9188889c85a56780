//! Price decision engine.
//!
//! Scores every price on an item's grid with the demand predictor plus an
//! exploration bonus, applies the min-margin guardrail and picks the best
//! candidate. [`explain`] renders the result for humans and API callers.

pub mod engine;
pub mod explain;
pub mod types;

pub use engine::{
    parse_min_margin, DecisionEngine, EngineConfig, FullBlockPolicy, EXPLORATION_ALPHA,
};
pub use explain::{explain, format_money, DecisionResponse, Explanation, ExplanationRecord};
pub use types::*;
