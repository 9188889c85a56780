//! Human and machine renderings of a [`DecisionResult`].
//!
//! Pure formatting: the same result always yields the same explanation.

use common::Context;
use serde::{Deserialize, Serialize};

use crate::types::{CandidateScore, DecisionResult, Score};

/// Structured summary of why a price was chosen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplanationRecord {
    pub item_id: String,
    pub context: Context,
    pub chosen_price: f64,
    pub expected_qty: f64,
    /// `None` when the chosen price was itself blocked.
    pub expected_revenue: Option<f64>,
    pub guardrail_applied: bool,
    pub min_margin: Option<f64>,
    pub blocked_prices: Vec<f64>,
    pub exploration_enabled: bool,
    pub exploration_bonus: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Explanation {
    pub record: ExplanationRecord,
    /// One-line status, e.g. "Recommended price: 2.00".
    pub note: String,
    pub narrative: String,
}

pub fn explain(result: &DecisionResult) -> Explanation {
    let chosen = &result.chosen;
    let record = ExplanationRecord {
        item_id: result.item_id.clone(),
        context: result.context,
        chosen_price: result.chosen_price,
        expected_qty: chosen.expected_qty,
        expected_revenue: chosen.expected_revenue.value(),
        guardrail_applied: result.guardrail_applied,
        min_margin: result.min_margin,
        blocked_prices: result.blocked_prices(),
        exploration_enabled: result.exploration_enabled,
        exploration_bonus: result.exploration_bonus(),
    };

    Explanation {
        note: format!("Recommended price: {:.2}", result.chosen_price),
        narrative: narrative(&record, result.exploration_alpha),
        record,
    }
}

fn narrative(record: &ExplanationRecord, alpha: f64) -> String {
    let ctx = &record.context;
    let price = format_money(record.chosen_price);
    let mut parts = Vec::with_capacity(5);

    parts.push(format!(
        "**Recommended price:** **${}** for item **{}** on **{} (month {})**{}.",
        price,
        record.item_id,
        ctx.weekday,
        ctx.month,
        if ctx.is_event { " with a holiday/event" } else { "" }
    ));

    match record.expected_revenue {
        Some(revenue) => parts.push(format!(
            "This choice maximizes expected *revenue per view* on the tested grid by balancing \
             price vs. predicted demand. At ${}, the model expects about **{:.2} units** and \
             **${} revenue**.",
            price,
            record.expected_qty,
            format_money(revenue)
        )),
        None => parts.push(format!(
            "Every price on the grid sits below the guardrail, so ${} is the first blocked \
             candidate and no demand is credited to it.",
            price
        )),
    }

    if let (true, Some(mm)) = (record.guardrail_applied, record.min_margin) {
        parts.push(format!(
            "Prices below the **min margin ${}** were **blocked** by a guardrail.",
            format_money(mm)
        ));
    }

    if record.exploration_enabled && alpha > 0.0 {
        parts.push(
            "An exploration bonus (UCB) slightly prefers prices where the model is less \
             certain, helping discover better options over time."
                .to_string(),
        );
    }

    parts.push(
        "Behind the scenes, a demand model \
         (`log(1+qty) ~ log(price) + weekday + month + event + item_id`) estimates \
         elasticity and scores each price in the grid."
            .to_string(),
    );

    parts.join(" ")
}

/// Two decimals with thousands separators: `1234.5` → `"1,234.50"`.
pub fn format_money(value: f64) -> String {
    let raw = format!("{:.2}", value.abs());
    let (whole, frac) = raw.split_once('.').unwrap_or((raw.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && raw.bytes().any(|b| b != b'0' && b != b'.') {
        "-"
    } else {
        ""
    };
    format!("{}{}.{}", sign, grouped, frac)
}

/// JSON response for API and CLI callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionResponse {
    pub item_id: String,
    pub context: Context,
    pub grid: Vec<f64>,
    pub chosen_price: f64,
    pub arm_index: usize,
    /// Grid-ordered scores. Blocked candidates serialize as `null` rather
    /// than a large negative placeholder, so this list is not all floats.
    pub scores_ucb: Vec<Score>,
    pub candidates: Vec<CandidateScore>,
    pub guardrail_applied: bool,
    pub exploration_enabled: bool,
    pub note: String,
    pub summary: String,
}

impl DecisionResponse {
    pub fn new(result: &DecisionResult, explanation: &Explanation) -> Self {
        Self {
            item_id: result.item_id.clone(),
            context: result.context,
            grid: result.grid.clone(),
            chosen_price: result.chosen_price,
            arm_index: result.chosen_index,
            scores_ucb: result.scores.clone(),
            candidates: result.candidates.clone(),
            guardrail_applied: result.guardrail_applied,
            exploration_enabled: result.exploration_enabled,
            note: explanation.note.clone(),
            summary: explanation.narrative.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::Weekday;

    use crate::types::BlockReason;

    fn scored(grid_index: usize, price: f64, qty: f64, bonus: f64) -> CandidateScore {
        CandidateScore {
            grid_index,
            price,
            expected_qty: qty,
            expected_revenue: Score::Scored(price * qty),
            exploration_bonus: bonus,
            score: Score::Scored(price * qty + bonus),
            blocked: None,
        }
    }

    fn blocked(grid_index: usize, price: f64) -> CandidateScore {
        CandidateScore {
            grid_index,
            price,
            expected_qty: 0.0,
            expected_revenue: Score::Blocked,
            exploration_bonus: 0.0,
            score: Score::Blocked,
            blocked: Some(BlockReason::BelowMinMargin),
        }
    }

    /// Scenario B: [2.00, 2.50] blocked at min margin 2.75, 3.00 sells 5 units.
    fn guarded_result() -> DecisionResult {
        let candidates = vec![blocked(0, 2.0), blocked(1, 2.5), scored(2, 3.0, 5.0, 0.0)];
        DecisionResult {
            item_id: "FOODS_1_001".into(),
            context: Context::new(Weekday::Friday, 11, false).unwrap(),
            grid: vec![2.0, 2.5, 3.0],
            chosen_price: 3.0,
            chosen_index: 2,
            chosen: candidates[2].clone(),
            scores: candidates.iter().map(|c| c.score).collect(),
            candidates,
            min_margin: Some(2.75),
            guardrail_applied: true,
            exploration_enabled: false,
            exploration_alpha: 0.0,
            sigma: 0.0,
        }
    }

    #[test]
    fn test_golden_narrative_with_guardrail() {
        let explanation = explain(&guarded_result());
        assert_eq!(explanation.note, "Recommended price: 3.00");
        assert_eq!(
            explanation.narrative,
            "**Recommended price:** **$3.00** for item **FOODS_1_001** on **Friday (month 11)**. \
             This choice maximizes expected *revenue per view* on the tested grid by balancing \
             price vs. predicted demand. At $3.00, the model expects about **5.00 units** and \
             **$15.00 revenue**. \
             Prices below the **min margin $2.75** were **blocked** by a guardrail. \
             Behind the scenes, a demand model \
             (`log(1+qty) ~ log(price) + weekday + month + event + item_id`) estimates \
             elasticity and scores each price in the grid."
        );
    }

    #[test]
    fn test_record_fields() {
        let record = explain(&guarded_result()).record;
        assert_eq!(record.blocked_prices, vec![2.0, 2.5]);
        assert_eq!(record.expected_revenue, Some(15.0));
        assert_eq!(record.expected_qty, 5.0);
        assert!(record.guardrail_applied);
        assert!(!record.exploration_enabled);
    }

    #[test]
    fn test_event_and_exploration_sentences() {
        let mut result = guarded_result();
        result.context.is_event = true;
        result.exploration_enabled = true;
        result.exploration_alpha = 0.8;
        result.sigma = 0.5;

        let explanation = explain(&result);
        assert!(explanation.narrative.contains("(month 11)** with a holiday/event."));
        assert!(explanation.narrative.contains("An exploration bonus (UCB)"));
        assert!((explanation.record.exploration_bonus - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_blocked_choice_has_no_revenue() {
        let mut result = guarded_result();
        result.chosen = result.candidates[0].clone();
        result.chosen_price = 2.0;
        result.chosen_index = 0;

        let explanation = explain(&result);
        assert_eq!(explanation.record.expected_revenue, None);
        assert!(explanation.narrative.contains("first blocked candidate"));
    }

    #[test]
    fn test_explanation_is_deterministic() {
        let result = guarded_result();
        assert_eq!(explain(&result), explain(&result));
    }

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(0.0), "0.00");
        assert_eq!(format_money(2.5), "2.50");
        assert_eq!(format_money(999.999), "1,000.00");
        assert_eq!(format_money(1234567.891), "1,234,567.89");
        assert_eq!(format_money(-1234.5), "-1,234.50");
        assert_eq!(format_money(-0.001), "0.00");
    }

    #[test]
    fn test_response_json_shape() {
        let result = guarded_result();
        let response = DecisionResponse::new(&result, &explain(&result));
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["arm_index"], 2);
        assert_eq!(json["chosen_price"], 3.0);
        assert_eq!(json["scores_ucb"], serde_json::json!([null, null, 15.0]));
        assert_eq!(json["context"]["weekday"], "Friday");
        assert_eq!(json["candidates"][0]["blocked"], "below_min_margin");
        assert_eq!(json["note"], "Recommended price: 3.00");
    }
}
