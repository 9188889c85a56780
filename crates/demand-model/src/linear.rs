//! Coefficient-form demand regression.
//!
//! A ridge pipeline over `[log_price, weekday, month, is_event, item_id]`
//! with one-hot categoricals reduces to an intercept, one numeric slope and
//! one coefficient per seen category. Unseen categories contribute zero,
//! matching an encoder fitted with "ignore unknown".

use std::collections::HashMap;

use common::{Error, Result};
use serde::{Deserialize, Serialize};

use crate::predictor::{DemandModel, FeatureRow};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LinearDemandModel {
    pub intercept: f64,
    pub log_price: f64,
    #[serde(default)]
    pub weekday: HashMap<String, f64>,
    /// Keyed by the month number rendered as a string ("1" .. "12").
    #[serde(default)]
    pub month: HashMap<String, f64>,
    /// Keyed by "0" / "1".
    #[serde(default)]
    pub is_event: HashMap<String, f64>,
    #[serde(default)]
    pub item_id: HashMap<String, f64>,
    /// Fail instead of contributing zero when a category was never seen.
    #[serde(default)]
    pub strict_categories: bool,
}

impl LinearDemandModel {
    fn category_term(
        &self,
        column: &str,
        coefficients: &HashMap<String, f64>,
        value: &str,
    ) -> Result<f64> {
        match coefficients.get(value) {
            Some(coef) => Ok(*coef),
            None if self.strict_categories => Err(Error::UnknownCategory {
                column: column.to_string(),
                value: value.to_string(),
            }),
            None => Ok(0.0),
        }
    }
}

impl DemandModel for LinearDemandModel {
    fn predict_log1p(&self, row: &FeatureRow<'_>) -> Result<f64> {
        let mut mu = self.intercept + self.log_price * row.log_price;
        mu += self.category_term("weekday", &self.weekday, row.weekday.as_str())?;
        mu += self.category_term("month", &self.month, &row.month.to_string())?;
        mu += self.category_term("is_event", &self.is_event, &row.is_event.to_string())?;
        mu += self.category_term("item_id", &self.item_id, row.item_id)?;
        Ok(mu)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::Weekday;

    fn model() -> LinearDemandModel {
        LinearDemandModel {
            intercept: 2.0,
            log_price: -1.5,
            weekday: HashMap::from([("Friday".to_string(), 0.2)]),
            month: HashMap::from([("11".to_string(), 0.1)]),
            is_event: HashMap::from([("1".to_string(), 0.3)]),
            item_id: HashMap::from([("FOODS_1_001".to_string(), 0.4)]),
            strict_categories: false,
        }
    }

    fn row(item_id: &str, is_event: u8) -> FeatureRow<'_> {
        FeatureRow {
            log_price: 1.0,
            weekday: Weekday::Friday,
            month: 11,
            is_event,
            item_id,
        }
    }

    #[test]
    fn test_sums_all_terms() {
        let mu = model().predict_log1p(&row("FOODS_1_001", 1)).unwrap();
        let expected = 2.0 - 1.5 + 0.2 + 0.1 + 0.3 + 0.4;
        assert!((mu - expected).abs() < 1e-12, "mu={}", mu);
    }

    #[test]
    fn test_unseen_category_contributes_zero() {
        let mu = model().predict_log1p(&row("HOBBIES_9_999", 0)).unwrap();
        let expected = 2.0 - 1.5 + 0.2 + 0.1;
        assert!((mu - expected).abs() < 1e-12, "mu={}", mu);
    }

    #[test]
    fn test_strict_mode_rejects_unseen_category() {
        let mut m = model();
        m.strict_categories = true;
        let err = m.predict_log1p(&row("HOBBIES_9_999", 1)).unwrap_err();
        assert!(
            matches!(err, Error::UnknownCategory { ref column, .. } if column == "item_id"),
            "unexpected error: {}",
            err
        );
    }

    #[test]
    fn test_higher_price_lowers_demand() {
        let m = model();
        let mut cheap = row("FOODS_1_001", 0);
        cheap.log_price = 2.0_f64.ln();
        let mut dear = row("FOODS_1_001", 0);
        dear.log_price = 3.0_f64.ln();
        assert!(m.predict_log1p(&cheap).unwrap() > m.predict_log1p(&dear).unwrap());
    }
}
