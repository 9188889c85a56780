//! Demand predictor adapter.
//!
//! The trained regression predicts `log(1 + qty)` from a single feature
//! row. The adapter builds that row from (item, context, price) and maps
//! the estimate back into unit space.

use common::{Context, Error, Result, Weekday};
use std::sync::Arc;

/// One model input row: `[log_price, weekday, month, is_event, item_id]`.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow<'a> {
    pub log_price: f64,
    pub weekday: Weekday,
    pub month: u32,
    pub is_event: u8,
    pub item_id: &'a str,
}

/// A fitted regression whose target is `log(1 + qty)`.
///
/// Implementations must be deterministic for a fixed row.
pub trait DemandModel: Send + Sync {
    fn predict_log1p(&self, row: &FeatureRow<'_>) -> Result<f64>;
}

/// Expected units and revenue for one (item, context, price).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DemandEstimate {
    pub expected_qty: f64,
    pub expected_revenue: f64,
}

/// Calling contract the decision engine depends on.
pub trait DemandPredictor: Send + Sync {
    /// Expected units sold at `price`. Never negative.
    fn predict_quantity(&self, item_id: &str, context: &Context, price: f64) -> Result<f64>;

    /// `price * predict_quantity(..)`.
    fn predict_revenue(&self, item_id: &str, context: &Context, price: f64) -> Result<f64> {
        Ok(price * self.predict_quantity(item_id, context, price)?)
    }

    /// Quantity and revenue from a single quantity call.
    fn estimate(&self, item_id: &str, context: &Context, price: f64) -> Result<DemandEstimate> {
        let expected_qty = self.predict_quantity(item_id, context, price)?;
        Ok(DemandEstimate {
            expected_qty,
            expected_revenue: price * expected_qty,
        })
    }
}

/// Adapts a `log(1 + qty)` regression to [`DemandPredictor`].
#[derive(Clone)]
pub struct ModelPredictor {
    model: Arc<dyn DemandModel>,
}

impl ModelPredictor {
    pub fn new(model: Arc<dyn DemandModel>) -> Self {
        Self { model }
    }
}

impl DemandPredictor for ModelPredictor {
    fn predict_quantity(&self, item_id: &str, context: &Context, price: f64) -> Result<f64> {
        if !price.is_finite() || price <= 0.0 {
            return Err(Error::InvalidPrice(price));
        }

        let row = FeatureRow {
            log_price: price.ln(),
            weekday: context.weekday,
            month: context.month,
            is_event: context.event_flag(),
            item_id,
        };
        let mu = self.model.predict_log1p(&row)?;
        if !mu.is_finite() {
            return Err(Error::Prediction(format!(
                "non-finite estimate {} for {} @ {:.2}",
                mu, item_id, price
            )));
        }

        // exp(mu) - 1 dips below zero whenever mu < 0.
        let qty = (mu.exp() - 1.0).max(0.0);
        if !qty.is_finite() {
            return Err(Error::Prediction(format!(
                "estimate {} overflows unit space for {} @ {:.2}",
                mu, item_id, price
            )));
        }
        Ok(qty)
    }
}

impl std::fmt::Debug for ModelPredictor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelPredictor").finish_non_exhaustive()
    }
}
