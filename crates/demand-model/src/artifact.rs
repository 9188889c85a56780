//! Trained artifact bundle.
//!
//! One JSON document carries everything the engine needs at decision time:
//! the fitted context encoder, the price grid catalog and the demand
//! regression. It is loaded once at startup and never mutated.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use common::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::encoder::{ContextEncoder, OneHotEncoder};
use crate::grid::PriceGridStore;
use crate::linear::LinearDemandModel;
use crate::predictor::{DemandModel, DemandPredictor, ModelPredictor};

pub const FEATURE_COLUMNS: [&str; 5] = ["log_price", "weekday", "month", "is_event", "item_id"];
pub const CONTEXT_COLUMNS: [&str; 3] = ["weekday", "month", "is_event"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactBundle {
    pub feature_cols: Vec<String>,
    pub ctx_cols: Vec<String>,
    pub onehot: OneHotEncoder,
    pub price_grid: HashMap<String, Vec<f64>>,
    pub model: LinearDemandModel,
}

/// The three read-only collaborators the engine is built from.
#[derive(Clone)]
pub struct LoadedArtifacts {
    pub encoder: Arc<dyn ContextEncoder>,
    pub grids: Arc<PriceGridStore>,
    pub predictor: Arc<dyn DemandPredictor>,
}

impl ArtifactBundle {
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let bundle: ArtifactBundle = serde_json::from_str(raw)?;
        bundle.validate()?;
        Ok(bundle)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let bundle = Self::from_json_str(&raw)?;
        info!(
            "Loaded artifact {} ({} items, encoder width {})",
            path.display(),
            bundle.price_grid.len(),
            bundle.onehot.width()
        );
        Ok(bundle)
    }

    fn validate(&self) -> Result<()> {
        if self.feature_cols != FEATURE_COLUMNS {
            return Err(Error::Artifact(format!(
                "feature_cols must be {:?}, got {:?}",
                FEATURE_COLUMNS, self.feature_cols
            )));
        }
        if self.ctx_cols != CONTEXT_COLUMNS {
            return Err(Error::Artifact(format!(
                "ctx_cols must be {:?}, got {:?}",
                CONTEXT_COLUMNS, self.ctx_cols
            )));
        }
        if !self.model.intercept.is_finite() || !self.model.log_price.is_finite() {
            return Err(Error::Artifact("model coefficients must be finite".into()));
        }
        Ok(())
    }

    pub fn into_parts(self) -> LoadedArtifacts {
        let model: Arc<dyn DemandModel> = Arc::new(self.model);
        LoadedArtifacts {
            encoder: Arc::new(self.onehot),
            grids: Arc::new(PriceGridStore::sanitized(self.price_grid)),
            predictor: Arc::new(ModelPredictor::new(model)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BUNDLE: &str = r#"{
        "feature_cols": ["log_price", "weekday", "month", "is_event", "item_id"],
        "ctx_cols": ["weekday", "month", "is_event"],
        "onehot": {
            "weekday": ["Friday", "Monday"],
            "month": [10, 11],
            "is_event": [0, 1]
        },
        "price_grid": {
            "FOODS_1_001": [2.0, 2.5, 3.0],
            "FOODS_1_002": [0.0, 1.0]
        },
        "model": {
            "intercept": 2.5,
            "log_price": -1.2,
            "item_id": {"FOODS_1_001": 0.3}
        }
    }"#;

    #[test]
    fn test_parse_and_split() {
        let bundle = ArtifactBundle::from_json_str(BUNDLE).unwrap();
        assert_eq!(bundle.onehot.width(), 6);
        assert!(!bundle.model.strict_categories);

        let parts = bundle.into_parts();
        assert_eq!(parts.grids.usable_items(10), vec!["FOODS_1_001"]);
        assert_eq!(parts.grids.grid("FOODS_1_002"), Some(&[1.0][..]));
    }

    #[test]
    fn test_rejects_reordered_feature_columns() {
        let raw = BUNDLE.replace(
            r#""log_price", "weekday", "month", "is_event", "item_id""#,
            r#""weekday", "log_price", "month", "is_event", "item_id""#,
        );
        let err = ArtifactBundle::from_json_str(&raw).unwrap_err();
        assert!(matches!(err, Error::Artifact(_)), "unexpected error: {}", err);
    }

    #[test]
    fn test_malformed_json_is_json_error() {
        let err = ArtifactBundle::from_json_str("{not json").unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }
}
