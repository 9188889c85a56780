//! Demand model crate.
//!
//! Wraps the trained demand regression and context encoder behind narrow
//! traits, and holds the read-only price grid catalog.

pub mod artifact;
pub mod encoder;
pub mod grid;
pub mod linear;
pub mod predictor;
pub mod uncertainty;

pub use artifact::{ArtifactBundle, LoadedArtifacts, CONTEXT_COLUMNS, FEATURE_COLUMNS};
pub use encoder::{ContextEncoder, OneHotEncoder};
pub use grid::PriceGridStore;
pub use linear::LinearDemandModel;
pub use predictor::{DemandEstimate, DemandModel, DemandPredictor, FeatureRow, ModelPredictor};
pub use uncertainty::{context_dispersion, dispersion};
