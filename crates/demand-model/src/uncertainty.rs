//! Context uncertainty estimate used as the exploration bonus magnitude.
//!
//! `sigma = sqrt(sum(x * (1 - x)))` over the encoded context. Entries near
//! 0 or 1 contribute nothing; entries near 0.5 contribute the most. This is
//! a cheap, model-free heuristic for "how unfamiliar is this context", not a
//! calibrated confidence bound. With a strict one-hot encoding every entry
//! is exactly 0 or 1, so sigma is 0 and exploration has no effect.

use common::{Context, Result};

use crate::encoder::ContextEncoder;

/// Dispersion of an already-encoded vector. Never negative.
pub fn dispersion(encoded: &[f64]) -> f64 {
    let total: f64 = encoded.iter().map(|x| x * (1.0 - x)).sum();
    // Entries outside [0,1] make terms negative.
    total.max(0.0).sqrt()
}

/// Encode `context` and return its dispersion.
pub fn context_dispersion(encoder: &dyn ContextEncoder, context: &Context) -> Result<f64> {
    let encoded = encoder.encode(context)?;
    Ok(dispersion(&encoded))
}
