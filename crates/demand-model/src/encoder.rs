//! Context encoders.
//!
//! An encoder maps a [`Context`] to a fixed-width numeric vector. The
//! one-hot encoder below mirrors the fitted categorical encoder shipped in
//! the artifact bundle: one block per context column, unknown values encode
//! as an all-zero block.

use common::{Context, Result};
use serde::{Deserialize, Serialize};

pub trait ContextEncoder: Send + Sync {
    /// Width of every vector returned by [`ContextEncoder::encode`].
    fn width(&self) -> usize;

    fn encode(&self, context: &Context) -> Result<Vec<f64>>;
}

/// Categories seen at fit time, per context column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OneHotEncoder {
    pub weekday: Vec<String>,
    pub month: Vec<u32>,
    pub is_event: Vec<u8>,
}

impl OneHotEncoder {
    fn push_block<T: PartialEq>(out: &mut Vec<f64>, categories: &[T], value: &T) {
        out.extend(
            categories
                .iter()
                .map(|c| if c == value { 1.0 } else { 0.0 }),
        );
    }
}

impl ContextEncoder for OneHotEncoder {
    fn width(&self) -> usize {
        self.weekday.len() + self.month.len() + self.is_event.len()
    }

    fn encode(&self, context: &Context) -> Result<Vec<f64>> {
        let mut out = Vec::with_capacity(self.width());
        let weekday = context.weekday.as_str().to_string();
        Self::push_block(&mut out, &self.weekday, &weekday);
        Self::push_block(&mut out, &self.month, &context.month);
        Self::push_block(&mut out, &self.is_event, &context.event_flag());
        Ok(out)
    }
}
