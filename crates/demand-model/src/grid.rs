//! Read-only catalog of candidate prices per item.

use std::collections::HashMap;

use tracing::warn;

/// Minimum number of distinct prices for a grid to be searchable.
pub const MIN_GRID_PRICES: usize = 2;

#[derive(Debug, Clone, Default)]
pub struct PriceGridStore {
    grids: HashMap<String, Vec<f64>>,
}

impl PriceGridStore {
    pub fn new(grids: HashMap<String, Vec<f64>>) -> Self {
        Self { grids }
    }

    /// Build a store, dropping non-finite or non-positive prices.
    pub fn sanitized(grids: HashMap<String, Vec<f64>>) -> Self {
        let grids = grids
            .into_iter()
            .map(|(item_id, prices)| {
                let before = prices.len();
                let kept: Vec<f64> = prices
                    .into_iter()
                    .filter(|p| p.is_finite() && *p > 0.0)
                    .collect();
                if kept.len() != before {
                    warn!(
                        "{}: dropped {} invalid grid price(s)",
                        item_id,
                        before - kept.len()
                    );
                }
                (item_id, kept)
            })
            .collect();
        Self { grids }
    }

    /// Grid in stored order, if the item is known.
    pub fn grid(&self, item_id: &str) -> Option<&[f64]> {
        self.grids.get(item_id).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.grids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grids.is_empty()
    }

    /// Items whose grid holds at least [`MIN_GRID_PRICES`] distinct prices,
    /// sorted, capped at `limit`.
    pub fn usable_items(&self, limit: usize) -> Vec<&str> {
        let mut items: Vec<&str> = self
            .grids
            .iter()
            .filter(|(_, grid)| is_usable_grid(grid))
            .map(|(item_id, _)| item_id.as_str())
            .collect();
        items.sort_unstable();
        items.truncate(limit);
        items
    }
}

/// Number of distinct finite, positive prices in `grid`.
pub fn distinct_prices(grid: &[f64]) -> usize {
    let mut sorted: Vec<f64> = grid
        .iter()
        .copied()
        .filter(|p| p.is_finite() && *p > 0.0)
        .collect();
    sorted.sort_by(f64::total_cmp);
    sorted.dedup();
    sorted.len()
}

pub fn is_usable_grid(grid: &[f64]) -> bool {
    distinct_prices(grid) >= MIN_GRID_PRICES
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> PriceGridStore {
        PriceGridStore::new(HashMap::from([
            ("FOODS_1_002".to_string(), vec![1.0, 1.5]),
            ("FOODS_1_001".to_string(), vec![2.0, 2.5, 3.0]),
            ("SINGLE".to_string(), vec![4.0]),
            ("REPEATED".to_string(), vec![4.0, 4.0, 4.0]),
            ("EMPTY".to_string(), vec![]),
        ]))
    }

    #[test]
    fn test_usable_items_sorted_and_filtered() {
        let s = store();
        assert_eq!(s.usable_items(10), vec!["FOODS_1_001", "FOODS_1_002"]);
        assert_eq!(s.usable_items(1), vec!["FOODS_1_001"]);
    }

    #[test]
    fn test_repeated_price_is_not_usable() {
        assert!(!is_usable_grid(&[4.0, 4.0, 4.0]));
        assert!(is_usable_grid(&[4.0, 4.5, 4.0]));
        assert_eq!(distinct_prices(&[]), 0);
    }

    #[test]
    fn test_invalid_prices_do_not_count_toward_usability() {
        assert!(!is_usable_grid(&[-1.0, 2.0]));
        assert!(!is_usable_grid(&[0.0, 2.0]));
        assert!(!is_usable_grid(&[f64::NAN, f64::INFINITY, 2.0]));
        assert_eq!(distinct_prices(&[-1.0, 0.0, 2.0, 3.0]), 2);

        let s = PriceGridStore::new(HashMap::from([("X".to_string(), vec![-1.0, 2.0])]));
        assert!(s.usable_items(10).is_empty());
    }

    #[test]
    fn test_sanitized_drops_invalid_prices() {
        let s = PriceGridStore::sanitized(HashMap::from([(
            "X".to_string(),
            vec![-1.0, 0.0, 2.0, f64::NAN, 3.0],
        )]));
        assert_eq!(s.grid("X"), Some(&[2.0, 3.0][..]));
        assert!(s.grid("missing").is_none());
    }
}
