use crate::orderbook::{BookSnapshot, PriceLevel};
use ordered_float::OrderedFloat;
use serde::Serialize;

/// A level plus its bar width relative to the largest level on the same side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepthBar {
    pub price: f64,
    pub quantity: f64,
    /// In `[0, 1]`
    pub width_fraction: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DepthView {
    pub bids: Vec<DepthBar>,
    pub asks: Vec<DepthBar>,
}

impl DepthView {
    pub fn of(book: &BookSnapshot) -> Self {
        Self {
            bids: project(&book.bids),
            asks: project(&book.asks),
        }
    }
}

/// Normalizes level quantities against the side's largest quantity, keeping input order.
pub fn project(levels: &[PriceLevel]) -> Vec<DepthBar> {
    // an all-zero side would otherwise divide by zero
    let max_volume = levels
        .iter()
        .map(|l| OrderedFloat(l.quantity))
        .max()
        .map(|q| q.into_inner())
        .filter(|q| *q > 0.0)
        .unwrap_or(1.0);

    levels
        .iter()
        .map(|l| DepthBar {
            price: l.price,
            quantity: l.quantity,
            width_fraction: l.quantity / max_volume,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level(price: f64, quantity: f64) -> PriceLevel {
        PriceLevel { price, quantity }
    }

    fn fractions(bars: &[DepthBar]) -> Vec<f64> {
        bars.iter().map(|b| b.width_fraction).collect()
    }

    #[test]
    fn widths_are_relative_to_largest_level() {
        let bars = project(&[level(10.0, 4.0), level(9.0, 2.0)]);
        assert_eq!(fractions(&bars), vec![1.0, 0.5]);
        assert_eq!(bars[0].price, 10.0);
        assert_eq!(bars[1].quantity, 2.0);
    }

    #[test]
    fn preserves_input_order() {
        let bars = project(&[level(101.0, 1.0), level(102.0, 4.0), level(103.0, 2.0)]);
        let prices: Vec<f64> = bars.iter().map(|b| b.price).collect();
        assert_eq!(prices, vec![101.0, 102.0, 103.0]);
        assert_eq!(fractions(&bars), vec![0.25, 1.0, 0.5]);
    }

    #[test]
    fn empty_side_projects_to_nothing() {
        assert!(project(&[]).is_empty());
    }

    #[test]
    fn all_zero_side_has_zero_widths() {
        let bars = project(&[level(10.0, 0.0), level(9.0, 0.0)]);
        assert_eq!(fractions(&bars), vec![0.0, 0.0]);
    }

    #[test]
    fn serializes_width_fraction_in_camel_case() {
        let value = serde_json::to_value(project(&[level(10.0, 4.0)])).unwrap();
        assert_eq!(value[0]["widthFraction"], 1.0);
    }
}
