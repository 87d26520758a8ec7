pub mod depth;
pub mod volatility;

use crate::models::MidPricePoint;
use crate::orderbook::BookSnapshot;
use serde::Serialize;
pub use depth::{DepthBar, DepthView};
pub use volatility::RunningStats;

/// Derived view of the current book. Recomputed on every read, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    pub best_bid: f64,
    pub best_ask: f64,
    pub spread: f64,
    pub mid_price: f64,
    pub total_bid_volume: f64,
    pub total_ask_volume: f64,
    /// Sample standard deviation of the retained mid-price history
    pub volatility: f64,
}

impl Metrics {
    /// Builds metrics for a two-sided book with an already known volatility.
    /// Returns `None` if either side is empty.
    pub fn from_book(book: &BookSnapshot, volatility: f64) -> Option<Self> {
        let best_bid = book.best_bid()?;
        let best_ask = book.best_ask()?;

        Some(Self {
            best_bid,
            best_ask,
            spread: best_ask - best_bid,
            mid_price: (best_ask + best_bid) / 2.0,
            total_bid_volume: book.total_bid_volume(),
            total_ask_volume: book.total_ask_volume(),
            volatility,
        })
    }

    /// Best bid above best ask. Only possible if the venue sent levels out of order.
    pub fn is_crossed(&self) -> bool {
        self.spread < 0.0
    }
}

/// Batch form: recomputes volatility over the whole history.
/// The engine uses an incremental accumulator that gives the same result.
pub fn compute<'a, I>(snapshot: Option<&BookSnapshot>, history: I) -> Option<Metrics>
where
    I: IntoIterator<Item = &'a MidPricePoint>,
{
    let book = snapshot?;
    if !book.is_two_sided() {
        return None;
    }
    let mids: Vec<f64> = history.into_iter().map(|p| p.mid_price).collect();
    Metrics::from_book(book, volatility::sample_std_dev(&mids))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orderbook::PriceLevel;

    const NO_HISTORY: &[MidPricePoint] = &[];

    fn level(price: f64, quantity: f64) -> PriceLevel {
        PriceLevel { price, quantity }
    }

    fn point(timestamp: u64, mid_price: f64) -> MidPricePoint {
        MidPricePoint {
            timestamp,
            best_bid: mid_price - 1.0,
            best_ask: mid_price + 1.0,
            mid_price,
        }
    }

    fn book() -> BookSnapshot {
        BookSnapshot {
            bids: vec![level(100.0, 5.0), level(99.0, 3.0)],
            asks: vec![level(102.0, 1.0), level(103.0, 4.0), level(104.0, 2.0)],
        }
    }

    #[test]
    fn no_snapshot_no_metrics() {
        assert_eq!(compute(None, NO_HISTORY), None);
    }

    #[test]
    fn empty_side_no_metrics() {
        let mut one_sided = book();
        one_sided.asks.clear();
        assert_eq!(compute(Some(&one_sided), NO_HISTORY), None);

        let mut one_sided = book();
        one_sided.bids.clear();
        assert_eq!(compute(Some(&one_sided), NO_HISTORY), None);
    }

    #[test]
    fn spread_mid_and_volumes() {
        let metrics = compute(Some(&book()), &[point(1, 101.0)]).unwrap();
        assert_eq!(metrics.best_bid, 100.0);
        assert_eq!(metrics.best_ask, 102.0);
        assert_eq!(metrics.spread, 2.0);
        assert_eq!(metrics.mid_price, 101.0);
        assert_eq!(metrics.total_bid_volume, 8.0);
        assert_eq!(metrics.total_ask_volume, 7.0);
        assert_eq!(metrics.volatility, 0.0);
        assert!(!metrics.is_crossed());
    }

    #[test]
    fn volatility_over_history() {
        let history = [point(1, 100.0), point(2, 102.0)];
        let metrics = compute(Some(&book()), &history).unwrap();
        assert!((metrics.volatility - 2.0_f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn crossed_book_passes_through() {
        let crossed = BookSnapshot {
            bids: vec![level(105.0, 1.0)],
            asks: vec![level(104.0, 1.0)],
        };
        let metrics = compute(Some(&crossed), NO_HISTORY).unwrap();
        assert_eq!(metrics.spread, -1.0);
        assert!(metrics.is_crossed());
    }

    #[test]
    fn serializes_in_camel_case() {
        let value = serde_json::to_value(compute(Some(&book()), NO_HISTORY).unwrap()).unwrap();
        assert_eq!(value["bestBid"], 100.0);
        assert_eq!(value["totalAskVolume"], 7.0);
        assert_eq!(value["midPrice"], 101.0);
    }
}
