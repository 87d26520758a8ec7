use crate::orderbook::BookSnapshot;
use serde::{Deserialize, Serialize};

/// One history sample, taken on every two-sided snapshot.
/// Carries the touch as well so the chart can plot bid and ask series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MidPricePoint {
    /// Milliseconds since the Unix epoch
    pub timestamp: u64,
    pub best_bid: f64,
    pub best_ask: f64,
    pub mid_price: f64,
}

/// Any decoded venue message that isn't a book snapshot (acks, fills, errors...).
pub type EventMessage = serde_json::Value;

/// A classified inbound frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    Snapshot(BookSnapshot),
    Event(EventMessage),
}

/// Order parameters as entered by a user, before an id is assigned.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OrderTicket {
    #[serde(rename = "type")]
    pub order_type: String,
    pub side: String,
    pub price: f64,
    pub quantity: f64,
}

/// Order message on the wire. `type` and `side` are passed through as-is;
/// the venue decides what it accepts (GTC/IOC/FOK, buy/sell).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderSubmission {
    pub id: String,
    #[serde(rename = "type")]
    pub order_type: String,
    pub side: String,
    pub price: f64,
    pub quantity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRequest {
    command: &'static str,
}

/// Everything the client ever sends to the venue.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Command {
    Summary(SummaryRequest),
    Order(OrderSubmission),
}

impl Command {
    pub fn summary() -> Self {
        Command::Summary(SummaryRequest { command: "summary" })
    }

    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn summary_request_wire_shape() {
        let encoded = Command::summary().encode().unwrap();
        assert_eq!(encoded, r#"{"command":"summary"}"#);
    }

    #[test]
    fn order_submission_wire_shape() {
        let order = Command::Order(OrderSubmission {
            id: "7".to_string(),
            order_type: "GTC".to_string(),
            side: "buy".to_string(),
            price: 101.5,
            quantity: 3.0,
        });

        let value: serde_json::Value = serde_json::from_str(&order.encode().unwrap()).unwrap();
        assert_eq!(
            value,
            json!({ "id": "7", "type": "GTC", "side": "buy", "price": 101.5, "quantity": 3.0 })
        );
    }

    #[test]
    fn mid_price_point_is_camel_case() {
        let point = MidPricePoint {
            timestamp: 1_700_000_000_000,
            best_bid: 100.0,
            best_ask: 101.0,
            mid_price: 100.5,
        };
        assert_eq!(
            serde_json::to_value(point).unwrap(),
            json!({
                "timestamp": 1_700_000_000_000u64,
                "bestBid": 100.0,
                "bestAsk": 101.0,
                "midPrice": 100.5,
            })
        );
    }
}
