use crate::errors::DecodeError;
use crate::models::Inbound;
use crate::orderbook::{BookSnapshot, PriceLevel};
use serde_json::Value;

/// Decodes one inbound frame and classifies it.
///
/// An object whose `bids` and `asks` fields are both set is a book snapshot,
/// even when both are empty arrays. A side that is missing, `null`, `false`,
/// zero or an empty string does not count as set, so such a message is an
/// opaque event like every other JSON value.
pub fn classify(text: &str) -> Result<Inbound, DecodeError> {
    let value: Value = serde_json::from_str(text)?;

    let is_snapshot = value.as_object().is_some_and(|obj| {
        obj.get("bids").is_some_and(is_set) && obj.get("asks").is_some_and(is_set)
    });

    if !is_snapshot {
        return Ok(Inbound::Event(value));
    }

    let snapshot: BookSnapshot = serde_json::from_value(value)
        .map_err(|e| DecodeError::MalformedSnapshot(e.to_string()))?;

    validate_levels("bid", &snapshot.bids)?;
    validate_levels("ask", &snapshot.asks)?;

    Ok(Inbound::Snapshot(snapshot))
}

fn is_set(side: &Value) -> bool {
    match side {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn validate_levels(side: &str, levels: &[PriceLevel]) -> Result<(), DecodeError> {
    for (i, level) in levels.iter().enumerate() {
        if !level.price.is_finite() {
            return Err(DecodeError::MalformedSnapshot(format!(
                "{side} level {i} has a non-finite price"
            )));
        }
        if !level.quantity.is_finite() || level.quantity < 0.0 {
            return Err(DecodeError::MalformedSnapshot(format!(
                "{side} level {i} has invalid quantity {}",
                level.quantity
            )));
        }
    }
    Ok(())
}
