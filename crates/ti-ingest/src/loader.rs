//! Object loader — loads and validates a single object payload into a
//! vector of [`TradeEntry`] values.
//!
//! The root of the payload is either a single object or an array of
//! objects; a single object is treated as a one-element array. Each
//! candidate is parsed into an untyped "raw" shape first (per spec §9's
//! guidance to parse into a schema-typed shape and reject at parse time),
//! then validated field-by-field; entries failing validation are silently
//! dropped. A per-file parse/transport failure is fatal for that object and
//! propagated to the caller.

use serde::Deserialize;
use serde_json::Value;

use ti_core::{Side, TradeEntry};

use crate::capability::ObjectStoreClient;
use crate::error::LoadError;

#[derive(Debug, Deserialize)]
struct RawEntry {
    timestamp: Option<Value>,
    price: Option<Value>,
    size: Option<Value>,
    side: Option<Value>,
    source: Option<Value>,
}

fn validate(raw: RawEntry) -> Option<TradeEntry> {
    let timestamp = raw.timestamp?.as_f64().filter(|v| v.is_finite())?;
    let price = raw.price?.as_f64().filter(|v| v.is_finite())?;
    let size = raw.size?.as_f64().filter(|v| v.is_finite())?;
    let side = match raw.side?.as_str()? {
        "buy" => Side::Buy,
        "sell" => Side::Sell,
        _ => return None,
    };
    let source = raw.source?.as_str()?.to_string();

    Some(TradeEntry {
        timestamp: timestamp as i64,
        price,
        size,
        side,
        source,
    })
}

/// Fetch, decode, and validate the object at `key` via `client`, returning
/// the entries that survived validation.
pub async fn load_object(
    key: &str,
    client: &dyn ObjectStoreClient,
) -> Result<Vec<TradeEntry>, LoadError> {
    let bytes = client.get(key).await.map_err(LoadError::Transport)?;
    let text = String::from_utf8(bytes.to_vec()).map_err(|e| LoadError::Decode(e.into()))?;
    let root: Value = serde_json::from_str(&text).map_err(|e| LoadError::Decode(e.into()))?;

    let candidates: Vec<Value> = match root {
        Value::Array(values) => values,
        other => vec![other],
    };

    let mut entries = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        let Ok(raw) = serde_json::from_value::<RawEntry>(candidate) else {
            continue;
        };
        if let Some(entry) = validate(raw) {
            entries.push(entry);
        }
    }
    Ok(entries)
}
