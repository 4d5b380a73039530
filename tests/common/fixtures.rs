//! Static object payloads used across loader/coordinator harnesses.

/// A well-formed object body: an array of three valid rows.
pub const OBJECT_VALID_ARRAY: &str = r#"[
    {"timestamp": 1700000000000, "price": 100.0, "size": 1.0, "side": "buy",  "source": "exA"},
    {"timestamp": 1700000001000, "price": 100.5, "size": 2.0, "side": "sell", "source": "exA"},
    {"timestamp": 1700000002000, "price": 101.0, "size": 0.5, "side": "buy",  "source": "exB"}
]"#;

/// A single object (not wrapped in an array) — treated as one-element array.
pub const OBJECT_SINGLE: &str = r#"{"timestamp": 1700000003000, "price": 99.0, "size": 3.0, "side": "sell", "source": "exA"}"#;

/// An array mixing valid rows with rows that fail validation for various
/// reasons (missing field, wrong type, unrecognized side).
pub const OBJECT_MIXED_VALIDITY: &str = r#"[
    {"timestamp": 1, "price": 1.0, "size": 1.0, "side": "buy", "source": "A"},
    {"timestamp": 2, "price": 1.0, "size": 1.0, "side": "diagonal", "source": "B"},
    {"timestamp": 3, "size": 1.0, "side": "sell", "source": "C"},
    {"timestamp": 4, "price": 2.0, "size": 2.0, "side": "sell", "source": "D"}
]"#;

/// Not valid JSON at all.
pub const OBJECT_MALFORMED: &str = "{not json at all";

/// An S3-style notification body naming a single key.
pub fn notification_for_key(key: &str) -> String {
    format!(r#"{{"Records": [{{"s3": {{"object": {{"key": "{key}"}}}}}}]}}"#)
}
