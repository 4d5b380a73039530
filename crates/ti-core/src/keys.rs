//! Parsing/formatting for the producer-side object key convention described
//! in spec §6: `{exchange}/{collector}/{t_start}-{t_end}`, where `t_start`
//! and `t_end` are Unix-seconds floats formatted with exactly six fractional
//! digits.
//!
//! The index itself never parses this convention — it only relies on the
//! `.json` suffix when discovering objects — but test suites round-trip
//! keys of this form, as the spec invites.

/// A parsed object key following the `{exchange}/{collector}/{t_start}-{t_end}`
/// convention.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectKeyParts {
    pub exchange: String,
    pub collector: String,
    pub t_start: f64,
    pub t_end: f64,
}

impl ObjectKeyParts {
    /// Format as `{exchange}/{collector}/{t_start}-{t_end}.json`, with
    /// `t_start`/`t_end` rendered with exactly six fractional digits.
    pub fn format(&self) -> String {
        format!(
            "{}/{}/{:.6}-{:.6}.json",
            self.exchange, self.collector, self.t_start, self.t_end
        )
    }
}

/// Parse a key of the form `{exchange}/{collector}/{t_start}-{t_end}`,
/// tolerating an optional trailing `.json`.
pub fn parse_object_key(key: &str) -> Option<ObjectKeyParts> {
    let key = key.strip_suffix(".json").unwrap_or(key);
    let mut parts = key.splitn(3, '/');
    let exchange = parts.next()?;
    let collector = parts.next()?;
    let window = parts.next()?;
    if parts.next().is_some() {
        return None;
    }

    let (start_str, end_str) = window.split_once('-')?;
    let t_start: f64 = start_str.parse().ok()?;
    let t_end: f64 = end_str.parse().ok()?;

    if exchange.is_empty() || collector.is_empty() {
        return None;
    }

    Some(ObjectKeyParts {
        exchange: exchange.to_string(),
        collector: collector.to_string(),
        t_start,
        t_end,
    })
}
