//! Error types for the store and query layers.

/// Errors returned by [`crate::query::QueryApi`]'s validating operations.
///
/// The store itself is infallible by construction — its inputs are already
/// validated `TradeEntry` values, so `Store` methods never return a `Result`.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}
