//! Error types for the loader and coordinator.

/// Per-object fatal error returned by [`crate::loader::load_object`] to its
/// caller. Row-level validation failures never produce an error — invalid
/// rows are silently dropped per spec §4.3.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("transport error fetching object: {0}")]
    Transport(#[source] anyhow::Error),
    #[error("failed to decode object payload: {0}")]
    Decode(#[source] anyhow::Error),
}

/// One recorded per-object failure from a [`crate::coordinator::BackfillResult`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackfillEntry {
    pub key: String,
    pub message: String,
}
