// ── Core error types ──
//
// Errors surfaced by the reconciliation engine. Remote failures are kept
// whole in `Remote`: the engine never inspects their message text to guess
// what went wrong, because that text changes between server releases.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Lookup ───────────────────────────────────────────────────────
    #[error("{entity} not found: {identifier}")]
    NotFound {
        entity: &'static str,
        identifier: String,
    },

    // ── Input ────────────────────────────────────────────────────────
    #[error("Unrecognised EC2 state: {state}")]
    UnrecognizedState { state: String },

    #[error("Instance {instance} is missing required field {field}")]
    InvalidInstance {
        instance: String,
        field: &'static str,
    },

    #[error("Batch record {index} could not be decoded: {reason}")]
    Decode { index: usize, reason: String },

    // ── Consistency ──────────────────────────────────────────────────
    #[error("Unexpected hostid returned. Expected {expected}, got {actual}")]
    IdentityMismatch { expected: String, actual: String },

    #[error("Unexpected response from monitoring API: {message}")]
    UnexpectedResponse { message: String },

    // ── Remote (wrapped, not reinterpreted) ──────────────────────────
    #[error(transparent)]
    Remote(#[from] fleetsync_api::Error),
}

impl CoreError {
    /// Returns `true` for a required lookup that found nothing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
