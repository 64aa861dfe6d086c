use thiserror::Error;

/// Top-level error type for the `fleetsync-api` crate.
///
/// Covers every failure mode of a JSON-RPC exchange: authentication,
/// transport, the RPC error envelope, and response decoding.
/// `fleetsync-core` wraps these without reinterpreting them.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Login failed or the session/token was rejected.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, non-2xx, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS handshake or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── JSON-RPC ────────────────────────────────────────────────────
    /// Structured error from the `{ "error": { code, message, data } }` envelope.
    #[error("{method} failed (code {code}): {message}")]
    Rpc {
        method: String,
        code: i64,
        message: String,
        /// Free-text detail. Not stable across server releases.
        data: Option<String>,
    },

    /// A write method answered without the identifier it should return.
    #[error("{method} returned an empty result")]
    EmptyResult { method: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// The JSON-RPC error code, if the server produced one.
    pub fn rpc_code(&self) -> Option<i64> {
        match self {
            Self::Rpc { code, .. } => Some(*code),
            _ => None,
        }
    }
}
