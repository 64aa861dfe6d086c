//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use fleetsync_config::ConfigError;
use fleetsync_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to Zabbix at {url}")]
    #[diagnostic(
        code(fleetsync::connection_failed),
        help(
            "Check that the Zabbix frontend is running and reachable.\n\
             URL: {url}"
        )
    )]
    ConnectionFailed {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("TLS error: {message}")]
    #[diagnostic(
        code(fleetsync::tls_error),
        help("Use --insecure (-k) to accept the certificate, or set zabbix.ca_cert.")
    )]
    TlsError { message: String },

    #[error("Request timed out")]
    #[diagnostic(
        code(fleetsync::timeout),
        help("Increase the timeout with --timeout or zabbix.timeout.")
    )]
    Timeout,

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(fleetsync::auth_failed),
        help("Verify zabbix.api_token, or zabbix.user and zabbix.password.")
    )]
    AuthFailed { message: String },

    #[error("No Zabbix credentials configured")]
    #[diagnostic(
        code(fleetsync::no_credentials),
        help("Set ZABBIX_API_TOKEN, or ZABBIX_USER and ZABBIX_PASSWORD.")
    )]
    NoCredentials,

    // ── Resources ────────────────────────────────────────────────────
    #[error("{entity} not found: {identifier}")]
    #[diagnostic(
        code(fleetsync::not_found),
        help("Pass --ignore-missing to treat a missing host as success.")
    )]
    NotFound { entity: String, identifier: String },

    #[error("Zabbix answered for host {actual}, expected {expected}")]
    #[diagnostic(code(fleetsync::identity_mismatch))]
    IdentityMismatch { expected: String, actual: String },

    // ── API ──────────────────────────────────────────────────────────
    #[error("API error ({code}): {message}")]
    #[diagnostic(code(fleetsync::api_error))]
    ApiError { code: String, message: String },

    // ── Batch ────────────────────────────────────────────────────────
    #[error("{failed} of {processed} records failed")]
    #[diagnostic(
        code(fleetsync::partial_batch),
        help("Rerun with -v to see the error logged for each record.")
    )]
    PartialBatch { failed: usize, processed: usize },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(fleetsync::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error(transparent)]
    #[diagnostic(
        code(fleetsync::config),
        help("See `fleetsync config path` for the expected file location.")
    )]
    Config(ConfigError),

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON input: {0}")]
    #[diagnostic(code(fleetsync::json), help("Check the JSON input and try again."))]
    Json(#[from] serde_json::Error),

    #[error("Failed to render output: {message}")]
    Render { message: String },
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::TlsError { .. } => exit_code::CONNECTION,
            Self::Timeout => exit_code::TIMEOUT,
            Self::AuthFailed { .. } | Self::NoCredentials => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::IdentityMismatch { .. } => exit_code::CONFLICT,
            Self::Validation { .. } | Self::Json(_) => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NotFound { entity, identifier } => CliError::NotFound {
                entity: entity.into(),
                identifier,
            },

            CoreError::UnrecognizedState { state } => CliError::Validation {
                field: "State.Name".into(),
                reason: format!("unrecognised EC2 state '{state}'"),
            },

            CoreError::InvalidInstance { instance, field } => CliError::Validation {
                field: field.into(),
                reason: format!("missing on instance {instance}"),
            },

            CoreError::Decode { index, reason } => CliError::Validation {
                field: format!("Records[{index}]"),
                reason,
            },

            CoreError::IdentityMismatch { expected, actual } => {
                CliError::IdentityMismatch { expected, actual }
            }

            CoreError::UnexpectedResponse { message } => CliError::ApiError {
                code: "unexpected_response".into(),
                message,
            },

            CoreError::Remote(err) => err.into(),
        }
    }
}

impl From<fleetsync_api::Error> for CliError {
    fn from(err: fleetsync_api::Error) -> Self {
        use fleetsync_api::Error;

        match err {
            Error::Authentication { message } => CliError::AuthFailed { message },

            Error::Transport(e) if e.is_timeout() => CliError::Timeout,

            Error::Transport(e) => CliError::ConnectionFailed {
                url: e
                    .url()
                    .map_or_else(|| "(unknown)".to_owned(), ToString::to_string),
                source: Box::new(e),
            },

            Error::InvalidUrl(e) => CliError::Validation {
                field: "zabbix.url".into(),
                reason: e.to_string(),
            },

            Error::Tls(message) => CliError::TlsError { message },

            Error::Rpc {
                method,
                code,
                message,
                data,
            } => CliError::ApiError {
                code: code.to_string(),
                message: match data {
                    Some(data) => format!("{method}: {message} {data}"),
                    None => format!("{method}: {message}"),
                },
            },

            e @ (Error::EmptyResult { .. } | Error::Deserialization { .. }) => {
                CliError::ApiError {
                    code: "bad_response".into(),
                    message: e.to_string(),
                }
            }
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NoCredentials => CliError::NoCredentials,
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            other => CliError::Config(other),
        }
    }
}
