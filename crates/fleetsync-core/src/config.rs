// ── Runtime configuration ──
//
// These types describe *how* to reach the monitoring API and *how* to
// reconcile. They carry credential data and tuning, but never touch disk
// or the environment. The CLI (via fleetsync-config) builds them and
// hands them in.

use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use crate::cache::CachePolicy;
use crate::model::UserMacro;
use crate::transform::DEFAULT_MACRO_PREFIX;

/// How to authenticate with the monitoring API.
#[derive(Debug, Clone)]
pub enum AuthCredentials {
    /// API token sent as a bearer header (preferred).
    ApiToken(SecretString),
    /// `user.login` session.
    Credentials {
        username: String,
        password: SecretString,
    },
}

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(std::path::PathBuf),
    /// Skip verification (self-signed certs).
    DangerAcceptInvalid,
}

/// Configuration for connecting to one monitoring frontend.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Frontend URL (e.g. `https://zabbix.example.com/`) or the full
    /// `api_jsonrpc.php` URL.
    pub url: Url,
    pub auth: AuthCredentials,
    pub tls: TlsVerification,
    /// Per-request timeout.
    pub timeout: Duration,
}

/// Reconciliation tuning for one [`Reconciler`](crate::Reconciler).
#[derive(Debug, Clone)]
pub struct ReconcilerOptions {
    /// Group names applied to hosts reconciled from stream events.
    pub groups: Vec<String>,
    /// Template names linked to hosts reconciled from stream events.
    pub templates: Vec<String>,
    /// Operator macros added to every host ahead of tag macros.
    pub macros: Vec<UserMacro>,
    /// Terminal group archived hosts are moved into.
    pub archive_group: String,
    /// Parent group for templates created on first reference.
    pub template_group: String,
    /// Create groups and templates that do not exist yet.
    pub create_missing: bool,
    /// Prefix inside `{...}` for macros derived from tags.
    pub macro_prefix: String,
    pub cache: CachePolicy,
}

impl Default for ReconcilerOptions {
    fn default() -> Self {
        Self {
            groups: Vec::new(),
            templates: Vec::new(),
            macros: Vec::new(),
            archive_group: "Archive".into(),
            template_group: "Templates".into(),
            create_missing: true,
            macro_prefix: DEFAULT_MACRO_PREFIX.into(),
            cache: CachePolicy::default(),
        }
    }
}
