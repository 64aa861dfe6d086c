//! Configuration for fleetsync.
//!
//! Layered loading (defaults, TOML file, environment) and translation to
//! `fleetsync_core::ConnectionConfig` / `ReconcilerOptions`. The core
//! never reads files or the environment; everything flows through here.
//!
//! Environment variables:
//! - `ZABBIX_*` fill the `[zabbix]` table (`ZABBIX_URL`, `ZABBIX_USER`,
//!   `ZABBIX_PASSWORD`, `ZABBIX_API_TOKEN`, `ZABBIX_TIMEOUT`, ...).
//! - `FLEETSYNC_*` fill the `[sync]` table (`FLEETSYNC_GROUPS="[A, B]"`,
//!   `FLEETSYNC_ARCHIVE_GROUP`, ...).

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use fleetsync_core::{
    AuthCredentials, CachePolicy, ConnectionConfig, ReconcilerOptions, TlsVerification, UserMacro,
};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("missing {field}: set it in the config file or via {env}")]
    Missing { field: String, env: String },

    #[error("no credentials configured: set zabbix.api_token, or zabbix.user and zabbix.password")]
    NoCredentials,

    #[error("config file not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub zabbix: ZabbixSection,

    #[serde(default)]
    pub sync: SyncSection,
}

/// `[zabbix]`: how to reach the monitoring API.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ZabbixSection {
    /// Frontend URL, or the full `api_jsonrpc.php` URL.
    pub url: Option<String>,

    /// Username for session auth.
    pub user: Option<String>,

    /// Password for session auth (plaintext, prefer `ZABBIX_PASSWORD`).
    pub password: Option<String>,

    /// API token (preferred over user/password when both are set).
    pub api_token: Option<String>,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Accept invalid TLS certificates.
    #[serde(default)]
    pub insecure: bool,

    /// Path to a custom CA certificate (PEM).
    pub ca_cert: Option<PathBuf>,
}

impl Default for ZabbixSection {
    fn default() -> Self {
        Self {
            url: None,
            user: None,
            password: None,
            api_token: None,
            timeout: default_timeout(),
            insecure: false,
            ca_cert: None,
        }
    }
}

/// `[sync]`: reconciliation behavior.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SyncSection {
    /// Groups applied to hosts reconciled from stream events.
    #[serde(default)]
    pub groups: Vec<String>,

    /// Templates linked to hosts reconciled from stream events.
    #[serde(default)]
    pub templates: Vec<String>,

    #[serde(default = "default_archive_group")]
    pub archive_group: String,

    /// Parent group for templates created on first use.
    #[serde(default = "default_template_group")]
    pub template_group: String,

    #[serde(default = "default_macro_prefix")]
    pub macro_prefix: String,

    /// Create groups and templates that do not exist yet.
    #[serde(default = "default_true")]
    pub create_missing: bool,

    /// Per-keyspace cache bound. Unbounded when unset.
    pub cache_capacity: Option<usize>,

    /// Cache entry lifetime in seconds. No expiry when unset.
    pub cache_ttl_secs: Option<u64>,

    /// Extra macros set on every host, ahead of tag macros.
    #[serde(default)]
    pub macros: BTreeMap<String, String>,
}

impl Default for SyncSection {
    fn default() -> Self {
        Self {
            groups: Vec::new(),
            templates: Vec::new(),
            archive_group: default_archive_group(),
            template_group: default_template_group(),
            macro_prefix: default_macro_prefix(),
            create_missing: true,
            cache_capacity: None,
            cache_ttl_secs: None,
            macros: BTreeMap::new(),
        }
    }
}

fn default_timeout() -> u64 {
    30
}
fn default_archive_group() -> String {
    ReconcilerOptions::default().archive_group
}
fn default_template_group() -> String {
    ReconcilerOptions::default().template_group
}
fn default_macro_prefix() -> String {
    fleetsync_core::transform::DEFAULT_MACRO_PREFIX.into()
}
fn default_true() -> bool {
    true
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("io", "fleetsync", "fleetsync").map_or_else(
        || PathBuf::from(".fleetsync.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

// ── Config loading ──────────────────────────────────────────────────

/// Build the layered provider: defaults, file, then environment.
pub fn figment(path: &Path) -> Figment {
    Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("ZABBIX_").map(|k| format!("zabbix.{k}").into()))
        .merge(Env::prefixed("FLEETSYNC_").map(|k| format!("sync.{k}").into()))
}

/// Load the configuration.
///
/// An explicit `path` must exist. Without one, the platform config file is
/// used when present.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let path = match path {
        Some(p) if !p.exists() => {
            return Err(ConfigError::FileNotFound {
                path: p.to_path_buf(),
            });
        }
        Some(p) => p.to_path_buf(),
        None => config_path(),
    };

    Ok(figment(&path).extract()?)
}

// ── Translation ─────────────────────────────────────────────────────

impl Config {
    /// Connection parameters for `fleetsync_core::connect`.
    pub fn connection(&self) -> Result<ConnectionConfig, ConfigError> {
        let z = &self.zabbix;
        let raw_url = z.url.as_deref().ok_or_else(|| ConfigError::Missing {
            field: "zabbix.url".into(),
            env: "ZABBIX_URL".into(),
        })?;
        let url: url::Url = raw_url.parse().map_err(|e| ConfigError::Validation {
            field: "zabbix.url".into(),
            reason: format!("{e}: {raw_url}"),
        })?;

        let auth = if let Some(token) = &z.api_token {
            AuthCredentials::ApiToken(SecretString::from(token.clone()))
        } else {
            match (&z.user, &z.password) {
                (Some(username), Some(password)) => AuthCredentials::Credentials {
                    username: username.clone(),
                    password: SecretString::from(password.clone()),
                },
                _ => return Err(ConfigError::NoCredentials),
            }
        };

        let tls = if z.insecure {
            TlsVerification::DangerAcceptInvalid
        } else if let Some(ca) = &z.ca_cert {
            TlsVerification::CustomCa(ca.clone())
        } else {
            TlsVerification::SystemDefaults
        };

        if z.timeout == 0 {
            return Err(ConfigError::Validation {
                field: "zabbix.timeout".into(),
                reason: "must be at least 1 second".into(),
            });
        }

        Ok(ConnectionConfig {
            url,
            auth,
            tls,
            timeout: Duration::from_secs(z.timeout),
        })
    }

    /// Reconciliation options for `fleetsync_core::Reconciler`.
    pub fn reconciler_options(&self) -> ReconcilerOptions {
        let s = &self.sync;
        ReconcilerOptions {
            groups: s.groups.clone(),
            templates: s.templates.clone(),
            macros: s
                .macros
                .iter()
                .map(|(name, value)| UserMacro::new(name.clone(), value.clone()))
                .collect(),
            archive_group: s.archive_group.clone(),
            template_group: s.template_group.clone(),
            create_missing: s.create_missing,
            macro_prefix: s.macro_prefix.clone(),
            cache: CachePolicy {
                capacity: s.cache_capacity,
                ttl: s.cache_ttl_secs.map(Duration::from_secs),
            },
        }
    }

    /// The effective configuration as TOML, with secrets masked.
    pub fn to_redacted_toml(&self) -> Result<String, ConfigError> {
        let mut shown = self.clone();
        let mask = |v: &mut Option<String>| {
            if v.is_some() {
                *v = Some("********".into());
            }
        };
        mask(&mut shown.zabbix.password);
        mask(&mut shown.zabbix.api_token);
        Ok(toml::to_string_pretty(&shown)?)
    }
}
