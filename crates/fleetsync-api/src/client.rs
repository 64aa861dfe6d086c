// JSON-RPC HTTP client
//
// Wraps `reqwest::Client` with endpoint resolution, request envelopes,
// session handling, and response unwrapping. Method families (hosts,
// groups, templates, user macros) are implemented as inherent methods in
// separate files to keep this module focused on transport mechanics.

use std::sync::atomic::{AtomicU64, Ordering};

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::models::{RpcRequest, RpcResponse};
use crate::transport::TransportConfig;

const RPC_PATH: &str = "api_jsonrpc.php";

/// Raw client for the Zabbix JSON-RPC API.
///
/// Every call is a `POST` of a JSON-RPC 2.0 envelope to a single endpoint.
/// Methods return the unwrapped `result` payload; the `error` envelope is
/// turned into [`Error::Rpc`] before the caller sees it.
pub struct RpcClient {
    http: reqwest::Client,
    endpoint: Url,
    session: Option<SecretString>,
    next_id: AtomicU64,
}

impl RpcClient {
    /// Create a client without credentials. Call [`login`](Self::login)
    /// before issuing anything but `apiinfo.version`.
    ///
    /// `base_url` may be the frontend root (`https://zabbix.example.com/`)
    /// or the full `api_jsonrpc.php` URL.
    pub fn new(base_url: &Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Self::from_reqwest(base_url, http)
    }

    /// Create a client that authenticates every request with an API token
    /// sent as `Authorization: Bearer <token>`.
    pub fn with_token(
        base_url: &Url,
        token: &SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let mut value = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
            .map_err(|_| Error::Authentication {
                message: "API token contains characters not allowed in a header".into(),
            })?;
        value.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, value);
        let http = transport.build_client_with_headers(headers)?;
        Self::from_reqwest(base_url, http)
    }

    /// Create a client around a pre-built `reqwest::Client`.
    pub fn from_reqwest(base_url: &Url, http: reqwest::Client) -> Result<Self, Error> {
        Ok(Self {
            http,
            endpoint: rpc_endpoint(base_url)?,
            session: None,
            next_id: AtomicU64::new(1),
        })
    }

    /// The resolved JSON-RPC endpoint.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Whether a `user.login` session is active.
    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }

    // ── Session ──────────────────────────────────────────────────────

    /// Authenticate with username/password. The session id is attached to
    /// every subsequent request in the envelope's `auth` field.
    pub async fn login(&mut self, username: &str, password: &SecretString) -> Result<(), Error> {
        #[derive(Serialize)]
        struct LoginParams<'a> {
            username: &'a str,
            password: &'a str,
        }

        let params = LoginParams {
            username,
            password: password.expose_secret(),
        };
        let session: String = self
            .call("user.login", &params)
            .await
            .map_err(|e| match e {
                Error::Rpc { message, .. } => Error::Authentication { message },
                other => other,
            })?;

        debug!(username, "session authentication successful");
        self.session = Some(SecretString::from(session));
        Ok(())
    }

    /// End the current session. A no-op without one.
    pub async fn logout(&mut self) -> Result<(), Error> {
        if self.session.is_none() {
            return Ok(());
        }
        let _: bool = self.call("user.logout", &[(); 0]).await?;
        self.session = None;
        debug!("session closed");
        Ok(())
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send one JSON-RPC request and unwrap the response envelope.
    pub async fn call<P, R>(&self, method: &str, params: &P) -> Result<R, Error>
    where
        P: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = RpcRequest {
            jsonrpc: "2.0",
            method,
            params,
            id,
            auth: self.session.as_ref().map(|s| s.expose_secret()),
        };

        debug!(method, id, "POST {}", self.endpoint);

        let resp = self
            .http
            .post(self.endpoint.clone())
            .json(&request)
            .send()
            .await?;

        if resp.status() == reqwest::StatusCode::UNAUTHORIZED {
            return Err(Error::Authentication {
                message: "session expired or invalid API token".into(),
            });
        }

        let resp = resp.error_for_status()?;
        let body = resp.text().await?;

        let envelope: RpcResponse<R> =
            serde_json::from_str(&body).map_err(|e| Error::Deserialization {
                message: e.to_string(),
                body: body.clone(),
            })?;

        match (envelope.result, envelope.error) {
            (_, Some(err)) => Err(Error::Rpc {
                method: method.to_owned(),
                code: err.code,
                message: err.message,
                data: err.data,
            }),
            (Some(result), None) => Ok(result),
            (None, None) => Err(Error::Deserialization {
                message: "response carries neither result nor error".into(),
                body,
            }),
        }
    }
}

/// Resolve the JSON-RPC endpoint from a frontend URL.
fn rpc_endpoint(base_url: &Url) -> Result<Url, Error> {
    if base_url.path().ends_with(".php") {
        return Ok(base_url.clone());
    }

    let mut base = base_url.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    Ok(base.join(RPC_PATH)?)
}
