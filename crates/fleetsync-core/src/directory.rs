// ── Host directory ──
//
// The remote collaborator seen by the reconciler: lookups and writes
// against the monitoring system's host, group, template and macro
// records. `RpcClient` is the production implementation; tests plug in an
// in-memory directory.

use fleetsync_api::models::{GroupRef, HostCreate, HostUpdate, TemplateCreate, UserMacroCreate};
use fleetsync_api::{RpcClient, TlsMode, TransportConfig};
use tracing::{debug, info};

use crate::config::{AuthCredentials, ConnectionConfig, TlsVerification};
use crate::diff::HostDiff;
use crate::error::CoreError;
use crate::model::{GroupId, HostId, RegisteredHost, TargetHost, TemplateId};

/// Remote host registry operations used by [`Reconciler`](crate::Reconciler).
///
/// Lookups return `Ok(None)` when nothing matches. Writes return the id the
/// server reports back; the reconciler checks it against the id it sent.
#[allow(async_fn_in_trait)]
pub trait HostDirectory {
    /// Full host record whose technical name is `host`.
    async fn find_host(&self, host: &str) -> Result<Option<RegisteredHost>, CoreError>;

    /// Id of the host whose technical name is `host`.
    async fn find_host_id(&self, host: &str) -> Result<Option<HostId>, CoreError>;

    async fn find_group(&self, name: &str) -> Result<Option<GroupId>, CoreError>;

    async fn create_group(&self, name: &str) -> Result<GroupId, CoreError>;

    async fn find_template(&self, name: &str) -> Result<Option<TemplateId>, CoreError>;

    /// Create a template named `name` inside `parent`.
    async fn create_template(&self, name: &str, parent: &GroupId)
    -> Result<TemplateId, CoreError>;

    async fn create_host(&self, host: &TargetHost) -> Result<HostId, CoreError>;

    async fn update_host(&self, diff: &HostDiff) -> Result<HostId, CoreError>;

    async fn delete_host(&self, hostid: &HostId) -> Result<HostId, CoreError>;

    async fn create_user_macro(
        &self,
        hostid: &HostId,
        name: &str,
        value: &str,
    ) -> Result<(), CoreError>;
}

// ── JSON-RPC implementation ──────────────────────────────────────────

impl HostDirectory for RpcClient {
    async fn find_host(&self, host: &str) -> Result<Option<RegisteredHost>, CoreError> {
        let Some(raw) = self.get_hosts(host).await?.into_iter().next() else {
            return Ok(None);
        };
        let found = RegisteredHost::try_from(raw)?;
        debug!(host, hostid = %found.hostid, "host found");
        Ok(Some(found))
    }

    async fn find_host_id(&self, host: &str) -> Result<Option<HostId>, CoreError> {
        let ids = self.get_host_ids(host).await?;
        Ok(ids.into_iter().next().map(|r| HostId::new(r.hostid)))
    }

    async fn find_group(&self, name: &str) -> Result<Option<GroupId>, CoreError> {
        let groups = self.get_groups(name).await?;
        Ok(groups.into_iter().next().map(|g| GroupId::new(g.groupid)))
    }

    async fn create_group(&self, name: &str) -> Result<GroupId, CoreError> {
        Ok(GroupId::new(RpcClient::create_group(self, name).await?))
    }

    async fn find_template(&self, name: &str) -> Result<Option<TemplateId>, CoreError> {
        let templates = self.get_templates(name).await?;
        Ok(templates
            .into_iter()
            .next()
            .map(|t| TemplateId::new(t.templateid)))
    }

    async fn create_template(
        &self,
        name: &str,
        parent: &GroupId,
    ) -> Result<TemplateId, CoreError> {
        let payload = TemplateCreate {
            host: name.to_owned(),
            name: name.to_owned(),
            groups: vec![GroupRef {
                groupid: parent.as_str().to_owned(),
            }],
        };
        Ok(TemplateId::new(
            RpcClient::create_template(self, &payload).await?,
        ))
    }

    async fn create_host(&self, host: &TargetHost) -> Result<HostId, CoreError> {
        let payload = HostCreate::from(host);
        Ok(HostId::new(RpcClient::create_host(self, &payload).await?))
    }

    async fn update_host(&self, diff: &HostDiff) -> Result<HostId, CoreError> {
        let payload = HostUpdate::from(diff);
        Ok(HostId::new(RpcClient::update_host(self, &payload).await?))
    }

    async fn delete_host(&self, hostid: &HostId) -> Result<HostId, CoreError> {
        Ok(HostId::new(
            RpcClient::delete_host(self, hostid.as_str()).await?,
        ))
    }

    async fn create_user_macro(
        &self,
        hostid: &HostId,
        name: &str,
        value: &str,
    ) -> Result<(), CoreError> {
        let payload = UserMacroCreate {
            hostid: hostid.as_str().to_owned(),
            name: name.to_owned(),
            value: value.to_owned(),
        };
        RpcClient::create_user_macro(self, &payload).await?;
        Ok(())
    }
}

// ── Connection ───────────────────────────────────────────────────────

fn transport_for(config: &ConnectionConfig) -> TransportConfig {
    let tls = match &config.tls {
        TlsVerification::SystemDefaults => TlsMode::System,
        TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
        TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
    };
    TransportConfig {
        tls,
        timeout: config.timeout,
    }
}

/// Build an authenticated client for `config`.
///
/// Token auth needs no round trip; credential auth performs `user.login`.
pub async fn connect(config: &ConnectionConfig) -> Result<RpcClient, CoreError> {
    let transport = transport_for(config);
    let client = match &config.auth {
        AuthCredentials::ApiToken(token) => {
            RpcClient::with_token(&config.url, token, &transport)?
        }
        AuthCredentials::Credentials { username, password } => {
            let mut client = RpcClient::new(&config.url, &transport)?;
            client.login(username, password).await?;
            client
        }
    };
    info!(endpoint = %client.endpoint(), "connected to monitoring API");
    Ok(client)
}
