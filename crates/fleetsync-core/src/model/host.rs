// ── Monitoring host model ──

use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::ids::{GroupId, HostId, TemplateId};
use super::instance::InstanceState;
use crate::error::CoreError;

/// Zabbix agent port. Every generated interface uses it.
pub const AGENT_PORT: &str = "10050";

/// Inventory field names written by [`Transform`](crate::Transform).
pub mod inventory {
    pub const ASSET_TAG: &str = "asset_tag";
    pub const HARDWARE: &str = "hardware";
    pub const HW_ARCH: &str = "hw_arch";
    pub const TYPE: &str = "type";
    pub const LOCATION: &str = "location";
    pub const MAC_ADDRESS: &str = "macaddress_a";
    pub const HOST_NETWORKS: &str = "host_networks";
    pub const NAME: &str = "name";
}

// ── Status ───────────────────────────────────────────────────────────

/// Monitoring status of a host.
///
/// The wire form is `"0"` (monitored) / `"1"` (unmonitored); that encoding
/// is confined to [`as_wire`](Self::as_wire) and [`from_wire`](Self::from_wire).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HostStatus {
    Enabled,
    Disabled,
}

impl HostStatus {
    pub fn as_wire(self) -> &'static str {
        match self {
            Self::Enabled => "0",
            Self::Disabled => "1",
        }
    }

    pub fn from_wire(raw: &str) -> Result<Self, CoreError> {
        match raw {
            "0" => Ok(Self::Enabled),
            "1" => Ok(Self::Disabled),
            other => Err(CoreError::UnexpectedResponse {
                message: format!("host status {other:?} is neither \"0\" nor \"1\""),
            }),
        }
    }
}

impl From<InstanceState> for HostStatus {
    fn from(state: InstanceState) -> Self {
        match state {
            InstanceState::Pending | InstanceState::Running => Self::Enabled,
            InstanceState::ShuttingDown
            | InstanceState::Terminated
            | InstanceState::Stopping
            | InstanceState::Stopped => Self::Disabled,
        }
    }
}

// ── Host record ──────────────────────────────────────────────────────

/// Agent interface on a host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostInterface {
    pub ip: String,
    pub dns: String,
    pub port: String,
    pub main: bool,
    pub use_ip: bool,
}

impl HostInterface {
    /// Main agent interface addressed by IP on the standard port.
    pub fn agent(ip: impl Into<String>, dns: impl Into<String>) -> Self {
        Self {
            ip: ip.into(),
            dns: dns.into(),
            port: AGENT_PORT.into(),
            main: true,
            use_ip: true,
        }
    }
}

/// Host-level user macro, e.g. `{$EC2_TAG_NAME}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserMacro {
    pub name: String,
    pub value: String,
}

impl UserMacro {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Desired (or observed) shape of a monitoring host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetHost {
    /// Technical name. Equals the instance identity and never changes.
    pub host: String,
    pub name: String,
    pub status: HostStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub interfaces: Vec<HostInterface>,
    pub inventory: BTreeMap<String, String>,
    pub groups: Vec<GroupId>,
    pub templates: Vec<TemplateId>,
    /// Macro name to value, in insertion order.
    pub macros: IndexMap<String, String>,
}

/// A host as it exists remotely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisteredHost {
    pub hostid: HostId,
    #[serde(flatten)]
    pub host: TargetHost,
}
