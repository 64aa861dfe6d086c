// ── EC2 instance snapshot ──
//
// Deserializes the `DescribeInstances` instance shape (PascalCase keys).
// Network fields are optional here because terminated instances drop
// them; `Transform` decides which ones a host actually needs.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

use crate::error::CoreError;

/// Immutable instance snapshot supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SourceInstance {
    pub instance_id: String,
    pub state: StateRef,
    #[serde(default)]
    pub private_ip_address: Option<String>,
    #[serde(default)]
    pub private_dns_name: Option<String>,
    #[serde(default)]
    pub instance_type: Option<String>,
    #[serde(default)]
    pub architecture: Option<String>,
    #[serde(default)]
    pub image_id: Option<String>,
    #[serde(default)]
    pub placement: Option<Placement>,
    #[serde(default)]
    pub network_interfaces: Vec<NetworkInterface>,
    #[serde(default)]
    pub vpc_id: Option<String>,
    #[serde(default)]
    pub subnet_id: Option<String>,
    /// Ordered as delivered. Keys may repeat.
    #[serde(default)]
    pub tags: Vec<Tag>,
}

/// `State` block. Only `Name` drives reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StateRef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<u16>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Placement {
    pub availability_zone: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NetworkInterface {
    #[serde(default)]
    pub mac_address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Tag {
    pub key: String,
    pub value: String,
}

impl Tag {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// EC2 lifecycle state. Parsing is exact: anything outside these six
/// strings is rejected rather than defaulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr)]
#[strum(serialize_all = "kebab-case")]
pub enum InstanceState {
    Pending,
    Running,
    ShuttingDown,
    Terminated,
    Stopping,
    Stopped,
}

impl SourceInstance {
    /// Parse the lifecycle state.
    pub fn lifecycle(&self) -> Result<InstanceState, CoreError> {
        self.state
            .name
            .parse()
            .map_err(|_| CoreError::UnrecognizedState {
                state: self.state.name.clone(),
            })
    }

    /// MAC address of the primary (first) network interface.
    pub fn primary_mac(&self) -> Option<&str> {
        self.network_interfaces
            .first()
            .and_then(|nic| nic.mac_address.as_deref())
    }
}
