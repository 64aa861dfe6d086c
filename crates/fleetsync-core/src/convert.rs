// ── Wire ↔ domain conversion ──
//
// Bridges `fleetsync_api::models` and `crate::model`. Inbound records are
// normalized (status parsed, inventory flattened, flags read as bools);
// outbound payloads carry the string encodings the API expects.

use fleetsync_api::models::{
    GroupRef, HostCreate, HostUpdate, RawHost, RawInterface, RawMacro, TemplateRef,
};

use crate::diff::HostDiff;
use crate::error::CoreError;
use crate::model::{GroupId, HostInterface, HostStatus, RegisteredHost, TargetHost, TemplateId};

/// Zabbix agent interface type.
const AGENT_INTERFACE: &str = "1";
/// Manual inventory mode.
const INVENTORY_MANUAL: &str = "0";

fn flag(b: bool) -> String {
    let raw = if b { "1" } else { "0" };
    raw.to_owned()
}

// ── Inbound ──────────────────────────────────────────────────────────

impl From<RawInterface> for HostInterface {
    fn from(raw: RawInterface) -> Self {
        Self {
            ip: raw.ip,
            dns: raw.dns,
            port: raw.port,
            main: raw.main == "1",
            use_ip: raw.useip == "1",
        }
    }
}

impl TryFrom<RawHost> for RegisteredHost {
    type Error = CoreError;

    fn try_from(raw: RawHost) -> Result<Self, Self::Error> {
        let status = HostStatus::from_wire(&raw.status)?;
        Ok(Self {
            hostid: raw.hostid.into(),
            host: TargetHost {
                host: raw.host,
                name: raw.name,
                status,
                description: Some(raw.description).filter(|d| !d.is_empty()),
                interfaces: raw.interfaces.into_iter().map(HostInterface::from).collect(),
                inventory: raw.inventory.into_fields(),
                groups: raw
                    .groups
                    .into_iter()
                    .map(|g| GroupId::new(g.groupid))
                    .collect(),
                templates: raw
                    .parent_templates
                    .into_iter()
                    .map(|t| TemplateId::new(t.templateid))
                    .collect(),
                macros: raw.macros.into_iter().map(|m| (m.name, m.value)).collect(),
            },
        })
    }
}

// ── Outbound ─────────────────────────────────────────────────────────

impl From<&HostInterface> for RawInterface {
    fn from(iface: &HostInterface) -> Self {
        Self {
            interfaceid: None,
            kind: AGENT_INTERFACE.into(),
            main: flag(iface.main),
            useip: flag(iface.use_ip),
            ip: iface.ip.clone(),
            dns: iface.dns.clone(),
            port: iface.port.clone(),
        }
    }
}

fn group_refs(groups: &[GroupId]) -> Vec<GroupRef> {
    groups
        .iter()
        .map(|g| GroupRef {
            groupid: g.as_str().to_owned(),
        })
        .collect()
}

impl From<&TargetHost> for HostCreate {
    fn from(host: &TargetHost) -> Self {
        Self {
            host: host.host.clone(),
            name: host.name.clone(),
            status: host.status.as_wire().into(),
            description: host.description.clone(),
            interfaces: host.interfaces.iter().map(RawInterface::from).collect(),
            inventory_mode: INVENTORY_MANUAL.into(),
            inventory: host.inventory.clone(),
            groups: group_refs(&host.groups),
            templates: host
                .templates
                .iter()
                .map(|t| TemplateRef {
                    templateid: t.as_str().to_owned(),
                })
                .collect(),
            macros: host
                .macros
                .iter()
                .map(|(name, value)| RawMacro {
                    name: name.clone(),
                    value: value.clone(),
                })
                .collect(),
        }
    }
}

impl From<&HostDiff> for HostUpdate {
    fn from(diff: &HostDiff) -> Self {
        Self {
            hostid: diff.hostid.as_str().to_owned(),
            name: diff.name.clone(),
            description: diff.description.clone(),
            status: diff.status.map(|s| s.as_wire().to_owned()),
            inventory: diff.inventory.clone(),
            groups: diff.groups.as_deref().map(group_refs),
        }
    }
}
