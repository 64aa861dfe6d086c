// JSON-RPC wire types
//
// Request/response envelopes and the Zabbix object shapes this workspace
// reads and writes. The API encodes almost every scalar as a string
// ("0"/"1" flags, numeric ids), so fields stay `String` here; typing happens
// in `fleetsync-core::convert`. Unknown fields are ignored.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// ── Envelope ─────────────────────────────────────────────────────────

/// Outgoing JSON-RPC 2.0 request.
#[derive(Debug, Serialize)]
pub(crate) struct RpcRequest<'a, P: Serialize + ?Sized> {
    pub jsonrpc: &'static str,
    pub method: &'a str,
    pub params: &'a P,
    pub id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth: Option<&'a str>,
}

/// Incoming JSON-RPC 2.0 response. Exactly one of `result`/`error` is set.
#[derive(Debug, Deserialize)]
pub(crate) struct RpcResponse<R> {
    pub result: Option<R>,
    pub error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RpcErrorBody {
    pub code: i64,
    pub message: String,
    #[serde(default)]
    pub data: Option<String>,
}

// ── References ───────────────────────────────────────────────────────

/// `{ "groupid": "..." }`, as used in host payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupRef {
    pub groupid: String,
}

/// `{ "templateid": "..." }`, as used in host payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateRef {
    pub templateid: String,
}

/// A host id alone, from `host.get` without `output: extend`.
#[derive(Debug, Clone, Deserialize)]
pub struct HostIdRef {
    pub hostid: String,
}

// ── Host ─────────────────────────────────────────────────────────────

/// Full host object from `host.get` with groups, interfaces, inventory,
/// macros and linked templates selected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawHost {
    pub hostid: String,
    /// Technical name. fleetsync stores the instance identity here.
    pub host: String,
    #[serde(default)]
    pub name: String,
    /// `"0"` = monitored, `"1"` = unmonitored.
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub groups: Vec<GroupRef>,
    #[serde(default, rename = "parentTemplates")]
    pub parent_templates: Vec<TemplateRef>,
    #[serde(default)]
    pub interfaces: Vec<RawInterface>,
    #[serde(default)]
    pub inventory: RawInventory,
    #[serde(default)]
    pub macros: Vec<RawMacro>,
}

/// Host interface. All fields are strings on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawInterface {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interfaceid: Option<String>,
    /// `"1"` = agent, `"2"` = SNMP, `"3"` = IPMI, `"4"` = JMX.
    #[serde(rename = "type")]
    pub kind: String,
    pub main: String,
    pub useip: String,
    #[serde(default)]
    pub ip: String,
    #[serde(default)]
    pub dns: String,
    pub port: String,
}

/// Host inventory.
///
/// The API returns an object of field name to value when inventory is
/// enabled, and an empty array when it is disabled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawInventory {
    Fields(BTreeMap<String, String>),
    Disabled(Vec<serde_json::Value>),
}

impl Default for RawInventory {
    fn default() -> Self {
        Self::Fields(BTreeMap::new())
    }
}

impl RawInventory {
    /// Inventory fields, empty when inventory is disabled.
    pub fn into_fields(self) -> BTreeMap<String, String> {
        match self {
            Self::Fields(fields) => fields,
            Self::Disabled(_) => BTreeMap::new(),
        }
    }
}

/// Host-level user macro.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawMacro {
    #[serde(rename = "macro")]
    pub name: String,
    #[serde(default)]
    pub value: String,
}

/// `host.create` payload.
#[derive(Debug, Clone, Serialize)]
pub struct HostCreate {
    pub host: String,
    pub name: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub interfaces: Vec<RawInterface>,
    /// `"0"` = manual inventory.
    pub inventory_mode: String,
    pub inventory: BTreeMap<String, String>,
    pub groups: Vec<GroupRef>,
    pub templates: Vec<TemplateRef>,
    pub macros: Vec<RawMacro>,
}

/// `host.update` payload. Only the fields that are `Some`/non-empty are
/// sent; omitted fields are left untouched by the server, except that a
/// `groups` list replaces the host's memberships entirely.
#[derive(Debug, Clone, Default, Serialize)]
pub struct HostUpdate {
    pub hostid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub inventory: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub groups: Option<Vec<GroupRef>>,
}

/// `{ "hostids": [...] }` from host write methods.
#[derive(Debug, Deserialize)]
pub(crate) struct HostIds {
    pub hostids: Vec<String>,
}

// ── Host groups ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct RawGroup {
    pub groupid: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GroupIds {
    pub groupids: Vec<String>,
}

// ── Templates ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct RawTemplate {
    pub templateid: String,
    #[serde(default)]
    pub host: String,
}

/// `template.create` payload.
#[derive(Debug, Clone, Serialize)]
pub struct TemplateCreate {
    pub host: String,
    pub name: String,
    pub groups: Vec<GroupRef>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TemplateIds {
    pub templateids: Vec<String>,
}

// ── User macros ──────────────────────────────────────────────────────

/// `usermacro.create` payload.
#[derive(Debug, Clone, Serialize)]
pub struct UserMacroCreate {
    pub hostid: String,
    #[serde(rename = "macro")]
    pub name: String,
    pub value: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct HostMacroIds {
    pub hostmacroids: Vec<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn inventory_object_parses_as_fields() {
        let inv: RawInventory =
            serde_json::from_value(json!({ "hardware": "t2.micro", "hw_arch": "" })).unwrap();
        let fields = inv.into_fields();
        assert_eq!(fields.get("hardware").map(String::as_str), Some("t2.micro"));
        assert_eq!(fields.get("hw_arch").map(String::as_str), Some(""));
    }

    #[test]
    fn disabled_inventory_is_an_empty_array() {
        let inv: RawInventory = serde_json::from_value(json!([])).unwrap();
        assert!(matches!(inv, RawInventory::Disabled(_)));
        assert!(inv.into_fields().is_empty());
    }

    #[test]
    fn host_update_omits_unchanged_fields() {
        let update = HostUpdate {
            hostid: "10105".into(),
            status: Some("1".into()),
            ..HostUpdate::default()
        };
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            json!({ "hostid": "10105", "status": "1" })
        );
    }

    #[test]
    fn raw_host_tolerates_missing_selects() {
        let host: RawHost =
            serde_json::from_value(json!({ "hostid": "1", "host": "i-1", "proxy_hostid": "0" }))
                .unwrap();
        assert_eq!(host.host, "i-1");
        assert!(host.groups.is_empty());
        assert!(host.inventory.into_fields().is_empty());
    }
}
