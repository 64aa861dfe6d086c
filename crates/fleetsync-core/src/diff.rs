// ── Host diff ──
//
// Minimal change set between an observed host and the desired one, shaped
// for a sparse `host.update`. Scalars and inventory keys are sent only when
// they changed. Groups are all-or-nothing: the remote update replaces the
// whole membership list, so a partial list would unlink groups.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::model::{GroupId, HostId, HostStatus, RegisteredHost, TargetHost};

/// Sparse update for one host. Never empty when produced by [`diff`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostDiff {
    pub hostid: HostId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<HostStatus>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub inventory: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub groups: Option<Vec<GroupId>>,
}

impl HostDiff {
    /// An empty diff for `hostid`, to be filled field by field.
    pub fn for_host(hostid: HostId) -> Self {
        Self {
            hostid,
            name: None,
            description: None,
            status: None,
            inventory: BTreeMap::new(),
            groups: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.status.is_none()
            && self.inventory.is_empty()
            && self.groups.is_none()
    }

    /// Names of the categories carried by this diff, in payload order.
    pub fn changed_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.name.is_some() {
            fields.push("name");
        }
        if self.description.is_some() {
            fields.push("description");
        }
        if self.status.is_some() {
            fields.push("status");
        }
        if !self.inventory.is_empty() {
            fields.push("inventory");
        }
        if self.groups.is_some() {
            fields.push("groups");
        }
        fields
    }
}

/// Compare `current` against `desired`.
///
/// Returns `None` when nothing differs. Inventory keys present only on the
/// current host are ignored; a desired key missing from the current host
/// counts as a change. Group order is irrelevant.
pub fn diff(current: &RegisteredHost, desired: &TargetHost) -> Option<HostDiff> {
    let have = &current.host;
    let mut out = HostDiff::for_host(current.hostid.clone());

    if have.name != desired.name {
        out.name = Some(desired.name.clone());
    }

    let have_description = have.description.as_deref().unwrap_or_default();
    let want_description = desired.description.as_deref().unwrap_or_default();
    if have_description != want_description {
        out.description = Some(want_description.to_owned());
    }

    if have.status != desired.status {
        out.status = Some(desired.status);
    }

    for (key, want) in &desired.inventory {
        if have.inventory.get(key) != Some(want) {
            out.inventory.insert(key.clone(), want.clone());
        }
    }

    if !same_members(&have.groups, &desired.groups) {
        out.groups = Some(desired.groups.clone());
    }

    (!out.is_empty()).then_some(out)
}

fn same_members(current: &[GroupId], desired: &[GroupId]) -> bool {
    if current.len() != desired.len() {
        return false;
    }
    let mut a: Vec<&GroupId> = current.iter().collect();
    let mut b: Vec<&GroupId> = desired.iter().collect();
    a.sort();
    b.sort();
    a == b
}
