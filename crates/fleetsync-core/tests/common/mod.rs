// In-memory host directory shared by the reconciler integration tests.

#![allow(dead_code, clippy::unwrap_used)]

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use fleetsync_core::{
    CoreError, GroupId, HostDiff, HostDirectory, HostId, RegisteredHost, SourceInstance,
    TargetHost, TemplateId,
};
use serde_json::json;

#[derive(Debug, Default)]
pub struct State {
    /// Hosts keyed by technical name.
    pub hosts: BTreeMap<String, RegisteredHost>,
    pub groups: BTreeMap<String, GroupId>,
    /// Template name to (id, parent group).
    pub templates: BTreeMap<String, (TemplateId, GroupId)>,
    /// (hostid, macro, value) in creation order.
    pub macros: Vec<(HostId, String, String)>,
    pub updates: Vec<HostDiff>,
    /// Method names in call order.
    pub calls: Vec<&'static str>,
    pub next_id: u64,
    /// Make `update_host` report a different host id.
    pub wrong_update_id: bool,
}

impl State {
    fn allocate(&mut self) -> String {
        self.next_id += 1;
        (10_000 + self.next_id).to_string()
    }
}

#[derive(Debug, Default)]
pub struct FakeDirectory {
    state: Mutex<State>,
}

impl FakeDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_group(self, name: &str, id: &str) -> Self {
        self.state().groups.insert(name.into(), GroupId::from(id));
        self
    }

    pub fn with_template(self, name: &str, id: &str) -> Self {
        self.state().templates.insert(
            name.into(),
            (TemplateId::from(id), GroupId::from("1")),
        );
        self
    }

    pub fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    pub fn host(&self, identity: &str) -> Option<RegisteredHost> {
        self.state().hosts.get(identity).cloned()
    }

    pub fn count(&self, method: &str) -> usize {
        self.state().calls.iter().filter(|c| **c == method).count()
    }
}

impl HostDirectory for FakeDirectory {
    async fn find_host(&self, host: &str) -> Result<Option<RegisteredHost>, CoreError> {
        let mut state = self.state();
        state.calls.push("host.get");
        Ok(state.hosts.get(host).cloned())
    }

    async fn find_host_id(&self, host: &str) -> Result<Option<HostId>, CoreError> {
        let mut state = self.state();
        state.calls.push("host.get");
        Ok(state.hosts.get(host).map(|h| h.hostid.clone()))
    }

    async fn find_group(&self, name: &str) -> Result<Option<GroupId>, CoreError> {
        let mut state = self.state();
        state.calls.push("hostgroup.get");
        Ok(state.groups.get(name).cloned())
    }

    async fn create_group(&self, name: &str) -> Result<GroupId, CoreError> {
        let mut state = self.state();
        state.calls.push("hostgroup.create");
        let id = GroupId::new(state.allocate());
        state.groups.insert(name.into(), id.clone());
        Ok(id)
    }

    async fn find_template(&self, name: &str) -> Result<Option<TemplateId>, CoreError> {
        let mut state = self.state();
        state.calls.push("template.get");
        Ok(state.templates.get(name).map(|(id, _)| id.clone()))
    }

    async fn create_template(
        &self,
        name: &str,
        parent: &GroupId,
    ) -> Result<TemplateId, CoreError> {
        let mut state = self.state();
        state.calls.push("template.create");
        let id = TemplateId::new(state.allocate());
        state
            .templates
            .insert(name.into(), (id.clone(), parent.clone()));
        Ok(id)
    }

    async fn create_host(&self, host: &TargetHost) -> Result<HostId, CoreError> {
        let mut state = self.state();
        state.calls.push("host.create");
        let hostid = HostId::new(state.allocate());
        state.hosts.insert(
            host.host.clone(),
            RegisteredHost {
                hostid: hostid.clone(),
                host: host.clone(),
            },
        );
        Ok(hostid)
    }

    async fn update_host(&self, diff: &HostDiff) -> Result<HostId, CoreError> {
        let mut state = self.state();
        state.calls.push("host.update");
        state.updates.push(diff.clone());
        let wrong = state.wrong_update_id;

        let host = state
            .hosts
            .values_mut()
            .find(|h| h.hostid == diff.hostid)
            .ok_or_else(|| CoreError::UnexpectedResponse {
                message: format!("no host {}", diff.hostid),
            })?;
        if let Some(name) = &diff.name {
            host.host.name.clone_from(name);
        }
        if let Some(description) = &diff.description {
            host.host.description = Some(description.clone()).filter(|d| !d.is_empty());
        }
        if let Some(status) = diff.status {
            host.host.status = status;
        }
        for (key, value) in &diff.inventory {
            host.host.inventory.insert(key.clone(), value.clone());
        }
        if let Some(groups) = &diff.groups {
            host.host.groups.clone_from(groups);
        }

        if wrong {
            Ok(HostId::from("99999"))
        } else {
            Ok(diff.hostid.clone())
        }
    }

    async fn delete_host(&self, hostid: &HostId) -> Result<HostId, CoreError> {
        let mut state = self.state();
        state.calls.push("host.delete");
        state.hosts.retain(|_, h| h.hostid != *hostid);
        Ok(hostid.clone())
    }

    async fn create_user_macro(
        &self,
        hostid: &HostId,
        name: &str,
        value: &str,
    ) -> Result<(), CoreError> {
        let mut state = self.state();
        state.calls.push("usermacro.create");
        state
            .macros
            .push((hostid.clone(), name.to_owned(), value.to_owned()));
        Ok(())
    }
}

/// A complete running instance with a `Name` tag.
pub fn instance(id: &str, state: &str, name: &str) -> SourceInstance {
    serde_json::from_value(json!({
        "InstanceId": id,
        "State": { "Name": state },
        "PrivateIpAddress": "10.0.0.1",
        "PrivateDnsName": "ip-10-0-0-1.ec2.internal",
        "InstanceType": "t3.micro",
        "Architecture": "x86_64",
        "ImageId": "ami-0abc",
        "Placement": { "AvailabilityZone": "us-east-1a" },
        "NetworkInterfaces": [{ "MacAddress": "0a:00:00:00:00:01" }],
        "VpcId": "vpc-1",
        "SubnetId": "subnet-1",
        "Tags": [{ "Key": "Name", "Value": name }]
    }))
    .unwrap()
}
