// ── Instance → host transform ──
//
// Pure mapping from an EC2 instance snapshot to the desired monitoring
// host. No I/O, no state; the same input always yields the same record.

use std::collections::BTreeMap;

use indexmap::IndexMap;

use crate::error::CoreError;
use crate::model::host::inventory;
use crate::model::{
    GroupId, HostInterface, HostStatus, InstanceState, SourceInstance, Tag, TargetHost,
    TemplateId, UserMacro,
};

/// Prefix inside `{...}` for macros derived from instance tags.
pub const DEFAULT_MACRO_PREFIX: &str = "$EC2_TAG_";

/// Map an EC2 lifecycle state string to a host status.
///
/// `running` and `pending` are monitored; `shutting-down`, `terminated`,
/// `stopping` and `stopped` are not. Anything else is rejected.
pub fn state_to_status(state: &str) -> Result<HostStatus, CoreError> {
    state
        .parse::<InstanceState>()
        .map(HostStatus::from)
        .map_err(|_| CoreError::UnrecognizedState {
            state: state.to_owned(),
        })
}

/// Upper-case a tag key and collapse every run of characters outside
/// `[A-Z0-9]` into a single underscore.
pub fn sanitize_macro_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for c in key.to_uppercase().chars() {
        if c.is_ascii_uppercase() || c.is_ascii_digit() {
            out.push(c);
        } else if !out.ends_with('_') {
            out.push('_');
        }
    }
    out
}

/// Builds [`TargetHost`] records from instance snapshots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transform {
    macro_prefix: String,
}

impl Default for Transform {
    fn default() -> Self {
        Self::new(DEFAULT_MACRO_PREFIX)
    }
}

impl Transform {
    pub fn new(macro_prefix: impl Into<String>) -> Self {
        Self {
            macro_prefix: macro_prefix.into(),
        }
    }

    pub fn macro_prefix(&self) -> &str {
        &self.macro_prefix
    }

    /// Convert a tag into a user macro: `{<prefix><SANITIZED_KEY>}` with
    /// the tag value verbatim.
    pub fn tag_to_macro(&self, tag: &Tag) -> UserMacro {
        UserMacro {
            name: format!("{{{}{}}}", self.macro_prefix, sanitize_macro_key(&tag.key)),
            value: tag.value.clone(),
        }
    }

    /// Build the desired host for `instance`.
    ///
    /// `groups` and `templates` are attached as given. Operator `macros` go
    /// in first, then one macro per tag; a later macro with the same name
    /// overwrites the earlier value in place.
    pub fn instance_to_host(
        &self,
        instance: &SourceInstance,
        groups: &[GroupId],
        templates: &[TemplateId],
        macros: &[UserMacro],
    ) -> Result<TargetHost, CoreError> {
        let status = state_to_status(&instance.state.name)?;
        let id = instance.instance_id.as_str();

        let required = |value: Option<&str>, field: &'static str| {
            value.map(str::to_owned).ok_or_else(|| CoreError::InvalidInstance {
                instance: id.to_owned(),
                field,
            })
        };

        let ip = required(instance.private_ip_address.as_deref(), "PrivateIpAddress")?;
        let dns = required(instance.private_dns_name.as_deref(), "PrivateDnsName")?;
        let hardware = required(instance.instance_type.as_deref(), "InstanceType")?;
        let arch = required(instance.architecture.as_deref(), "Architecture")?;
        let image = required(instance.image_id.as_deref(), "ImageId")?;
        let zone = required(
            instance
                .placement
                .as_ref()
                .map(|p| p.availability_zone.as_str()),
            "Placement.AvailabilityZone",
        )?;
        let mac = required(instance.primary_mac(), "NetworkInterfaces[0].MacAddress")?;
        let vpc = required(instance.vpc_id.as_deref(), "VpcId")?;
        let subnet = required(instance.subnet_id.as_deref(), "SubnetId")?;

        let mut inv = BTreeMap::from([
            (inventory::ASSET_TAG.to_owned(), id.to_owned()),
            (inventory::HARDWARE.to_owned(), hardware),
            (inventory::HW_ARCH.to_owned(), arch),
            (inventory::TYPE.to_owned(), image),
            (inventory::LOCATION.to_owned(), zone),
            (inventory::MAC_ADDRESS.to_owned(), mac),
            (inventory::HOST_NETWORKS.to_owned(), format!("{vpc}\n{subnet}")),
        ]);

        let mut name = id.to_owned();
        let mut description = None;
        let mut named = false;

        let mut host_macros: IndexMap<String, String> = macros
            .iter()
            .map(|m| (m.name.clone(), m.value.clone()))
            .collect();

        for tag in &instance.tags {
            match tag.key.to_lowercase().as_str() {
                "name" if !named => {
                    named = true;
                    name = format!("{} ({id})", tag.value);
                    inv.insert(inventory::NAME.to_owned(), tag.value.clone());
                }
                "description" if description.is_none() => {
                    description = Some(tag.value.clone());
                }
                _ => {}
            }
            let tag_macro = self.tag_to_macro(tag);
            host_macros.insert(tag_macro.name, tag_macro.value);
        }

        Ok(TargetHost {
            host: id.to_owned(),
            name,
            status,
            description,
            interfaces: vec![HostInterface::agent(ip, dns)],
            inventory: inv,
            groups: groups.to_vec(),
            templates: templates.to_vec(),
            macros: host_macros,
        })
    }
}
