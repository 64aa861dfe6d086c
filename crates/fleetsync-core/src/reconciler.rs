// ── Reconciler ──
//
// Orchestrates the host workflows: upsert, create, enable/disable, archive
// and delete. Each workflow is a strict sequence of awaited directory
// calls. Every method takes `&mut self`, so one reconciler never has two
// operations in flight; callers sharing identities across reconcilers must
// serialize externally.

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::cache::IdentityCache;
use crate::config::ReconcilerOptions;
use crate::diff::{HostDiff, diff};
use crate::directory::HostDirectory;
use crate::error::CoreError;
use crate::model::{
    GroupId, HostId, HostOutcome, HostStatus, OutcomeAction, RegisteredHost, SourceInstance,
    TargetHost, TemplateId,
};
use crate::transform::Transform;

/// Macro set on archived hosts with the archive timestamp (RFC 2822).
pub const ARCHIVE_DATE_MACRO: &str = "{$ARCHIVE_DATE}";
/// Macro set on archived hosts with the caller-supplied reason.
pub const ARCHIVE_REASON_MACRO: &str = "{$ARCHIVE_REASON}";

const HOST_ENTITY: &str = "Zabbix Host";
const GROUP_ENTITY: &str = "Zabbix Host Group";

/// Keeps monitoring hosts in step with instance snapshots.
pub struct Reconciler<D> {
    directory: D,
    transform: Transform,
    cache: IdentityCache,
    options: ReconcilerOptions,
}

impl<D: HostDirectory> Reconciler<D> {
    pub fn new(directory: D, options: ReconcilerOptions) -> Self {
        Self {
            directory,
            transform: Transform::new(options.macro_prefix.clone()),
            cache: IdentityCache::new(options.cache),
            options,
        }
    }

    pub fn directory(&self) -> &D {
        &self.directory
    }

    pub fn into_directory(self) -> D {
        self.directory
    }

    pub fn options(&self) -> &ReconcilerOptions {
        &self.options
    }

    pub fn cache(&self) -> &IdentityCache {
        &self.cache
    }

    // ── Workflows ────────────────────────────────────────────────────

    /// Create the host for `instance`, or update it if anything differs.
    ///
    /// An unchanged host issues no write.
    pub async fn upsert(
        &mut self,
        instance: &SourceInstance,
        groups: &[String],
        templates: &[String],
    ) -> Result<HostOutcome, CoreError> {
        let identity = instance.instance_id.as_str();
        let Some(current) = self.current_host(identity).await? else {
            return self.create(instance, groups, templates).await;
        };
        let hostid = current.hostid.clone();

        let desired = self.desired_host(instance, groups, templates).await?;
        let Some(changes) = diff(&current, &desired) else {
            debug!(identity, %hostid, "host unchanged");
            return Ok(HostOutcome::new(
                OutcomeAction::Unchanged,
                Some(hostid.clone()),
                format!("No changes for {HOST_ENTITY} {identity} ({hostid})"),
            ));
        };

        self.cache.invalidate_host(&hostid);
        let returned = self.directory.update_host(&changes).await?;
        verify_hostid(&hostid, returned)?;

        info!(
            identity,
            %hostid,
            fields = ?changes.changed_fields(),
            "updated host"
        );
        Ok(HostOutcome::new(
            OutcomeAction::Updated,
            Some(hostid.clone()),
            format!("Updated {HOST_ENTITY} {identity} ({hostid})"),
        )
        .with_diff(changes))
    }

    /// Create a new host for `instance`.
    pub async fn create(
        &mut self,
        instance: &SourceInstance,
        groups: &[String],
        templates: &[String],
    ) -> Result<HostOutcome, CoreError> {
        let identity = instance.instance_id.as_str();
        let host = self.desired_host(instance, groups, templates).await?;
        let hostid = self.directory.create_host(&host).await?;
        self.cache.store_host_id(identity, hostid.clone());

        info!(identity, %hostid, "created host");
        Ok(HostOutcome::new(
            OutcomeAction::Created,
            Some(hostid.clone()),
            format!("Created {HOST_ENTITY} {identity} ({hostid})"),
        ))
    }

    /// Enable or disable monitoring of the host for `instance`.
    pub async fn toggle(
        &mut self,
        instance: &SourceInstance,
        enable: bool,
        ignore_missing: bool,
    ) -> Result<HostOutcome, CoreError> {
        let identity = instance.instance_id.as_str();
        let Some(hostid) = self.host_id(identity, ignore_missing).await? else {
            return Ok(missing(identity));
        };
        self.cache.invalidate_host(&hostid);

        let (status, action, verb) = if enable {
            (HostStatus::Enabled, OutcomeAction::Enabled, "Enabled")
        } else {
            (HostStatus::Disabled, OutcomeAction::Disabled, "Disabled")
        };
        let mut changes = HostDiff::for_host(hostid.clone());
        changes.status = Some(status);

        let returned = self.directory.update_host(&changes).await?;
        verify_hostid(&hostid, returned)?;

        info!(identity, %hostid, %action, "toggled host");
        Ok(HostOutcome::new(
            action,
            Some(hostid.clone()),
            format!("{verb} {HOST_ENTITY} {identity} ({hostid})"),
        ))
    }

    pub async fn enable(
        &mut self,
        instance: &SourceInstance,
        ignore_missing: bool,
    ) -> Result<HostOutcome, CoreError> {
        self.toggle(instance, true, ignore_missing).await
    }

    pub async fn disable(
        &mut self,
        instance: &SourceInstance,
        ignore_missing: bool,
    ) -> Result<HostOutcome, CoreError> {
        self.toggle(instance, false, ignore_missing).await
    }

    /// Disable the host and move it into the archive group, then stamp it
    /// with `{$ARCHIVE_DATE}` and, when given, `{$ARCHIVE_REASON}`.
    pub async fn archive(
        &mut self,
        instance: &SourceInstance,
        reason: Option<&str>,
        ignore_missing: bool,
    ) -> Result<HostOutcome, CoreError> {
        let identity = instance.instance_id.as_str();
        let Some(hostid) = self.host_id(identity, ignore_missing).await? else {
            return Ok(HostOutcome::new(
                OutcomeAction::Missing,
                None,
                format!("{HOST_ENTITY} {identity} does not exist - may have been archived already"),
            ));
        };
        self.cache.invalidate_host(&hostid);

        let archive_group = self.options.archive_group.clone();
        let groupid = self
            .resolve_group(&archive_group, true)
            .await?
            .ok_or_else(|| CoreError::NotFound {
                entity: GROUP_ENTITY,
                identifier: archive_group.clone(),
            })?;

        let mut changes = HostDiff::for_host(hostid.clone());
        changes.status = Some(HostStatus::Disabled);
        changes.groups = Some(vec![groupid]);
        let returned = self.directory.update_host(&changes).await?;
        verify_hostid(&hostid, returned)?;

        let archived_at = Utc::now().to_rfc2822();
        self.directory
            .create_user_macro(&hostid, ARCHIVE_DATE_MACRO, &archived_at)
            .await?;

        let reason = reason.filter(|r| !r.is_empty());
        if let Some(reason) = reason {
            self.directory
                .create_user_macro(&hostid, ARCHIVE_REASON_MACRO, reason)
                .await?;
        }

        info!(identity, %hostid, group = %archive_group, "archived host");
        Ok(HostOutcome::new(
            OutcomeAction::Archived,
            Some(hostid.clone()),
            format!(
                "Archived {HOST_ENTITY} {identity} ({hostid}): {}",
                reason.unwrap_or("<no reason given>")
            ),
        )
        .with_diff(changes))
    }

    /// Delete the host for `instance`.
    pub async fn delete(
        &mut self,
        instance: &SourceInstance,
        ignore_missing: bool,
    ) -> Result<HostOutcome, CoreError> {
        let identity = instance.instance_id.as_str();
        let Some(hostid) = self.host_id(identity, ignore_missing).await? else {
            return Ok(missing(identity));
        };
        self.cache.forget_host(identity);

        let returned = self.directory.delete_host(&hostid).await?;
        verify_hostid(&hostid, returned)?;

        info!(identity, %hostid, "deleted host");
        Ok(HostOutcome::new(
            OutcomeAction::Deleted,
            Some(hostid.clone()),
            format!("Deleted {HOST_ENTITY} {identity} ({hostid})"),
        ))
    }

    // ── Name resolution ──────────────────────────────────────────────

    /// Group id for `name`: cache, then lookup, then (if allowed) create.
    /// `Ok(None)` when the group is absent and may not be created.
    pub async fn resolve_group(
        &mut self,
        name: &str,
        create_if_missing: bool,
    ) -> Result<Option<GroupId>, CoreError> {
        if let Some(id) = self.cache.lookup_group(name) {
            return Ok(Some(id));
        }

        let id = match self.directory.find_group(name).await? {
            Some(id) => id,
            None if create_if_missing => {
                let id = self.directory.create_group(name).await?;
                info!(group = name, groupid = %id, "created host group");
                id
            }
            None => return Ok(None),
        };

        debug!(group = name, groupid = %id, "resolved host group");
        self.cache.store_group(name, id.clone());
        Ok(Some(id))
    }

    /// Template id for `name`: cache, then lookup, then (if allowed) create
    /// inside the template parent group.
    pub async fn resolve_template(
        &mut self,
        name: &str,
        create_if_missing: bool,
    ) -> Result<Option<TemplateId>, CoreError> {
        if let Some(id) = self.cache.lookup_template(name) {
            return Ok(Some(id));
        }

        let id = match self.directory.find_template(name).await? {
            Some(id) => id,
            None if create_if_missing => {
                let parent_name = self.options.template_group.clone();
                let parent = self
                    .resolve_group(&parent_name, true)
                    .await?
                    .ok_or_else(|| CoreError::NotFound {
                        entity: GROUP_ENTITY,
                        identifier: parent_name,
                    })?;
                let id = self.directory.create_template(name, &parent).await?;
                info!(template = name, templateid = %id, "created template");
                id
            }
            None => return Ok(None),
        };

        debug!(template = name, templateid = %id, "resolved template");
        self.cache.store_template(name, id.clone());
        Ok(Some(id))
    }

    // ── Internals ────────────────────────────────────────────────────

    async fn current_host(&mut self, identity: &str) -> Result<Option<RegisteredHost>, CoreError> {
        if let Some(host) = self.cache.lookup_host(identity) {
            return Ok(Some(host));
        }
        let Some(host) = self.directory.find_host(identity).await? else {
            return Ok(None);
        };
        debug!(identity, hostid = %host.hostid, "looked up host");
        self.cache.store_host(host.clone());
        Ok(Some(host))
    }

    async fn host_id(
        &mut self,
        identity: &str,
        ignore_missing: bool,
    ) -> Result<Option<HostId>, CoreError> {
        if let Some(id) = self.cache.lookup_host_id(identity) {
            return Ok(Some(id));
        }
        match self.directory.find_host_id(identity).await? {
            Some(id) => {
                debug!(identity, hostid = %id, "looked up host id");
                self.cache.store_host_id(identity, id.clone());
                Ok(Some(id))
            }
            None if ignore_missing => Ok(None),
            None => Err(CoreError::NotFound {
                entity: HOST_ENTITY,
                identifier: identity.to_owned(),
            }),
        }
    }

    async fn desired_host(
        &mut self,
        instance: &SourceInstance,
        groups: &[String],
        templates: &[String],
    ) -> Result<TargetHost, CoreError> {
        // Reject a bad instance before resolution can create anything remotely.
        let mut host = self
            .transform
            .instance_to_host(instance, &[], &[], &self.options.macros)?;
        let create = self.options.create_missing;

        let mut group_ids = Vec::with_capacity(groups.len());
        for name in groups {
            match self.resolve_group(name, create).await? {
                Some(id) => group_ids.push(id),
                None => warn!(group = %name, "host group does not exist, skipping"),
            }
        }

        let mut template_ids = Vec::with_capacity(templates.len());
        for name in templates {
            match self.resolve_template(name, create).await? {
                Some(id) => template_ids.push(id),
                None => warn!(template = %name, "template does not exist, skipping"),
            }
        }

        host.groups = group_ids;
        host.templates = template_ids;
        Ok(host)
    }
}

fn verify_hostid(expected: &HostId, actual: HostId) -> Result<(), CoreError> {
    if *expected == actual {
        Ok(())
    } else {
        Err(CoreError::IdentityMismatch {
            expected: expected.to_string(),
            actual: actual.into_inner(),
        })
    }
}

fn missing(identity: &str) -> HostOutcome {
    HostOutcome::new(
        OutcomeAction::Missing,
        None,
        format!("{HOST_ENTITY} {identity} does not exist"),
    )
}
