#![allow(clippy::unwrap_used)]
// Reconciler workflows against an in-memory host directory.

mod common;

use common::{FakeDirectory, instance};
use fleetsync_core::reconciler::{ARCHIVE_DATE_MACRO, ARCHIVE_REASON_MACRO};
use fleetsync_core::{
    CoreError, GroupId, HostStatus, OutcomeAction, Reconciler, ReconcilerOptions,
    TemplateId, UserMacro,
};
use pretty_assertions::assert_eq;

fn reconciler(directory: FakeDirectory) -> Reconciler<FakeDirectory> {
    Reconciler::new(directory, ReconcilerOptions::default())
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| (*s).to_owned()).collect()
}

// ── Upsert ──────────────────────────────────────────────────────────

#[tokio::test]
async fn upsert_creates_then_noops_then_updates_status() {
    let mut r = reconciler(FakeDirectory::new());

    let first = r.upsert(&instance("i-1", "running", "Web1"), &[], &[]).await.unwrap();
    assert_eq!(first.action, OutcomeAction::Created);
    let hostid = first.hostid.clone().unwrap();
    assert_eq!(first.message, format!("Created Zabbix Host i-1 ({hostid})"));

    let second = r.upsert(&instance("i-1", "running", "Web1"), &[], &[]).await.unwrap();
    assert_eq!(second.action, OutcomeAction::Unchanged);
    assert_eq!(second.message, format!("No changes for Zabbix Host i-1 ({hostid})"));
    assert_eq!(second.diff, None);
    assert_eq!(r.directory().count("host.update"), 0);

    let third = r.upsert(&instance("i-1", "stopped", "Web1"), &[], &[]).await.unwrap();
    assert_eq!(third.action, OutcomeAction::Updated);
    assert_eq!(third.message, format!("Updated Zabbix Host i-1 ({hostid})"));
    let diff = third.diff.unwrap();
    assert_eq!(diff.changed_fields(), vec!["status"]);
    assert_eq!(diff.status, Some(HostStatus::Disabled));
    assert_eq!(r.directory().count("host.update"), 1);
    assert_eq!(
        r.directory().host("i-1").unwrap().host.status,
        HostStatus::Disabled
    );

    // The update evicted the cached record, so this diffs against the fresh one.
    let fourth = r.upsert(&instance("i-1", "stopped", "Web1"), &[], &[]).await.unwrap();
    assert_eq!(fourth.action, OutcomeAction::Unchanged);
    assert_eq!(r.directory().count("host.update"), 1);
}

#[tokio::test]
async fn created_host_carries_transform_output() {
    let mut r = reconciler(FakeDirectory::new());
    r.upsert(&instance("i-1", "running", "Web1"), &[], &[]).await.unwrap();

    let host = r.directory().host("i-1").unwrap().host;
    assert_eq!(host.name, "Web1 (i-1)");
    assert_eq!(host.inventory["name"], "Web1");
    assert_eq!(host.inventory["host_networks"], "vpc-1\nsubnet-1");
    assert_eq!(host.macros["{$EC2_TAG_NAME}"], "Web1");
}

#[tokio::test]
async fn renaming_updates_name_and_inventory_only() {
    let mut r = reconciler(FakeDirectory::new());
    r.upsert(&instance("i-1", "running", "Web1"), &[], &[]).await.unwrap();

    let outcome = r.upsert(&instance("i-1", "running", "Web2"), &[], &[]).await.unwrap();
    let diff = outcome.diff.unwrap();
    assert_eq!(diff.changed_fields(), vec!["name", "inventory"]);
    assert_eq!(diff.name.as_deref(), Some("Web2 (i-1)"));
    assert_eq!(diff.inventory.len(), 1);
    assert_eq!(diff.inventory["name"], "Web2");
}

#[tokio::test]
async fn upsert_resolves_and_creates_groups_and_templates() {
    let directory = FakeDirectory::new()
        .with_group("Linux servers", "2")
        .with_template("Template OS Linux", "10001");
    let mut r = reconciler(directory);

    r.upsert(
        &instance("i-1", "running", "Web1"),
        &names(&["Linux servers", "EC2"]),
        &names(&["Template OS Linux", "Template EC2"]),
    )
    .await
    .unwrap();

    let state = r.directory().state();
    let created_group = state.groups["EC2"].clone();
    let templates_group = state.groups["Templates"].clone();
    let (created_template, parent) = state.templates["Template EC2"].clone();
    assert_eq!(parent, templates_group);

    let host = &state.hosts["i-1"].host;
    assert_eq!(host.groups, vec![GroupId::from("2"), created_group]);
    assert_eq!(
        host.templates,
        vec![TemplateId::from("10001"), created_template]
    );
}

#[tokio::test]
async fn missing_groups_are_skipped_when_creation_is_disabled() {
    let directory = FakeDirectory::new().with_group("Linux servers", "2");
    let options = ReconcilerOptions {
        create_missing: false,
        ..ReconcilerOptions::default()
    };
    let mut r = Reconciler::new(directory, options);

    r.upsert(
        &instance("i-1", "running", "Web1"),
        &names(&["Linux servers", "Nope"]),
        &names(&["Missing template"]),
    )
    .await
    .unwrap();

    let host = r.directory().host("i-1").unwrap().host;
    assert_eq!(host.groups, vec![GroupId::from("2")]);
    assert!(host.templates.is_empty());
    assert_eq!(r.directory().count("hostgroup.create"), 0);
    assert_eq!(r.directory().count("template.create"), 0);
}

#[tokio::test]
async fn group_lookups_are_cached() {
    let mut r = reconciler(FakeDirectory::new().with_group("Linux servers", "2"));
    let groups = names(&["Linux servers"]);

    r.upsert(&instance("i-1", "running", "Web1"), &groups, &[]).await.unwrap();
    r.upsert(&instance("i-2", "running", "Web2"), &groups, &[]).await.unwrap();

    assert_eq!(r.directory().count("hostgroup.get"), 1);
}

#[tokio::test]
async fn group_membership_change_sends_full_list() {
    let directory = FakeDirectory::new()
        .with_group("A", "1")
        .with_group("B", "2");
    let mut r = reconciler(directory);
    let inst = instance("i-1", "running", "Web1");

    r.upsert(&inst, &names(&["A"]), &[]).await.unwrap();
    let outcome = r.upsert(&inst, &names(&["B", "A"]), &[]).await.unwrap();

    let diff = outcome.diff.unwrap();
    assert_eq!(diff.changed_fields(), vec!["groups"]);
    assert_eq!(
        diff.groups,
        Some(vec![GroupId::from("2"), GroupId::from("1")])
    );
}

#[tokio::test]
async fn operator_macros_are_applied() {
    let options = ReconcilerOptions {
        macros: vec![UserMacro::new("{$SNMP_COMMUNITY}", "public")],
        ..ReconcilerOptions::default()
    };
    let mut r = Reconciler::new(FakeDirectory::new(), options);
    r.upsert(&instance("i-1", "running", "Web1"), &[], &[]).await.unwrap();

    let host = r.directory().host("i-1").unwrap().host;
    let keys: Vec<&str> = host.macros.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["{$SNMP_COMMUNITY}", "{$EC2_TAG_NAME}"]);
}

#[tokio::test]
async fn update_with_foreign_hostid_is_rejected() {
    let mut r = reconciler(FakeDirectory::new());
    r.upsert(&instance("i-1", "running", "Web1"), &[], &[]).await.unwrap();
    r.directory().state().wrong_update_id = true;

    let err = r
        .upsert(&instance("i-1", "stopped", "Web1"), &[], &[])
        .await
        .unwrap_err();
    assert!(
        matches!(&err, CoreError::IdentityMismatch { actual, .. } if actual == "99999"),
        "unexpected error: {err:?}"
    );
}

#[tokio::test]
async fn unknown_state_is_rejected() {
    let mut r = reconciler(FakeDirectory::new());
    let err = r
        .upsert(&instance("i-1", "rebooting", "Web1"), &[], &[])
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Unrecognised EC2 state: rebooting");
    assert_eq!(r.directory().count("host.create"), 0);
}

#[tokio::test]
async fn rejected_instance_creates_no_groups_or_templates() {
    let mut r = reconciler(FakeDirectory::new());
    let groups = ["NewGroup".to_owned()];
    let templates = ["NewTemplate".to_owned()];

    let err = r
        .upsert(&instance("i-1", "rebooting", "Web1"), &groups, &templates)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::UnrecognizedState { .. }));

    let mut incomplete = instance("i-2", "running", "Web2");
    incomplete.vpc_id = None;
    let err = r.create(&incomplete, &groups, &templates).await.unwrap_err();
    assert!(matches!(
        err,
        CoreError::InvalidInstance { field: "VpcId", .. }
    ));

    let dir = r.directory();
    assert_eq!(dir.count("hostgroup.get"), 0);
    assert_eq!(dir.count("hostgroup.create"), 0);
    assert_eq!(dir.count("template.get"), 0);
    assert_eq!(dir.count("template.create"), 0);
    assert_eq!(dir.count("host.create"), 0);
}

// ── Toggle ──────────────────────────────────────────────────────────

#[tokio::test]
async fn disable_then_enable() {
    let mut r = reconciler(FakeDirectory::new());
    let inst = instance("i-1", "running", "Web1");
    let hostid = r.upsert(&inst, &[], &[]).await.unwrap().hostid.unwrap();

    let off = r.disable(&inst, false).await.unwrap();
    assert_eq!(off.action, OutcomeAction::Disabled);
    assert_eq!(off.message, format!("Disabled Zabbix Host i-1 ({hostid})"));
    assert_eq!(
        r.directory().host("i-1").unwrap().host.status,
        HostStatus::Disabled
    );

    let on = r.enable(&inst, false).await.unwrap();
    assert_eq!(on.action, OutcomeAction::Enabled);
    assert_eq!(on.message, format!("Enabled Zabbix Host i-1 ({hostid})"));

    let last = r.directory().state().updates.last().cloned().unwrap();
    assert_eq!(last.changed_fields(), vec!["status"]);
}

#[tokio::test]
async fn toggle_evicts_cached_record() {
    let mut r = reconciler(FakeDirectory::new());
    let inst = instance("i-1", "running", "Web1");
    r.upsert(&inst, &[], &[]).await.unwrap();
    // Second upsert caches the full record.
    r.upsert(&inst, &[], &[]).await.unwrap();

    r.disable(&inst, false).await.unwrap();
    let outcome = r.upsert(&inst, &[], &[]).await.unwrap();

    assert_eq!(outcome.action, OutcomeAction::Updated);
    assert_eq!(outcome.diff.unwrap().status, Some(HostStatus::Enabled));
}

#[tokio::test]
async fn toggle_missing_host() {
    let mut r = reconciler(FakeDirectory::new());
    let inst = instance("i-404", "running", "Ghost");

    let err = r.disable(&inst, false).await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.to_string(), "Zabbix Host not found: i-404");

    let outcome = r.disable(&inst, true).await.unwrap();
    assert_eq!(outcome.action, OutcomeAction::Missing);
    assert_eq!(outcome.hostid, None);
    assert_eq!(r.directory().count("host.update"), 0);
}

// ── Archive ─────────────────────────────────────────────────────────

#[tokio::test]
async fn archive_disables_moves_and_stamps() {
    let mut r = reconciler(FakeDirectory::new().with_group("Linux servers", "2"));
    let inst = instance("i-1", "running", "Web1");
    let hostid = r
        .upsert(&inst, &names(&["Linux servers"]), &[])
        .await
        .unwrap()
        .hostid
        .unwrap();

    let outcome = r.archive(&inst, Some("Decommissioned"), false).await.unwrap();
    assert_eq!(outcome.action, OutcomeAction::Archived);
    assert_eq!(
        outcome.message,
        format!("Archived Zabbix Host i-1 ({hostid}): Decommissioned")
    );

    let state = r.directory().state();
    let archive_id = state.groups["Archive"].clone();
    let host = &state.hosts["i-1"].host;
    assert_eq!(host.status, HostStatus::Disabled);
    assert_eq!(host.groups, vec![archive_id]);

    let macros: Vec<&str> = state.macros.iter().map(|(_, m, _)| m.as_str()).collect();
    assert_eq!(macros, vec![ARCHIVE_DATE_MACRO, ARCHIVE_REASON_MACRO]);
    assert!(state.macros.iter().all(|(id, _, _)| *id == hostid));
    assert_eq!(state.macros[1].2, "Decommissioned");
    // RFC 2822, e.g. "Mon, 19 Oct 2026 10:00:00 +0000".
    assert!(chrono::DateTime::parse_from_rfc2822(&state.macros[0].2).is_ok());
}

#[tokio::test]
async fn archive_without_reason() {
    let mut r = reconciler(FakeDirectory::new());
    let inst = instance("i-1", "running", "Web1");
    let hostid = r.upsert(&inst, &[], &[]).await.unwrap().hostid.unwrap();

    let outcome = r.archive(&inst, None, false).await.unwrap();
    assert_eq!(
        outcome.message,
        format!("Archived Zabbix Host i-1 ({hostid}): <no reason given>")
    );
    assert_eq!(r.directory().count("usermacro.create"), 1);
}

#[tokio::test]
async fn archive_into_custom_group() {
    let options = ReconcilerOptions {
        archive_group: "Retired".into(),
        ..ReconcilerOptions::default()
    };
    let mut r = Reconciler::new(FakeDirectory::new().with_group("Retired", "77"), options);
    let inst = instance("i-1", "running", "Web1");
    r.upsert(&inst, &[], &[]).await.unwrap();

    r.archive(&inst, None, false).await.unwrap();
    assert_eq!(
        r.directory().host("i-1").unwrap().host.groups,
        vec![GroupId::from("77")]
    );
    assert_eq!(r.directory().count("hostgroup.create"), 0);
}

#[tokio::test]
async fn archive_missing_host() {
    let mut r = reconciler(FakeDirectory::new());
    let inst = instance("i-404", "terminated", "Ghost");

    assert!(r.archive(&inst, None, false).await.unwrap_err().is_not_found());

    let outcome = r.archive(&inst, None, true).await.unwrap();
    assert_eq!(outcome.action, OutcomeAction::Missing);
    assert_eq!(
        outcome.message,
        "Zabbix Host i-404 does not exist - may have been archived already"
    );
}

// ── Delete ──────────────────────────────────────────────────────────

#[tokio::test]
async fn delete_forgets_identity() {
    let mut r = reconciler(FakeDirectory::new());
    let inst = instance("i-1", "running", "Web1");
    let hostid = r.upsert(&inst, &[], &[]).await.unwrap().hostid.unwrap();

    let outcome = r.delete(&inst, false).await.unwrap();
    assert_eq!(outcome.action, OutcomeAction::Deleted);
    assert_eq!(outcome.message, format!("Deleted Zabbix Host i-1 ({hostid})"));
    assert!(r.directory().host("i-1").is_none());

    let again = r.upsert(&inst, &[], &[]).await.unwrap();
    assert_eq!(again.action, OutcomeAction::Created);
    assert_ne!(again.hostid, Some(hostid));
}

#[tokio::test]
async fn delete_missing_host() {
    let mut r = reconciler(FakeDirectory::new());
    let inst = instance("i-404", "running", "Ghost");

    assert!(r.delete(&inst, false).await.unwrap_err().is_not_found());
    let outcome = r.delete(&inst, true).await.unwrap();
    assert_eq!(outcome.action, OutcomeAction::Missing);
    assert_eq!(r.directory().count("host.delete"), 0);
}

#[tokio::test]
async fn resolve_without_creation_returns_none() {
    let mut r = reconciler(FakeDirectory::new());
    assert_eq!(r.resolve_group("Nope", false).await.unwrap(), None);
    assert_eq!(r.resolve_template("Nope", false).await.unwrap(), None);

    let created = r.resolve_group("Yes", true).await.unwrap().unwrap();
    assert_eq!(r.resolve_group("Yes", false).await.unwrap(), Some(created));
    assert_eq!(r.directory().count("hostgroup.create"), 1);
}
