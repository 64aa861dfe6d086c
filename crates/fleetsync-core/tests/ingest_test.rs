#![allow(clippy::unwrap_used)]
// Batch ingestion: stream envelopes fanned out into reconciler calls.

mod common;

use common::{FakeDirectory, instance};
use fleetsync_core::ingest::{StreamPayload, StreamRecord};
use fleetsync_core::{
    CoreError, FailurePolicy, GroupId, HostStatus, InstanceEvent, OutcomeAction, Reconciler,
    ReconcilerOptions, StreamEnvelope,
};
use pretty_assertions::assert_eq;

fn record(id: &str, state: &str) -> StreamRecord {
    StreamRecord::encode(&InstanceEvent {
        detail_type: "EC2 Instance State-change Notification".into(),
        detail: instance(id, state, "Web"),
    })
    .unwrap()
}

fn garbage() -> StreamRecord {
    StreamRecord {
        kinesis: StreamPayload {
            data: "%%%".into(),
        },
    }
}

fn envelope(records: Vec<StreamRecord>) -> StreamEnvelope {
    StreamEnvelope { records }
}

#[tokio::test]
async fn running_upserts_and_terminated_archives() {
    let mut r = Reconciler::new(FakeDirectory::new(), ReconcilerOptions::default());
    r.upsert(&instance("i-2", "running", "Web"), &[], &[]).await.unwrap();

    let report = r
        .ingest(
            &envelope(vec![record("i-1", "running"), record("i-2", "terminated")]),
            FailurePolicy::FailFast,
        )
        .await
        .unwrap();

    assert_eq!(report.message, "Processed 2 records");
    assert_eq!(report.processed, 2);
    assert_eq!(report.failed, 0);
    let actions: Vec<OutcomeAction> = report.outcomes.iter().map(|o| o.action).collect();
    assert_eq!(actions, vec![OutcomeAction::Created, OutcomeAction::Archived]);
    assert!(report.outcomes[1].message.ends_with(": Instance terminated"));

    let archived = r.directory().host("i-2").unwrap().host;
    assert_eq!(archived.status, HostStatus::Disabled);
}

#[tokio::test]
async fn terminated_unknown_host_is_tolerated() {
    let mut r = Reconciler::new(FakeDirectory::new(), ReconcilerOptions::default());
    let report = r
        .ingest(&envelope(vec![record("i-9", "terminated")]), FailurePolicy::FailFast)
        .await
        .unwrap();

    assert_eq!(report.outcomes[0].action, OutcomeAction::Missing);
    assert_eq!(r.directory().count("host.create"), 0);
}

#[tokio::test]
async fn stream_upserts_use_configured_groups() {
    let options = ReconcilerOptions {
        groups: vec!["EC2 Instances".into()],
        ..ReconcilerOptions::default()
    };
    let directory = FakeDirectory::new().with_group("EC2 Instances", "42");
    let mut r = Reconciler::new(directory, options);

    r.ingest(&envelope(vec![record("i-1", "pending")]), FailurePolicy::FailFast)
        .await
        .unwrap();

    let host = r.directory().host("i-1").unwrap().host;
    assert_eq!(host.groups, vec![GroupId::from("42")]);
    assert_eq!(host.status, HostStatus::Enabled);
}

#[tokio::test]
async fn fail_fast_stops_at_first_bad_record() {
    let mut r = Reconciler::new(FakeDirectory::new(), ReconcilerOptions::default());
    let err = r
        .ingest(
            &envelope(vec![record("i-1", "running"), garbage(), record("i-3", "running")]),
            FailurePolicy::FailFast,
        )
        .await
        .unwrap_err();

    assert!(matches!(err, CoreError::Decode { index: 1, .. }));
    assert!(r.directory().host("i-1").is_some());
    assert!(r.directory().host("i-3").is_none());
}

#[tokio::test]
async fn continue_counts_failures_and_carries_on() {
    let mut r = Reconciler::new(FakeDirectory::new(), ReconcilerOptions::default());
    let report = r
        .ingest(
            &envelope(vec![
                record("i-1", "running"),
                garbage(),
                record("i-3", "hibernating"),
                record("i-4", "stopped"),
            ]),
            FailurePolicy::Continue,
        )
        .await
        .unwrap();

    assert_eq!(report.processed, 4);
    assert_eq!(report.failed, 2);
    assert_eq!(report.succeeded(), 2);
    assert_eq!(report.message, "Processed 4 records");
    let failed: Vec<usize> = report.failures.iter().map(|f| f.index).collect();
    assert_eq!(failed, vec![1, 2]);
    assert_eq!(
        report.failures[1].error,
        "Unrecognised EC2 state: hibernating"
    );
    assert_eq!(
        r.directory().host("i-4").unwrap().host.status,
        HostStatus::Disabled
    );
}

#[tokio::test]
async fn empty_batch() {
    let mut r = Reconciler::new(FakeDirectory::new(), ReconcilerOptions::default());
    let report = r
        .ingest(&StreamEnvelope::default(), FailurePolicy::FailFast)
        .await
        .unwrap();
    assert_eq!(report.message, "Processed 0 records");
    assert!(report.outcomes.is_empty());
}
