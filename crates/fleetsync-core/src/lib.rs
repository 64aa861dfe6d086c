// fleetsync-core: Reconciliation engine between EC2 instance snapshots and Zabbix hosts.

pub mod cache;
pub mod config;
pub mod convert;
pub mod diff;
pub mod directory;
pub mod error;
pub mod ingest;
pub mod model;
pub mod reconciler;
pub mod transform;

// ── Primary re-exports ──────────────────────────────────────────────
pub use cache::{CachePolicy, IdentityCache};
pub use config::{AuthCredentials, ConnectionConfig, ReconcilerOptions, TlsVerification};
pub use diff::{HostDiff, diff};
pub use directory::{HostDirectory, connect};
pub use error::CoreError;
pub use ingest::{BatchReport, FailurePolicy, InstanceEvent, RecordFailure, StreamEnvelope};
pub use reconciler::Reconciler;
pub use transform::{Transform, state_to_status};

// Re-export model types at the crate root for ergonomics.
pub use model::{
    GroupId, HostId, HostInterface, HostOutcome, HostStatus, InstanceState, OutcomeAction,
    RegisteredHost, SourceInstance, Tag, TargetHost, TemplateId, UserMacro,
};
