// ── Domain model ──
//
// Typed representations of the two sides being reconciled: the EC2
// instance snapshot (source) and the Zabbix host (target). Wire shapes of
// the monitoring API live in `fleetsync_api::models`; `crate::convert`
// bridges the two.

pub mod host;
pub mod ids;
pub mod instance;
pub mod outcome;

// ── Re-exports ──────────────────────────────────────────────────────

pub use host::{HostInterface, HostStatus, RegisteredHost, TargetHost, UserMacro, inventory};
pub use ids::{GroupId, HostId, TemplateId};
pub use instance::{InstanceState, NetworkInterface, Placement, SourceInstance, StateRef, Tag};
pub use outcome::{HostOutcome, OutcomeAction};
