// ── Batch ingestion ──
//
// Fans a stream batch (`{"Records": [{"kinesis": {"data": "<base64>"}}]}`)
// out into single-event reconciler calls, strictly in record order. Each
// record decodes to an event whose `detail` is an instance snapshot.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::directory::HostDirectory;
use crate::error::CoreError;
use crate::model::{HostOutcome, InstanceState, SourceInstance};
use crate::reconciler::Reconciler;

/// Archive reason recorded for hosts whose instance terminated.
pub const TERMINATED_REASON: &str = "Instance terminated";

// ── Wire shapes ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamEnvelope {
    #[serde(rename = "Records", default)]
    pub records: Vec<StreamRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamRecord {
    pub kinesis: StreamPayload,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamPayload {
    /// Base64 (standard alphabet) JSON of an [`InstanceEvent`].
    pub data: String,
}

/// One decoded record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceEvent {
    #[serde(rename = "detail-type", default)]
    pub detail_type: String,
    pub detail: SourceInstance,
}

impl StreamRecord {
    /// Wrap an event as a stream record.
    pub fn encode(event: &InstanceEvent) -> Result<Self, serde_json::Error> {
        let json = serde_json::to_vec(event)?;
        Ok(Self {
            kinesis: StreamPayload {
                data: STANDARD.encode(json),
            },
        })
    }

    /// Decode this record; `index` is its position in the batch.
    pub fn decode(&self, index: usize) -> Result<InstanceEvent, CoreError> {
        let bytes = STANDARD
            .decode(self.kinesis.data.trim())
            .map_err(|e| CoreError::Decode {
                index,
                reason: format!("invalid base64: {e}"),
            })?;
        serde_json::from_slice(&bytes).map_err(|e| CoreError::Decode {
            index,
            reason: format!("invalid event JSON: {e}"),
        })
    }
}

impl StreamEnvelope {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// ── Policy & report ──────────────────────────────────────────────────

/// What to do when one record fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Stop at the first failing record and return its error.
    #[default]
    FailFast,
    /// Log the failure, count it, and carry on with the next record.
    Continue,
}

/// A record that failed under [`FailurePolicy::Continue`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordFailure {
    pub index: usize,
    pub error: String,
}

/// Result of one batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    /// Records handled, successful or not.
    pub processed: usize,
    pub failed: usize,
    pub outcomes: Vec<HostOutcome>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<RecordFailure>,
    pub message: String,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.processed - self.failed
    }
}

// ── Dispatch ─────────────────────────────────────────────────────────

impl<D: HostDirectory> Reconciler<D> {
    /// Reconcile one event: a terminated instance archives its host
    /// (tolerating a host that is already gone), any other state upserts
    /// with the configured groups and templates.
    pub async fn handle_event(&mut self, event: &InstanceEvent) -> Result<HostOutcome, CoreError> {
        let instance = &event.detail;
        debug!(
            identity = %instance.instance_id,
            detail_type = %event.detail_type,
            state = %instance.state.name,
            "handling instance event"
        );

        if instance.lifecycle()? == InstanceState::Terminated {
            return self.archive(instance, Some(TERMINATED_REASON), true).await;
        }

        let groups = self.options().groups.clone();
        let templates = self.options().templates.clone();
        self.upsert(instance, &groups, &templates).await
    }

    /// Process every record of `envelope` in order.
    pub async fn ingest(
        &mut self,
        envelope: &StreamEnvelope,
        policy: FailurePolicy,
    ) -> Result<BatchReport, CoreError> {
        let mut outcomes = Vec::with_capacity(envelope.len());
        let mut failures = Vec::new();

        for (index, record) in envelope.records.iter().enumerate() {
            let result = match record.decode(index) {
                Ok(event) => self.handle_event(&event).await,
                Err(e) => Err(e),
            };
            match (result, policy) {
                (Ok(outcome), _) => {
                    info!(index, "{}", outcome.message);
                    outcomes.push(outcome);
                }
                (Err(e), FailurePolicy::FailFast) => return Err(e),
                (Err(e), FailurePolicy::Continue) => {
                    warn!(index, error = %e, "record failed, continuing");
                    failures.push(RecordFailure {
                        index,
                        error: e.to_string(),
                    });
                }
            }
        }

        let processed = envelope.len();
        Ok(BatchReport {
            processed,
            failed: failures.len(),
            outcomes,
            failures,
            message: format!("Processed {processed} records"),
        })
    }
}
