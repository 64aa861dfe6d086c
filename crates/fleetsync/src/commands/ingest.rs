//! Stream batch ingestion.

use fleetsync_core::{FailurePolicy, HostDirectory, Reconciler, StreamEnvelope};

use crate::cli::{GlobalOpts, IngestArgs};
use crate::commands::util;
use crate::error::CliError;
use crate::output;

pub async fn handle<D: HostDirectory>(
    reconciler: &mut Reconciler<D>,
    args: IngestArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let envelope: StreamEnvelope = serde_json::from_str(&util::read_input(&args.batch)?)?;
    let policy = if args.continue_on_error {
        FailurePolicy::Continue
    } else {
        FailurePolicy::FailFast
    };

    let report = reconciler.ingest(&envelope, policy).await?;
    let rendered = output::render_report(global.output, &report)?;
    output::print_output(&rendered, global.quiet);

    if report.failed > 0 {
        return Err(CliError::PartialBatch {
            failed: report.failed,
            processed: report.processed,
        });
    }
    Ok(())
}
