//! Command dispatch: bridges CLI args -> reconciler workflows -> output formatting.

pub mod config_cmd;
pub mod hosts;
pub mod ingest;
pub mod util;

use fleetsync_core::{HostDirectory, Reconciler};

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a Zabbix-bound command to the appropriate handler.
pub async fn dispatch<D: HostDirectory>(
    cmd: Command,
    reconciler: &mut Reconciler<D>,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Upsert(args) => hosts::upsert(reconciler, args, global).await,
        Command::Create(args) => hosts::create(reconciler, args, global).await,
        Command::Enable(args) => hosts::toggle(reconciler, args, true, global).await,
        Command::Disable(args) => hosts::toggle(reconciler, args, false, global).await,
        Command::Archive(args) => hosts::archive(reconciler, args, global).await,
        Command::Delete(args) => hosts::delete(reconciler, args, global).await,
        Command::Ingest(args) => ingest::handle(reconciler, args, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
