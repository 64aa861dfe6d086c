//! Single-instance host workflows.

use fleetsync_core::{HostDirectory, HostOutcome, Reconciler};

use crate::cli::{ArchiveArgs, GlobalOpts, HostArgs, ToggleArgs};
use crate::commands::util;
use crate::error::CliError;
use crate::output;

fn show(outcome: &HostOutcome, global: &GlobalOpts) -> Result<(), CliError> {
    let rendered = output::render_outcome(global.output, outcome)?;
    output::print_output(&rendered, global.quiet);
    Ok(())
}

/// Explicit names win; otherwise the configured defaults apply.
fn or_configured(explicit: Vec<String>, configured: &[String]) -> Vec<String> {
    if explicit.is_empty() {
        configured.to_vec()
    } else {
        explicit
    }
}

pub async fn upsert<D: HostDirectory>(
    reconciler: &mut Reconciler<D>,
    args: HostArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let instance = util::read_instance(&args.input.instance)?;
    let groups = or_configured(args.groups, &reconciler.options().groups);
    let templates = or_configured(args.templates, &reconciler.options().templates);

    let outcome = reconciler.upsert(&instance, &groups, &templates).await?;
    show(&outcome, global)
}

pub async fn create<D: HostDirectory>(
    reconciler: &mut Reconciler<D>,
    args: HostArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let instance = util::read_instance(&args.input.instance)?;
    let groups = or_configured(args.groups, &reconciler.options().groups);
    let templates = or_configured(args.templates, &reconciler.options().templates);

    let outcome = reconciler.create(&instance, &groups, &templates).await?;
    show(&outcome, global)
}

pub async fn toggle<D: HostDirectory>(
    reconciler: &mut Reconciler<D>,
    args: ToggleArgs,
    enable: bool,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let instance = util::read_instance(&args.input.instance)?;
    let outcome = reconciler
        .toggle(&instance, enable, args.ignore_missing)
        .await?;
    show(&outcome, global)
}

pub async fn archive<D: HostDirectory>(
    reconciler: &mut Reconciler<D>,
    args: ArchiveArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let instance = util::read_instance(&args.input.instance)?;
    let outcome = reconciler
        .archive(&instance, args.reason.as_deref(), args.ignore_missing)
        .await?;
    show(&outcome, global)
}

pub async fn delete<D: HostDirectory>(
    reconciler: &mut Reconciler<D>,
    args: ToggleArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let instance = util::read_instance(&args.input.instance)?;
    let outcome = reconciler.delete(&instance, args.ignore_missing).await?;
    show(&outcome, global)
}
