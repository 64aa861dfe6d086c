mod cli;
mod commands;
mod error;
mod output;

use clap::Parser;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use fleetsync_config::Config;
use fleetsync_core::Reconciler;

use crate::cli::{Cli, Command, GlobalOpts};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        // Config commands don't need a Zabbix connection
        Command::Config(ref args) => commands::config_cmd::handle(args, &cli.global),

        Command::Completions(ref args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "fleetsync", &mut std::io::stdout());
            Ok(())
        }

        cmd => {
            let cfg = load_config(&cli.global)?;
            let client = fleetsync_core::connect(&cfg.connection()?).await?;
            let mut reconciler = Reconciler::new(client, cfg.reconciler_options());

            tracing::debug!(command = ?cmd, "dispatching command");
            let result = commands::dispatch(cmd, &mut reconciler, &cli.global).await;

            let mut client = reconciler.into_directory();
            if client.has_session() {
                if let Err(e) = client.logout().await {
                    warn!(error = %e, "failed to close Zabbix session");
                }
            }
            result
        }
    }
}

/// Load the layered configuration and apply command-line overrides.
pub(crate) fn load_config(global: &GlobalOpts) -> Result<Config, CliError> {
    let mut cfg = fleetsync_config::load_config(global.config.as_deref())?;
    if let Some(url) = &global.url {
        cfg.zabbix.url = Some(url.clone());
    }
    if global.insecure {
        cfg.zabbix.insecure = true;
    }
    if let Some(timeout) = global.timeout {
        cfg.zabbix.timeout = timeout;
    }
    Ok(cfg)
}
