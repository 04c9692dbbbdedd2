//! # Keycloak admin CLI

#![forbid(unsafe_code)]

use clap::Parser;
use kc_admin_client::AdminError;
use kc_cli::{
    cli::{Cli, Command},
    commands::{run_config, run_events, run_role, run_user, AdminContext},
    config::CliConfig,
    output::{error, warning},
    CliError, CliResult,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("warn,kc_admin_client=debug,kc_cli=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn run(cli: Cli, mut config: CliConfig) -> CliResult<()> {
    let globals = &cli.globals;
    let format = globals.output.unwrap_or(config.output_format);
    match cli.command {
        Command::Config(cmd) => run_config(cmd, &mut config),
        Command::User(cmd) => {
            let ctx = AdminContext::connect(globals, &config).await?;
            run_user(cmd, &ctx, format).await
        }
        Command::Role(cmd) => {
            let ctx = AdminContext::connect(globals, &config).await?;
            run_role(cmd, &ctx, format).await
        }
        Command::Events(cmd) => {
            let ctx = AdminContext::connect(globals, &config).await?;
            run_events(cmd, &ctx, format).await
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.globals.verbose);

    let config = match CliConfig::load() {
        Ok(c) => c,
        Err(e) => {
            error(&format!("Failed to load configuration: {e}"));
            std::process::exit(1);
        }
    };

    if let Err(e) = run(cli, config).await {
        error(&e.to_string());
        if let CliError::Admin(AdminError::ReconciliationPartialFailure { .. }) = &e {
            warning("Role assignments were partially applied; re-run set-roles to converge.");
        }
        std::process::exit(e.exit_code());
    }
}
