mod cli;
mod commands;
mod config;
mod error;
mod inspect;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use homie_setup_api::DeviceClient;

use crate::cli::{Cli, Command};
use crate::error::CliError;
use crate::inspect::SystemNetwork;

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup tracing based on verbosity
    init_tracing(cli.global.verbose);

    // Dispatch and handle errors with proper exit codes
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
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        // Config commands don't need a device
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global),

        // Shell completions generation
        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "homie-setup", &mut std::io::stdout());
            Ok(())
        }

        // Generation is offline
        Command::Generate(ref args) => {
            commands::generate::generate(args, &cli.global, &SystemNetwork)
        }

        // The wizard resolves the device address itself
        Command::Wizard(args) => {
            let cfg = config::load_config_or_default();
            commands::wizard::handle(args, &cli.global, &cfg, &SystemNetwork).await
        }

        // All other commands talk to the device
        cmd => {
            let cfg = config::load_config_or_default();
            let format = config::output_format(&cli.global, &cfg);
            let options = config::resolve_options(&cli.global, &cfg, config::gateway_or_default)?;
            let client = DeviceClient::new(options)?;

            tracing::debug!(command = ?cmd, url = %client.base_url(), "dispatching command");
            commands::dispatch(cmd, &client, &cli.global, format).await
        }
    }
}
