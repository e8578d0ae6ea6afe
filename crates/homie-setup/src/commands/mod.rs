//! Command dispatch: bridges CLI args -> device client -> output formatting.

pub mod config_cmd;
pub mod device;
pub mod generate;
pub mod networks;
pub mod proxy;
pub mod util;
pub mod wifi;
pub mod wizard;

use homie_setup_api::DeviceClient;

use crate::cli::{Command, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::inspect::SystemNetwork;

/// Dispatch a device-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    client: &DeviceClient,
    global: &GlobalOpts,
    format: OutputFormat,
) -> Result<(), CliError> {
    match cmd {
        Command::Heartbeat => device::heartbeat(client, global, format).await,
        Command::Info => device::info(client, global, format).await,
        Command::Networks(args) => networks::handle(client, args, global, format).await,
        Command::WifiStatus => wifi::status(client, global, format).await,
        Command::WifiConnect(args) => wifi::connect(client, args, global, format).await,
        Command::Proxy(args) => proxy::handle(client, args, global, format).await,
        Command::Push(args) => generate::push(client, &args, global, &SystemNetwork).await,
        // Handled before a client is built
        Command::Generate(_) | Command::Wizard(_) | Command::Config(_) | Command::Completions(_) => {
            unreachable!()
        }
    }
}
