mod domains;
mod snapshot;
mod sources;

use parkpulse_core::ParkDataService;
use serde_json::Value;

use crate::cli::{Cli, Command};
use crate::error::CliError;

pub async fn run(cli: &Cli, service: &ParkDataService) -> Result<Value, CliError> {
    match &cli.command {
        Command::WaitTimes(args) => domains::wait_times(args, service).await,
        Command::Hours(args) => domains::park_hours(args, service).await,
        Command::Entertainment(args) => domains::entertainment(args, service).await,
        Command::Characters(args) => domains::characters(args, service).await,
        Command::Snapshot(args) => snapshot::run(args, service).await,
        Command::Sources(args) => sources::run(args, service),
    }
}
