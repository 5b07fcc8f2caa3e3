use parkpulse_core::ParkDataService;
use serde_json::Value;

use crate::cli::ParkArgs;
use crate::error::CliError;

pub async fn wait_times(args: &ParkArgs, service: &ParkDataService) -> Result<Value, CliError> {
    let envelope = service.acquire_wait_times(&args.park).await?;
    Ok(serde_json::to_value(envelope)?)
}

pub async fn park_hours(args: &ParkArgs, service: &ParkDataService) -> Result<Value, CliError> {
    let envelope = service.acquire_park_hours(&args.park).await?;
    Ok(serde_json::to_value(envelope)?)
}

pub async fn entertainment(args: &ParkArgs, service: &ParkDataService) -> Result<Value, CliError> {
    let envelope = service.acquire_entertainment(&args.park).await?;
    Ok(serde_json::to_value(envelope)?)
}

pub async fn characters(args: &ParkArgs, service: &ParkDataService) -> Result<Value, CliError> {
    let envelope = service.acquire_characters(&args.park).await?;
    Ok(serde_json::to_value(envelope)?)
}
