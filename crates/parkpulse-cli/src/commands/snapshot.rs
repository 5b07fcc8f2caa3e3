use parkpulse_core::{
    AttractionStatus, CharacterMeet, EntertainmentBundle, Envelope, HealthReport,
    ParkDataService, ParkHoursEntry, ParkId,
};
use serde::Serialize;
use serde_json::Value;

use crate::cli::ParkArgs;
use crate::error::CliError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SnapshotResponseData {
    park: ParkId,
    park_name: &'static str,
    wait_times: Envelope<Vec<AttractionStatus>>,
    park_hours: Envelope<Vec<ParkHoursEntry>>,
    entertainment: Envelope<EntertainmentBundle>,
    characters: Envelope<Vec<CharacterMeet>>,
    health: HealthReport,
}

/// Acquires every domain concurrently, then reports health after all settle.
pub async fn run(args: &ParkArgs, service: &ParkDataService) -> Result<Value, CliError> {
    let park = args.park.parse::<ParkId>()?;
    let id = park.as_str();

    let (wait_times, park_hours, entertainment, characters) = tokio::join!(
        service.acquire_wait_times(id),
        service.acquire_park_hours(id),
        service.acquire_entertainment(id),
        service.acquire_characters(id),
    );

    let data = SnapshotResponseData {
        park,
        park_name: park.display_name(),
        wait_times: wait_times?,
        park_hours: park_hours?,
        entertainment: entertainment?,
        characters: characters?,
        health: service.health().await,
    };
    Ok(serde_json::to_value(data)?)
}
