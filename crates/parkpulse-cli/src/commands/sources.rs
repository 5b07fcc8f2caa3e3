use parkpulse_core::{DataDomain, ParkDataService, SourceEndpoint};
use serde::Serialize;
use serde_json::Value;

use crate::cli::SourcesArgs;
use crate::error::CliError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SourcesResponseData {
    domain: DataDomain,
    park: String,
    retries_per_source: u32,
    worst_case_latency_ms: u64,
    sources: Vec<SourceEndpoint>,
}

pub fn run(args: &SourcesArgs, service: &ParkDataService) -> Result<Value, CliError> {
    let domain = args.domain.parse::<DataDomain>()?;
    let sources = service.registry().endpoints(domain, &args.park)?;
    let retry = service.retry_for(domain);
    let worst_case = service.worst_case_latency(domain);

    let data = SourcesResponseData {
        domain,
        park: args.park.trim().to_owned(),
        retries_per_source: retry.max_retries,
        worst_case_latency_ms: u64::try_from(worst_case.as_millis()).unwrap_or(u64::MAX),
        sources,
    };
    Ok(serde_json::to_value(data)?)
}
